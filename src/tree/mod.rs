use crate::models::{MovePayload, MoveRequest};

/// The drag-and-drop tree widget holding the book.
pub(crate) trait TreeWidget {
    /// Opaque handle the widget hands out with each move, used to undo it.
    type Rollback;

    /// `move_url` from the widget's current settings.
    fn move_url(&self) -> Option<String>;

    fn rollback(&self, handle: &Self::Rollback);
}

/// One persistence request per moved node; positions count up from the drop point.
pub(crate) fn move_requests(payload: &MovePayload) -> Vec<MoveRequest> {
    payload
        .moved
        .iter()
        .zip(0i64..)
        .map(|(topic, i)| MoveRequest {
            what: topic.clone(),
            new_parent: payload.new_parent.clone(),
            new_pos: payload.base_position + i,
        })
        .collect()
}
