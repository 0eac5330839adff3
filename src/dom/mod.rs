/// An element (by id) or a group of elements (by class) on the Bookmaker page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Selector {
    Id(&'static str),
    Class(&'static str),
}

impl Selector {
    pub fn css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{id}"),
            Selector::Class(class) => format!(".{class}"),
        }
    }
}

pub(crate) const MORE_PANEL: Selector = Selector::Id("bookmaker_more");
pub(crate) const EXPAND_PANEL: Selector = Selector::Id("bookmaker_expand");
pub(crate) const CONTRACT_CONTROL: Selector = Selector::Id("bookmaker_contract");
pub(crate) const ACTIVE: Selector = Selector::Class("bookmaker_active");
pub(crate) const ACTION: Selector = Selector::Class("bookmaker_action");
pub(crate) const BOOK_TITLE: Selector = Selector::Id("book_title");
pub(crate) const NEW_BOOK_PANEL: Selector = Selector::Id("new_book");
pub(crate) const CHANGE_PANEL: Selector = Selector::Id("bookmaker_change");
pub(crate) const BUTTON: Selector = Selector::Class("bookmaker_button");
pub(crate) const BOOK_TREE: Selector = Selector::Id("book_tree");

/// Per-node attribute carrying the topic id in the book tree.
pub(crate) const TOPIC_ATTR: &str = "topic";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum Transition {
    Show,
    Hide,
    FadeIn,
    FadeOut,
    SlideUp,
}

impl Transition {
    /// Whether the target is visible once the transition finishes.
    pub fn ends_visible(&self) -> bool {
        matches!(self, Transition::Show | Transition::FadeIn)
    }
}

/// What should happen to the browser's default action for an event.
///
/// `PreventDefault` also stops propagation, like returning `false` from a jQuery handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EventOutcome {
    Continue,
    PreventDefault,
}

/// Page operations the controller needs.
pub(crate) trait UiBinding {
    fn apply(&self, target: Selector, transition: Transition);
    /// Blocking, user-facing message.
    fn alert(&self, message: &str);
    /// Execute a script returned by the server.
    fn run_script(&self, script: &str) -> Result<(), String>;
}
