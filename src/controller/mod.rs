use crate::api::{HttpMethod, OutgoingRequest, ResponseKind, Transport};
use crate::dom::{
    EventOutcome, Transition, UiBinding, ACTION, ACTIVE, CHANGE_PANEL, EXPAND_PANEL, MORE_PANEL,
    NEW_BOOK_PANEL,
};
use crate::form::{build_submission, FormElement, KeyDeriver};
use crate::models::MovePayload;
use crate::tree::{move_requests, TreeWidget};
use leptos::logging::{error, log, warn};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

/// Result of an event handler: what to do with the browser default, plus the
/// submission to run (if any). The caller spawns `task`.
pub(crate) struct Handled<F> {
    pub outcome: EventOutcome,
    pub task: Option<F>,
}

/// Page controller for the book editor.
///
/// Everything visible lives in the DOM behind `ui`. The only state held here is the
/// queue of tree moves still waiting to be persisted.
pub(crate) struct Bookmaker<U, T, K, W: TreeWidget> {
    ui: U,
    transport: T,
    deriver: K,
    tree: W,

    pending_moves: RefCell<VecDeque<(MovePayload, W::Rollback)>>,
    draining_moves: Cell<bool>,
}

impl<U, T, K, W> Bookmaker<U, T, K, W>
where
    U: UiBinding + 'static,
    T: Transport + 'static,
    K: KeyDeriver + 'static,
    W: TreeWidget + 'static,
{
    pub fn new(ui: U, transport: T, deriver: K, tree: W) -> Self {
        Self {
            ui,
            transport,
            deriver,
            tree,
            pending_moves: RefCell::new(VecDeque::new()),
            draining_moves: Cell::new(false),
        }
    }

    /// Initial panel state on page load.
    pub fn start(&self) {
        self.ui.apply(MORE_PANEL, Transition::Hide);
        self.ui.apply(ACTION, Transition::Hide);
        self.ui.apply(ACTIVE, Transition::Show);
    }

    pub fn on_contract_click(&self) -> EventOutcome {
        self.ui.apply(EXPAND_PANEL, Transition::FadeIn);
        self.ui.apply(ACTIVE, Transition::FadeIn);
        self.ui.apply(MORE_PANEL, Transition::SlideUp);
        EventOutcome::Continue
    }

    pub fn on_change_click(&self) -> EventOutcome {
        self.ui.apply(CHANGE_PANEL, Transition::FadeOut);
        self.ui.apply(NEW_BOOK_PANEL, Transition::FadeIn);
        EventOutcome::Continue
    }

    /// Book title edited: swap panels and send the enclosing form.
    pub fn on_book_title_change<F>(
        self: &Rc<Self>,
        form: Option<F>,
    ) -> Handled<impl Future<Output = ()> + 'static>
    where
        F: FormElement + 'static,
    {
        self.ui.apply(NEW_BOOK_PANEL, Transition::FadeOut);
        self.ui.apply(CHANGE_PANEL, Transition::FadeIn);

        if form.is_none() {
            warn!("[Bookmaker] Book title changed outside a form; nothing to submit");
        }
        let task = form.map(|form| {
            let this = Rc::clone(self);
            async move { this.submit_form(&form, None).await }
        });

        Handled {
            outcome: EventOutcome::PreventDefault,
            task,
        }
    }

    /// Action button: send the enclosing form's key to the button's link target.
    pub fn on_button_click<F>(
        self: &Rc<Self>,
        form: Option<F>,
        href: Option<String>,
    ) -> Handled<impl Future<Output = ()> + 'static>
    where
        F: FormElement + 'static,
    {
        if form.is_none() {
            warn!("[Bookmaker] Action button {:?} has no enclosing form", href);
        }
        let task = form.map(|form| {
            let this = Rc::clone(self);
            async move { this.submit_form(&form, href.as_deref()).await }
        });

        Handled {
            outcome: EventOutcome::PreventDefault,
            task,
        }
    }

    /// Send `form` (or just its validation key plus the override's query) and run
    /// the returned script. Failures are reported with an alert; nothing is retried.
    pub async fn submit_form(&self, form: &impl FormElement, url_override: Option<&str>) {
        let req = build_submission(form, &self.deriver, url_override);
        log!("[Bookmaker] {} {}", req.method, req.url);

        match self.transport.send(&req).await {
            Ok(script) => {
                if script.trim().is_empty() {
                    return;
                }
                if let Err(e) = self.ui.run_script(&script) {
                    warn!("[Bookmaker] Response script from {} failed: {}", req.url, e);
                    self.ui.alert(&format!("parsererror: {e}"));
                }
            }
            Err(e) => {
                warn!("[Bookmaker] {} {} failed: {}", req.method, req.url, e);
                self.ui.alert(&e.to_string());
            }
        }
    }

    /// Persist a drag-and-drop reorder, one node at a time.
    ///
    /// Each request completes before the next is sent, and a batch only starts once
    /// every earlier batch has finished. A move arriving while another batch is in
    /// flight is queued and sent by the call already draining the queue. A failed
    /// node is rolled back and the rest of the batch still goes out.
    pub async fn on_tree_move(&self, payload: MovePayload, rollback: W::Rollback) {
        self.pending_moves
            .borrow_mut()
            .push_back((payload, rollback));
        if self.draining_moves.replace(true) {
            return;
        }

        loop {
            let next = self.pending_moves.borrow_mut().pop_front();
            let Some((payload, rollback)) = next else {
                break;
            };
            self.persist_move(payload, rollback).await;
        }
        self.draining_moves.set(false);
    }

    async fn persist_move(&self, payload: MovePayload, rollback: W::Rollback) {
        let Some(url) = self.tree.move_url().filter(|u| !u.trim().is_empty()) else {
            error!("[BookTree] No move_url in tree settings; reverting move");
            self.tree.rollback(&rollback);
            return;
        };

        for req in move_requests(&payload) {
            let what = req.what.clone();
            let out = OutgoingRequest {
                method: HttpMethod::Post,
                url: url.clone(),
                body: req.into_pairs(),
                expect: ResponseKind::Ignored,
            };

            if let Err(e) = self.transport.send(&out).await {
                warn!("[BookTree] Move failed for {}: {}", what, e);
                self.tree.rollback(&rollback);
            }
        }
    }
}
