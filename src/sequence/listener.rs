//! Progress and completion callbacks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;

/// Receives progress of a running sequence.
pub trait SequenceListener {
    /// Called after every dismissal of an individual overlay.
    ///
    /// `on_user_click` is false when the overlay auto-dismissed because it was
    /// already displayed. `current` is the number of overlays advanced past,
    /// `total` the sequence length.
    fn on_progress(&mut self, on_user_click: bool, view_id: &str, current: usize, total: usize);

    /// Called once the last overlay is dismissed or the sequence is skipped.
    fn on_completed(&mut self);
}

/// Snapshot of one `on_progress` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub on_user_click: bool,
    pub view_id: String,
    pub current: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn new(on_user_click: bool, view_id: &str, current: usize, total: usize) -> Self {
        Self {
            on_user_click,
            view_id: view_id.to_string(),
            current,
            total,
        }
    }
}

/// One recorded listener call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerCall {
    Progress(ProgressEvent),
    Completed,
}

/// Listener that records calls for delivery after the controller returns.
///
/// Callbacks that re-enter the sequence (calling `start` from `on_completed`,
/// say) cannot run while the controller is mid-call. Install a clone of this
/// listener and drain it once control is back with the caller.
#[derive(Debug, Clone, Default)]
pub struct QueuedListener {
    calls: Rc<RefCell<VecDeque<ListenerCall>>>,
}

impl QueuedListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every call recorded so far, oldest first.
    pub fn drain(&self) -> Vec<ListenerCall> {
        self.calls.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }
}

impl SequenceListener for QueuedListener {
    fn on_progress(&mut self, on_user_click: bool, view_id: &str, current: usize, total: usize) {
        self.calls.borrow_mut().push_back(ListenerCall::Progress(ProgressEvent::new(
            on_user_click,
            view_id,
            current,
            total,
        )));
    }

    fn on_completed(&mut self) {
        self.calls.borrow_mut().push_back(ListenerCall::Completed);
    }
}

// =============================================================================
// TESTS
// =============================================================================
