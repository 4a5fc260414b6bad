//! The host-screen contract and the UI task queue.
//!
//! The controller never renders anything. It asks the host to create, show
//! and dismiss overlays and to attach/detach the click-intercepting layer.
//! Overlays report back through an [`OverlayNotifier`], which posts onto the
//! controller's queue; the host drains that queue once per event-loop
//! iteration with [`IntroSequence::pump`](super::IntroSequence::pump).

use std::time::Duration;

use crossbeam_channel::Sender;

use super::model::IntroConfig;

/// A screen/window that can present overlays.
pub trait HostScreen {
    /// Host-side overlay handle.
    type Overlay;

    /// Host-side handle of an attached click-intercepting layer.
    type Layer;

    /// Builds an overlay from `config`. The overlay must call
    /// `binding.notifier.intro_done(..)` when it is dismissed, and wire its
    /// skip button, if any, to `binding.notifier.skip()`. A show-once overlay
    /// already recorded as displayed is never shown; the controller reports
    /// it as an automatic dismissal.
    fn create_overlay(&mut self, config: &IntroConfig, binding: OverlayBinding) -> Self::Overlay;

    /// Displays the overlay after its configured delay.
    fn show_overlay(&mut self, overlay: &mut Self::Overlay);

    /// Removes the overlay from screen.
    fn dismiss_overlay(&mut self, overlay: &mut Self::Overlay);

    /// Inserts a transparent, input-absorbing surface covering the whole
    /// display area above all existing content.
    fn attach_intercepting_layer(&mut self) -> Self::Layer;

    /// Removes a layer returned by `attach_intercepting_layer`.
    fn detach_intercepting_layer(&mut self, layer: Self::Layer);
}

/// Work items on a controller's UI queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// Deferred display of the overlay at `index`.
    ShowNext { index: usize },
    /// The overlay at `index` was dismissed.
    Dismissed { index: usize, on_user_click: bool },
    /// A skip button was pressed.
    SkipRequested,
}

/// Handle an overlay uses to talk back to its controller.
#[derive(Debug, Clone)]
pub struct OverlayNotifier {
    index: usize,
    tx: Sender<SequenceEvent>,
}

impl OverlayNotifier {
    pub(crate) fn new(index: usize, tx: Sender<SequenceEvent>) -> Self {
        Self { index, tx }
    }

    /// Position of the bound overlay in its sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Reports that the overlay went away, either by user click or because it
    /// auto-dismissed.
    pub fn intro_done(&self, on_user_click: bool) {
        self.send(SequenceEvent::Dismissed {
            index: self.index,
            on_user_click,
        });
    }

    /// Requests that the whole sequence be skipped.
    pub fn skip(&self) {
        self.send(SequenceEvent::SkipRequested);
    }

    fn send(&self, event: SequenceEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!(index = self.index, ?event, "sequence dropped, notification ignored");
        }
    }
}

/// Everything a host needs to wire a freshly created overlay.
#[derive(Debug, Clone)]
pub struct OverlayBinding {
    /// Delay before the overlay appears once shown.
    pub delay: Duration,

    /// Whether the overlay shows a skip button.
    pub show_skip: bool,

    /// Dismissal and skip notifications.
    pub notifier: OverlayNotifier,
}
