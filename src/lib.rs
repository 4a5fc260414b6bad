//! introseq - sequencing controller for highlight/intro overlays.
//!
//! Overlays (tooltips pointing at UI elements) are shown one after another
//! over a host screen:
//!
//! - **One overlay at a time**: each dismissal advances to the next one
//! - **Click interception**: background input is absorbed while a run is active
//! - **Skip**: ends the run and marks every show-once overlay as seen
//! - **Seen-state**: overlays already displayed are not added again
//!
//! Rendering stays with the host, which implements [`HostScreen`] and drains
//! the controller's queue once per event-loop iteration with
//! [`IntroSequence::pump`].
//!
//! # Example
//!
//! ```rust
//! use introseq::{
//!     HostScreen, IntroConfig, IntroSequence, MemorySeenStore, OverlayBinding, TargetRef,
//! };
//!
//! struct Screen;
//!
//! impl HostScreen for Screen {
//!     type Overlay = OverlayBinding;
//!     type Layer = ();
//!
//!     fn create_overlay(&mut self, _config: &IntroConfig, binding: OverlayBinding) -> OverlayBinding {
//!         binding
//!     }
//!     fn show_overlay(&mut self, _overlay: &mut OverlayBinding) {}
//!     fn dismiss_overlay(&mut self, _overlay: &mut OverlayBinding) {}
//!     fn attach_intercepting_layer(&mut self) {}
//!     fn detach_intercepting_layer(&mut self, _layer: ()) {}
//! }
//!
//! let mut sequence = IntroSequence::new(Screen, MemorySeenStore::shared());
//! sequence.add(
//!     IntroConfig::for_target(TargetRef::new("toolbar.search").with_tag("search"))
//!         .with_info_text("Find anything from here"),
//! );
//! sequence.start();
//!
//! // Next event-loop iteration: the first overlay is shown.
//! sequence.pump();
//! assert!(sequence.has_intercepting_layer());
//!
//! // The overlay reports its dismissal through its notifier.
//! sequence.notifier(0).unwrap().intro_done(true);
//! sequence.pump();
//! assert!(sequence.is_finished());
//! ```

pub mod error;

// Seen-state stores
pub mod seen;

// Sequence module
pub mod sequence;

// Re-exports for convenience
pub use error::{IntroError, IntroResult};
pub use seen::{DocumentSeenStore, MemorySeenStore, SeenStore, SharedSeenStore};
pub use sequence::{
    HostId, HostScreen, IntroConfig, IntroSequence, ListenerCall, OverlayBinding,
    OverlayNotifier, ProgressEvent, QueuedListener, SequenceListener, SequenceRegistry,
    SequenceSettings, TargetRef,
};

#[cfg(feature = "wasm")]
pub use sequence::JsIntroSequence;
