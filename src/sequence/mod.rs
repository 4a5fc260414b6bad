//! Intro sequence module.
//!
//! Provides the controller that presents overlays one after another over a
//! host screen, the host contract it drives, and the per-host registry.

pub mod controller;
pub mod host;
pub mod listener;
pub mod model;
pub mod registry;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use controller::IntroSequence;
pub use host::{HostScreen, OverlayBinding, OverlayNotifier, SequenceEvent};
pub use listener::{ListenerCall, ProgressEvent, QueuedListener, SequenceListener};
pub use model::{IntroConfig, SequenceSettings, TargetRef, DEFAULT_INITIAL_DELAY_MS};
pub use registry::{HostId, SequenceRegistry};

#[cfg(feature = "wasm")]
pub use wasm::JsIntroSequence;
