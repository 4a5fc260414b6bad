//! Error types for the intro sequence controller and its seen-state stores.

use thiserror::Error;

/// Result type alias for intro operations.
pub type IntroResult<T> = Result<T, IntroError>;

/// Errors that can occur while persisting seen-state or loading configuration.
///
/// The controller itself never fails: misuse degrades to a no-op. Only the
/// stores, the settings loader and the bindings surface these.
#[derive(Error, Debug)]
pub enum IntroError {
    /// Automerge error during document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema violation - seen-state document structure is invalid.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// An overlay index that the sequence does not hold.
    #[error("Overlay {index} out of range for sequence of length {length}")]
    UnknownOverlay { index: usize, length: usize },
}

impl IntroError {
    /// Creates a SchemaViolation error.
    pub fn schema_violation(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    /// Creates an UnknownOverlay error.
    pub fn unknown_overlay(index: usize, length: usize) -> Self {
        Self::UnknownOverlay { index, length }
    }
}
