//! Configuration models for intro sequences.
//!
//! Both structs are serde-friendly so hosts can ship overlay definitions and
//! sequence settings as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::IntroResult;

/// Delay before the first overlay of a sequence, in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

// =============================================================================
// SEQUENCE SETTINGS
// =============================================================================

/// Mutable settings of one sequence controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequenceSettings {
    /// Whether overlays show a skip button.
    pub show_skip: bool,

    /// Once the user skips, every later `start()` on the same controller
    /// completes immediately instead of showing newly added overlays.
    pub persist_skip: bool,

    /// Delay before the first overlay is displayed.
    pub initial_delay_ms: u64,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            show_skip: false,
            persist_skip: false,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
        }
    }
}

impl SequenceSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> IntroResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the initial delay as a `Duration`.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Builder: Set skip button visibility.
    pub fn with_show_skip(mut self, show_skip: bool) -> Self {
        self.show_skip = show_skip;
        self
    }

    /// Builder: Set skip persistence.
    pub fn with_persist_skip(mut self, persist_skip: bool) -> Self {
        self.persist_skip = persist_skip;
        self
    }

    /// Builder: Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

// =============================================================================
// TARGET REFERENCE
// =============================================================================

/// Reference to the host element an overlay points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetRef {
    /// Host-specific element key (a widget path, DOM selector, ...).
    pub element: String,

    /// Tag attached to the element; doubles as the overlay identifier when no
    /// explicit one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl TargetRef {
    /// Creates an untagged target reference.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            tag: None,
        }
    }

    /// Builder: Set tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

// =============================================================================
// INTRO CONFIG
// =============================================================================

/// Configuration of a single overlay.
///
/// The controller only reads the identifier and `show_only_once`; everything
/// else is handed to the host untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntroConfig {
    /// Explicit identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,

    /// Element the overlay highlights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,

    /// Never show this overlay again once displayed or skipped.
    pub show_only_once: bool,

    /// Tooltip text.
    pub info_text: String,

    /// Extensible presentation options as JSON (blob approach).
    pub presentation: serde_json::Value,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            view_id: None,
            target: None,
            show_only_once: true,
            info_text: String::new(),
            presentation: serde_json::Value::Null,
        }
    }
}

impl IntroConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration pointing at `target`.
    pub fn for_target(target: TargetRef) -> Self {
        Self::new().with_target(target)
    }

    /// Builder: Set explicit identifier.
    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    /// Builder: Set target.
    pub fn with_target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder: Set show-once flag.
    pub fn with_show_only_once(mut self, show_only_once: bool) -> Self {
        self.show_only_once = show_only_once;
        self
    }

    /// Builder: Set info text.
    pub fn with_info_text(mut self, info_text: impl Into<String>) -> Self {
        self.info_text = info_text.into();
        self
    }

    /// Builder: Set presentation options.
    pub fn with_presentation(mut self, presentation: serde_json::Value) -> Self {
        self.presentation = presentation;
        self
    }

    /// The overlay identifier: the explicit id, else the target's tag.
    pub fn resolved_id(&self) -> Option<String> {
        self.view_id
            .clone()
            .or_else(|| self.target.as_ref().and_then(|t| t.tag.clone()))
    }

    /// Every identifier this configuration may be known by.
    pub(crate) fn candidate_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.view_id
            .as_deref()
            .into_iter()
            .chain(self.target.as_ref().and_then(|t| t.tag.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_id_prefers_explicit_id() {
        let config = IntroConfig::for_target(TargetRef::new("#save").with_tag("save-tag"))
            .with_view_id("save-intro");
        assert_eq!(config.resolved_id().as_deref(), Some("save-intro"));
        assert_eq!(
            config.candidate_ids().collect::<Vec<_>>(),
            vec!["save-intro", "save-tag"]
        );
    }

    #[test]
    fn test_resolved_id_falls_back_to_tag() {
        let config = IntroConfig::for_target(TargetRef::new("#save").with_tag("save-tag"));
        assert_eq!(config.resolved_id().as_deref(), Some("save-tag"));

        let untagged = IntroConfig::for_target(TargetRef::new("#save"));
        assert_eq!(untagged.resolved_id(), None);
    }

    #[test]
    fn test_settings_from_json() {
        let settings = SequenceSettings::from_json(r#"{"persist_skip": true}"#).unwrap();
        assert!(settings.persist_skip);
        assert!(!settings.show_skip);
        assert_eq!(settings.initial_delay(), Duration::from_millis(500));

        assert!(SequenceSettings::from_json("not json").is_err());
    }

    #[test]
    fn test_oversized_initial_delay_saturates() {
        let settings = SequenceSettings::default().with_initial_delay(Duration::MAX);
        assert_eq!(settings.initial_delay_ms, u64::MAX);

        let settings = settings.with_initial_delay(Duration::from_secs(2));
        assert_eq!(settings.initial_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_from_json_defaults_to_show_once() {
        let config: IntroConfig = serde_json::from_str(
            r#"{"target": {"element": "toolbar.search", "tag": "search"}, "info_text": "Find anything"}"#,
        )
        .unwrap();
        assert!(config.show_only_once);
        assert_eq!(config.resolved_id().as_deref(), Some("search"));
        assert_eq!(config.presentation, serde_json::Value::Null);
    }
}
