//! Seen-state persisted in an Automerge document.
//!
//! Each displayed overlay is a boolean key on the document root, prefixed with
//! `displayed:`. Saving yields compact bytes the host can keep in local
//! storage, and two devices' documents can be merged so an overlay dismissed
//! on one is not shown again on the other. The root map is the only object
//! every document shares, so flags written by independently created stores
//! merge key by key.

use std::collections::HashMap;

use automerge::{
    transaction::Transactable, AutoCommit, ChangeHash, ReadDoc, ScalarValue, Value, ROOT,
};
use autosurgeon::hydrate;

use super::store::SeenStore;
use crate::error::{IntroError, IntroResult};

const KEY_PREFIX: &str = "displayed:";

fn flag_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Hydrated view of a seen-state document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeenDocument {
    /// Map of overlay identifier -> displayed flag.
    pub displayed: HashMap<String, bool>,
}

/// Seen-state store backed by an Automerge document.
///
/// Every write is a targeted `put`/`delete` on the root map.
pub struct DocumentSeenStore {
    doc: AutoCommit,
}

impl DocumentSeenStore {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            doc: AutoCommit::new(),
        }
    }

    /// Loads a store from saved binary data, rejecting documents that hold
    /// anything but `displayed:` flags.
    pub fn from_bytes(bytes: &[u8]) -> IntroResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        let store = Self { doc };
        store.validate()?;
        Ok(store)
    }

    /// Saves the document to binary format.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    /// Returns the current heads.
    pub fn get_heads(&mut self) -> Vec<ChangeHash> {
        self.doc.get_heads()
    }

    /// Gets the actor ID for this document instance.
    pub fn actor_id(&self) -> String {
        self.doc.get_actor().to_hex_string()
    }

    /// Merges another seen-state document into this one.
    pub fn merge(&mut self, other: &mut Self) -> IntroResult<()> {
        self.doc.merge(&mut other.doc)?;
        Ok(())
    }

    // =========================================================================
    // FALLIBLE OPERATIONS
    // =========================================================================

    /// Hydrates the whole document.
    pub fn get_state(&self) -> IntroResult<SeenDocument> {
        let flags: HashMap<String, bool> = hydrate(&self.doc)?;
        let displayed = flags
            .into_iter()
            .filter_map(|(key, displayed)| {
                key.strip_prefix(KEY_PREFIX)
                    .map(|id| (id.to_string(), displayed))
            })
            .collect();
        Ok(SeenDocument { displayed })
    }

    /// Returns every identifier recorded as displayed, sorted.
    pub fn displayed_ids(&self) -> IntroResult<Vec<String>> {
        let state = self.get_state()?;
        let mut ids: Vec<String> = state
            .displayed
            .into_iter()
            .filter_map(|(id, displayed)| displayed.then_some(id))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Checks whether `id` was displayed.
    pub fn try_is_displayed(&self, id: &str) -> IntroResult<bool> {
        let key = flag_key(id);
        match self.doc.get(&ROOT, key.as_str())? {
            Some((Value::Scalar(value), _)) => {
                Ok(matches!(*value, ScalarValue::Boolean(true)))
            }
            Some(_) => Err(IntroError::schema_violation(format!(
                "'{}' is not a boolean",
                key
            ))),
            None => Ok(false),
        }
    }

    /// Records `id` as displayed. Writing an already displayed id adds no change.
    pub fn try_set_displayed(&mut self, id: &str) -> IntroResult<()> {
        if self.try_is_displayed(id)? {
            return Ok(());
        }
        self.doc.put(&ROOT, flag_key(id), true)?;
        Ok(())
    }

    /// Removes `id` from the document.
    pub fn try_reset(&mut self, id: &str) -> IntroResult<()> {
        let key = flag_key(id);
        if self.doc.get(&ROOT, key.as_str())?.is_some() {
            self.doc.delete(&ROOT, key)?;
        }
        Ok(())
    }

    /// Removes every identifier from the document.
    pub fn try_reset_all(&mut self) -> IntroResult<()> {
        let keys: Vec<String> = self
            .doc
            .keys(&ROOT)
            .filter(|key| key.starts_with(KEY_PREFIX))
            .collect();
        for key in keys {
            self.doc.delete(&ROOT, key)?;
        }
        Ok(())
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    fn validate(&self) -> IntroResult<()> {
        for key in self.doc.keys(&ROOT) {
            if !key.starts_with(KEY_PREFIX) {
                return Err(IntroError::schema_violation(format!(
                    "unexpected root key '{}'",
                    key
                )));
            }
            match self.doc.get(&ROOT, key.as_str())? {
                Some((Value::Scalar(value), _))
                    if matches!(*value, ScalarValue::Boolean(_)) => {}
                _ => {
                    return Err(IntroError::schema_violation(format!(
                        "'{}' is not a boolean",
                        key
                    )))
                }
            }
        }
        Ok(())
    }
}

impl Default for DocumentSeenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenStore for DocumentSeenStore {
    fn is_displayed(&self, id: &str) -> bool {
        self.try_is_displayed(id).unwrap_or_else(|err| {
            tracing::warn!(view_id = id, %err, "failed to read seen-state");
            false
        })
    }

    fn set_displayed(&mut self, id: &str) {
        if let Err(err) = self.try_set_displayed(id) {
            tracing::warn!(view_id = id, %err, "failed to record seen-state");
        }
    }

    fn reset(&mut self, id: &str) {
        if let Err(err) = self.try_reset(id) {
            tracing::warn!(view_id = id, %err, "failed to reset seen-state");
        }
    }

    fn reset_all(&mut self) {
        if let Err(err) = self.try_reset_all() {
            tracing::warn!(%err, "failed to reset all seen-state");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
