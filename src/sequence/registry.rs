//! Host-keyed registry of sequence controllers.
//!
//! Each host screen owns at most one controller. The registry holds them by
//! a stable `HostId`; hosts call `release` when they are torn down so the
//! controller (and its overlays) go away with them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::controller::IntroSequence;
use super::host::HostScreen;
use super::model::SequenceSettings;
use crate::seen::SharedSeenStore;

/// Stable identifier of a host screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostId(String);

impl HostId {
    /// Mints a random identifier for hosts without a natural key.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for HostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One controller per host, all sharing a seen-state store.
pub struct SequenceRegistry<H: HostScreen> {
    store: SharedSeenStore,
    default_settings: SequenceSettings,
    sequences: HashMap<HostId, IntroSequence<H>>,
}

impl<H: HostScreen> SequenceRegistry<H> {
    pub fn new(store: SharedSeenStore) -> Self {
        Self::with_default_settings(store, SequenceSettings::default())
    }

    /// Controllers created by this registry start with `settings`.
    pub fn with_default_settings(store: SharedSeenStore, settings: SequenceSettings) -> Self {
        Self {
            store,
            default_settings: settings,
            sequences: HashMap::new(),
        }
    }

    /// Returns the controller for `host_id`, creating it with `make_host`
    /// if the host has none yet. Repeated calls return the same controller.
    pub fn get_instance<F>(&mut self, host_id: &HostId, make_host: F) -> &mut IntroSequence<H>
    where
        F: FnOnce() -> H,
    {
        let store = Rc::clone(&self.store);
        let settings = self.default_settings.clone();
        self.sequences.entry(host_id.clone()).or_insert_with(|| {
            tracing::debug!(host = %host_id, "creating intro sequence");
            IntroSequence::with_settings(make_host(), store, settings)
        })
    }

    pub fn get(&self, host_id: &HostId) -> Option<&IntroSequence<H>> {
        self.sequences.get(host_id)
    }

    pub fn get_mut(&mut self, host_id: &HostId) -> Option<&mut IntroSequence<H>> {
        self.sequences.get_mut(host_id)
    }

    /// Drops the controller of a host being torn down, returning it.
    pub fn release(&mut self, host_id: &HostId) -> Option<IntroSequence<H>> {
        let released = self.sequences.remove(host_id);
        if released.is_some() {
            tracing::debug!(host = %host_id, "released intro sequence");
        }
        released
    }

    pub fn contains(&self, host_id: &HostId) -> bool {
        self.sequences.contains_key(host_id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &HostId> {
        self.sequences.keys()
    }

    pub fn store(&self) -> &SharedSeenStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::seen::{MemorySeenStore, SeenStore};
    use crate::sequence::host::OverlayBinding;
    use crate::sequence::model::IntroConfig;

    #[derive(Default)]
    struct NullHost {
        created: usize,
    }

    impl HostScreen for NullHost {
        type Overlay = ();
        type Layer = ();

        fn create_overlay(&mut self, _config: &IntroConfig, _binding: OverlayBinding) {
            self.created += 1;
        }

        fn show_overlay(&mut self, _overlay: &mut ()) {}

        fn dismiss_overlay(&mut self, _overlay: &mut ()) {}

        fn attach_intercepting_layer(&mut self) {}

        fn detach_intercepting_layer(&mut self, _layer: ()) {}
    }

    #[test]
    fn test_same_host_gets_same_sequence() {
        let mut registry = SequenceRegistry::<NullHost>::new(MemorySeenStore::shared());
        let main = HostId::from("main-screen");

        registry
            .get_instance(&main, NullHost::default)
            .add(IntroConfig::new().with_view_id("A"));
        let again = registry.get_instance(&main, || panic!("host must not be rebuilt"));

        assert_eq!(again.len(), 1);
        assert_eq!(again.host().created, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_hosts_are_independent() {
        let mut registry = SequenceRegistry::<NullHost>::new(MemorySeenStore::shared());
        let main = HostId::new();
        let settings = HostId::new();
        assert_ne!(main, settings);

        registry.get_instance(&main, NullHost::default).set_persist_skip(true);
        registry.get_instance(&main, NullHost::default).skip();
        registry
            .get_instance(&settings, NullHost::default)
            .add(IntroConfig::new().with_view_id("B"));

        let other = registry.get(&settings).unwrap();
        assert!(!other.is_skipped());
        assert!(!other.settings().persist_skip);
        assert!(registry.get(&main).unwrap().is_skipped());
    }

    #[test]
    fn test_release_on_teardown() {
        let mut registry = SequenceRegistry::<NullHost>::new(MemorySeenStore::shared());
        let main = HostId::from("main-screen");
        registry.get_instance(&main, NullHost::default);

        assert!(registry.release(&main).is_some());
        assert!(!registry.contains(&main));
        assert!(registry.release(&main).is_none());

        let fresh = registry.get_instance(&main, NullHost::default);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_sequences_share_seen_state() {
        let store = MemorySeenStore::shared();
        let settings = SequenceSettings::new().with_initial_delay(Duration::from_millis(0));
        let mut registry = SequenceRegistry::<NullHost>::with_default_settings(store.clone(), settings);
        let main = HostId::from("main");

        let seq = registry.get_instance(&main, NullHost::default);
        assert_eq!(seq.settings().initial_delay_ms, 0);
        seq.add(IntroConfig::new().with_view_id("A"));
        seq.skip();

        assert!(store.borrow().is_displayed("A"));
        assert!(registry.store().borrow().is_displayed("A"));
    }
}
