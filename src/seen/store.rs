//! The seen-state contract and an in-memory implementation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Seen-state store shared between every controller of one application.
pub type SharedSeenStore = Rc<RefCell<dyn SeenStore>>;

/// Persists per-identifier "has this overlay already been shown" flags.
///
/// Writes must be idempotent: the controller records the same identifier
/// repeatedly (on dismissal and again on skip).
pub trait SeenStore {
    /// Returns true if the overlay with this identifier was already displayed.
    fn is_displayed(&self, id: &str) -> bool;

    /// Records the overlay with this identifier as displayed.
    fn set_displayed(&mut self, id: &str);

    /// Forgets a single identifier so its overlay shows again.
    fn reset(&mut self, id: &str);

    /// Forgets every identifier.
    fn reset_all(&mut self);
}

/// Volatile store backed by a `HashSet`. Useful for tests and for hosts that
/// keep seen-state elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySeenStore {
    displayed: HashSet<String>,
}

impl MemorySeenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the store for sharing between controllers.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Returns the number of identifiers recorded as displayed.
    pub fn len(&self) -> usize {
        self.displayed.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }
}

impl SeenStore for MemorySeenStore {
    fn is_displayed(&self, id: &str) -> bool {
        self.displayed.contains(id)
    }

    fn set_displayed(&mut self, id: &str) {
        if !self.displayed.contains(id) {
            self.displayed.insert(id.to_string());
        }
    }

    fn reset(&mut self, id: &str) {
        self.displayed.remove(id);
    }

    fn reset_all(&mut self) {
        self.displayed.clear();
    }
}
