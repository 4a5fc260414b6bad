//! The intro sequence controller.
//!
//! `IntroSequence` owns the overlays of one host screen and walks through
//! them one at a time:
//! - `add()` builds overlays, skipping duplicates that were already displayed
//! - `start()` begins (or resumes) the run
//! - each dismissal advances to the next overlay
//! - `skip()` ends the run and marks every show-once overlay as seen
//!
//! All transitions happen on the host's UI thread. Showing the next overlay is
//! deferred to the next `pump()` so the intercepting layer can settle first.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, trace};

use super::host::{HostScreen, OverlayBinding, OverlayNotifier, SequenceEvent};
use super::listener::SequenceListener;
use super::model::{IntroConfig, SequenceSettings};
use crate::error::{IntroError, IntroResult};
use crate::seen::SharedSeenStore;

struct IntroEntry<O> {
    view_id: Option<String>,
    show_only_once: bool,
    overlay: O,
}

/// Sequencing controller for the overlays of one host screen.
///
/// # Run state
///
/// - `cursor`: number of overlays advanced past (never exceeds the length)
/// - `showing`: an overlay is visible or about to be
/// - `skipped`: the user skipped at least once
/// - `intercepting_layer`: present only while a run is in flight
pub struct IntroSequence<H: HostScreen> {
    host: H,
    store: SharedSeenStore,
    intros: Vec<IntroEntry<H::Overlay>>,
    intercepting_layer: Option<H::Layer>,
    cursor: usize,
    showing: bool,
    skipped: bool,
    settings: SequenceSettings,
    listener: Option<Box<dyn SequenceListener>>,
    tx: Sender<SequenceEvent>,
    rx: Receiver<SequenceEvent>,
}

impl<H: HostScreen> IntroSequence<H> {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty sequence with default settings.
    pub fn new(host: H, store: SharedSeenStore) -> Self {
        Self::with_settings(host, store, SequenceSettings::default())
    }

    /// Creates an empty sequence with the given settings.
    pub fn with_settings(host: H, store: SharedSeenStore, settings: SequenceSettings) -> Self {
        let (tx, rx) = unbounded();
        Self {
            host,
            store,
            intros: Vec::new(),
            intercepting_layer: None,
            cursor: 0,
            showing: false,
            skipped: false,
            settings,
            listener: None,
            tx,
            rx,
        }
    }

    // =========================================================================
    // SETTINGS & LISTENER
    // =========================================================================

    pub fn settings(&self) -> &SequenceSettings {
        &self.settings
    }

    /// Settings changes apply to overlays added afterwards.
    pub fn settings_mut(&mut self) -> &mut SequenceSettings {
        &mut self.settings
    }

    pub fn set_show_skip(&mut self, show_skip: bool) {
        self.settings.show_skip = show_skip;
    }

    pub fn set_persist_skip(&mut self, persist_skip: bool) {
        self.settings.persist_skip = persist_skip;
    }

    pub fn set_initial_delay(&mut self, delay: Duration) {
        self.settings.initial_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    }

    /// Installs the progress/completion listener, replacing any previous one.
    pub fn set_listener<L: SequenceListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    // =========================================================================
    // PUBLIC OPERATIONS
    // =========================================================================

    /// Builds an overlay from `config` and appends it to the sequence.
    ///
    /// Returns false, adding nothing, when an overlay with the same identifier
    /// is already in the sequence and the seen-state store reports it as
    /// displayed. Configurations without an identifier are always added.
    pub fn add(&mut self, config: IntroConfig) -> bool {
        let view_id = config.resolved_id();

        let found = config.candidate_ids().any(|candidate| {
            self.intros
                .iter()
                .any(|entry| entry.view_id.as_deref() == Some(candidate))
        });
        if found {
            if let Some(id) = view_id.as_deref() {
                if self.store.borrow().is_displayed(id) {
                    debug!(view_id = id, "intro already displayed, not adding");
                    return false;
                }
            }
        }

        let index = self.intros.len();
        let delay = if self.intros.is_empty() {
            self.settings.initial_delay()
        } else {
            Duration::ZERO
        };
        let binding = OverlayBinding {
            delay,
            show_skip: self.settings.show_skip,
            notifier: OverlayNotifier::new(index, self.tx.clone()),
        };
        let overlay = self.host.create_overlay(&config, binding);

        debug!(
            index,
            view_id = view_id.as_deref().unwrap_or_default(),
            ?delay,
            "intro added"
        );
        self.intros.push(IntroEntry {
            view_id,
            show_only_once: config.show_only_once,
            overlay,
        });
        true
    }

    /// Builds a configuration in place and adds it.
    pub fn add_config<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut IntroConfig),
    {
        let mut config = IntroConfig::default();
        f(&mut config);
        self.add(config)
    }

    /// Starts or resumes the sequence. A no-op while an overlay is showing.
    ///
    /// With `persist_skip` enabled and a previous skip, completes immediately
    /// without showing anything.
    pub fn start(&mut self) {
        if self.skipped && self.settings.persist_skip {
            debug!("skip persisted, completing without showing");
            self.skip();
        } else if !self.showing {
            self.next_intro();
        } else {
            trace!(cursor = self.cursor, "intro already showing");
        }
    }

    /// Ends the sequence early.
    ///
    /// Dismisses the visible overlay, records every show-once overlay as
    /// displayed (shown or not), fires completion and removes the
    /// intercepting layer. Safe to call any number of times.
    pub fn skip(&mut self) {
        self.skipped = true;

        if self.showing {
            if let Some(index) = self.cursor.checked_sub(1) {
                if let Some(entry) = self.intros.get_mut(index) {
                    self.host.dismiss_overlay(&mut entry.overlay);
                }
            }
        }
        self.showing = false;

        {
            let mut store = self.store.borrow_mut();
            for entry in self.intros.iter().filter(|entry| entry.show_only_once) {
                if let Some(id) = entry.view_id.as_deref() {
                    store.set_displayed(id);
                }
            }
        }

        self.cursor = self.intros.len();
        info!(total = self.intros.len(), "intro sequence skipped");
        self.notify_completed();
        self.detach_intercepting_layer();
    }

    /// Processes the events queued before this call: deferred shows,
    /// dismissals and skip requests. Events queued while processing wait for
    /// the next call. Returns the number of events processed.
    pub fn pump(&mut self) -> usize {
        let pending: Vec<SequenceEvent> = self.rx.try_iter().collect();
        let count = pending.len();
        for event in pending {
            self.handle_event(event);
        }
        count
    }

    /// Returns a notifier bound to the overlay at `index`.
    pub fn notifier(&self, index: usize) -> IntroResult<OverlayNotifier> {
        if index < self.intros.len() {
            Ok(OverlayNotifier::new(index, self.tx.clone()))
        } else {
            Err(IntroError::unknown_overlay(index, self.intros.len()))
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub fn len(&self) -> usize {
        self.intros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intros.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// True when every overlay has been advanced past and none is showing.
    pub fn is_finished(&self) -> bool {
        self.cursor == self.intros.len() && !self.showing
    }

    pub fn has_intercepting_layer(&self) -> bool {
        self.intercepting_layer.is_some()
    }

    /// Identifiers in display order (`None` for unidentified overlays).
    pub fn view_ids(&self) -> Vec<Option<&str>> {
        self.intros
            .iter()
            .map(|entry| entry.view_id.as_deref())
            .collect()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // =========================================================================
    // INTERNAL TRANSITIONS
    // =========================================================================

    fn handle_event(&mut self, event: SequenceEvent) {
        match event {
            SequenceEvent::ShowNext { index } => self.show_intro(index),
            SequenceEvent::Dismissed {
                index,
                on_user_click,
            } => self.on_intro_done(index, on_user_click),
            SequenceEvent::SkipRequested => self.skip(),
        }
    }

    /// Advances to the next overlay, deferring its display to the next pump.
    fn next_intro(&mut self) {
        if self.skipped && self.settings.persist_skip {
            self.skip();
            return;
        }
        if self.cursor < self.intros.len() {
            self.attach_intercepting_layer();
            self.showing = true;
            let index = self.cursor;
            self.cursor += 1;
            self.post(SequenceEvent::ShowNext { index });
        }
    }

    fn show_intro(&mut self, index: usize) {
        if !self.is_current(index) {
            trace!(index, "stale show request dropped");
            return;
        }
        let Some(entry) = self.intros.get_mut(index) else {
            return;
        };
        let view_id = entry.view_id.as_deref().unwrap_or_default();
        // Displayed in an earlier session: dismissed without showing.
        let already_displayed = entry.show_only_once
            && entry.view_id.is_some()
            && self.store.borrow().is_displayed(view_id);
        if already_displayed {
            debug!(index, view_id, "intro already displayed, auto-dismissing");
            self.on_intro_done(index, false);
            return;
        }
        debug!(index, view_id, "showing intro");
        self.host.show_overlay(&mut entry.overlay);
    }

    fn on_intro_done(&mut self, index: usize, on_user_click: bool) {
        if !self.is_current(index) {
            trace!(index, "stale dismissal ignored");
            return;
        }
        let Some(entry) = self.intros.get(index) else {
            return;
        };
        let view_id = entry.view_id.clone().unwrap_or_default();
        if entry.show_only_once && entry.view_id.is_some() {
            self.store.borrow_mut().set_displayed(&view_id);
        }

        let total = self.intros.len();
        debug!(index, %view_id, on_user_click, current = self.cursor, total, "intro done");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_progress(on_user_click, &view_id, self.cursor, total);
        }

        self.showing = false;
        if self.cursor == total {
            info!(total, "intro sequence completed");
            self.notify_completed();
            self.detach_intercepting_layer();
        } else {
            self.next_intro();
        }
    }

    /// The overlay at `index` is the one most recently advanced to and the
    /// run has not been ended since.
    fn is_current(&self, index: usize) -> bool {
        self.showing && index + 1 == self.cursor
    }

    fn notify_completed(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_completed();
        }
    }

    fn post(&self, event: SequenceEvent) {
        // Both ends live in `self`, so the send cannot fail.
        let _ = self.tx.send(event);
    }

    fn attach_intercepting_layer(&mut self) {
        if self.intercepting_layer.is_some() {
            return;
        }
        self.intercepting_layer = Some(self.host.attach_intercepting_layer());
        debug!("intercepting layer attached");
    }

    fn detach_intercepting_layer(&mut self) {
        match self.intercepting_layer.take() {
            Some(layer) => {
                self.host.detach_intercepting_layer(layer);
                debug!("intercepting layer detached");
            }
            None => trace!("no intercepting layer to detach"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
