//! WASM bindings for the intro sequence.
//!
//! The page supplies a JavaScript host object that renders overlays; the
//! controller drives it. Seen-state lives in an Automerge document whose bytes
//! the page can keep in localStorage or IndexedDB.
//!
//! Listener callbacks run as microtasks after the calling method returns, so
//! they may call back into the sequence.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use super::controller::IntroSequence;
use super::host::{HostScreen, OverlayBinding};
use super::listener::{ListenerCall, QueuedListener};
use super::model::{IntroConfig, SequenceSettings};
use crate::error::IntroError;
use crate::seen::{DocumentSeenStore, SeenStore};

/// Serialize a value to JsValue with maps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<IntroError> for JsValue {
    fn from(err: IntroError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: IntroError| JsValue::from(e))
    };
}

// =============================================================================
// JAVASCRIPT HOST
// =============================================================================

#[wasm_bindgen]
extern "C" {
    /// JavaScript object that renders overlays.
    ///
    /// ```ts
    /// interface IntroHost {
    ///   createOverlay(index: number, config: object, delayMs: number, showSkip: boolean): void;
    ///   showOverlay(index: number): void;
    ///   dismissOverlay(index: number): void;
    ///   attachInterceptingLayer(): void;
    ///   detachInterceptingLayer(): void;
    /// }
    /// ```
    pub type IntroHost;

    #[wasm_bindgen(method, js_name = createOverlay)]
    fn create_overlay(this: &IntroHost, index: u32, config: JsValue, delay_ms: f64, show_skip: bool);

    #[wasm_bindgen(method, js_name = showOverlay)]
    fn show_overlay(this: &IntroHost, index: u32);

    #[wasm_bindgen(method, js_name = dismissOverlay)]
    fn dismiss_overlay(this: &IntroHost, index: u32);

    #[wasm_bindgen(method, js_name = attachInterceptingLayer)]
    fn attach_intercepting_layer(this: &IntroHost);

    #[wasm_bindgen(method, js_name = detachInterceptingLayer)]
    fn detach_intercepting_layer(this: &IntroHost);
}

struct JsHost {
    host: IntroHost,
}

impl HostScreen for JsHost {
    type Overlay = u32;
    type Layer = ();

    fn create_overlay(&mut self, config: &IntroConfig, binding: OverlayBinding) -> u32 {
        let index = binding.notifier.index() as u32;
        let config = to_js_value(config).unwrap_or_else(|err| {
            tracing::warn!(index, %err, "failed to convert intro config");
            JsValue::NULL
        });
        self.host.create_overlay(
            index,
            config,
            binding.delay.as_millis() as f64,
            binding.show_skip,
        );
        index
    }

    fn show_overlay(&mut self, overlay: &mut u32) {
        self.host.show_overlay(*overlay);
    }

    fn dismiss_overlay(&mut self, overlay: &mut u32) {
        self.host.dismiss_overlay(*overlay);
    }

    fn attach_intercepting_layer(&mut self) {
        self.host.attach_intercepting_layer();
    }

    fn detach_intercepting_layer(&mut self, _layer: ()) {
        self.host.detach_intercepting_layer();
    }
}

struct JsListener {
    on_progress: Function,
    on_completed: Function,
}

impl JsListener {
    fn deliver(&self, call: ListenerCall) {
        match call {
            ListenerCall::Progress(event) => match to_js_value(&event) {
                Ok(value) => defer(&self.on_progress, &value),
                Err(err) => tracing::warn!(%err, "failed to convert progress event"),
            },
            ListenerCall::Completed => defer(&self.on_completed, &JsValue::UNDEFINED),
        }
    }
}

/// Schedules `callback(arg)` as a microtask via `Promise.resolve(arg).then(callback)`.
fn defer(callback: &Function, arg: &JsValue) {
    let promise = Promise::resolve(arg);
    let then = Reflect::get(&promise, &JsValue::from_str("then"))
        .and_then(|then| then.dyn_into::<Function>());
    match then {
        Ok(then) => {
            if let Err(err) = then.call1(&promise, callback) {
                tracing::warn!(?err, "failed to schedule listener callback");
            }
        }
        Err(err) => tracing::warn!(?err, "Promise.then unavailable"),
    }
}

fn settings_from_js(settings: JsValue) -> Result<SequenceSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        Ok(SequenceSettings::default())
    } else {
        Ok(from_value(settings)?)
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around IntroSequence.
#[wasm_bindgen]
pub struct JsIntroSequence {
    inner: IntroSequence<JsHost>,
    store: Rc<RefCell<DocumentSeenStore>>,
    outbox: QueuedListener,
    callbacks: Option<JsListener>,
}

impl JsIntroSequence {
    fn build(
        host: IntroHost,
        settings: JsValue,
        store: DocumentSeenStore,
    ) -> Result<JsIntroSequence, JsValue> {
        let settings = settings_from_js(settings)?;
        let store = Rc::new(RefCell::new(store));
        let mut inner = IntroSequence::with_settings(JsHost { host }, store.clone(), settings);
        let outbox = QueuedListener::new();
        inner.set_listener(outbox.clone());
        Ok(JsIntroSequence {
            inner,
            store,
            outbox,
            callbacks: None,
        })
    }

    /// Hands recorded listener calls to the page's callbacks. Calls made
    /// while no callbacks are installed are dropped.
    fn flush(&mut self) {
        let calls = self.outbox.drain();
        if let Some(callbacks) = &self.callbacks {
            for call in calls {
                callbacks.deliver(call);
            }
        }
    }
}

#[wasm_bindgen]
impl JsIntroSequence {
    /// Creates a sequence with fresh seen-state.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const sequence = new JsIntroSequence(host, { persist_skip: true });
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(host: IntroHost, settings: JsValue) -> Result<JsIntroSequence, JsValue> {
        Self::build(host, settings, DocumentSeenStore::new())
    }

    /// Creates a sequence with seen-state restored from saved bytes.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const sequence = JsIntroSequence.withSeenState(host, null, savedBytes);
    /// ```
    #[wasm_bindgen(js_name = withSeenState)]
    pub fn with_seen_state(
        host: IntroHost,
        settings: JsValue,
        bytes: &[u8],
    ) -> Result<JsIntroSequence, JsValue> {
        let store = js_result!(DocumentSeenStore::from_bytes(bytes))?;
        Self::build(host, settings, store)
    }

    /// Saves the seen-state document (returns Uint8Array).
    #[wasm_bindgen(js_name = seenStateBytes)]
    pub fn seen_state_bytes(&mut self) -> Uint8Array {
        let bytes = self.store.borrow_mut().save();
        Uint8Array::from(&bytes[..])
    }

    /// Installs progress and completion callbacks. They run as microtasks
    /// once the triggering `start`, `skip` or `pump` has returned.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// sequence.setListener(
    ///   ({ onUserClick, viewId, current, total }) => console.log(viewId, current, total),
    ///   () => console.log('done'),
    /// );
    /// ```
    #[wasm_bindgen(js_name = setListener)]
    pub fn set_listener(&mut self, on_progress: Function, on_completed: Function) {
        self.callbacks = Some(JsListener {
            on_progress,
            on_completed,
        });
    }

    /// Adds an overlay; returns false when it was rejected as already seen.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// sequence.add({
    ///   view_id: 'search',
    ///   target: { element: '#search' },
    ///   info_text: 'Find anything from here',
    /// });
    /// ```
    pub fn add(&mut self, config: JsValue) -> Result<bool, JsValue> {
        let config: IntroConfig = from_value(config)?;
        Ok(self.inner.add(config))
    }

    pub fn start(&mut self) {
        self.inner.start();
        self.flush();
    }

    pub fn skip(&mut self) {
        self.inner.skip();
        self.flush();
    }

    /// Processes queued work. Call once per animation frame.
    pub fn pump(&mut self) -> u32 {
        let processed = self.inner.pump() as u32;
        self.flush();
        processed
    }

    /// Reports that the overlay at `index` was dismissed.
    #[wasm_bindgen(js_name = introDone)]
    pub fn intro_done(&mut self, index: u32, on_user_click: bool) -> Result<(), JsValue> {
        let notifier = js_result!(self.inner.notifier(index as usize))?;
        notifier.intro_done(on_user_click);
        Ok(())
    }
}

// =============================================================================
// SETTINGS & STATE
// =============================================================================

#[wasm_bindgen]
impl JsIntroSequence {
    #[wasm_bindgen(js_name = setShowSkip)]
    pub fn set_show_skip(&mut self, show_skip: bool) {
        self.inner.set_show_skip(show_skip);
    }

    #[wasm_bindgen(js_name = setPersistSkip)]
    pub fn set_persist_skip(&mut self, persist_skip: bool) {
        self.inner.set_persist_skip(persist_skip);
    }

    #[wasm_bindgen(js_name = setInitialDelay)]
    pub fn set_initial_delay(&mut self, delay_ms: f64) {
        self.inner
            .set_initial_delay(std::time::Duration::from_millis(delay_ms.max(0.0) as u64));
    }

    pub fn len(&self) -> u32 {
        self.inner.len() as u32
    }

    pub fn cursor(&self) -> u32 {
        self.inner.cursor() as u32
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    #[wasm_bindgen(js_name = hasInterceptingLayer)]
    pub fn has_intercepting_layer(&self) -> bool {
        self.inner.has_intercepting_layer()
    }

    /// Checks whether an overlay was already displayed.
    #[wasm_bindgen(js_name = isDisplayed)]
    pub fn is_displayed(&self, id: &str) -> Result<bool, JsValue> {
        js_result!(self.store.borrow().try_is_displayed(id))
    }

    /// Forgets one overlay so it shows again.
    #[wasm_bindgen(js_name = resetSeen)]
    pub fn reset_seen(&mut self, id: &str) {
        self.store.borrow_mut().reset(id);
    }

    /// Forgets every overlay.
    #[wasm_bindgen(js_name = resetAllSeen)]
    pub fn reset_all_seen(&mut self) {
        self.store.borrow_mut().reset_all();
    }
}
