//! Routing widget signals to application callbacks by string tag.
//!
//! Each signal name (`"clicked"`, `"accepted"`, ...) gets a [`Dispatcher`]
//! the first time it is registered. A dispatcher maps source widget ids to
//! tags and tags to callbacks, so many widgets can share one signal name
//! while each reaches its own closure.

use std::collections::HashMap;

use crate::state::UiState;

/// Callback invoked with the tag it was registered under.
pub type SignalCallback = Box<dyn FnMut(&str, &mut SignalCtx<'_>)>;

/// Access to UI state from inside a callback.
pub struct SignalCtx<'a> {
    state: &'a mut UiState,
}

impl<'a> SignalCtx<'a> {
    pub fn new(state: &'a mut UiState) -> Self {
        Self { state }
    }

    /// Current string stored under widget `id` (text box content, label text).
    pub fn text(&self, id: &str) -> Option<&str> {
        self.state.text(id)
    }

    /// Replaces the string shown by widget `id`.
    pub fn set_text(&mut self, id: &str, value: impl Into<String>) {
        self.state.set_text(id, value);
    }
}

/// Per-signal table of sources and tagged callbacks.
#[derive(Default)]
pub struct Dispatcher {
    sources: HashMap<String, String>,
    callbacks: HashMap<String, SignalCallback>,
}

impl Dispatcher {
    fn invoke(&mut self, tag: &str, ctx: &mut SignalCtx<'_>) -> bool {
        match self.callbacks.get_mut(tag) {
            Some(cb) => {
                cb(tag, ctx);
                true
            }
            None => false,
        }
    }
}

#[derive(Default)]
pub struct SignalRouter {
    dispatchers: HashMap<String, Dispatcher>,
}

impl SignalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `signal` from widget `source` to `callback` under `tag`.
    ///
    /// Registering a tag again for the same signal replaces its callback.
    pub fn register<F>(&mut self, source: &str, signal: &str, tag: &str, callback: F)
    where
        F: FnMut(&str, &mut SignalCtx<'_>) + 'static,
    {
        let dispatcher = self.dispatchers.entry(signal.to_string()).or_insert_with(|| {
            log::debug!("signal: new dispatcher for {signal:?}");
            Dispatcher::default()
        });
        dispatcher.sources.insert(source.to_string(), tag.to_string());
        dispatcher.callbacks.insert(tag.to_string(), Box::new(callback));
    }

    /// Delivers `signal` raised by `source`. Returns whether a callback ran.
    pub fn emit(&mut self, source: &str, signal: &str, ctx: &mut SignalCtx<'_>) -> bool {
        let Some(dispatcher) = self.dispatchers.get_mut(signal) else {
            log::debug!("signal: {source}.{signal} has no dispatcher");
            return false;
        };
        let Some(tag) = dispatcher.sources.get(source).cloned() else {
            log::debug!("signal: {source}.{signal} is not routed");
            return false;
        };
        dispatcher.invoke(&tag, ctx)
    }

    /// Invokes the callback registered for `tag` under `signal` directly.
    pub fn map(&mut self, signal: &str, tag: &str, ctx: &mut SignalCtx<'_>) -> bool {
        let ran = self
            .dispatchers
            .get_mut(signal)
            .is_some_and(|d| d.invoke(tag, ctx));
        if !ran {
            log::debug!("signal: no callback for tag {tag:?} on {signal:?}");
        }
        ran
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnMut(&str, &mut SignalCtx<'_>)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let make = move |name: &str| {
            let l = Rc::clone(&l);
            let name = name.to_string();
            Box::new(move |tag: &str, _: &mut SignalCtx<'_>| l.borrow_mut().push(format!("{name}:{tag}")))
                as Box<dyn FnMut(&str, &mut SignalCtx<'_>)>
        };
        (log, make)
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn each_tag_invokes_only_its_callback() {
        let (log, make) = recorder();
        let mut router = SignalRouter::new();
        router.register("b1", "clicked", "double", make("a"));
        router.register("b2", "clicked", "halve", make("b"));

        let mut state = UiState::new();
        assert!(router.emit("b1", "clicked", &mut SignalCtx::new(&mut state)));
        assert_eq!(*log.borrow(), ["a:double"]);
        assert!(router.emit("b2", "clicked", &mut SignalCtx::new(&mut state)));
        assert_eq!(*log.borrow(), ["a:double", "b:halve"]);
    }

    #[test]
    fn map_dispatches_by_tag() {
        let (log, make) = recorder();
        let mut router = SignalRouter::new();
        router.register("b1", "clicked", "double", make("a"));
        let mut state = UiState::new();
        assert!(router.map("clicked", "double", &mut SignalCtx::new(&mut state)));
        assert!(!router.map("clicked", "halve", &mut SignalCtx::new(&mut state)));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn reregistering_a_tag_overwrites() {
        let (log, make) = recorder();
        let mut router = SignalRouter::new();
        router.register("b1", "clicked", "double", make("old"));
        router.register("b1", "clicked", "double", make("new"));
        let mut state = UiState::new();
        router.emit("b1", "clicked", &mut SignalCtx::new(&mut state));
        assert_eq!(*log.borrow(), ["new:double"]);
    }

    #[test]
    fn unknown_signal_or_source_is_dropped() {
        let (log, make) = recorder();
        let mut router = SignalRouter::new();
        router.register("b1", "clicked", "double", make("a"));
        let mut state = UiState::new();
        assert!(!router.emit("b1", "pressed", &mut SignalCtx::new(&mut state)));
        assert!(!router.emit("b9", "clicked", &mut SignalCtx::new(&mut state)));
        assert!(log.borrow().is_empty());
    }

    // ── SignalCtx ─────────────────────────────────────────────────────────

    #[test]
    fn callbacks_read_and_write_ui_text() {
        let mut router = SignalRouter::new();
        router.register("t1", "accepted", "speed", |_, ctx| {
            let v = ctx.text("t1").unwrap_or_default().to_string();
            ctx.set_text("l1", format!("got {v}"));
        });
        let mut state = UiState::new();
        state.set_text("t1", "2.5");
        router.emit("t1", "accepted", &mut SignalCtx::new(&mut state));
        assert_eq!(state.text("l1"), Some("got 2.5"));
    }
}
