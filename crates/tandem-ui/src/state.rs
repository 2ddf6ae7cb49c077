use std::collections::HashMap;

/// A signal raised by a widget, e.g. `("b1", "clicked")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub source: String,
    pub signal: String,
}

/// UI state that outlives the per-frame widget tree.
///
/// Keyed by widget id: the string shown by a `Text`, the content of a
/// `TextBox`, and which box has keyboard focus. Widgets also queue the
/// signals they raise here for the application to route after the frame.
#[derive(Debug, Default)]
pub struct UiState {
    texts: HashMap<String, String>,
    focused: Option<String>,
    emitted: Vec<Emitted>,
    dirty: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    /// Stores `value` under `id`; marks the state dirty only on change.
    pub fn set_text(&mut self, id: &str, value: impl Into<String>) {
        let value = value.into();
        if self.texts.get(id) != Some(&value) {
            self.texts.insert(id.to_string(), value);
            self.dirty = true;
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }

    pub fn set_focus(&mut self, id: Option<&str>) {
        if self.focused.as_deref() != id {
            self.focused = id.map(str::to_string);
            self.dirty = true;
        }
    }

    pub fn emit(&mut self, source: &str, signal: &str) {
        self.emitted.push(Emitted { source: source.to_string(), signal: signal.to_string() });
        self.dirty = true;
    }

    pub fn take_emitted(&mut self) -> Vec<Emitted> {
        std::mem::take(&mut self.emitted)
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
