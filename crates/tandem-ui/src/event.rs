use tandem_engine::coords::Vec2;
use tandem_engine::input::Key;

pub use tandem_engine::input::Modifiers;

/// Input events routed through the widget tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Primary button released at `pos`.
    Click { pos: Vec2 },
    /// Committed text (one or more characters).
    TextInput { text: String },
    /// Named key pressed (Backspace, Enter, Escape, ...).
    KeyPress { key: Key, modifiers: Modifiers },
}

/// Result returned by `Widget::on_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Consumed,
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }
}
