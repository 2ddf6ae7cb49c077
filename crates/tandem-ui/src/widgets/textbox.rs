use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::input::Key;
use tandem_engine::paint::Color;
use tandem_engine::scene::Border;
use tandem_engine::text::FontId;

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::Widget;

/// Signal raised when Enter is pressed in a focused text box.
pub const ACCEPTED: &str = "accepted";

/// Single-line text field.
///
/// Click to focus, type to append, Backspace deletes the last character,
/// Enter raises [`ACCEPTED`], Escape drops focus. Content and focus live in
/// the UI state under the box's id; the widget holds a per-frame copy.
pub struct TextBox {
    id: String,
    text: String,
    placeholder: String,
    focused: bool,
    font: Option<FontId>,
    font_size: f32,
    text_color: Color,
    placeholder_color: Color,
    background: Color,
    border_color: Color,
    focused_border_color: Color,
    padding: Edges,
    min_width: f32,
}

impl TextBox {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            placeholder: String::new(),
            focused: false,
            font: None,
            font_size: 14.0,
            text_color: Color::from_straight(0.9, 0.92, 0.95, 1.0),
            placeholder_color: Color::from_straight(0.45, 0.5, 0.58, 1.0),
            background: Color::from_straight(0.06, 0.08, 0.12, 1.0),
            border_color: Color::from_straight(0.25, 0.3, 0.38, 1.0),
            focused_border_color: Color::from_straight(0.2, 0.65, 1.0, 1.0),
            padding: Edges::symmetric(5.0, 8.0),
            min_width: 120.0,
        }
    }

    pub fn text(mut self, v: impl Into<String>) -> Self {
        self.text = v.into();
        self
    }

    pub fn placeholder(mut self, v: impl Into<String>) -> Self {
        self.placeholder = v.into();
        self
    }

    pub fn focused(mut self, v: bool) -> Self {
        self.focused = v;
        self
    }

    pub fn font(mut self, font: FontId, size: f32) -> Self {
        self.font = Some(font);
        self.font_size = size;
        self
    }

    pub fn text_color(mut self, c: Color) -> Self {
        self.text_color = c;
        self
    }

    pub fn background(mut self, c: Color) -> Self {
        self.background = c;
        self
    }

    pub fn min_width(mut self, w: f32) -> Self {
        self.min_width = w;
        self
    }

    fn edit(&mut self, ctx: &LayoutCtx<'_>, f: impl FnOnce(&mut String)) {
        f(&mut self.text);
        ctx.set_text(&self.id, &self.text);
    }
}

impl Widget for TextBox {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let h = self.font_size * 1.3 + self.padding.v();
        constraints.constrain(Vec2::new(self.min_width, h))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let (border_color, border_width) = if self.focused {
            (self.focused_border_color, 2.0)
        } else {
            (self.border_color, 1.0)
        };
        painter.rect(rect, self.background, Some(Border::new(border_width, border_color)));

        let Some(font) = self.font else { return };
        let inner = inset_rect(rect, self.padding);
        let origin = Vec2::new(inner.origin.x, inner.origin.y + (inner.size.y - self.font_size * 1.2) * 0.5);

        painter.push_clip(inner);
        if self.text.is_empty() {
            if !self.placeholder.is_empty() && !self.focused {
                painter.text(self.placeholder.as_str(), font, self.font_size, self.placeholder_color, origin, None);
            }
        } else {
            painter.text(self.text.as_str(), font, self.font_size, self.text_color, origin, None);
        }
        if self.focused {
            let w = if self.text.is_empty() {
                0.0
            } else {
                painter.measure_text(&self.text, font, self.font_size, None).x
            };
            let x = (inner.origin.x + w + 1.0).min(inner.max().x - 2.0);
            painter.fill_rect(Rect::new(x, inner.origin.y, 1.5, inner.size.y), self.focused_border_color);
        }
        painter.pop_clip();
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx<'_>) -> EventResult {
        match event {
            UiEvent::Click { pos } if rect.contains(*pos) => {
                self.focused = true;
                ctx.set_focus(Some(&self.id));
                EventResult::Consumed
            }
            UiEvent::Click { .. } => {
                if self.focused {
                    self.focused = false;
                    ctx.set_focus(None);
                }
                EventResult::Ignored
            }
            _ if !self.focused => EventResult::Ignored,
            UiEvent::TextInput { text } => {
                let printable: String = text.chars().filter(|c| !c.is_control()).collect();
                if printable.is_empty() {
                    return EventResult::Ignored;
                }
                self.edit(ctx, |t| t.push_str(&printable));
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::Backspace, .. } => {
                self.edit(ctx, |t| {
                    t.pop();
                });
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::Enter, .. } => {
                ctx.emit(&self.id, ACCEPTED);
                EventResult::Consumed
            }
            UiEvent::KeyPress { key: Key::Escape, .. } => {
                self.focused = false;
                ctx.set_focus(None);
                EventResult::Consumed
            }
            UiEvent::KeyPress { .. } => EventResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tandem_engine::input::Modifiers;
    use tandem_engine::text::FontSystem;

    use super::*;
    use crate::state::UiState;

    fn key(key: Key) -> UiEvent {
        UiEvent::KeyPress { key, modifiers: Modifiers::default() }
    }

    fn typed(s: &str) -> UiEvent {
        UiEvent::TextInput { text: s.to_string() }
    }

    const RECT: Rect = Rect::new(0.0, 0.0, 100.0, 24.0);

    // ── focus ─────────────────────────────────────────────────────────────

    #[test]
    fn unfocused_box_ignores_typing() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut tb = TextBox::new("t1");
        assert_eq!(tb.on_event(&typed("2"), RECT, &ctx), EventResult::Ignored);
        assert_eq!(state.borrow().text("t1"), None);
    }

    #[test]
    fn click_focuses_and_outside_click_blurs() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut tb = TextBox::new("t1");
        tb.on_event(&UiEvent::Click { pos: Vec2::new(10.0, 10.0) }, RECT, &ctx);
        assert!(state.borrow().is_focused("t1"));
        tb.on_event(&UiEvent::Click { pos: Vec2::new(300.0, 10.0) }, RECT, &ctx);
        assert_eq!(state.borrow().focused(), None);
    }

    // ── editing ───────────────────────────────────────────────────────────

    #[test]
    fn typing_and_backspace_write_through() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut tb = TextBox::new("t1").focused(true);
        tb.on_event(&typed("2.5x"), RECT, &ctx);
        tb.on_event(&key(Key::Backspace), RECT, &ctx);
        assert_eq!(state.borrow().text("t1"), Some("2.5"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut tb = TextBox::new("t1").focused(true);
        assert_eq!(tb.on_event(&typed("\r"), RECT, &ctx), EventResult::Ignored);
        assert_eq!(state.borrow().text("t1"), None);
    }

    #[test]
    fn enter_emits_accepted() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut tb = TextBox::new("t1").text("3").focused(true);
        tb.on_event(&key(Key::Enter), RECT, &ctx);
        let emitted = state.borrow_mut().take_emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].source, "t1");
        assert_eq!(emitted[0].signal, ACCEPTED);
    }
}
