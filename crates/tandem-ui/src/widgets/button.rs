use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::paint::Color;
use tandem_engine::scene::Border;

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

/// Signal raised by a button with an id when clicked.
pub const CLICKED: &str = "clicked";

/// Clickable wrapper around any child.
///
/// Hover and press visuals are read from the [`Painter`], so the button keeps
/// no state between frames. A button with an id emits [`CLICKED`] into the
/// UI state; an `on_click` closure runs as well.
pub struct Button {
    child: Element,
    id: Option<String>,
    on_click: Option<Box<dyn FnMut()>>,
    background: Color,
    hover_background: Color,
    press_background: Color,
    border: Option<Border>,
    padding: Edges,
}

impl Button {
    pub fn new(child: impl Into<Element>) -> Self {
        Self {
            child: child.into(),
            id: None,
            on_click: None,
            background: Color::from_straight(0.16, 0.18, 0.22, 1.0),
            hover_background: Color::from_straight(0.22, 0.25, 0.3, 1.0),
            press_background: Color::from_straight(0.1, 0.12, 0.15, 1.0),
            border: None,
            padding: Edges::symmetric(6.0, 12.0),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn on_click(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn hover_background(mut self, color: Color) -> Self {
        self.hover_background = color;
        self
    }

    pub fn press_background(mut self, color: Color) -> Self {
        self.press_background = color;
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn padding(mut self, edges: Edges) -> Self {
        self.padding = edges;
        self
    }
}

impl Widget for Button {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let child = self.child.measure(constraints.shrink(self.padding), ctx);
        constraints.constrain(Vec2::new(child.x + self.padding.h(), child.y + self.padding.v()))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let bg = if painter.is_pressed(rect) {
            self.press_background
        } else if painter.is_hovered(rect) {
            self.hover_background
        } else {
            self.background
        };
        painter.rect(rect, bg, self.border);
        self.child.paint(painter, inset_rect(rect, self.padding));
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx<'_>) -> EventResult {
        match event {
            UiEvent::Click { pos } if rect.contains(*pos) => {
                if let Some(id) = &self.id {
                    ctx.emit(id, CLICKED);
                }
                if let Some(f) = &mut self.on_click {
                    f();
                }
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use tandem_engine::text::FontSystem;

    use super::*;
    use crate::state::UiState;
    use crate::widgets::container::Container;

    #[test]
    fn click_inside_emits_and_runs_closure() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let mut b = Button::new(Container::new()).id("b1").on_click(move || h.set(h.get() + 1));

        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        let r = b.on_event(&UiEvent::Click { pos: Vec2::new(5.0, 5.0) }, rect, &ctx);
        assert!(r.is_consumed());
        assert_eq!(hits.get(), 1);

        let emitted = state.borrow_mut().take_emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!((emitted[0].source.as_str(), emitted[0].signal.as_str()), ("b1", CLICKED));
    }

    #[test]
    fn click_outside_is_ignored() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        let mut b = Button::new(Container::new()).id("b1");
        let r = b.on_event(
            &UiEvent::Click { pos: Vec2::new(50.0, 5.0) },
            Rect::new(0.0, 0.0, 40.0, 20.0),
            &ctx,
        );
        assert_eq!(r, EventResult::Ignored);
        assert!(state.borrow_mut().take_emitted().is_empty());
    }
}
