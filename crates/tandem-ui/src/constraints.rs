use std::cell::RefCell;

use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::text::FontSystem;

use crate::state::UiState;

// ── Edges ─────────────────────────────────────────────────────────────────

/// Insets on all four sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    #[inline]
    pub fn all(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    #[inline]
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self { top: vertical, bottom: vertical, left: horizontal, right: horizontal }
    }

    #[inline]
    pub fn h(self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn v(self) -> f32 {
        self.top + self.bottom
    }
}

// ── Constraints ───────────────────────────────────────────────────────────

/// Size range a parent allows a child during measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub min: Vec2,
    pub max: Vec2,
}

impl Constraints {
    #[inline]
    pub fn loose(max: Vec2) -> Self {
        Self { min: Vec2::zero(), max }
    }

    #[inline]
    #[must_use]
    pub fn constrain(self, size: Vec2) -> Vec2 {
        Vec2::new(
            size.x.max(self.min.x).min(self.max.x),
            size.y.max(self.min.y).min(self.max.y),
        )
    }

    /// Shrinks `max` by `edges`; `min` drops to zero.
    #[inline]
    #[must_use]
    pub fn shrink(self, edges: Edges) -> Self {
        Self {
            min: Vec2::zero(),
            max: Vec2::new((self.max.x - edges.h()).max(0.0), (self.max.y - edges.v()).max(0.0)),
        }
    }
}

// ── LayoutCtx ─────────────────────────────────────────────────────────────

/// Shared resources handed to `measure` and `on_event`.
pub struct LayoutCtx<'a> {
    pub fonts: &'a FontSystem,
    /// `None` when widgets run detached from a scene (tests, custom hosts).
    pub state: Option<&'a RefCell<UiState>>,
}

impl<'a> LayoutCtx<'a> {
    pub fn new(fonts: &'a FontSystem) -> Self {
        Self { fonts, state: None }
    }

    pub fn with_state(fonts: &'a FontSystem, state: &'a RefCell<UiState>) -> Self {
        Self { fonts, state: Some(state) }
    }

    pub fn emit(&self, source: &str, signal: &str) {
        if let Some(state) = self.state {
            state.borrow_mut().emit(source, signal);
        }
    }

    pub fn set_text(&self, id: &str, value: &str) {
        if let Some(state) = self.state {
            state.borrow_mut().set_text(id, value);
        }
    }

    pub fn set_focus(&self, id: Option<&str>) {
        if let Some(state) = self.state {
            state.borrow_mut().set_focus(id);
        }
    }
}

// ── rect helper ───────────────────────────────────────────────────────────

#[inline]
pub fn inset_rect(rect: Rect, edges: Edges) -> Rect {
    Rect::new(
        rect.origin.x + edges.left,
        rect.origin.y + edges.top,
        (rect.size.x - edges.h()).max(0.0),
        (rect.size.y - edges.v()).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Constraints ───────────────────────────────────────────────────────

    #[test]
    fn constrain_clamps_both_ends() {
        let c = Constraints { min: Vec2::new(10.0, 10.0), max: Vec2::new(50.0, 50.0) };
        assert_eq!(c.constrain(Vec2::new(5.0, 80.0)), Vec2::new(10.0, 50.0));
        assert_eq!(c.constrain(Vec2::new(20.0, 30.0)), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn shrink_never_goes_negative() {
        let c = Constraints::loose(Vec2::new(100.0, 8.0)).shrink(Edges::all(10.0));
        assert_eq!(c.max, Vec2::new(80.0, 0.0));
        assert_eq!(c.min, Vec2::zero());
    }

    // ── inset_rect ────────────────────────────────────────────────────────

    #[test]
    fn inset_rect_asymmetric() {
        let r = inset_rect(
            Rect::new(5.0, 5.0, 100.0, 60.0),
            Edges { top: 4.0, bottom: 8.0, left: 6.0, right: 10.0 },
        );
        assert_eq!(r, Rect::new(11.0, 9.0, 84.0, 48.0));
    }

    // ── LayoutCtx ─────────────────────────────────────────────────────────

    #[test]
    fn detached_ctx_ignores_writes() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        ctx.emit("b1", "clicked");
        ctx.set_text("t1", "x");
    }

    #[test]
    fn attached_ctx_writes_through() {
        let fonts = FontSystem::new();
        let state = RefCell::new(UiState::new());
        let ctx = LayoutCtx::with_state(&fonts, &state);
        ctx.emit("b1", "clicked");
        ctx.set_text("t1", "2.5");
        ctx.set_focus(Some("t1"));
        let mut s = state.borrow_mut();
        assert_eq!(s.take_emitted().len(), 1);
        assert_eq!(s.text("t1"), Some("2.5"));
        assert!(s.is_focused("t1"));
    }
}
