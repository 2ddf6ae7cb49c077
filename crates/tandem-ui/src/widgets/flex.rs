use tandem_engine::coords::{Rect, Vec2};

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

// ── Align ─────────────────────────────────────────────────────────────────

/// Cross-axis placement of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

impl Align {
    /// Parses `stretch | start | center | end`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stretch" => Some(Align::Stretch),
            "start" => Some(Align::Start),
            "center" => Some(Align::Center),
            "end" => Some(Align::End),
            _ => None,
        }
    }

    fn offset(self, available: f32, used: f32) -> f32 {
        match self {
            Align::Stretch | Align::Start => 0.0,
            Align::Center => (available - used) * 0.5,
            Align::End => available - used,
        }
    }
}

// ── shared axis layout ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Vertical,
    Horizontal,
}

/// Children laid out along one axis with fixed spacing.
struct Flex {
    axis: Axis,
    children: Vec<Element>,
    spacing: f32,
    padding: Edges,
    align: Align,
}

impl Flex {
    fn new(axis: Axis) -> Self {
        Self { axis, children: Vec::new(), spacing: 0.0, padding: Edges::default(), align: Align::Stretch }
    }

    /// (main, cross) components of `v`.
    fn split(&self, v: Vec2) -> (f32, f32) {
        match self.axis {
            Axis::Vertical => (v.y, v.x),
            Axis::Horizontal => (v.x, v.y),
        }
    }

    fn join(&self, main: f32, cross: f32) -> Vec2 {
        match self.axis {
            Axis::Vertical => Vec2::new(cross, main),
            Axis::Horizontal => Vec2::new(main, cross),
        }
    }

    fn child_constraints(&self, inner_cross: f32) -> Constraints {
        // An unbounded cross axis cannot be stretched into.
        let min_cross = match self.align {
            Align::Stretch if inner_cross.is_finite() => inner_cross,
            _ => 0.0,
        };
        Constraints {
            min: self.join(0.0, min_cross),
            max: self.join(f32::INFINITY, inner_cross),
        }
    }

    fn gaps(&self) -> f32 {
        self.children.len().saturating_sub(1) as f32 * self.spacing
    }

    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let (_, max_cross) = self.split(constraints.max);
        let (pad_main, pad_cross) = self.split(Vec2::new(self.padding.h(), self.padding.v()));
        let inner_cross = (max_cross - pad_cross).max(0.0);
        let child_c = self.child_constraints(inner_cross);

        let mut main = pad_main + self.gaps();
        let mut cross: f32 = 0.0;
        for child in &self.children {
            let (m, c) = self.split(child.measure(child_c, ctx));
            main += m;
            cross = cross.max(c);
        }

        let cross = if self.align == Align::Stretch && max_cross.is_finite() {
            max_cross
        } else {
            cross + pad_cross
        };
        constraints.constrain(self.join(main, cross))
    }

    /// Child rects inside `rect`, in child order.
    fn layout(&self, rect: Rect, ctx: &LayoutCtx) -> Vec<Rect> {
        let inner = inset_rect(rect, self.padding);
        let (mut cursor, cross_origin) = self.split(inner.origin);
        let (_, inner_cross) = self.split(inner.size);
        let child_c = self.child_constraints(inner_cross);

        self.children
            .iter()
            .map(|child| {
                let size = child.measure(child_c, ctx);
                let (m, c) = self.split(size);
                let origin = self.join(cursor, cross_origin + self.align.offset(inner_cross, c));
                cursor += m + self.spacing;
                Rect::from_origin_size(origin, size)
            })
            .collect()
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let ctx = painter.layout_ctx();
        let rects = self.layout(rect, &ctx);
        for (child, r) in self.children.iter().zip(rects) {
            child.paint(painter, r);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx<'_>) -> EventResult {
        let rects = self.layout(rect, ctx);
        for (child, r) in self.children.iter_mut().zip(rects) {
            if child.on_event(event, r, ctx).is_consumed() {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }
}

macro_rules! flex_widget {
    ($(#[$doc:meta])* $name:ident, $axis:expr) => {
        $(#[$doc])*
        pub struct $name(Flex);

        impl $name {
            pub fn new() -> Self {
                Self(Flex::new($axis))
            }

            pub fn spacing(mut self, v: f32) -> Self {
                self.0.spacing = v;
                self
            }

            pub fn padding(mut self, edges: Edges) -> Self {
                self.0.padding = edges;
                self
            }

            pub fn padding_all(mut self, v: f32) -> Self {
                self.0.padding = Edges::all(v);
                self
            }

            pub fn cross_align(mut self, align: Align) -> Self {
                self.0.align = align;
                self
            }

            pub fn child(mut self, child: impl Into<Element>) -> Self {
                self.0.children.push(child.into());
                self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Widget for $name {
            fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
                self.0.measure(constraints, ctx)
            }

            fn paint(&self, painter: &mut Painter, rect: Rect) {
                self.0.paint(painter, rect)
            }

            fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx<'_>) -> EventResult {
                self.0.on_event(event, rect, ctx)
            }
        }
    };
}

flex_widget!(
    /// Children stacked top to bottom.
    Column,
    Axis::Vertical
);

flex_widget!(
    /// Children placed left to right.
    Row,
    Axis::Horizontal
);

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_engine::text::FontSystem;

    /// Fixed-size leaf for layout tests.
    struct Boxed(Vec2);

    impl Widget for Boxed {
        fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
            constraints.constrain(self.0)
        }
        fn paint(&self, _painter: &mut Painter, _rect: Rect) {}
    }

    fn leaf(w: f32, h: f32) -> Boxed {
        Boxed(Vec2::new(w, h))
    }

    // ── Column ────────────────────────────────────────────────────────────

    #[test]
    fn column_sums_heights_with_spacing() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let col = Column::new()
            .spacing(4.0)
            .padding_all(2.0)
            .cross_align(Align::Start)
            .child(leaf(10.0, 20.0))
            .child(leaf(30.0, 5.0));
        let size = col.measure(Constraints::loose(Vec2::new(200.0, 200.0)), &ctx);
        assert_eq!(size, Vec2::new(34.0, 33.0));
    }

    #[test]
    fn column_stretch_fills_width() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let col = Column::new().child(leaf(10.0, 10.0));
        let rects = col.0.layout(Rect::new(0.0, 0.0, 100.0, 100.0), &ctx);
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 100.0, 10.0));
    }

    // ── Row ───────────────────────────────────────────────────────────────

    #[test]
    fn row_places_left_to_right_and_centers() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx::new(&fonts);
        let row = Row::new()
            .spacing(5.0)
            .cross_align(Align::Center)
            .child(leaf(10.0, 10.0))
            .child(leaf(20.0, 30.0));
        let rects = row.0.layout(Rect::new(0.0, 0.0, 100.0, 30.0), &ctx);
        assert_eq!(rects[0], Rect::new(0.0, 10.0, 10.0, 10.0));
        assert_eq!(rects[1], Rect::new(15.0, 0.0, 20.0, 30.0));
    }

    #[test]
    fn align_parse() {
        assert_eq!(Align::parse("center"), Some(Align::Center));
        assert_eq!(Align::parse("middle"), None);
    }
}
