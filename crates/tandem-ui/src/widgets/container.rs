use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::paint::Color;
use tandem_engine::scene::Border;

use crate::constraints::{inset_rect, Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

/// Single-child box with padding, background and border. Empty by default.
pub struct Container {
    child: Option<Element>,
    padding: Edges,
    background: Option<Color>,
    border: Option<Border>,
    min_size: Vec2,
}

impl Container {
    pub fn new() -> Self {
        Self { child: None, padding: Edges::default(), background: None, border: None, min_size: Vec2::zero() }
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.child = Some(child.into());
        self
    }

    pub fn padding(mut self, edges: Edges) -> Self {
        self.padding = edges;
        self
    }

    pub fn padding_all(mut self, v: f32) -> Self {
        self.padding = Edges::all(v);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn min_size(mut self, width: f32, height: f32) -> Self {
        self.min_size = Vec2::new(width, height);
        self
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let child = self
            .child
            .as_ref()
            .map_or(Vec2::zero(), |c| c.measure(constraints.shrink(self.padding), ctx));
        constraints.constrain(Vec2::new(
            (child.x + self.padding.h()).max(self.min_size.x),
            (child.y + self.padding.v()).max(self.min_size.y),
        ))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        if self.background.is_some() || self.border.is_some() {
            painter.rect(rect, self.background.unwrap_or(Color::TRANSPARENT), self.border);
        }
        if let Some(child) = &self.child {
            child.paint(painter, inset_rect(rect, self.padding));
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx<'_>) -> EventResult {
        match &mut self.child {
            Some(child) => child.on_event(event, inset_rect(rect, self.padding), ctx),
            None => EventResult::Ignored,
        }
    }
}
