use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::paint::Color;
use tandem_engine::scene::{Bitmap, Border, DrawList, ZIndex};
use tandem_engine::text::{FontId, FontSystem};

use crate::constraints::LayoutCtx;

/// Drawing surface passed to `Widget::paint`.
///
/// Wraps the engine `DrawList` and exposes the pointer state so widgets can
/// draw hover and pressed visuals without retained state.
pub struct Painter<'a> {
    draw_list: &'a mut DrawList,
    pub(crate) fonts: &'a FontSystem,
    z: i32,
    pub mouse_pos: Vec2,
    pub mouse_pressed: bool,
}

impl<'a> Painter<'a> {
    pub(crate) fn new(
        draw_list: &'a mut DrawList,
        fonts: &'a FontSystem,
        mouse_pos: Vec2,
        mouse_pressed: bool,
    ) -> Self {
        Self { draw_list, fonts, z: 0, mouse_pos, mouse_pressed }
    }

    #[inline]
    pub fn is_hovered(&self, rect: Rect) -> bool {
        rect.contains(self.mouse_pos)
    }

    #[inline]
    pub fn is_pressed(&self, rect: Rect) -> bool {
        self.mouse_pressed && rect.contains(self.mouse_pos)
    }

    /// Measure context for containers that lay out children while painting.
    #[inline]
    pub fn layout_ctx(&self) -> LayoutCtx<'a> {
        LayoutCtx::new(self.fonts)
    }

    pub fn measure_text(&self, text: &str, font: FontId, size: f32, max_width: Option<f32>) -> Vec2 {
        self.fonts.measure_text(text, font, size, max_width)
    }

    // ── drawing ───────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let z = self.next_z();
        self.draw_list.push_solid_rect(z, rect, color);
    }

    pub fn rect(&mut self, rect: Rect, fill: Color, border: Option<Border>) {
        let z = self.next_z();
        self.draw_list.push_rect(z, rect, fill, border);
    }

    pub fn text(
        &mut self,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
        max_width: Option<f32>,
    ) {
        let z = self.next_z();
        self.draw_list.push_text(z, text, font, size, color, origin, max_width);
    }

    pub fn image(&mut self, rect: Rect, bitmap: Bitmap) {
        let z = self.next_z();
        self.draw_list.push_image(z, rect, bitmap);
    }

    /// Begin a scissor region; pair with [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }

    #[inline]
    fn next_z(&mut self) -> ZIndex {
        let z = ZIndex::new(self.z);
        self.z += 1;
        z
    }
}
