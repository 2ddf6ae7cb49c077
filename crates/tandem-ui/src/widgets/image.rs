use tandem_engine::coords::{Rect, Vec2};
use tandem_engine::scene::Bitmap;

use crate::constraints::{Constraints, LayoutCtx};
use crate::painter::Painter;
use crate::widget::Widget;

/// Displays a decoded bitmap, letterboxed to keep its aspect ratio.
///
/// A missing bitmap still takes up its requested size so layouts do not
/// jump when a source fails to load.
pub struct Image {
    bitmap: Option<Bitmap>,
    width: Option<f32>,
    height: Option<f32>,
}

impl Image {
    pub fn new(bitmap: Option<Bitmap>) -> Self {
        Self { bitmap, width: None, height: None }
    }

    pub fn width(mut self, w: f32) -> Self {
        self.width = Some(w);
        self
    }

    pub fn height(mut self, h: f32) -> Self {
        self.height = Some(h);
        self
    }

    fn native_size(&self) -> Vec2 {
        self.bitmap
            .as_ref()
            .map(|b| Vec2::new(b.width() as f32, b.height() as f32))
            .unwrap_or_default()
    }

    /// Requested size; a single given side scales the other by aspect.
    fn preferred_size(&self) -> Vec2 {
        let native = self.native_size();
        match (self.width, self.height) {
            (Some(w), Some(h)) => Vec2::new(w, h),
            (Some(w), None) if native.x > 0.0 => Vec2::new(w, w * native.y / native.x),
            (None, Some(h)) if native.y > 0.0 => Vec2::new(h * native.x / native.y, h),
            (Some(w), None) => Vec2::new(w, 0.0),
            (None, Some(h)) => Vec2::new(0.0, h),
            (None, None) => native,
        }
    }
}

impl Widget for Image {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        constraints.constrain(self.preferred_size())
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let Some(bitmap) = &self.bitmap else { return };
        let dst = rect.fit_centered(self.native_size());
        if !dst.is_empty() {
            painter.image(dst, bitmap.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use tandem_engine::text::FontSystem;

    use super::*;

    fn bitmap(w: u32, h: u32) -> Bitmap {
        Bitmap::new(w, h, vec![255u8; (w * h * 4) as usize]).unwrap()
    }

    fn measure(img: &Image) -> Vec2 {
        let fonts = FontSystem::new();
        img.measure(Constraints::loose(Vec2::new(1000.0, 1000.0)), &LayoutCtx::new(&fonts))
    }

    #[test]
    fn native_size_when_unsized() {
        assert_eq!(measure(&Image::new(Some(bitmap(64, 32)))), Vec2::new(64.0, 32.0));
    }

    #[test]
    fn one_side_keeps_aspect() {
        assert_eq!(measure(&Image::new(Some(bitmap(64, 32))).width(128.0)), Vec2::new(128.0, 64.0));
        assert_eq!(measure(&Image::new(Some(bitmap(64, 32))).height(16.0)), Vec2::new(32.0, 16.0));
    }

    #[test]
    fn missing_bitmap_keeps_requested_size() {
        assert_eq!(measure(&Image::new(None).width(40.0).height(20.0)), Vec2::new(40.0, 20.0));
        assert_eq!(measure(&Image::new(None)), Vec2::zero());
    }
}
