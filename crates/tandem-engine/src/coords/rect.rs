use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { origin: Vec2::new(x, y), size: Vec2::new(w, h) }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }

    /// Overlapping region, or `None` when the rects do not overlap with positive area.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let (a1, b1) = (self.max(), other.max());
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let w = a1.x.min(b1.x) - x0;
        let h = a1.y.min(b1.y) - y0;
        (w > 0.0 && h > 0.0).then(|| Rect::new(x0, y0, w, h))
    }

    /// Largest rect with aspect `content` centered inside `self`.
    pub fn fit_centered(self, content: Vec2) -> Rect {
        if content.x <= 0.0 || content.y <= 0.0 || self.is_empty() {
            return Rect::from_origin_size(self.origin, Vec2::zero());
        }
        let scale = (self.size.x / content.x).min(self.size.y / content.y);
        let size = content * scale;
        let origin = self.origin + (self.size - size) * 0.5;
        Rect::from_origin_size(origin, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edge_is_none() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersect(r(10.0, 0.0, 10.0, 10.0)).is_none());
    }

    // ── fit_centered ──────────────────────────────────────────────────────

    #[test]
    fn fit_wide_content_letterboxes() {
        let fit = r(0.0, 0.0, 100.0, 100.0).fit_centered(Vec2::new(200.0, 100.0));
        assert_eq!(fit, r(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn fit_degenerate_content_is_empty() {
        assert!(r(0.0, 0.0, 100.0, 100.0).fit_centered(Vec2::zero()).is_empty());
    }
}
