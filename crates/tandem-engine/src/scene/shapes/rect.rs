use crate::coords::Rect;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

use super::Border;

/// Rectangle draw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: Rect,
    pub fill: Color,
    pub border: Option<Border>,
}

impl RectCmd {
    /// Splits the command into solid quads: the fill, then up to four border edges.
    pub fn quads(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        let fill = (!self.rect.is_empty() && self.fill.a > 0.0).then_some((self.rect, self.fill));
        let edges = self.border.iter().flat_map(|b| {
            let r = self.rect;
            let w = b.width.min(r.size.x * 0.5).min(r.size.y * 0.5).max(0.0);
            [
                Rect::new(r.origin.x, r.origin.y, r.size.x, w),
                Rect::new(r.origin.x, r.origin.y + r.size.y - w, r.size.x, w),
                Rect::new(r.origin.x, r.origin.y + w, w, r.size.y - 2.0 * w),
                Rect::new(r.origin.x + r.size.x - w, r.origin.y + w, w, r.size.y - 2.0 * w),
            ]
            .into_iter()
            .filter(|e| !e.is_empty())
            .map(move |e| (e, b.color))
        });
        fill.into_iter().chain(edges)
    }
}

impl DrawList {
    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, fill: Color, border: Option<Border>) {
        self.push(z, DrawCmd::Rect(RectCmd { rect, fill, border }));
    }

    pub fn push_solid_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push_rect(z, rect, color, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_rect_is_one_quad() {
        let cmd = RectCmd { rect: Rect::new(0.0, 0.0, 10.0, 10.0), fill: Color::WHITE, border: None };
        assert_eq!(cmd.quads().count(), 1);
    }

    #[test]
    fn border_adds_four_edges() {
        let cmd = RectCmd {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            fill: Color::TRANSPARENT,
            border: Some(Border::new(1.0, Color::BLACK)),
        };
        let quads: Vec<_> = cmd.quads().collect();
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].0, Rect::new(0.0, 0.0, 10.0, 1.0));
        assert_eq!(quads[3].0, Rect::new(9.0, 1.0, 1.0, 8.0));
    }
}
