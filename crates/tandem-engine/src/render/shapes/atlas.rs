/// Shelf packer for a square atlas: glyphs fill rows left to right and a
/// new row starts below the tallest glyph of the previous one.
#[derive(Debug)]
pub(super) struct ShelfPacker {
    size: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    pub(super) fn new(size: u32, padding: u32) -> Self {
        Self { size, padding, cursor_x: padding, cursor_y: padding, row_height: 0, full: false }
    }

    /// Reserves a `w`×`h` slot and returns its top-left corner.
    ///
    /// Once a glyph fails to fit the packer stays full.
    pub(super) fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }
        if self.cursor_x + w + self.padding > self.size {
            self.cursor_y += self.row_height + self.padding;
            self.cursor_x = self.padding;
            self.row_height = 0;
        }
        if self.cursor_y + h + self.padding > self.size || w + 2 * self.padding > self.size {
            self.full = true;
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(at)
    }

    /// UV rectangle `(min, max)` of a slot.
    pub(super) fn uv(&self, x: u32, y: u32, w: u32, h: u32) -> ([f32; 2], [f32; 2]) {
        let s = self.size as f32;
        ([x as f32 / s, y as f32 / s], [(x + w) as f32 / s, (y + h) as f32 / s])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_row_then_wraps() {
        let mut p = ShelfPacker::new(16, 1);
        assert_eq!(p.place(6, 4), Some((1, 1)));
        assert_eq!(p.place(6, 2), Some((8, 1)));
        // 15 + 6 + 1 > 16: next row starts under the tallest glyph (4).
        assert_eq!(p.place(6, 3), Some((1, 6)));
    }

    #[test]
    fn full_is_sticky() {
        let mut p = ShelfPacker::new(8, 1);
        assert_eq!(p.place(6, 6), Some((1, 1)));
        assert_eq!(p.place(6, 6), None);
        assert_eq!(p.place(1, 1), None);
    }

    #[test]
    fn uv_is_normalized() {
        let p = ShelfPacker::new(100, 0);
        assert_eq!(p.uv(10, 20, 30, 40), ([0.1, 0.2], [0.4, 0.6]));
    }
}
