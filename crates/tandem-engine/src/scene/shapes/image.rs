use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::coords::Rect;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Identity of a [`Bitmap`]; the renderer caches one GPU texture per id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BitmapId(u64);

impl BitmapId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Decoded RGBA8 pixels (straight alpha, row-major, no padding).
#[derive(Debug, Clone)]
pub struct Bitmap {
    id: BitmapId,
    width: u32,
    height: u32,
    pixels: Rc<[u8]>,
}

impl Bitmap {
    /// Wraps `pixels`; returns `None` if the length does not match `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: impl Into<Rc<[u8]>>) -> Option<Self> {
        let pixels = pixels.into();
        let expected = (width as usize) * (height as usize) * 4;
        (width > 0 && height > 0 && pixels.len() == expected).then(|| Self {
            id: BitmapId::next(),
            width,
            height,
            pixels,
        })
    }

    pub fn id(&self) -> BitmapId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Image draw payload: `bitmap` stretched over `rect`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCmd {
    pub rect: Rect,
    pub bitmap: Bitmap,
}

impl DrawList {
    pub fn push_image(&mut self, z: ZIndex, rect: Rect, bitmap: Bitmap) {
        self.push(z, DrawCmd::Image(ImageCmd { rect, bitmap }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_length() {
        assert!(Bitmap::new(2, 2, vec![0u8; 15]).is_none());
        assert!(Bitmap::new(0, 2, Vec::<u8>::new()).is_none());
    }

    #[test]
    fn ids_are_unique() {
        let a = Bitmap::new(1, 1, vec![0u8; 4]).unwrap();
        let b = Bitmap::new(1, 1, vec![0u8; 4]).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone(), a);
    }
}
