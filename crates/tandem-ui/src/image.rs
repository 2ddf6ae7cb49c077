//! Image providers and the per-application image store.

use std::collections::HashMap;
use std::rc::Rc;

use ::image::imageops::{self, FilterType};
use tandem_engine::resources::ResourceProvider;
use tandem_engine::scene::Bitmap;

use crate::url::{parse_image_url, UrlInterceptor, UrlKind};

/// Requested image size in pixels; zero on either side means "native".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// RGBA8 pixels, straight alpha, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn to_bitmap(&self) -> Option<Bitmap> {
        Bitmap::new(self.width, self.height, self.rgba.as_slice())
    }
}

/// A decoded image and the size of its source before any scaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub image: DecodedImage,
    pub native_size: Size,
}

/// Supplies images addressed as `image://<name>/<id>`.
///
/// A provider that cannot serve `id` returns `None`; callers render nothing.
pub trait ImageProvider {
    fn request_image(&self, id: &str, requested: Size) -> Option<ImageResponse>;

    fn request_pixmap(&self, _id: &str, _requested: Size) -> Option<ImageResponse> {
        None
    }

    /// Ready-made texture, bypassing decoding.
    fn request_texture(&self, _id: &str, _requested: Size) -> Option<Bitmap> {
        None
    }
}

// ── AssetImageProvider ────────────────────────────────────────────────────

/// Decodes images read from a [`ResourceProvider`].
pub struct AssetImageProvider {
    resources: Rc<dyn ResourceProvider>,
}

impl AssetImageProvider {
    pub fn new(resources: Rc<dyn ResourceProvider>) -> Self {
        Self { resources }
    }
}

impl ImageProvider for AssetImageProvider {
    fn request_image(&self, id: &str, requested: Size) -> Option<ImageResponse> {
        let Some(mut data) = self.resources.access(id) else {
            log::debug!("image: no resource {id:?}");
            return None;
        };
        let bytes = match data.read_to_vec() {
            Ok(b) => b,
            Err(e) => {
                log::warn!("image: failed to read {id:?}: {e}");
                return None;
            }
        };
        let decoded = match ::image::load_from_memory(&bytes) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                log::warn!("image: failed to decode {id:?}: {e}");
                return None;
            }
        };

        let native_size = Size::new(decoded.width(), decoded.height());
        let rgba = if requested.is_empty() || requested == native_size {
            decoded
        } else {
            imageops::resize(&decoded, requested.width, requested.height, FilterType::Triangle)
        };

        Some(ImageResponse {
            image: DecodedImage { width: rgba.width(), height: rgba.height(), rgba: rgba.into_raw() },
            native_size,
        })
    }
}

// ── ImageStore ────────────────────────────────────────────────────────────

/// Resolves markup image sources to bitmaps.
///
/// Sources go through the [`UrlInterceptor`], then to the provider named in
/// the rewritten URL. Results, misses included, are cached per URL and size
/// so each image is decoded and uploaded once.
pub struct ImageStore {
    interceptor: UrlInterceptor,
    providers: HashMap<String, Box<dyn ImageProvider>>,
    cache: HashMap<(String, Size), Option<Bitmap>>,
}

impl ImageStore {
    pub fn new(interceptor: UrlInterceptor) -> Self {
        Self { interceptor, providers: HashMap::new(), cache: HashMap::new() }
    }

    pub fn interceptor_mut(&mut self) -> &mut UrlInterceptor {
        &mut self.interceptor
    }

    /// Registers `provider` under `name`, replacing any previous one.
    pub fn add_provider(&mut self, name: impl Into<String>, provider: Box<dyn ImageProvider>) {
        self.providers.insert(name.into(), provider);
        self.cache.clear();
    }

    pub fn resolve(&mut self, source: &str, requested: Size) -> Option<Bitmap> {
        let url = self.interceptor.intercept(source, UrlKind::UrlString);
        let key = (url, requested);
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let bitmap = self.load(&key.0, requested);
        self.cache.insert(key, bitmap.clone());
        bitmap
    }

    fn load(&self, url: &str, requested: Size) -> Option<Bitmap> {
        let Some((name, id)) = parse_image_url(url) else {
            log::debug!("image: {url:?} does not address an image provider");
            return None;
        };
        let Some(provider) = self.providers.get(name) else {
            log::warn!("image: no provider named {name:?}");
            return None;
        };
        provider
            .request_texture(id, requested)
            .or_else(|| provider.request_image(id, requested)?.image.to_bitmap())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ::image::{ImageFormat, Rgba, RgbaImage};
    use tandem_engine::resources::MemoryResourceProvider;

    use super::*;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn provider() -> AssetImageProvider {
        let res = MemoryResourceProvider::new()
            .with("tex/a.png", png(8, 4))
            .with("tex/broken.png", b"not a png".to_vec());
        AssetImageProvider::new(Rc::new(res))
    }

    // ── AssetImageProvider ────────────────────────────────────────────────

    #[test]
    fn native_size_when_no_size_requested() {
        let r = provider().request_image("tex/a.png", Size::default()).unwrap();
        assert_eq!(r.image.size(), Size::new(8, 4));
        assert_eq!(r.native_size, Size::new(8, 4));
        assert_eq!(r.image.rgba.len(), 8 * 4 * 4);
        assert_eq!(&r.image.rgba[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn resizes_to_requested_size() {
        let r = provider().request_image("tex/a.png", Size::new(2, 2)).unwrap();
        assert_eq!(r.image.size(), Size::new(2, 2));
        assert_eq!(r.native_size, Size::new(8, 4));
    }

    #[test]
    fn half_empty_size_means_native() {
        let r = provider().request_image("tex/a.png", Size::new(16, 0)).unwrap();
        assert_eq!(r.image.size(), Size::new(8, 4));
    }

    #[test]
    fn miss_and_decode_failure_are_none() {
        let p = provider();
        assert!(p.request_image("tex/missing.png", Size::default()).is_none());
        assert!(p.request_image("tex/broken.png", Size::default()).is_none());
        assert!(p.request_pixmap("tex/a.png", Size::default()).is_none());
        assert!(p.request_texture("tex/a.png", Size::default()).is_none());
    }

    // ── ImageStore ────────────────────────────────────────────────────────

    fn store() -> ImageStore {
        let mut interceptor = UrlInterceptor::new();
        interceptor.set_base_url("/assets");
        let mut store = ImageStore::new(interceptor);
        store.add_provider("nya_provider", Box::new(provider()));
        store
    }

    #[test]
    fn resolves_through_interceptor_and_caches() {
        let mut s = store();
        let a = s.resolve("tex/a.png", Size::default()).unwrap();
        assert_eq!((a.width(), a.height()), (8, 4));
        let b = s.resolve("/assets/tex/a.png", Size::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_provider_or_scheme_resolves_to_none() {
        let mut s = ImageStore::new(UrlInterceptor::new().with_provider("other"));
        assert!(s.resolve("tex/a.png", Size::default()).is_none());
        let mut s = store();
        assert!(s.resolve("https://example.org/a.png", Size::default()).is_none());
        assert!(s.resolve("tex/missing.png", Size::default()).is_none());
    }
}
