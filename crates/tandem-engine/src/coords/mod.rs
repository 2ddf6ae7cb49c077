//! Coordinate and geometry types shared across engine renderers and UI.
//!
//! Canonical CPU space is logical pixels with the origin at the top-left,
//! +X right and +Y down. Renderers convert to NDC with a viewport uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
