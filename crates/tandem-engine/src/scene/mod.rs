//! Scene (draw stream) types.
//!
//! Renderer-agnostic draw commands recorded by the UI layer each frame, in a
//! deterministic paint order (z-index first, then insertion order).

mod cmd;
mod list;
mod order;

pub mod shapes;

pub use cmd::DrawCmd;
pub use list::{DrawItem, DrawList};
pub use order::{SortKey, ZIndex};
pub use shapes::image::{Bitmap, BitmapId};
pub use shapes::Border;
