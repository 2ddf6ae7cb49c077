//! GPU rendering subsystem.
//!
//! Two layers share one frame:
//! - `mesh`: depth-tested 3D geometry drawn first, owning the clear
//! - `shapes`: 2D UI renderers drawn on top with `LoadOp::Load`
//!
//! 2D geometry is in logical pixels (top-left origin, +Y down); vertex
//! shaders convert to NDC using a viewport uniform.

mod ctx;
pub mod mesh;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
