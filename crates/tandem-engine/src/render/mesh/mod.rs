//! Depth-tested 3D geometry.
//!
//! A [`RenderState`] holds the fixed-function settings for a frame (clear
//! values, depth test, projection and model-view matrices). A
//! [`ShaderProgram`] is a pipeline plus its MVP uniform, and a [`Mesh`] is an
//! indexed vertex buffer drawn through it.

mod mesh;
mod program;
mod state;

pub use mesh::{ColorVertex, Mesh};
pub use program::{ProgramDesc, ShaderProgram};
pub use state::RenderState;
