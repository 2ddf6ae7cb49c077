//! UI shape renderers.

mod atlas;
mod common;

pub mod image;
pub mod rect;
pub mod text;
