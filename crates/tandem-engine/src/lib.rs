//! Tandem engine crate.
//!
//! Platform and GPU runtime shared by the UI layer and demos: window loop,
//! device, input, timing, resources, 2D shape renderers and depth-tested
//! mesh rendering.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod resources;
pub mod scene;
pub mod text;
