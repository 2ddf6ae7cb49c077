//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! higher layers (UI, demos): the [`App`] trait with its lifecycle hooks and
//! the contexts handed to them.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SetupCtx, WindowCtx};
