//! Builds widget trees from `.mkml` documents.
//!
//! ```mkml
//! import "panel.mkml" as Panel
//!
//! Column {
//!     gap: 8
//!     Image { source: "images/logo.png"  width: 64 }
//!     Row {
//!         Button "2x" { id: b1 }
//!         Button "1/2" { id: b2 }
//!         TextBox { id: t1  placeholder: "speed" }
//!     }
//!     Text "fps: 0" { id: l1 }
//!     Panel
//! }
//! ```
//!
//! Documents are validated once by [`DslLoader::load`]; the tree is then
//! rebuilt every frame with [`DslLoader::build`], reading persistent widget
//! state (label text, text box content, focus) from the [`UiState`].
//!
//! [`UiState`]: crate::state::UiState

pub mod builder;
pub mod error;

pub use builder::{DslBindings, DslLoader, BUILTIN_WIDGETS};
pub use error::LoadError;
pub use tandem_mkml::{Document, Node};
