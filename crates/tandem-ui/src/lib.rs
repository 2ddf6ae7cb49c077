//! Tandem UI: markup-driven widgets drawn over a host's own GPU content.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tandem_ui::prelude::*;
//!
//! Application::new()
//!     .title("demo")
//!     .font("body", font_bytes)
//!     .on_signal("b1", "clicked", "hello", |tag, ui| ui.set_text("l1", tag))
//!     .run(r#"Column { Button "Hi" { id: b1 }  Text "" { id: l1 } }"#)?;
//! ```
//!
//! # Custom widgets
//!
//! Implement [`Widget`](widget::Widget) and use the type anywhere an
//! [`Element`](widget::Element) is accepted:
//!
//! ```rust,ignore
//! use tandem_ui::prelude::*;
//!
//! pub struct Swatch(Color);
//!
//! impl Widget for Swatch {
//!     fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
//!         constraints.constrain(Vec2::new(24.0, 24.0))
//!     }
//!     fn paint(&self, painter: &mut Painter, rect: Rect) {
//!         painter.fill_rect(rect, self.0);
//!     }
//! }
//! ```

pub mod app;
pub mod constraints;
pub mod dsl;
pub mod event;
pub mod image;
pub mod painter;
pub mod scene;
pub mod signal;
pub mod state;
pub mod url;
pub mod widget;
pub mod widgets;

pub use app::Application;

pub mod prelude {
    pub use crate::app::{AfterRender, Application, RenderHook};
    pub use crate::constraints::{Constraints, Edges, LayoutCtx};
    pub use crate::event::{EventResult, UiEvent};
    pub use crate::image::{AssetImageProvider, DecodedImage, ImageProvider, ImageResponse, Size};
    pub use crate::painter::Painter;
    pub use crate::scene::{UiInput, UiScene};
    pub use crate::signal::{SignalCtx, SignalRouter};
    pub use crate::state::UiState;
    pub use crate::url::{UrlInterceptor, UrlKind, DEFAULT_PROVIDER};
    pub use crate::widget::{Element, Widget};
    pub use crate::widgets::{
        button::{Button, CLICKED},
        container::Container,
        flex::{Align, Column, Row},
        image::Image,
        text::Text,
        textbox::{TextBox, ACCEPTED},
    };

    pub use tandem_engine::coords::{Rect, Vec2};
    pub use tandem_engine::paint::Color;
    pub use tandem_engine::scene::Border;
    pub use tandem_engine::text::FontId;

    pub use crate::dsl::{DslBindings, DslLoader, LoadError};
}
