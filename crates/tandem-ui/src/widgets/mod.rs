pub mod button;
pub mod container;
pub mod flex;
pub mod image;
pub mod text;
pub mod textbox;
