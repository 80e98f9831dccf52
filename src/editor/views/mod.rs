//! # Views
//!
//! The believed terminal grid and the renderer that keeps the real terminal
//! in step with the buffer.

pub mod screen_buffer;
pub mod screen_renderer;

pub use screen_buffer::ScreenBuffer;
pub use screen_renderer::{RenderFrame, ScreenRenderer, ScreenWrite, StatusView};
