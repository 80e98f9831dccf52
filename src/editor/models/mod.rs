//! # Editor Models
//!
//! Plain data owned by an editing session: the text buffer, registers and
//! marks, options and the status line.

pub mod options;
pub mod registers;
pub mod status_line;
pub mod text_buffer;

pub use options::{OptionFlags, Options};
pub use registers::{MarkName, PutPlan, RegisterMarkStore, RegisterName};
pub use status_line::{StatusLine, CONTINUE_PROMPT};
pub use text_buffer::TextBuffer;
