//! # vedit
//!
//! A small full-screen text editor with `vi` key bindings: Command, Insert
//! and Replace modes, operators with motions, registers and marks, one level
//! of line undo, `.` repeat, regex search and the common `:` line commands.
//!
//! The editing core ([`editor::EditorSession`]) is driven one key at a time
//! and produces terminal output as byte frames. [`editor::AppController`]
//! connects it to a terminal through the stream traits in [`editor::io`].
//!
//! ```
//! use vedit::editor::{EditorSession, MemoryHost};
//! use vedit::editor::events::keys;
//!
//! let mut session = EditorSession::open(80, 24, Some(b"hello world\n".to_vec()));
//! let mut host = MemoryHost::new();
//! for key in keys("dw") {
//!     session.handle_input(key, &mut host);
//! }
//! assert_eq!(session.text(), b"world\n");
//! ```

pub mod cmd_args;
pub mod config;
pub mod editor;

pub use editor::{AppController, EditorSession};
