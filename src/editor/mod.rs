//! # Editor
//!
//! A modal text editor in the tradition of `vi`, laid out in layers:
//!
//! ```text
//! ┌──────────────┐  events  ┌───────────────┐  keys   ┌────────────────┐
//! │  io streams  │─────────▶│  controllers  │────────▶│    session     │
//! │ (terminal or │◀─────────│ (run loop and │◀────────│ (EditorSession │
//! │    mocks)    │  frames  │  host access) │ frames  │ + its helpers) │
//! └──────────────┘          └───────────────┘         └────────────────┘
//!                                                         │
//!                        commands · models · services · views
//! ```
//!
//! The session holds no terminal or file handles of its own; everything it
//! needs from outside comes through [`services::Host`], so the same session
//! runs against a real terminal or an in-memory host in tests.

pub mod commands;
pub mod controllers;
pub mod error;
pub mod events;
pub mod io;
pub mod models;
pub mod services;
pub mod session;
pub mod views;

pub use controllers::AppController;
pub use error::{EditorError, EditorResult};
pub use events::{Key, KeyDecoder, Mode, RenderRequest};
pub use services::{ExternalRunner, FileSystem, Host, LocalFileSystem, MemoryHost, ProcessRunner};
pub use session::EditorSession;
pub use views::RenderFrame;
