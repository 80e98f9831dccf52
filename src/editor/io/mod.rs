//! # Terminal I/O
//!
//! The controller talks to the terminal only through two traits, so the whole
//! editor can be driven by scripted events and checked against recorded output.
//!
//! ```text
//! Production:  AppController ──▶ TerminalEventStream ──▶ crossterm::event::read()
//!                            ──▶ TerminalRenderStream ──▶ raw bytes on stdout
//!
//! Testing:     AppController ──▶ MockEventStream     ──▶ VecDeque<Event>
//!                            ──▶ MockRenderStream    ──▶ Vec<RenderCommand>
//! ```
//!
//! Frames produced by the screen renderer are already terminal byte streams,
//! so a render stream is mostly a `Write` plus the handful of mode switches
//! the editor makes around them.

use anyhow::Result;
use crossterm::event::Event;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use mock::{MockEventStream, MockRenderStream, RenderCommand};
pub use terminal::{TerminalEventStream, TerminalRenderStream};

/// Terminal size as (columns, rows)
pub type TerminalSize = (u16, u16);

/// Source of key and resize events
pub trait EventStream: Send {
    /// Whether an event is ready within `timeout`
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Next event; call after `poll` returned true
    fn read(&mut self) -> Result<Event>;
}

/// Destination for screen output
///
/// Bytes written through `Write` go to the terminal unchanged; buffer text
/// is not required to be UTF-8.
pub trait RenderStream: Write + Send {
    fn clear_screen(&mut self) -> Result<()>;

    /// Move the cursor to (column, row)
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;
}
