//! # Controllers
//!
//! The host side of the editor: the run loop and the capabilities it lends
//! the session.

pub mod app_controller;
pub mod terminal_host;

pub use app_controller::AppController;
pub use terminal_host::TerminalHost;
