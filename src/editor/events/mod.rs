//! # Event Types
//!
//! Keys and their decoding, modes, directions and render requests.

pub mod keys;
pub mod types;

pub use keys::{ctrl, keys, keys_from_event, Key, KeyDecoder, BACKSPACE, CR, DEL, ESC, LF};
pub use types::{AddressRange, Direction, Mode, RenderRequest};
