//! # Commands
//!
//! Parsing and evaluation that does not need the whole session: the
//! Command-mode key parser, motion arithmetic over a buffer, line addresses,
//! substitution, and the line-command registry.

pub mod ex_address;
pub mod ex_commands;
pub mod motion;
pub mod parser;
pub mod substitute;

pub use ex_address::{AddressResolver, LineRange};
pub use ex_commands::{LineCommand, LineCommandRegistry, LineInvocation};
pub use motion::MotionKind;
pub use parser::{
    parse_command, Action, InsertEntry, Motion, Operator, OperatorTarget, ParseOutcome,
    ParsedCommand, Scroll,
};
pub use substitute::Substitution;
