//! # Command-Mode Key Parser
//!
//! Turns the keys typed so far in Command mode into a [`ParsedCommand`]:
//!
//! ```text
//! ["x] [count] command [count] [motion] [argument]
//! ```
//!
//! The parser is pure. It answers "need more keys", "this is a complete
//! command" or "this is not a command", and the session executes complete
//! commands in a single straight-line pass. Operators take their motion from
//! the same key list, so an operator never re-enters the dispatcher.

use crate::editor::events::{ctrl, Key, BACKSPACE, CR, DEL, ESC, LF};
use crate::editor::models::RegisterName;

/// Operators that act on the range covered by a motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    ShiftLeft,
    ShiftRight,
}

impl Operator {
    fn from_key(byte: u8) -> Option<Self> {
        match byte {
            b'd' => Some(Self::Delete),
            b'c' => Some(Self::Change),
            b'y' => Some(Self::Yank),
            b'<' => Some(Self::ShiftLeft),
            b'>' => Some(Self::ShiftRight),
            _ => None,
        }
    }

    fn key(self) -> u8 {
        match self {
            Self::Delete => b'd',
            Self::Change => b'c',
            Self::Yank => b'y',
            Self::ShiftLeft => b'<',
            Self::ShiftRight => b'>',
        }
    }
}

/// Cursor motions, usable alone or after an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `$`
    LineEnd,
    /// `^`
    FirstNonBlank,
    /// `+` and Enter
    NextLine,
    /// `-`
    PrevLine,
    /// `|`
    Column,
    /// `w` (`W` when `big`)
    WordForward { big: bool },
    /// `b` / `B`
    WordBackward { big: bool },
    /// `e` / `E`
    WordEnd { big: bool },
    /// `f F t T`
    FindChar { byte: u8, forward: bool, till: bool },
    /// `;` and `,`
    RepeatFind { reverse: bool },
    /// `G`
    GotoLine,
    /// `H`
    ScreenTop,
    /// `M`
    ScreenMiddle,
    /// `L`
    ScreenBottom,
    /// `%`
    MatchBracket,
    /// `}`
    ParagraphForward,
    /// `{`
    ParagraphBackward,
    /// `'x`, or `''` for the previous context
    MarkLine(u8),
    /// `` `x ``
    MarkExact(u8),
    /// `n` / `N`
    SearchNext { reverse: bool },
}

/// What an operator acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorTarget {
    /// The operator key doubled (`dd`, `yy`, `>>`): whole lines
    Lines,
    Motion(Motion),
}

/// Ways of entering Insert mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    BeforeDot,
    /// `a`
    AfterDot,
    /// `A`
    LineEnd,
    /// `I`
    FirstNonBlank,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    /// `^F`
    PageForward,
    /// `^B`
    PageBackward,
    /// `^D`
    HalfDown,
    /// `^U`
    HalfUp,
    /// `^E`
    LineDown,
    /// `^Y`
    LineUp,
}

/// A complete Command-mode command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Motion),
    Operate {
        operator: Operator,
        target: OperatorTarget,
        /// Count typed between operator and motion (`d3w`)
        motion_count: Option<usize>,
    },
    Insert(InsertEntry),
    /// `R`
    ReplaceMode,
    /// `r` and its replacement byte
    ReplaceChar(u8),
    /// `p` / `P`
    Put { before: bool },
    /// `x` / `X`
    DeleteChar { before: bool },
    /// `J`
    Join,
    /// `~`
    ToggleCase,
    /// `.`
    RepeatChange,
    /// `U`
    RestoreLine,
    /// `m` and the mark letter
    SetMark(u8),
    /// `:`, `/` or `?`: start reading a line on the status row
    Prompt(u8),
    Scroll(Scroll),
    /// `^L` / `^R`
    Redraw,
    /// `^G`
    FileInfo,
    /// `ZZ`
    WriteQuit,
    /// Esc in Command mode
    Escape,
    /// `^C`
    Interrupt,
}

impl Action {
    /// Commands that change the buffer; these are recorded for `.` and move
    /// the editing context
    pub fn is_change(&self) -> bool {
        match self {
            Action::Operate { operator, .. } => *operator != Operator::Yank,
            Action::Insert(_)
            | Action::ReplaceMode
            | Action::ReplaceChar(_)
            | Action::Put { .. }
            | Action::DeleteChar { .. }
            | Action::Join
            | Action::ToggleCase => true,
            _ => false,
        }
    }
}

/// Result of parsing the pending keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand {
    pub register: Option<RegisterName>,
    pub count: Option<usize>,
    pub action: Action,
}

impl ParsedCommand {
    /// The count, or 1 when none was typed
    pub fn repeat(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// More keys are needed
    Incomplete,
    Complete(ParsedCommand),
    /// The keys do not form a command
    Invalid,
}

/// Parse the pending Command-mode keys
pub fn parse_command(keys: &[Key]) -> ParseOutcome {
    let mut i = 0;

    let register = if keys.first() == Some(&Key::Byte(b'"')) {
        let Some(key) = keys.get(1) else {
            return ParseOutcome::Incomplete;
        };
        i = 2;
        match key.byte().and_then(RegisterName::from_key) {
            Some(name) => Some(name),
            None => return ParseOutcome::Invalid,
        }
    } else {
        None
    };

    let (count, next) = parse_count(keys, i);
    i = next;

    let Some(&key) = keys.get(i) else {
        return ParseOutcome::Incomplete;
    };
    let rest = &keys[i + 1..];

    let action = match parse_action(key, rest) {
        Ok(action) => action,
        Err(outcome) => return outcome,
    };
    ParseOutcome::Complete(ParsedCommand {
        register,
        count,
        action,
    })
}

/// Digits starting at `from`; a leading `0` is the `0` motion, not a count
fn parse_count(keys: &[Key], from: usize) -> (Option<usize>, usize) {
    let mut i = from;
    let mut count: Option<usize> = None;
    while let Some(Key::Byte(byte)) = keys.get(i) {
        let digit = match byte {
            b'1'..=b'9' => usize::from(byte - b'0'),
            b'0' if count.is_some() => 0,
            _ => break,
        };
        count = Some(count.unwrap_or(0).saturating_mul(10).saturating_add(digit));
        i += 1;
    }
    (count, i)
}

fn parse_action(key: Key, rest: &[Key]) -> Result<Action, ParseOutcome> {
    let byte = match key {
        Key::Byte(byte) => byte,
        Key::PageDown => return Ok(Action::Scroll(Scroll::PageForward)),
        Key::PageUp => return Ok(Action::Scroll(Scroll::PageBackward)),
        Key::Insert => return Ok(Action::Insert(InsertEntry::BeforeDot)),
        Key::Delete => return Ok(Action::DeleteChar { before: false }),
        Key::Function(_) => return Err(ParseOutcome::Invalid),
        other => return parse_motion(other, rest).map(Action::Move),
    };

    if let Some(operator) = Operator::from_key(byte) {
        return parse_operator(operator, rest);
    }

    let action = match byte {
        b'i' => Action::Insert(InsertEntry::BeforeDot),
        b'a' => Action::Insert(InsertEntry::AfterDot),
        b'A' => Action::Insert(InsertEntry::LineEnd),
        b'I' => Action::Insert(InsertEntry::FirstNonBlank),
        b'o' => Action::Insert(InsertEntry::OpenBelow),
        b'O' => Action::Insert(InsertEntry::OpenAbove),
        b'R' => Action::ReplaceMode,
        b'r' => Action::ReplaceChar(argument(rest)?),
        b'p' => Action::Put { before: false },
        b'P' => Action::Put { before: true },
        b'x' => Action::DeleteChar { before: false },
        b'X' => Action::DeleteChar { before: true },
        b'J' => Action::Join,
        b'~' => Action::ToggleCase,
        b'.' => Action::RepeatChange,
        b'U' => Action::RestoreLine,
        b'm' => {
            let mark = argument(rest)?;
            if !mark.is_ascii_alphabetic() {
                return Err(ParseOutcome::Invalid);
            }
            Action::SetMark(mark.to_ascii_lowercase())
        }
        b':' | b'/' | b'?' => Action::Prompt(byte),
        b'D' => shorthand(Operator::Delete, OperatorTarget::Motion(Motion::LineEnd)),
        b'C' => shorthand(Operator::Change, OperatorTarget::Motion(Motion::LineEnd)),
        b's' => shorthand(Operator::Change, OperatorTarget::Motion(Motion::Right)),
        b'S' => shorthand(Operator::Change, OperatorTarget::Lines),
        b'Y' => shorthand(Operator::Yank, OperatorTarget::Lines),
        b'Z' => match argument(rest)? {
            b'Z' => Action::WriteQuit,
            _ => return Err(ParseOutcome::Invalid),
        },
        ESC => Action::Escape,
        b if b == ctrl(b'c') => Action::Interrupt,
        b if b == ctrl(b'f') => Action::Scroll(Scroll::PageForward),
        b if b == ctrl(b'b') => Action::Scroll(Scroll::PageBackward),
        b if b == ctrl(b'd') => Action::Scroll(Scroll::HalfDown),
        b if b == ctrl(b'u') => Action::Scroll(Scroll::HalfUp),
        b if b == ctrl(b'e') => Action::Scroll(Scroll::LineDown),
        b if b == ctrl(b'y') => Action::Scroll(Scroll::LineUp),
        b if b == ctrl(b'l') || b == ctrl(b'r') => Action::Redraw,
        b if b == ctrl(b'g') => Action::FileInfo,
        _ => return parse_motion(key, rest).map(Action::Move),
    };
    Ok(action)
}

fn shorthand(operator: Operator, target: OperatorTarget) -> Action {
    Action::Operate {
        operator,
        target,
        motion_count: None,
    }
}

fn parse_operator(operator: Operator, rest: &[Key]) -> Result<Action, ParseOutcome> {
    let (motion_count, i) = parse_count(rest, 0);
    let Some(&key) = rest.get(i) else {
        return Err(ParseOutcome::Incomplete);
    };

    let target = if key == Key::Byte(operator.key()) {
        OperatorTarget::Lines
    } else {
        OperatorTarget::Motion(parse_motion(key, &rest[i + 1..])?)
    };
    Ok(Action::Operate {
        operator,
        target,
        motion_count,
    })
}

/// The single argument key of `r`, `m`, `f`, `'` and friends
fn argument(rest: &[Key]) -> Result<u8, ParseOutcome> {
    match rest.first() {
        None => Err(ParseOutcome::Incomplete),
        Some(Key::Byte(ESC)) => Err(ParseOutcome::Invalid),
        Some(Key::Byte(byte)) => Ok(*byte),
        Some(_) => Err(ParseOutcome::Invalid),
    }
}

fn mark_argument(rest: &[Key]) -> Result<u8, ParseOutcome> {
    let mark = argument(rest)?;
    match mark {
        b'\'' | b'`' => Ok(b'\''),
        m if m.is_ascii_alphabetic() => Ok(m.to_ascii_lowercase()),
        _ => Err(ParseOutcome::Invalid),
    }
}

fn parse_motion(key: Key, rest: &[Key]) -> Result<Motion, ParseOutcome> {
    let byte = match key {
        Key::Byte(byte) => byte,
        Key::Up => return Ok(Motion::Up),
        Key::Down => return Ok(Motion::Down),
        Key::Left => return Ok(Motion::Left),
        Key::Right => return Ok(Motion::Right),
        Key::Home => return Ok(Motion::LineStart),
        Key::End => return Ok(Motion::LineEnd),
        _ => return Err(ParseOutcome::Invalid),
    };

    let motion = match byte {
        b'h' | BACKSPACE | DEL => Motion::Left,
        b'l' | b' ' => Motion::Right,
        b'j' | LF => Motion::Down,
        b'k' => Motion::Up,
        b if b == ctrl(b'n') => Motion::Down,
        b if b == ctrl(b'p') => Motion::Up,
        b'0' => Motion::LineStart,
        b'$' => Motion::LineEnd,
        b'^' => Motion::FirstNonBlank,
        b'+' | CR => Motion::NextLine,
        b'-' => Motion::PrevLine,
        b'|' => Motion::Column,
        b'w' => Motion::WordForward { big: false },
        b'W' => Motion::WordForward { big: true },
        b'b' => Motion::WordBackward { big: false },
        b'B' => Motion::WordBackward { big: true },
        b'e' => Motion::WordEnd { big: false },
        b'E' => Motion::WordEnd { big: true },
        b'f' | b'F' | b't' | b'T' => Motion::FindChar {
            byte: argument(rest)?,
            forward: byte.is_ascii_lowercase(),
            till: byte.eq_ignore_ascii_case(&b't'),
        },
        b';' => Motion::RepeatFind { reverse: false },
        b',' => Motion::RepeatFind { reverse: true },
        b'G' => Motion::GotoLine,
        b'H' => Motion::ScreenTop,
        b'M' => Motion::ScreenMiddle,
        b'L' => Motion::ScreenBottom,
        b'%' => Motion::MatchBracket,
        b'}' => Motion::ParagraphForward,
        b'{' => Motion::ParagraphBackward,
        b'\'' => Motion::MarkLine(mark_argument(rest)?),
        b'`' => Motion::MarkExact(mark_argument(rest)?),
        b'n' => Motion::SearchNext { reverse: false },
        b'N' => Motion::SearchNext { reverse: true },
        _ => return Err(ParseOutcome::Invalid),
    };
    Ok(motion)
}
