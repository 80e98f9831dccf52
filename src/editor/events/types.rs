//! # Core Event Types
//!
//! Small value types shared by the interpreter, search and renderer.

/// Editor mode (vi-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Command,
    Insert,
    Replace,
}

impl Mode {
    pub fn is_text_entry(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }
}

/// Direction of a search or scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// What the host should redraw after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderRequest {
    /// Nothing visible changed
    None,
    /// Resynchronise by diffing against the believed screen
    Refresh,
    /// Repaint every row (after a shell escape, `^L`, a resize)
    FullRedraw,
}

/// Inclusive range of buffer positions produced by a motion or an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: usize,
    pub end: usize,
    /// Whole lines, including the final newline
    pub linewise: bool,
}

impl AddressRange {
    pub fn new(start: usize, end: usize, linewise: bool) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            linewise,
        }
    }

    /// Bytes covered; never zero since both ends are included
    pub fn byte_count(&self) -> usize {
        self.end - self.start + 1
    }
}
