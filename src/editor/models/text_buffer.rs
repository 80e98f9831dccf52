//! # Text Buffer Model
//!
//! A single growable byte sequence with `\n` line separators and the logical
//! cursor ("dot"). All positions are byte offsets, so growing the storage never
//! invalidates them; edits report what moved so that the session can shift the
//! offsets it keeps elsewhere (marks, screen-top).
//!
//! The buffer is never empty: a fresh buffer holds a single `\n`, and deleting
//! everything puts that dummy line back.

use crate::editor::error::{EditorError, EditorResult};

/// Text storage plus cursor for one editing session
#[derive(Debug, Clone, PartialEq)]
pub struct TextBuffer {
    text: Vec<u8>,
    dot: usize,
    modified: bool,
}

impl TextBuffer {
    /// Create a buffer holding one empty line
    pub fn new() -> Self {
        Self {
            text: vec![b'\n'],
            dot: 0,
            modified: false,
        }
    }

    /// Create a buffer from loaded content, preserving it byte for byte
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::new();
        }
        Self {
            text: bytes,
            dot: 0,
            modified: false,
        }
    }

    /// Replace the whole content (used by `:edit`)
    pub fn replace_all(&mut self, bytes: Vec<u8>) {
        *self = Self::from_bytes(bytes);
    }

    /// One past the last valid position
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false: the buffer keeps at least one line terminator
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the buffer holds nothing but the dummy line
    pub fn is_blank(&self) -> bool {
        self.text == b"\n"
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.get(pos).copied()
    }

    /// Bytes in the inclusive range `[lo, hi]`, clamped to the buffer
    pub fn text_range(&self, lo: usize, hi: usize) -> &[u8] {
        if self.text.is_empty() || lo > hi {
            return &[];
        }
        let hi = hi.min(self.text.len() - 1);
        if lo > hi {
            return &[];
        }
        &self.text[lo..=hi]
    }

    // === Cursor ===

    pub fn dot(&self) -> usize {
        self.dot
    }

    /// Move the cursor, clamping into `[0, len]`
    pub fn set_dot(&mut self, pos: usize) {
        self.dot = pos.min(self.text.len());
    }

    // === Modification state ===

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    // === Editing ===

    /// Open a one-byte hole at `pos` and fill it, returning the position after it
    pub fn insert(&mut self, pos: usize, byte: u8) -> EditorResult<usize> {
        self.insert_bytes(pos, &[byte])
    }

    /// Insert `bytes` at `pos`, returning the position after the inserted text
    ///
    /// Either the whole insert happens or the buffer is left untouched.
    pub fn insert_bytes(&mut self, pos: usize, bytes: &[u8]) -> EditorResult<usize> {
        let pos = pos.min(self.text.len());
        if bytes.is_empty() {
            return Ok(pos);
        }
        self.text
            .try_reserve(bytes.len())
            .map_err(|_| EditorError::OutOfMemory)?;
        self.text.splice(pos..pos, bytes.iter().copied());
        if self.dot >= pos {
            self.dot += bytes.len();
        }
        self.modified = true;
        Ok(pos + bytes.len())
    }

    /// Remove the inclusive range `[lo, hi]`, returning `lo` clamped into the buffer
    pub fn delete_range(&mut self, lo: usize, hi: usize) -> usize {
        let len = self.text.len();
        if lo >= len || lo > hi {
            return lo.min(len.saturating_sub(1));
        }
        let hi = hi.min(len - 1);
        let removed = hi - lo + 1;
        self.text.drain(lo..=hi);

        if self.dot > hi {
            self.dot -= removed;
        } else if self.dot >= lo {
            self.dot = lo;
        }

        if self.text.is_empty() {
            self.text.push(b'\n');
            self.dot = 0;
        }
        self.dot = self.dot.min(self.text.len());
        self.modified = true;
        lo.min(self.text.len() - 1)
    }

    /// Overwrite one byte in place
    pub fn replace_byte(&mut self, pos: usize, byte: u8) -> bool {
        match self.text.get_mut(pos) {
            Some(slot) => {
                *slot = byte;
                self.modified = true;
                true
            }
            None => false,
        }
    }

    // === Line navigation ===

    /// First position of the line containing `pos`
    pub fn line_start(&self, pos: usize) -> usize {
        let mut p = pos.min(self.text.len());
        while p > 0 && self.text[p - 1] != b'\n' {
            p -= 1;
        }
        p
    }

    /// Position of the newline ending the line containing `pos`, or `len` when
    /// the last line is unterminated
    pub fn line_end(&self, pos: usize) -> usize {
        let start = pos.min(self.text.len());
        self.text[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.text.len(), |i| start + i)
    }

    /// Last position a Command-mode cursor may rest on in this line
    pub fn line_last_char(&self, pos: usize) -> usize {
        let start = self.line_start(pos);
        let end = self.line_end(pos);
        if end > start {
            end - 1
        } else {
            start
        }
    }

    /// Start of the line after the one containing `pos`
    pub fn next_line(&self, pos: usize) -> Option<usize> {
        let next = self.line_end(pos) + 1;
        (next < self.text.len()).then_some(next)
    }

    /// Start of the line before the one containing `pos`
    pub fn prev_line(&self, pos: usize) -> Option<usize> {
        let start = self.line_start(pos);
        (start > 0).then(|| self.line_start(start - 1))
    }

    /// Number of newlines in `[a, b)`; callers pass `a <= b`
    pub fn count_lines(&self, a: usize, b: usize) -> usize {
        let (lo, hi) = (a.min(b), a.max(b).min(self.text.len()));
        if lo >= hi {
            return 0;
        }
        self.text[lo..hi].iter().filter(|&&b| b == b'\n').count()
    }

    /// Total number of lines, counting an unterminated last line
    pub fn total_lines(&self) -> usize {
        let newlines = self.count_lines(0, self.text.len());
        if self.text.last() == Some(&b'\n') {
            newlines
        } else {
            newlines + 1
        }
    }

    /// One-based line number of `pos`
    pub fn line_number(&self, pos: usize) -> usize {
        self.count_lines(0, self.line_start(pos)) + 1
    }

    /// Start of one-based line `n`, clamped to the last line
    pub fn find_line(&self, n: usize) -> usize {
        let mut pos = 0;
        for _ in 1..n.max(1) {
            match self.next_line(pos) {
                Some(next) => pos = next,
                None => break,
            }
        }
        pos
    }

    /// First non-blank position of the line containing `pos`
    pub fn first_non_blank(&self, pos: usize) -> usize {
        let mut p = self.line_start(pos);
        let end = self.line_end(pos);
        while p < end && matches!(self.text[p], b' ' | b'\t') {
            p += 1;
        }
        p
    }

    /// Leading whitespace of the line containing `pos`
    pub fn indent_of(&self, pos: usize) -> &[u8] {
        let start = self.line_start(pos);
        &self.text[start..self.first_non_blank(pos)]
    }

    /// Whether the line containing `pos` has no characters
    pub fn is_empty_line(&self, pos: usize) -> bool {
        self.line_start(pos) == self.line_end(pos)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
