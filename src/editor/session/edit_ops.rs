//! Buffer edits that keep every other offset in step.
//!
//! All text changes made by commands go through these helpers so marks,
//! screen-top and the undo-line anchor move with the text.

use crate::editor::error::EditorResult;
use crate::editor::events::AddressRange;
use crate::editor::models::RegisterName;
use crate::editor::session::EditorSession;

impl EditorSession {
    /// Insert `bytes` at `pos`, returning the position after them
    pub(crate) fn insert_text(&mut self, pos: usize, bytes: &[u8]) -> EditorResult<usize> {
        let pos = pos.min(self.buffer.len());
        let end = self.buffer.insert_bytes(pos, bytes)?;
        let count = end - pos;
        if count == 0 {
            return Ok(end);
        }
        self.registers.note_insert(pos, count);
        self.renderer.note_insert(pos, count);
        if let Some(anchor) = self.undo_anchor {
            if anchor > pos || (anchor == pos && bytes.contains(&b'\n')) {
                self.undo_anchor = Some(anchor + count);
            }
        }
        Ok(end)
    }

    /// Delete the inclusive range `[lo, hi]`, returning `lo` clamped into the buffer
    pub(crate) fn delete_text(&mut self, lo: usize, hi: usize) -> usize {
        let len = self.buffer.len();
        if lo > hi || lo >= len {
            return lo.min(len.saturating_sub(1));
        }
        let hi = hi.min(len - 1);
        let joins_lines = self.buffer.text_range(lo, hi).contains(&b'\n');

        self.registers.note_delete(lo, hi);
        self.renderer.note_delete(lo, hi);
        self.undo_anchor = match self.undo_anchor {
            Some(anchor) if anchor > hi => Some(anchor - (hi - lo + 1)),
            Some(anchor) if anchor > lo || (anchor == lo && joins_lines) => None,
            other => other,
        };
        self.buffer.delete_range(lo, hi)
    }

    /// Replace the `old_len` bytes at `lo` with `bytes`, returning the position after them
    ///
    /// The new text goes in first so replacing the whole buffer never leaves
    /// the placeholder newline behind.
    pub(crate) fn replace_text(&mut self, lo: usize, old_len: usize, bytes: &[u8]) -> EditorResult<usize> {
        let end = self.insert_text(lo, bytes)?;
        if old_len > 0 {
            self.delete_text(end, end + old_len - 1);
        }
        Ok(end)
    }

    /// Copy a range into `register`; a named register also fills the default one
    pub(crate) fn yank_range(&mut self, range: AddressRange, register: Option<RegisterName>) -> usize {
        let target = register.unwrap_or(RegisterName::Default);
        let len = self
            .registers
            .yank(&self.buffer, range.start, range.end, target);
        if target != RegisterName::Default {
            let text = self.buffer.text_range(range.start, range.end).to_vec();
            self.registers.set_register(RegisterName::Default, text);
        }
        len
    }

    /// Yank then delete a range
    pub(crate) fn delete_into(&mut self, range: AddressRange, register: Option<RegisterName>) -> usize {
        self.yank_range(range, register);
        self.delete_text(range.start, range.end)
    }

    /// Keep the pre-edit text of the cursor line for `U`
    pub(crate) fn save_undo_line(&mut self) {
        let start = self.buffer.line_start(self.buffer.dot());
        if self.undo_anchor == Some(start) {
            return;
        }
        let end = self.line_span_end(start);
        let text = self.buffer.text_range(start, end).to_vec();
        self.registers.set_register(RegisterName::Undo, text);
        self.undo_anchor = Some(start);
    }

    /// Whole lines from the line containing `from` through the line containing `to`
    pub(crate) fn line_range(&self, from: usize, to: usize) -> AddressRange {
        let (lo, hi) = (from.min(to), from.max(to));
        AddressRange::new(self.buffer.line_start(lo), self.line_span_end(hi), true)
    }

    /// Whole lines by one-based number
    pub(crate) fn numbered_line_range(&self, first: usize, last: usize) -> AddressRange {
        let lo = self.buffer.find_line(first);
        let hi = self.buffer.find_line(last);
        self.line_range(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::models::{MarkName, RegisterName};
    use crate::editor::session::EditorSession;

    fn session(text: &str) -> EditorSession {
        EditorSession::open(40, 10, Some(text.as_bytes().to_vec()))
    }

    #[test]
    fn insert_text_should_shift_marks_after_it() {
        let mut session = session("abc\ndef\n");
        session.registers.set_mark(MarkName::Named(b'a'), 5);
        session.insert_text(2, b"XY").unwrap();
        assert_eq!(session.text(), b"abXYc\ndef\n");
        assert_eq!(session.mark(b'a'), Some(7));
    }

    #[test]
    fn delete_text_should_drop_marks_inside_range() {
        let mut session = session("abc\ndef\nghi\n");
        session.registers.set_mark(MarkName::Named(b'a'), 9);
        session.registers.set_mark(MarkName::Named(b'b'), 5);
        session.delete_text(4, 7);
        assert_eq!(session.text(), b"abc\nghi\n");
        assert_eq!(session.mark(b'a'), Some(5));
        assert_eq!(session.mark(b'b'), None);
    }

    #[test]
    fn undo_anchor_should_follow_its_line() {
        let mut session = session("abc\ndef\n");
        session.set_cursor(5);
        session.save_undo_line();
        assert_eq!(session.undo_anchor, Some(4));
        assert_eq!(session.register(RegisterName::Undo), Some(&b"def\n"[..]));

        session.insert_text(0, b"new\n").unwrap();
        assert_eq!(session.undo_anchor, Some(8));
        session.delete_text(0, 3);
        assert_eq!(session.undo_anchor, Some(4));
        session.delete_text(3, 4);
        assert_eq!(session.undo_anchor, None);
    }

    #[test]
    fn named_yank_should_also_fill_default_register() {
        let mut session = session("one two\n");
        let range = crate::editor::events::AddressRange::new(0, 2, false);
        session.yank_range(range, Some(RegisterName::Named(b'q')));
        assert_eq!(session.register(RegisterName::Named(b'q')), Some(&b"one"[..]));
        assert_eq!(session.register(RegisterName::Default), Some(&b"one"[..]));
    }

    #[test]
    fn line_range_should_cover_whole_lines() {
        let session = session("one\ntwo\nthree");
        let range = session.numbered_line_range(2, 3);
        assert_eq!((range.start, range.end), (4, 12));
        assert!(range.linewise);
    }
}
