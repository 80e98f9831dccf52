//! # Registers and Marks
//!
//! Twenty-eight register slots (`a`-`z`, the default yank/delete register and
//! the undo register holding the pre-edit copy of the cursor line) and
//! twenty-eight mark slots (`a`-`z` plus the current and previous editing
//! contexts).
//!
//! Registers own their bytes and never point back into the buffer. Marks are
//! buffer offsets; the session reports every insert and delete so they can be
//! shifted, and marks inside a deleted span are dropped.

use crate::editor::error::{EditorError, EditorResult};
use crate::editor::models::TextBuffer;

/// Number of register slots and of mark slots
pub const SLOT_COUNT: usize = 28;

/// Register identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterName {
    /// `a`-`z`, stored as the lowercase byte
    Named(u8),
    /// Register used when no name is given
    Default,
    /// Original text of the line under the cursor, for `U`
    Undo,
}

impl RegisterName {
    /// Register named by the key after `"`; uppercase names the same slot
    pub fn from_key(key: u8) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        lower.is_ascii_lowercase().then_some(Self::Named(lower))
    }

    fn slot(self) -> usize {
        match self {
            Self::Named(byte) => usize::from(byte - b'a'),
            Self::Default => 26,
            Self::Undo => 27,
        }
    }

    /// Character shown in status messages
    pub fn as_char(self) -> char {
        match self {
            Self::Named(byte) => char::from(byte),
            Self::Default => '"',
            Self::Undo => 'U',
        }
    }
}

/// Mark identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkName {
    Named(u8),
    CurrentContext,
    PreviousContext,
}

impl MarkName {
    /// Mark named by the key after `m`, `'` or `` ` ``
    pub fn from_key(key: u8) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        lower.is_ascii_lowercase().then_some(Self::Named(lower))
    }

    fn slot(self) -> usize {
        match self {
            Self::Named(byte) => usize::from(byte - b'a'),
            Self::CurrentContext => 26,
            Self::PreviousContext => 27,
        }
    }
}

/// Where and what a put operation will insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutPlan {
    /// Insertion position
    pub position: usize,
    /// Bytes to insert
    pub text: Vec<u8>,
    /// Whole-line content (inserted as new lines)
    pub linewise: bool,
}

/// Register and mark slots for one session
#[derive(Debug, Clone)]
pub struct RegisterMarkStore {
    registers: Vec<Option<Vec<u8>>>,
    marks: [Option<usize>; SLOT_COUNT],
}

impl RegisterMarkStore {
    pub fn new() -> Self {
        Self {
            registers: vec![None; SLOT_COUNT],
            marks: [None; SLOT_COUNT],
        }
    }

    // === Registers ===

    /// Copy the inclusive range `[lo, hi]` into `register`
    pub fn yank(&mut self, buffer: &TextBuffer, lo: usize, hi: usize, register: RegisterName) -> usize {
        let text = buffer.text_range(lo, hi).to_vec();
        let len = text.len();
        tracing::debug!("Yanking {} bytes into register {}", len, register.as_char());
        self.registers[register.slot()] = Some(text);
        len
    }

    /// Overwrite a register with owned text
    pub fn set_register(&mut self, register: RegisterName, text: Vec<u8>) {
        self.registers[register.slot()] = Some(text);
    }

    /// Contents of a register, if it holds anything
    pub fn register(&self, register: RegisterName) -> Option<&[u8]> {
        self.registers[register.slot()]
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Work out where the contents of `register` go relative to `at`
    ///
    /// Content with an internal newline is whole-line content and lands before
    /// the current line (`before`) or after it; anything else is inserted at
    /// `at` (`before`) or just after it.
    pub fn plan_put(
        &self,
        register: RegisterName,
        buffer: &TextBuffer,
        at: usize,
        before: bool,
    ) -> EditorResult<PutPlan> {
        let text = self
            .register(register)
            .ok_or(EditorError::EmptyRegister(register.as_char()))?
            .to_vec();
        let linewise = text.contains(&b'\n');

        let position = if linewise {
            if before {
                buffer.line_start(at)
            } else {
                match buffer.next_line(at) {
                    Some(next) => next,
                    None => buffer.len(),
                }
            }
        } else if before || buffer.byte_at(at) == Some(b'\n') {
            at
        } else {
            (at + 1).min(buffer.len())
        };

        Ok(PutPlan {
            position,
            text,
            linewise,
        })
    }

    // === Marks ===

    pub fn set_mark(&mut self, mark: MarkName, pos: usize) {
        self.marks[mark.slot()] = Some(pos);
    }

    /// Position of a mark, if it is set and still inside the buffer
    pub fn get_mark(&self, mark: MarkName, buffer: &TextBuffer) -> Option<usize> {
        self.marks[mark.slot()].filter(|&pos| pos < buffer.len())
    }

    /// Shift marks after an insert of `count` bytes at `pos`
    pub fn note_insert(&mut self, pos: usize, count: usize) {
        for mark in self.marks.iter_mut().flatten() {
            if *mark >= pos {
                *mark += count;
            }
        }
    }

    /// Shift marks after the inclusive range `[lo, hi]` was deleted
    pub fn note_delete(&mut self, lo: usize, hi: usize) {
        let removed = hi - lo + 1;
        for slot in self.marks.iter_mut() {
            *slot = match *slot {
                Some(pos) if pos > hi => Some(pos - removed),
                Some(pos) if pos >= lo => None,
                other => other,
            };
        }
    }

    /// Record a new editing context when `dot` lies outside the current one
    ///
    /// The current context covers two lines either side of the position where
    /// the last context was recorded. Returns whether a new context started.
    pub fn update_context(&mut self, buffer: &TextBuffer, dot: usize) -> bool {
        if let Some(current) = self.get_mark(MarkName::CurrentContext, buffer) {
            let (start, end) = context_window(buffer, current);
            if (start..=end).contains(&dot) {
                return false;
            }
        }
        self.marks[MarkName::PreviousContext.slot()] = self.marks[MarkName::CurrentContext.slot()];
        self.marks[MarkName::CurrentContext.slot()] = Some(dot);
        true
    }

    /// Swap `dot` with the previous context, returning the position to jump to
    pub fn swap_context(&mut self, buffer: &TextBuffer, dot: usize) -> Option<usize> {
        let previous = self.get_mark(MarkName::PreviousContext, buffer)?;
        self.marks[MarkName::PreviousContext.slot()] = Some(dot);
        self.marks[MarkName::CurrentContext.slot()] = Some(previous);
        Some(previous)
    }

    /// Forget all marks (a new file was loaded)
    pub fn clear_marks(&mut self) {
        self.marks = [None; SLOT_COUNT];
    }
}

impl Default for RegisterMarkStore {
    fn default() -> Self {
        Self::new()
    }
}

fn context_window(buffer: &TextBuffer, pos: usize) -> (usize, usize) {
    let mut start = buffer.line_start(pos);
    for _ in 0..2 {
        if let Some(prev) = buffer.prev_line(start) {
            start = prev;
        }
    }
    let mut end = pos;
    for _ in 0..2 {
        if let Some(next) = buffer.next_line(end) {
            end = next;
        }
    }
    (start, buffer.line_end(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_bytes(text.as_bytes().to_vec())
    }

    #[test]
    fn register_names_should_fold_case() {
        assert_eq!(RegisterName::from_key(b'q'), Some(RegisterName::Named(b'q')));
        assert_eq!(RegisterName::from_key(b'Q'), Some(RegisterName::Named(b'q')));
        assert_eq!(RegisterName::from_key(b'1'), None);
    }

    #[test]
    fn yank_should_copy_independently_of_buffer() {
        let mut buf = buffer("hello world\n");
        let mut store = RegisterMarkStore::new();
        store.yank(&buf, 0, 4, RegisterName::Named(b'a'));
        buf.delete_range(0, 5);
        assert_eq!(store.register(RegisterName::Named(b'a')), Some(&b"hello"[..]));
        assert_eq!(store.register(RegisterName::Default), None);
    }

    #[test]
    fn plan_put_should_place_line_content_around_current_line() {
        let buf = buffer("one\ntwo\n");
        let mut store = RegisterMarkStore::new();
        store.set_register(RegisterName::Default, b"new\n".to_vec());

        let after = store.plan_put(RegisterName::Default, &buf, 1, false).unwrap();
        assert_eq!(after.position, 4);
        assert!(after.linewise);

        let before = store.plan_put(RegisterName::Default, &buf, 5, true).unwrap();
        assert_eq!(before.position, 4);

        let at_end = store.plan_put(RegisterName::Default, &buf, 5, false).unwrap();
        assert_eq!(at_end.position, 8);
    }

    #[test]
    fn plan_put_should_place_char_content_after_cursor() {
        let buf = buffer("abc\n");
        let mut store = RegisterMarkStore::new();
        store.set_register(RegisterName::Default, b"XY".to_vec());

        let after = store.plan_put(RegisterName::Default, &buf, 1, false).unwrap();
        assert_eq!(after.position, 2);
        assert!(!after.linewise);
        let before = store.plan_put(RegisterName::Default, &buf, 1, true).unwrap();
        assert_eq!(before.position, 1);
    }

    #[test]
    fn plan_put_from_empty_register_should_fail() {
        let buf = buffer("abc\n");
        let store = RegisterMarkStore::new();
        let err = store
            .plan_put(RegisterName::Named(b'z'), &buf, 0, false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Nothing in register z");
    }

    #[test]
    fn marks_should_shift_on_edits_before_them() {
        let mut store = RegisterMarkStore::new();
        let a = MarkName::Named(b'a');
        store.set_mark(a, 10);
        store.note_insert(3, 2);
        assert_eq!(store.marks[a.slot()], Some(12));
        store.note_delete(0, 5);
        assert_eq!(store.marks[a.slot()], Some(6));
        store.note_insert(7, 4);
        assert_eq!(store.marks[a.slot()], Some(6));
    }

    #[test]
    fn marks_inside_deleted_range_should_be_invalidated() {
        let buf = buffer("a\nb\nc\nd\ne\n");
        let mut store = RegisterMarkStore::new();
        let a = MarkName::Named(b'a');
        store.set_mark(a, 5);
        store.note_delete(4, 7);
        assert_eq!(store.get_mark(a, &buf), None);
    }

    #[test]
    fn marks_past_buffer_end_should_not_resolve() {
        let buf = buffer("ab\n");
        let mut store = RegisterMarkStore::new();
        store.set_mark(MarkName::Named(b'x'), 40);
        assert_eq!(store.get_mark(MarkName::Named(b'x'), &buf), None);
    }

    #[test]
    fn context_should_only_move_outside_current_window() {
        let text = "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n";
        let buf = buffer(text);
        let mut store = RegisterMarkStore::new();

        assert!(store.update_context(&buf, 8));
        // Offset 8 is line "4"; its window runs from line "2" to line "6".
        assert!(!store.update_context(&buf, 12));
        assert!(!store.update_context(&buf, 4));
        assert!(store.update_context(&buf, 18));
        assert_eq!(store.get_mark(MarkName::PreviousContext, &buf), Some(8));
        assert_eq!(store.get_mark(MarkName::CurrentContext, &buf), Some(18));
    }

    #[test]
    fn swap_context_should_exchange_positions() {
        let buf = buffer("0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n");
        let mut store = RegisterMarkStore::new();
        store.update_context(&buf, 0);
        store.update_context(&buf, 16);

        assert_eq!(store.swap_context(&buf, 17), Some(0));
        assert_eq!(store.get_mark(MarkName::PreviousContext, &buf), Some(17));
        assert_eq!(store.swap_context(&buf, 0), Some(17));
    }
}
