//! # Motions
//!
//! Classification of motions for operators, and the pure position
//! arithmetic behind the word, character-find, column and paragraph motions.
//! Everything here works on a [`TextBuffer`] and returns new positions; the
//! session decides what to do with them.

use crate::editor::commands::parser::Motion;
use crate::editor::models::TextBuffer;

/// How an operator interprets the range a motion covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// Whole lines from the first to the last line touched
    Linewise,
    /// Characters between the two positions
    Charwise,
    /// Characters, with the word rules for trailing boundaries
    Word,
}

impl Motion {
    pub fn kind(&self) -> MotionKind {
        match self {
            Motion::Up
            | Motion::Down
            | Motion::NextLine
            | Motion::PrevLine
            | Motion::GotoLine
            | Motion::ScreenTop
            | Motion::ScreenMiddle
            | Motion::ScreenBottom
            | Motion::MatchBracket
            | Motion::ParagraphForward
            | Motion::ParagraphBackward
            | Motion::MarkLine(_) => MotionKind::Linewise,
            Motion::WordForward { .. } | Motion::WordBackward { .. } | Motion::WordEnd { .. } => {
                MotionKind::Word
            }
            _ => MotionKind::Charwise,
        }
    }

    /// Whether a charwise range includes the character the motion lands on
    pub fn is_inclusive(&self) -> bool {
        matches!(
            self,
            Motion::LineEnd
                | Motion::FindChar { .. }
                | Motion::RepeatFind { .. }
                | Motion::WordEnd { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn class(byte: u8, big: bool) -> CharClass {
    match byte {
        b' ' | b'\t' | b'\n' => CharClass::Blank,
        _ if big => CharClass::Word,
        b if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 => CharClass::Word,
        _ => CharClass::Punct,
    }
}

/// An empty line counts as a word of its own
fn is_empty_line_at(text: &[u8], pos: usize) -> bool {
    text.get(pos) == Some(&b'\n') && (pos == 0 || text[pos - 1] == b'\n')
}

/// Start of the next word after `pos`
pub fn word_forward(buffer: &TextBuffer, pos: usize, big: bool) -> usize {
    let text = buffer.as_bytes();
    let last = text.len().saturating_sub(1);
    let mut p = pos.min(last);

    let start_class = class(text[p], big);
    if start_class != CharClass::Blank {
        while p < last && class(text[p], big) == start_class {
            p += 1;
        }
    }
    while p < last && class(text[p], big) == CharClass::Blank {
        if text[p] == b'\n' && is_empty_line_at(text, p + 1) {
            return p + 1;
        }
        p += 1;
    }
    p
}

/// Start of the word before `pos` (or of the word `pos` is inside)
pub fn word_backward(buffer: &TextBuffer, pos: usize, big: bool) -> usize {
    let text = buffer.as_bytes();
    let mut p = pos.min(text.len().saturating_sub(1));
    if p == 0 {
        return 0;
    }
    p -= 1;

    while p > 0 && class(text[p], big) == CharClass::Blank {
        if is_empty_line_at(text, p) {
            return p;
        }
        p -= 1;
    }
    let word_class = class(text[p], big);
    if word_class == CharClass::Blank {
        return p;
    }
    while p > 0 && class(text[p - 1], big) == word_class {
        p -= 1;
    }
    p
}

/// Last character of the word at or after `pos + 1`
pub fn word_end(buffer: &TextBuffer, pos: usize, big: bool) -> usize {
    let text = buffer.as_bytes();
    let last = text.len().saturating_sub(1);
    let mut p = pos.min(last);
    if p >= last {
        return p;
    }
    p += 1;

    while p < last && class(text[p], big) == CharClass::Blank {
        p += 1;
    }
    let word_class = class(text[p], big);
    if word_class == CharClass::Blank {
        return p;
    }
    while p < last && class(text[p + 1], big) == word_class {
        p += 1;
    }
    p
}

/// Last character of the word `pos` is in (`pos` itself on a blank)
pub fn current_word_end(buffer: &TextBuffer, pos: usize, big: bool) -> usize {
    let text = buffer.as_bytes();
    let last = text.len().saturating_sub(1);
    let mut p = pos.min(last);
    let word_class = class(text[p], big);
    if word_class == CharClass::Blank {
        return p;
    }
    while p < last && class(text[p + 1], big) == word_class {
        p += 1;
    }
    p
}

/// `f F t T` on the current line: position of the `count`th `byte`, or just
/// before/after it for `till`
pub fn find_char(
    buffer: &TextBuffer,
    pos: usize,
    byte: u8,
    forward: bool,
    till: bool,
    count: usize,
) -> Option<usize> {
    let text = buffer.as_bytes();
    let start = buffer.line_start(pos);
    let end = buffer.line_end(pos);
    let mut p = pos;

    for n in 0..count.max(1) {
        // A repeated `t` must not stop on the character it already reached.
        let skip = if till && n == 0 { 1 } else { 0 };
        p = if forward {
            let from = p + 1 + skip;
            (from..end).find(|&i| text[i] == byte)?
        } else {
            let to = p.checked_sub(skip)?;
            (start..to).rev().find(|&i| text[i] == byte)?
        };
    }

    match (till, forward) {
        (false, _) => Some(p),
        (true, true) => Some(p - 1),
        (true, false) => Some(p + 1),
    }
}

/// `|`: the `column`th character of the line, clamped to its last character
pub fn column_position(buffer: &TextBuffer, pos: usize, column: usize) -> usize {
    let start = buffer.line_start(pos);
    (start + column.saturating_sub(1)).min(buffer.line_last_char(pos))
}

/// Position on the line starting at `line` whose display column is closest
/// to `column` without passing it
pub fn position_for_column(buffer: &TextBuffer, line: usize, column: usize, tabstop: usize) -> usize {
    let text = buffer.as_bytes();
    let last = buffer.line_last_char(line);
    let mut col = 0;
    let mut p = buffer.line_start(line);
    while p < last {
        let width = match text[p] {
            b'\t' => tabstop - col % tabstop,
            0x00..=0x1f | 0x7f => 2,
            _ => 1,
        };
        if col + width > column {
            break;
        }
        col += width;
        p += 1;
    }
    p
}

/// `}`: the next empty line after the current paragraph
pub fn paragraph_forward(buffer: &TextBuffer, pos: usize) -> Option<usize> {
    let text = buffer.as_bytes();
    let mut p = buffer.line_start(pos);
    while is_empty_line_at(text, p) {
        p = buffer.next_line(p)?;
    }
    (p..text.len().saturating_sub(1))
        .find(|&i| text[i] == b'\n' && text[i + 1] == b'\n')
        .map(|i| i + 1)
}

/// `{`: the previous empty line before the current paragraph
pub fn paragraph_backward(buffer: &TextBuffer, pos: usize) -> Option<usize> {
    let text = buffer.as_bytes();
    let mut p = buffer.line_start(pos);
    while is_empty_line_at(text, p) {
        p = buffer.prev_line(p)?;
    }
    (1..p).rev().find(|&i| is_empty_line_at(text, i))
}
