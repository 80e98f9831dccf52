//! # Line Addresses
//!
//! Parses the address prefix of a line command:
//!
//! ```text
//! address := base? (('+' | '-') number?)*
//! base    := number | '.' | '$' | "'" mark | '/' pattern '/' | '?' pattern '?'
//! range   := '%' | address ((',' | ';') address)?
//! ```
//!
//! Line numbers are one-based. A range with no address defaults to the
//! current line.

use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::Direction;
use crate::editor::models::{MarkName, RegisterMarkStore, TextBuffer};
use crate::editor::services::{SearchEngine, SearchScope};

/// Resolved line range of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
    /// How many addresses were typed (0, 1 or 2)
    pub addresses: usize,
}

impl LineRange {
    pub fn is_given(&self) -> bool {
        self.addresses > 0
    }
}

/// Everything an address may refer to
pub struct AddressResolver<'a> {
    pub buffer: &'a TextBuffer,
    pub dot: usize,
    pub marks: &'a RegisterMarkStore,
    pub search: &'a mut SearchEngine,
    /// Last search pattern; `//` reuses it and a new pattern replaces it
    pub last_pattern: &'a mut Option<String>,
}

impl AddressResolver<'_> {
    /// Parse the addresses at the start of `input`, returning the range and
    /// the rest of the command
    pub fn parse_range<'i>(&mut self, input: &'i str) -> EditorResult<(LineRange, &'i str)> {
        let current = self.buffer.line_number(self.dot);
        let input = input.trim_start();

        if let Some(rest) = input.strip_prefix('%') {
            let range = LineRange {
                first: 1,
                last: self.last_line(),
                addresses: 2,
            };
            return Ok((range, rest));
        }

        let (first, mut rest) = self.parse_address(input)?;
        let Some(first) = first else {
            let range = LineRange {
                first: current,
                last: current,
                addresses: 0,
            };
            return Ok((range, rest));
        };

        let trimmed = rest.trim_start();
        let second = if let Some(after) = trimmed.strip_prefix([',', ';']) {
            let (second, after) = self.parse_address(after)?;
            rest = after;
            Some(second.unwrap_or(current))
        } else {
            None
        };

        let range = match second {
            Some(second) => LineRange {
                first: first.min(second),
                last: first.max(second),
                addresses: 2,
            },
            None => LineRange {
                first,
                last: first,
                addresses: 1,
            },
        };
        Ok((range, rest))
    }

    fn last_line(&self) -> usize {
        self.buffer.total_lines()
    }

    /// One address; `None` when `input` does not start with one
    fn parse_address<'i>(&mut self, input: &'i str) -> EditorResult<(Option<usize>, &'i str)> {
        let input = input.trim_start();
        let current = self.buffer.line_number(self.dot);

        let (base, mut rest) = match input.chars().next() {
            Some(c) if c.is_ascii_digit() => {
                let digits = input.len() - input.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                let number = input[..digits]
                    .parse::<usize>()
                    .map_err(|_| EditorError::BadAddress(input.to_string()))?;
                (Some(number), &input[digits..])
            }
            Some('.') => (Some(current), &input[1..]),
            Some('$') => (Some(self.last_line()), &input[1..]),
            Some('\'') => {
                let mut chars = input[1..].chars();
                let mark = chars
                    .next()
                    .ok_or_else(|| EditorError::BadAddress(input.to_string()))?;
                let name = match mark {
                    '\'' => MarkName::PreviousContext,
                    c if c.is_ascii_alphabetic() => MarkName::Named(c.to_ascii_lowercase() as u8),
                    _ => return Err(EditorError::BadAddress(input.to_string())),
                };
                let pos = self
                    .marks
                    .get_mark(name, self.buffer)
                    .ok_or(EditorError::MarkNotSet)?;
                (Some(self.buffer.line_number(pos)), chars.as_str())
            }
            Some(delimiter @ ('/' | '?')) => {
                let (pattern, rest) = split_pattern(&input[1..], delimiter);
                let direction = if delimiter == '/' {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                (Some(self.search_line(&pattern, direction)?), rest)
            }
            Some('+' | '-') => (Some(current), input),
            _ => (None, input),
        };

        let Some(mut line) = base else {
            return Ok((None, rest));
        };

        loop {
            let sign = match rest.chars().next() {
                Some('+') => 1isize,
                Some('-') => -1isize,
                _ => break,
            };
            rest = &rest[1..];
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let amount = if digits == 0 {
                1
            } else {
                rest[..digits]
                    .parse::<usize>()
                    .map_err(|_| EditorError::BadAddress(input.to_string()))?
            };
            rest = &rest[digits..];
            line = if sign > 0 {
                line.saturating_add(amount)
            } else {
                line.checked_sub(amount)
                    .ok_or_else(|| EditorError::BadAddress(input.to_string()))?
            };
        }

        Ok((Some(line.min(self.last_line())), rest))
    }

    fn search_line(&mut self, pattern: &str, direction: Direction) -> EditorResult<usize> {
        let pattern = if pattern.is_empty() {
            self.last_pattern
                .clone()
                .ok_or(EditorError::NoPreviousPattern)?
        } else {
            *self.last_pattern = Some(pattern.to_string());
            pattern.to_string()
        };

        let start = match direction {
            Direction::Forward => self.buffer.line_end(self.dot) + 1,
            Direction::Backward => self.buffer.line_start(self.dot).saturating_sub(1),
        };
        let hit = self
            .search
            .find(self.buffer, start, &pattern, direction, SearchScope::Full)?
            .ok_or_else(|| EditorError::PatternNotFound(pattern.clone()))?;
        Ok(self.buffer.line_number(hit.position))
    }
}

/// Split `input` at the first unescaped `delimiter`; `\delimiter` becomes the
/// delimiter itself and other escapes are kept for the regex engine
pub fn split_pattern(input: &str, delimiter: char) -> (String, &str) {
    let mut pattern = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            return (pattern, &input[i + c.len_utf8()..]);
        }
        if c == '\\' {
            match chars.next() {
                Some((_, next)) if next == delimiter => pattern.push(next),
                Some((_, next)) => {
                    pattern.push('\\');
                    pattern.push(next);
                }
                None => pattern.push('\\'),
            }
            continue;
        }
        pattern.push(c);
    }
    (pattern, "")
}
