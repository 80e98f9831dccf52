//! # Search Service
//!
//! Pattern search over the text buffer using `regex::bytes`. Patterns are
//! compiled in multi-line mode so `^` and `$` anchor at line boundaries, and
//! searches run on the whole buffer (or just the current line) with anchors
//! evaluated against the surrounding text rather than the search start.

use regex::bytes::{Regex, RegexBuilder};

use crate::editor::error::EditorResult;
use crate::editor::events::Direction;
use crate::editor::models::TextBuffer;

/// How far a search may look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Only the rest of the current line (before `start` when searching backward)
    Limited,
    /// The whole buffer, wrapping around once
    Full,
}

/// A successful search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub position: usize,
    /// The search ran off one end of the buffer and continued at the other
    pub wrapped: bool,
}

impl SearchHit {
    /// Status message describing the wraparound, if one happened
    pub fn wrap_message(&self, direction: Direction) -> Option<&'static str> {
        if !self.wrapped {
            return None;
        }
        Some(match direction {
            Direction::Forward => "Search hit BOTTOM, continuing at TOP",
            Direction::Backward => "Search hit TOP, continuing at BOTTOM",
        })
    }
}

/// Compiles patterns and finds their occurrences
#[derive(Debug, Default)]
pub struct SearchEngine {
    ignorecase: bool,
    cached: Option<(String, bool, Regex)>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ignorecase(&mut self, ignorecase: bool) {
        self.ignorecase = ignorecase;
    }

    /// Compile `pattern`, reusing the last compiled regex when nothing changed
    pub fn compile(&mut self, pattern: &str) -> EditorResult<Regex> {
        if let Some((cached, ignorecase, regex)) = &self.cached {
            if cached == pattern && *ignorecase == self.ignorecase {
                return Ok(regex.clone());
            }
        }
        let regex = RegexBuilder::new(&translate_pattern(pattern))
            .multi_line(true)
            .case_insensitive(self.ignorecase)
            .build()?;
        self.cached = Some((pattern.to_string(), self.ignorecase, regex.clone()));
        Ok(regex)
    }

    /// Find `pattern` starting at `start` (inclusive) in `direction`
    ///
    /// With [`SearchScope::Full`] a failed search is retried once from the
    /// opposite end of the buffer. `Ok(None)` means the pattern does not occur.
    pub fn find(
        &mut self,
        buffer: &TextBuffer,
        start: usize,
        pattern: &str,
        direction: Direction,
        scope: SearchScope,
    ) -> EditorResult<Option<SearchHit>> {
        let regex = self.compile(pattern)?;
        let text = buffer.as_bytes();
        let start = start.min(text.len());

        let hit = match (direction, scope) {
            (Direction::Forward, SearchScope::Limited) => {
                let limit = buffer.line_end(start);
                first_match_from(&regex, &text[..limit], start)
            }
            (Direction::Backward, SearchScope::Limited) => {
                let limit = buffer.line_end(start);
                last_match_between(&regex, &text[..limit], buffer.line_start(start), start)
            }
            (Direction::Forward, SearchScope::Full) => first_match_from(&regex, text, start),
            (Direction::Backward, SearchScope::Full) => last_match_between(&regex, text, 0, start),
        };
        if let Some(position) = hit {
            return Ok(Some(SearchHit {
                position,
                wrapped: false,
            }));
        }
        if scope == SearchScope::Limited {
            return Ok(None);
        }

        let wrapped = match direction {
            Direction::Forward => first_match_from(&regex, text, 0).filter(|&pos| pos < start),
            Direction::Backward => last_match_between(&regex, text, start, text.len()),
        };
        if wrapped.is_some() {
            tracing::debug!("Search for {:?} wrapped around ({:?})", pattern, direction);
        }
        Ok(wrapped.map(|position| SearchHit {
            position,
            wrapped: true,
        }))
    }
}

/// Start of the first match at or after `from`
fn first_match_from(regex: &Regex, haystack: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    regex.find_at(haystack, from).map(|m| m.start())
}

/// Start of the last match beginning in `[from, upto]`
fn last_match_between(regex: &Regex, haystack: &[u8], from: usize, upto: usize) -> Option<usize> {
    let mut pos = from;
    let mut last = None;
    while pos <= upto && pos <= haystack.len() {
        match regex.find_at(haystack, pos) {
            Some(m) if m.start() <= upto => {
                last = Some(m.start());
                pos = m.start() + 1;
            }
            _ => break,
        }
    }
    last
}

/// Rewrite vi word anchors `\<` and `\>` into the regex crate's `\b`
fn translate_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('<') | Some('>') => {
                    chars.next();
                    out.push_str("\\b");
                }
                Some(&next) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Position of the bracket matching the one at `pos`
pub fn find_matching_bracket(buffer: &TextBuffer, pos: usize) -> Option<usize> {
    let text = buffer.as_bytes();
    let open = *text.get(pos)?;
    let (close, direction) = match open {
        b'(' => (b')', Direction::Forward),
        b'[' => (b']', Direction::Forward),
        b'{' => (b'}', Direction::Forward),
        b')' => (b'(', Direction::Backward),
        b']' => (b'[', Direction::Backward),
        b'}' => (b'{', Direction::Backward),
        _ => return None,
    };

    let mut depth = 1usize;
    let mut p = pos;
    loop {
        p = match direction {
            Direction::Forward => {
                if p + 1 >= text.len() {
                    return None;
                }
                p + 1
            }
            Direction::Backward => p.checked_sub(1)?,
        };
        if text[p] == open {
            depth += 1;
        } else if text[p] == close {
            depth -= 1;
            if depth == 0 {
                return Some(p);
            }
        }
    }
}
