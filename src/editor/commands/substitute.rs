//! # Substitute
//!
//! `:s/pattern/replacement/[g]` parsing and per-line replacement.
//!
//! Matching runs over one line at a time (without its newline), so `^` and
//! `$` anchor to the line. With `g` every non-overlapping match on the line is
//! replaced; an empty match directly after the previous match is skipped, and
//! after an empty match one byte is copied before matching again.

use regex::bytes::{Captures, Regex};

use crate::editor::commands::ex_address::split_pattern;
use crate::editor::error::{EditorError, EditorResult};

/// A parsed `:s` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Empty means "use the last search pattern"
    pub pattern: String,
    pub replacement: String,
    pub global: bool,
}

impl Substitution {
    /// Parse the arguments of `:s`, e.g. `/foo/bar/g`
    pub fn parse(args: &str) -> EditorResult<Self> {
        let mut chars = args.chars();
        let delimiter = match chars.next() {
            Some(c) if !c.is_alphanumeric() && !c.is_whitespace() && c != '\\' => c,
            _ => return Err(EditorError::NoPreviousPattern),
        };

        let (pattern, rest) = split_pattern(chars.as_str(), delimiter);
        let (replacement, flags) = split_replacement(rest, delimiter);

        let mut global = false;
        for flag in flags.trim().chars() {
            match flag {
                'g' => global = true,
                _ => return Err(EditorError::TrailingCharacters(flags.to_string())),
            }
        }

        Ok(Self {
            pattern,
            replacement,
            global,
        })
    }

    /// Replace matches in `line`; `None` when nothing matched
    pub fn apply(&self, regex: &Regex, line: &[u8]) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(line.len());
        let mut pos = 0;
        let mut previous_end: Option<usize> = None;
        let mut replaced = false;

        while pos <= line.len() {
            let Some(caps) = regex.captures_at(line, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            if whole.is_empty() && previous_end == Some(whole.start()) {
                if whole.start() >= line.len() {
                    break;
                }
                out.extend_from_slice(&line[pos..=whole.start()]);
                pos = whole.start() + 1;
                continue;
            }

            out.extend_from_slice(&line[pos..whole.start()]);
            expand_replacement(&caps, self.replacement.as_bytes(), &mut out);
            replaced = true;
            previous_end = Some(whole.end());

            if whole.is_empty() {
                if let Some(&byte) = line.get(whole.end()) {
                    out.push(byte);
                }
                pos = whole.end() + 1;
            } else {
                pos = whole.end();
            }

            if !self.global {
                break;
            }
        }

        if !replaced {
            return None;
        }
        if pos < line.len() {
            out.extend_from_slice(&line[pos..]);
        }
        Some(out)
    }
}

/// Replacement text runs to the next unescaped delimiter; escapes are kept
/// for [`expand_replacement`] except for the delimiter itself
fn split_replacement(input: &str, delimiter: char) -> (String, &str) {
    let mut replacement = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            return (replacement, &input[i + c.len_utf8()..]);
        }
        if c == '\\' {
            match chars.next() {
                Some((_, next)) if next == delimiter => replacement.push(next),
                Some((_, next)) => {
                    replacement.push('\\');
                    replacement.push(next);
                }
                None => replacement.push('\\'),
            }
            continue;
        }
        replacement.push(c);
    }
    (replacement, "")
}

/// `&` is the whole match, `\1`..`\9` are groups, `\&` and `\\` are literal
fn expand_replacement(caps: &Captures<'_>, replacement: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < replacement.len() {
        match replacement[i] {
            b'&' => {
                if let Some(m) = caps.get(0) {
                    out.extend_from_slice(m.as_bytes());
                }
            }
            b'\\' if i + 1 < replacement.len() => {
                i += 1;
                match replacement[i] {
                    digit @ b'1'..=b'9' => {
                        if let Some(m) = caps.get(usize::from(digit - b'0')) {
                            out.extend_from_slice(m.as_bytes());
                        }
                    }
                    other => out.push(other),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
}
