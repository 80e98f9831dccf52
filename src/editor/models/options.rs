//! # Editor Options
//!
//! Boolean options are a bitflag set, the only numeric option is `tabstop`.
//! `:set` parses option words in the usual vi forms: `name`, `noname`,
//! `name=value`, using either the long or the short name.

use bitflags::bitflags;

use crate::config::{DEFAULT_TABSTOP, MAX_TABSTOP};
use crate::editor::error::{EditorError, EditorResult};

bitflags! {
    /// Boolean editor options
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OptionFlags: u8 {
        /// Copy the indent of the current line when opening a new one
        const AUTOINDENT = 0b0000_0001;
        /// Insert spaces instead of a tab character
        const EXPANDTAB  = 0b0000_0010;
        /// Flash the screen instead of ringing the bell
        const FLASH      = 0b0000_0100;
        /// Case-insensitive searches and substitutions
        const IGNORECASE = 0b0000_1000;
        /// Briefly show the matching bracket when typing ) ] }
        const SHOWMATCH  = 0b0001_0000;
    }
}

/// Long name, short name and flag of every boolean option
const BOOLEAN_OPTIONS: [(&str, &str, OptionFlags); 5] = [
    ("autoindent", "ai", OptionFlags::AUTOINDENT),
    ("expandtab", "et", OptionFlags::EXPANDTAB),
    ("flash", "fl", OptionFlags::FLASH),
    ("ignorecase", "ic", OptionFlags::IGNORECASE),
    ("showmatch", "sm", OptionFlags::SHOWMATCH),
];

/// Current option values for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub flags: OptionFlags,
    pub tabstop: usize,
}

impl Options {
    pub fn new() -> Self {
        Self {
            flags: OptionFlags::FLASH,
            tabstop: DEFAULT_TABSTOP,
        }
    }

    pub fn autoindent(&self) -> bool {
        self.flags.contains(OptionFlags::AUTOINDENT)
    }

    pub fn expandtab(&self) -> bool {
        self.flags.contains(OptionFlags::EXPANDTAB)
    }

    pub fn flash(&self) -> bool {
        self.flags.contains(OptionFlags::FLASH)
    }

    pub fn ignorecase(&self) -> bool {
        self.flags.contains(OptionFlags::IGNORECASE)
    }

    pub fn showmatch(&self) -> bool {
        self.flags.contains(OptionFlags::SHOWMATCH)
    }

    /// Apply one `:set` word such as `ai`, `noic` or `ts=4`
    pub fn apply(&mut self, word: &str) -> EditorResult<()> {
        if let Some((name, value)) = word.split_once('=') {
            return match name {
                "tabstop" | "ts" => {
                    let width = value
                        .parse::<usize>()
                        .ok()
                        .filter(|w| (1..=MAX_TABSTOP).contains(w))
                        .ok_or_else(|| EditorError::BadOption(word.to_string()))?;
                    self.tabstop = width;
                    Ok(())
                }
                _ => Err(EditorError::BadOption(word.to_string())),
            };
        }

        let (name, enable) = match word.strip_prefix("no") {
            Some(rest) if Self::lookup(rest).is_some() => (rest, false),
            _ => (word, true),
        };
        let flag = Self::lookup(name).ok_or_else(|| EditorError::BadOption(word.to_string()))?;
        self.flags.set(flag, enable);
        Ok(())
    }

    fn lookup(name: &str) -> Option<OptionFlags> {
        BOOLEAN_OPTIONS
            .iter()
            .find(|(long, short, _)| *long == name || *short == name)
            .map(|(_, _, flag)| *flag)
    }

    /// One line per option, as shown by `:set all`
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = BOOLEAN_OPTIONS
            .iter()
            .map(|(long, _, flag)| {
                let prefix = if self.flags.contains(*flag) { "" } else { "no" };
                format!("{prefix}{long}")
            })
            .collect();
        lines.push(format!("tabstop={}", self.tabstop));
        lines
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
