//! # Editor Errors
//!
//! User and resource errors raised by editor commands. None of these end the
//! session: the session reports them on the status line and carries on.

use thiserror::Error;

/// Result alias used by every editor command
pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Errors surfaced to the user through the status line
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Unknown command")]
    UnknownKey,

    #[error("Not an editor command: {0}")]
    UnknownCommand(String),

    #[error("Bad address: {0}")]
    BadAddress(String),

    #[error("Trailing characters: {0}")]
    TrailingCharacters(String),

    #[error("Mark not set")]
    MarkNotSet,

    #[error("No previous regular expression")]
    NoPreviousPattern,

    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("No match")]
    NoMatch,

    #[error("Nothing in register {0}")]
    EmptyRegister(char),

    #[error("No write since last change (:{0}! overrides)")]
    NoWriteSinceLastChange(&'static str),

    #[error("{0} more file(s) to edit")]
    MoreFiles(usize),

    #[error("No more files to edit")]
    NoMoreFiles,

    #[error("No current filename")]
    NoFileName,

    #[error("'{0}' is read only")]
    ReadOnly(String),

    #[error("'{0}' exists (:w! overrides)")]
    FileExists(String),

    #[error("bad option: {0}")]
    BadOption(String),

    #[error("'{path}' {source}")]
    Io {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Shell command failed: {0}")]
    Shell(#[source] anyhow::Error),

    #[error("Count too large")]
    CountTooLarge,

    #[error("Out of memory growing the text buffer")]
    OutOfMemory,

    /// A motion or command could not do anything; reported only by the bell
    #[error("")]
    Bell,
}

impl EditorError {
    /// Wrap a host I/O failure with the path it concerned
    pub fn io(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors the session cannot recover from
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfMemory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_error_should_format_status_messages() {
        assert_eq!(
            EditorError::NoWriteSinceLastChange("quit").to_string(),
            "No write since last change (:quit! overrides)"
        );
        assert_eq!(EditorError::EmptyRegister('a').to_string(), "Nothing in register a");
        assert_eq!(EditorError::Bell.to_string(), "");
    }

    #[test]
    fn only_out_of_memory_should_be_fatal() {
        assert!(EditorError::OutOfMemory.is_fatal());
        assert!(!EditorError::NoMatch.is_fatal());
    }
}
