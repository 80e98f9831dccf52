//! # Status Line Model
//!
//! State of the bottom terminal row: the last message (optionally in standout),
//! the line being typed after `:`, `/` or `?`, and multi-line output that must
//! stay on screen until a key is pressed.

/// Prompt shown under text that waits for a key
pub const CONTINUE_PROMPT: &str = "[Hit return to continue]";

/// Status line model containing all status row display state
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    /// Message from the last command
    message: Option<String>,

    /// Show the message in reverse video
    standout: bool,

    /// Prompt character and text of a line being typed (`:`, `/`, `?`)
    command_buffer: Option<String>,

    /// Lines painted above the status row while waiting for a key
    overlay: Vec<String>,

    /// A key press is needed before normal display resumes
    awaiting_key: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    // === Status Message Methods ===

    /// Set a plain message
    pub fn set_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(message.into());
        self.standout = false;
    }

    /// Set a message drawn in standout (errors, warnings)
    pub fn set_error<S: Into<String>>(&mut self, message: S) {
        self.message = Some(message.into());
        self.standout = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
        self.standout = false;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_standout(&self) -> bool {
        self.standout
    }

    // === Command Buffer Methods ===

    /// Start reading a line after the given prompt character
    pub fn begin_command(&mut self, prompt: char) {
        self.command_buffer = Some(prompt.to_string());
    }

    pub fn command_buffer(&self) -> Option<&str> {
        self.command_buffer.as_deref()
    }

    pub fn append_to_command_buffer(&mut self, ch: char) {
        if let Some(buffer) = self.command_buffer.as_mut() {
            buffer.push(ch);
        }
    }

    /// Remove the last typed character; returns false once only the prompt is left
    pub fn backspace_command_buffer(&mut self) -> bool {
        match self.command_buffer.as_mut() {
            Some(buffer) if buffer.chars().count() > 1 => {
                buffer.pop();
                true
            }
            _ => false,
        }
    }

    /// Finish reading: returns the typed text without its prompt
    pub fn take_command_buffer(&mut self) -> Option<String> {
        self.command_buffer
            .take()
            .map(|buffer| buffer.chars().skip(1).collect())
    }

    pub fn cancel_command(&mut self) {
        self.command_buffer = None;
    }

    // === Persistent output ===

    /// Show lines that must stay until a key is pressed
    pub fn show_until_key(&mut self, lines: Vec<String>) {
        self.overlay = lines;
        self.awaiting_key = true;
        self.set_error(CONTINUE_PROMPT);
    }

    pub fn overlay(&self) -> &[String] {
        &self.overlay
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key
    }

    /// Dismiss persistent output after the gating key press
    pub fn acknowledge(&mut self) {
        self.overlay.clear();
        self.awaiting_key = false;
        self.clear_message();
    }

    /// Text and standout flag of the status row as it should be drawn
    pub fn display_text(&self) -> (&str, bool) {
        if let Some(buffer) = self.command_buffer.as_deref() {
            return (buffer, false);
        }
        (self.message.as_deref().unwrap_or(""), self.standout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_should_track_standout() {
        let mut status = StatusLine::new();
        status.set_error("Pattern not found");
        assert_eq!(status.display_text(), ("Pattern not found", true));
        status.set_message("\"a.txt\" 3L, 12C");
        assert_eq!(status.display_text(), ("\"a.txt\" 3L, 12C", false));
        status.clear_message();
        assert_eq!(status.display_text(), ("", false));
    }

    #[test]
    fn command_buffer_should_keep_prompt_until_taken() {
        let mut status = StatusLine::new();
        status.begin_command(':');
        status.append_to_command_buffer('w');
        status.append_to_command_buffer('q');
        assert_eq!(status.display_text(), (":wq", false));
        assert!(status.backspace_command_buffer());
        assert!(!status.backspace_command_buffer());
        assert_eq!(status.take_command_buffer(), Some(String::new()));
        assert_eq!(status.command_buffer(), None);
    }

    #[test]
    fn overlay_should_wait_for_acknowledgement() {
        let mut status = StatusLine::new();
        status.show_until_key(vec!["autoindent".into(), "tabstop=8".into()]);
        assert!(status.is_awaiting_key());
        assert_eq!(status.overlay().len(), 2);
        assert_eq!(status.display_text(), (CONTINUE_PROMPT, true));
        status.acknowledge();
        assert!(!status.is_awaiting_key());
        assert!(status.overlay().is_empty());
    }
}
