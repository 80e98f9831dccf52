//! # Editing Session
//!
//! `EditorSession` owns everything one editing session needs: the text
//! buffer, registers and marks, options, the status line, the search engine
//! and the screen renderer. The host feeds it one key at a time through
//! [`EditorSession::handle_input`] and asks it for terminal output through
//! [`EditorSession::render`].
//!
//! The impl is split by concern:
//!
//! - `edit_ops`: buffer edits that keep marks, screen-top and the undo line in step
//! - `command_mode`: parsed Command-mode commands and operators
//! - `motions`: motion targets and operator ranges
//! - `insert_mode`: typing in Insert and Replace mode
//! - `prompt`: the `:`, `/` and `?` line on the status row
//! - `file_ops`: loading and writing files through the host

mod command_mode;
mod edit_ops;
mod file_ops;
mod insert_mode;
mod motions;
mod prompt;

use std::sync::Arc;

use crate::editor::commands::ex_commands::LineCommandRegistry;
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::{Direction, Key, Mode, RenderRequest};
use crate::editor::models::{
    MarkName, Options, RegisterMarkStore, RegisterName, StatusLine, TextBuffer,
};
use crate::editor::services::{Host, SearchEngine};
use crate::editor::views::{RenderFrame, ScreenRenderer, StatusView};

/// Bytes that make the terminal flash (reverse video on, then off)
const FLASH_SEQUENCE: &[u8] = b"\x1b[?5h\x1b[?5l";

/// Bell
const BELL: u8 = 0x07;

/// Last `f F t T` command, for `;` and `,`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FindSpec {
    pub byte: u8,
    pub forward: bool,
    pub till: bool,
}

/// One editing session
pub struct EditorSession {
    pub(crate) buffer: TextBuffer,
    pub(crate) registers: RegisterMarkStore,
    pub(crate) options: Options,
    pub(crate) status: StatusLine,
    pub(crate) search: SearchEngine,
    pub(crate) renderer: ScreenRenderer,
    pub(crate) mode: Mode,
    line_commands: Arc<LineCommandRegistry>,

    /// Command-mode keys not yet forming a complete command
    pending: Vec<Key>,
    /// Keys of the change being typed, while it is in progress
    recording: Option<Vec<Key>>,
    /// Keys of the last completed change, replayed by `.`
    last_change: Vec<Key>,
    replaying: bool,
    /// `^V` was typed in Insert mode
    literal_next: bool,

    pub(crate) last_find: Option<FindSpec>,
    pub(crate) last_search: Option<String>,
    pub(crate) last_search_direction: Direction,
    /// Start of the line whose original text is in the undo register
    pub(crate) undo_anchor: Option<usize>,

    pub(crate) file_name: Option<String>,
    /// Files named on the command line, for `:n`
    pub(crate) files: Vec<String>,
    pub(crate) next_file: usize,
    pub(crate) read_only: bool,

    pub(crate) full_redraw: bool,
    bell: bool,
    /// Errors reported so far; replays stop at the first new one
    errors: usize,
    /// Matching bracket to flash after the last key
    pub(crate) showmatch: Option<usize>,
    pub(crate) quit: bool,
    /// `:q` already warned about files not yet edited
    pub(crate) quit_warned: bool,
    fatal: Option<EditorError>,
}

impl EditorSession {
    /// Start a session on a `columns × rows` terminal, optionally with
    /// initial content
    pub fn open(columns: usize, rows: usize, initial: Option<Vec<u8>>) -> Self {
        let options = Options::new();
        let mut search = SearchEngine::new();
        search.set_ignorecase(options.ignorecase());
        Self {
            buffer: initial.map(TextBuffer::from_bytes).unwrap_or_default(),
            registers: RegisterMarkStore::new(),
            renderer: ScreenRenderer::new(columns, rows, options.tabstop),
            options,
            status: StatusLine::new(),
            search,
            mode: Mode::Command,
            line_commands: Arc::new(LineCommandRegistry::new()),
            pending: Vec::new(),
            recording: None,
            last_change: Vec::new(),
            replaying: false,
            literal_next: false,
            last_find: None,
            last_search: None,
            last_search_direction: Direction::Forward,
            undo_anchor: None,
            file_name: None,
            files: Vec::new(),
            next_file: 0,
            read_only: false,
            full_redraw: true,
            bell: false,
            errors: 0,
            showmatch: None,
            quit: false,
            quit_warned: false,
            fatal: None,
        }
    }

    // === Host interface ===

    /// Process one key and report how much of the screen needs redrawing
    pub fn handle_input(&mut self, key: Key, host: &mut dyn Host) -> RenderRequest {
        if self.status.is_awaiting_key() {
            self.status.acknowledge();
            self.full_redraw = true;
            return self.request(RenderRequest::FullRedraw);
        }

        let result = if self.status.command_buffer().is_some() {
            self.prompt_key(key, host)
        } else if self.mode.is_text_entry() {
            self.insert_key(key)
        } else {
            self.command_key(key, host)
        };

        match result {
            Ok(request) => self.request(request),
            Err(error) => {
                self.report_error(error);
                self.request(RenderRequest::Refresh)
            }
        }
    }

    /// Run a line command as if typed after `:`
    pub fn run_line_command(&mut self, text: &str, host: &mut dyn Host) -> RenderRequest {
        if let Err(error) = self.execute_line_command(text, host) {
            self.report_error(error);
        }
        if self.mode == Mode::Command {
            self.settle_dot();
        }
        self.request(RenderRequest::Refresh)
    }

    /// Terminal output that brings the screen up to date
    pub fn render(&mut self) -> RenderFrame {
        let full = std::mem::take(&mut self.full_redraw);
        let dot = self.buffer.dot();
        let mut frame = self.render_with_cursor(dot, full);
        if std::mem::take(&mut self.bell) {
            let signal: &[u8] = if self.options.flash() {
                FLASH_SEQUENCE
            } else {
                &[BELL]
            };
            frame.output.splice(0..0, signal.iter().copied());
        }
        frame
    }

    /// Output that shows the cursor on the bracket matching the one just
    /// typed; the host shows it briefly and then renders normally
    pub fn showmatch_frame(&mut self) -> Option<RenderFrame> {
        let pos = self.showmatch.take()?;
        Some(self.render_with_cursor(pos, false))
    }

    fn render_with_cursor(&mut self, cursor: usize, full: bool) -> RenderFrame {
        let (text, standout) = self.status.display_text();
        let status = StatusView {
            text,
            standout,
            owns_cursor: self.status.command_buffer().is_some(),
        };
        self.renderer.refresh(
            &self.buffer,
            cursor,
            self.mode,
            status,
            self.status.overlay(),
            full,
        )
    }

    /// The terminal changed size
    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.renderer.resize(columns, rows);
        self.full_redraw = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quit || self.fatal.is_some()
    }

    /// An error the session cannot continue after, if one happened
    pub fn take_fatal_error(&mut self) -> Option<EditorError> {
        self.fatal.take()
    }

    // === Setup ===

    /// Remember the command-line file list; the first file is loaded
    /// separately and `:n` moves through the rest
    pub fn set_file_list(&mut self, files: Vec<String>) {
        self.next_file = usize::from(!files.is_empty());
        self.files = files;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Move the cursor, clamped into the buffer
    pub fn set_cursor(&mut self, pos: usize) {
        self.buffer.set_dot(pos.min(self.buffer.len().saturating_sub(1)));
    }

    // === Inspection ===

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn dot(&self) -> usize {
        self.buffer.dot()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn register(&self, name: RegisterName) -> Option<&[u8]> {
        self.registers.register(name)
    }

    /// Position of mark `a`-`z`
    pub fn mark(&self, letter: u8) -> Option<usize> {
        let name = MarkName::from_key(letter)?;
        self.registers.get_mark(name, &self.buffer)
    }

    /// Text of the status row as it will be drawn
    pub fn status_text(&self) -> &str {
        self.status.display_text().0
    }

    // === Internals shared by the impl blocks ===

    fn request(&self, request: RenderRequest) -> RenderRequest {
        if self.full_redraw {
            RenderRequest::FullRedraw
        } else {
            request
        }
    }

    /// Show an error on the status line and signal it
    pub(crate) fn report_error(&mut self, error: EditorError) {
        self.pending.clear();
        self.bell = true;
        self.errors = self.errors.wrapping_add(1);
        if matches!(error, EditorError::Bell) {
            return;
        }
        tracing::warn!("{}", error);
        self.status.set_error(error.to_string());
        if error.is_fatal() {
            self.fatal = Some(error);
        }
    }

    pub(crate) fn execute_line_command(&mut self, text: &str, host: &mut dyn Host) -> EditorResult<()> {
        let registry = Arc::clone(&self.line_commands);
        registry.execute(text, self, host)
    }

    /// Command mode never rests on a line's newline unless the line is empty
    pub(crate) fn settle_dot(&mut self) {
        let len = self.buffer.len();
        let mut dot = self.buffer.dot().min(len.saturating_sub(1));
        if self.buffer.byte_at(dot) == Some(b'\n') && dot > self.buffer.line_start(dot) {
            dot -= 1;
        }
        self.buffer.set_dot(dot);
    }

    /// Last position of the line containing `pos`, including its newline
    pub(crate) fn line_span_end(&self, pos: usize) -> usize {
        self.buffer
            .line_end(pos)
            .min(self.buffer.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::events::keys;
    use crate::editor::services::MemoryHost;

    fn session(text: &str) -> EditorSession {
        EditorSession::open(40, 10, Some(text.as_bytes().to_vec()))
    }

    fn feed(session: &mut EditorSession, host: &mut MemoryHost, input: &str) {
        for key in keys(input) {
            session.handle_input(key, host);
        }
    }

    #[test]
    fn open_should_start_in_command_mode_with_full_redraw() {
        let mut session = EditorSession::open(40, 10, None);
        assert_eq!(session.mode(), Mode::Command);
        assert_eq!(session.text(), b"\n");
        let frame = session.render();
        assert!(!frame.writes.is_empty());
        assert!(session.render().writes.is_empty());
    }

    #[test]
    fn incomplete_command_should_not_request_render() {
        let mut session = session("abc\n");
        let mut host = MemoryHost::new();
        session.render();
        let request = session.handle_input(Key::Byte(b'd'), &mut host);
        assert_eq!(request, RenderRequest::None);
        let request = session.handle_input(Key::Byte(b'l'), &mut host);
        assert_eq!(request, RenderRequest::Refresh);
        assert_eq!(session.text(), b"bc\n");
    }

    #[test]
    fn errors_should_ring_bell_and_show_standout_message() {
        let mut session = session("abc\n");
        let mut host = MemoryHost::new();
        session.render();
        feed(&mut session, &mut host, "q");
        assert_eq!(session.status_text(), "Unknown command");
        let frame = session.render();
        assert_eq!(frame.output.first(), Some(&b'\x1b'));
        assert!(frame.output.starts_with(FLASH_SEQUENCE));
    }

    #[test]
    fn bell_should_be_plain_without_flash() {
        let mut session = session("abc\n");
        let mut host = MemoryHost::new();
        session.run_line_command("set nofl", &mut host);
        session.render();
        feed(&mut session, &mut host, "h");
        assert_eq!(session.render().output.first(), Some(&BELL));
    }

    #[test]
    fn settle_dot_should_leave_trailing_newline() {
        let mut session = session("abc\n\n");
        session.buffer.set_dot(3);
        session.settle_dot();
        assert_eq!(session.dot(), 2);
        session.buffer.set_dot(4);
        session.settle_dot();
        assert_eq!(session.dot(), 4);
    }

    #[test]
    fn file_list_should_track_next_file() {
        let mut session = session("");
        session.set_file_list(vec!["a".into(), "b".into()]);
        assert_eq!(session.next_file, 1);
        session.set_file_list(Vec::new());
        assert_eq!(session.next_file, 0);
    }
}
