//! Scripted event source and recording render stream for tests.

use super::{EventStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Replays a fixed list of events
pub struct MockEventStream {
    events: VecDeque<Event>,
    poll_always_true: bool,
    /// Queued events are only seen by a `poll` willing to wait, as if each
    /// key arrived after the previous frame was drawn
    paced: bool,
}

impl MockEventStream {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            poll_always_true: false,
            paced: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// One key event per character, the way a user would type `text`
    ///
    /// `\r` becomes Enter, `\x1b` Escape, `\x7f` Backspace and other control
    /// bytes Ctrl+letter.
    ///
    /// The keys arrive paced, so a controller draws between them.
    pub fn typing(text: &str) -> Self {
        let mut stream = Self::new(text.chars().map(typed_key).collect());
        stream.paced = true;
        stream
    }

    /// Make `poll` report input even when the queue is empty, so `read`
    /// fails once it runs out
    pub fn set_poll_behavior(&mut self, always_true: bool) {
        self.poll_always_true = always_true;
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

fn typed_key(c: char) -> Event {
    let (code, modifiers) = match c {
        '\r' | '\n' => (KeyCode::Enter, KeyModifiers::NONE),
        '\x1b' => (KeyCode::Esc, KeyModifiers::NONE),
        '\x7f' => (KeyCode::Backspace, KeyModifiers::NONE),
        '\t' => (KeyCode::Tab, KeyModifiers::NONE),
        '\x01'..='\x1a' => (
            KeyCode::Char(char::from(c as u8 - 1 + b'a')),
            KeyModifiers::CONTROL,
        ),
        _ => (KeyCode::Char(c), KeyModifiers::NONE),
    };
    Event::Key(KeyEvent::new(code, modifiers))
}

impl Default for MockEventStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl EventStream for MockEventStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        if self.poll_always_true {
            return Ok(true);
        }
        if self.paced && timeout.is_zero() {
            return Ok(false);
        }
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No events available"))
    }
}

/// One operation performed on a [`MockRenderStream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    ClearScreen,
    MoveCursor(u16, u16),
    HideCursor,
    ShowCursor,
    GetSize,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    Write(Vec<u8>),
    Flush,
}

#[derive(Debug)]
struct MockTerminal {
    commands: Vec<RenderCommand>,
    output: Vec<u8>,
    size: TerminalSize,
    cursor_visible: bool,
    raw_mode: bool,
    alternate_screen: bool,
}

/// Records everything written to it
///
/// Clones share one recording, so a test can keep a handle after giving the
/// stream to a controller.
#[derive(Debug, Clone)]
pub struct MockRenderStream {
    terminal: Arc<Mutex<MockTerminal>>,
}

impl MockRenderStream {
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            terminal: Arc::new(Mutex::new(MockTerminal {
                commands: Vec::new(),
                output: Vec::new(),
                size,
                cursor_visible: true,
                raw_mode: false,
                alternate_screen: false,
            })),
        }
    }

    fn terminal(&self) -> MutexGuard<'_, MockTerminal> {
        self.terminal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_commands(&self) -> Vec<RenderCommand> {
        self.terminal().commands.clone()
    }

    pub fn clear_commands(&mut self) {
        let mut terminal = self.terminal();
        terminal.commands.clear();
        terminal.output.clear();
    }

    pub fn has_command(&self, command: &RenderCommand) -> bool {
        self.terminal().commands.contains(command)
    }

    /// Every byte written so far
    pub fn output(&self) -> Vec<u8> {
        self.terminal().output.clone()
    }

    pub fn get_buffer_string(&self) -> String {
        String::from_utf8_lossy(&self.terminal().output).into_owned()
    }

    pub fn is_raw_mode(&self) -> bool {
        self.terminal().raw_mode
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.terminal().alternate_screen
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.terminal().cursor_visible
    }

    fn record(&self, command: RenderCommand) {
        self.terminal().commands.push(command);
    }
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut terminal = self.terminal();
        terminal.output.extend_from_slice(buf);
        terminal.commands.push(RenderCommand::Write(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush);
        Ok(())
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::ClearScreen);
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        self.record(RenderCommand::MoveCursor(x, y));
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::HideCursor);
        self.terminal().cursor_visible = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::ShowCursor);
        self.terminal().cursor_visible = true;
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        let mut terminal = self.terminal();
        terminal.commands.push(RenderCommand::GetSize);
        Ok(terminal.size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::EnterAlternateScreen);
        self.terminal().alternate_screen = true;
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::LeaveAlternateScreen);
        self.terminal().alternate_screen = false;
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableRawMode);
        self.terminal().raw_mode = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableRawMode);
        self.terminal().raw_mode = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_event_stream_should_replay_in_order() {
        let mut stream = MockEventStream::new(vec![
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
            Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
        ]);
        assert!(stream.poll(Duration::ZERO).unwrap());
        match stream.read().unwrap() {
            Event::Key(key) => assert_eq!(key.code, KeyCode::Char('a')),
            other => panic!("unexpected {other:?}"),
        }
        match stream.read().unwrap() {
            Event::Key(key) => assert_eq!(key.code, KeyCode::Esc),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!stream.poll(Duration::ZERO).unwrap());
        assert!(stream.read().is_err());
    }

    #[test]
    fn typed_keys_should_only_show_to_a_waiting_poll() {
        let mut stream = MockEventStream::typing("ab");
        assert!(!stream.poll(Duration::ZERO).unwrap());
        assert!(stream.poll(Duration::from_millis(10)).unwrap());
        assert_eq!(stream.remaining(), 2);
    }

    #[test]
    fn typing_should_map_control_bytes_to_ctrl_keys() {
        let mut stream = MockEventStream::typing("\x07");
        match stream.read().unwrap() {
            Event::Key(key) => {
                assert_eq!(key.code, KeyCode::Char('g'));
                assert!(key.modifiers.contains(KeyModifiers::CONTROL));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn poll_always_true_should_report_input_on_empty_queue() {
        let mut stream = MockEventStream::empty();
        assert!(!stream.poll(Duration::ZERO).unwrap());
        stream.set_poll_behavior(true);
        assert!(stream.poll(Duration::ZERO).unwrap());
    }

    #[test]
    fn mock_render_stream_should_record_commands() {
        let mut stream = MockRenderStream::new();
        stream.clear_screen().unwrap();
        stream.move_cursor(10, 20).unwrap();
        stream.write_all(b"Hello").unwrap();
        stream.flush().unwrap();

        assert_eq!(
            stream.get_commands(),
            vec![
                RenderCommand::ClearScreen,
                RenderCommand::MoveCursor(10, 20),
                RenderCommand::Write(b"Hello".to_vec()),
                RenderCommand::Flush,
            ]
        );
        assert_eq!(stream.get_buffer_string(), "Hello");
    }

    #[test]
    fn clones_should_share_the_recording() {
        let stream = MockRenderStream::with_size((120, 40));
        let mut handle = stream.clone();
        handle.enable_raw_mode().unwrap();
        handle.enter_alternate_screen().unwrap();
        handle.hide_cursor().unwrap();

        assert_eq!(stream.get_size().unwrap(), (120, 40));
        assert!(stream.is_raw_mode());
        assert!(stream.is_alternate_screen());
        assert!(!stream.is_cursor_visible());
    }
}
