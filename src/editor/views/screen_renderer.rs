//! # Screen Renderer
//!
//! Turns the text buffer into terminal output. Each refresh formats the
//! visible lines into fixed-width rows, compares them with the believed
//! screen contents and emits only the bytes that changed, followed by the
//! cheapest sequence that puts the terminal cursor where the editor's cursor
//! is.
//!
//! The bottom terminal row is the status row and is diffed on its own, since
//! it may be drawn in reverse video.

use crossterm::cursor::{MoveDown, MoveTo, MoveUp};
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::Command;

use crate::editor::events::Mode;
use crate::editor::models::TextBuffer;
use crate::editor::views::screen_buffer::ScreenBuffer;

/// One span of bytes written to the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenWrite {
    pub row: usize,
    pub col: usize,
    pub bytes: Vec<u8>,
}

/// Result of a refresh: what changed, where the cursor ends up, and the raw
/// terminal output that achieves it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    pub writes: Vec<ScreenWrite>,
    /// (row, column) of the terminal cursor after `output` is written
    pub cursor: (usize, usize),
    pub output: Vec<u8>,
}

/// What the status row should show
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusView<'a> {
    pub text: &'a str,
    pub standout: bool,
    /// The user is typing on the status row; the cursor belongs there
    pub owns_cursor: bool,
}

/// Renders a text buffer onto a `rows × columns` terminal
#[derive(Debug, Clone)]
pub struct ScreenRenderer {
    grid: ScreenBuffer,
    columns: usize,
    rows: usize,
    tabstop: usize,
    /// Horizontal scroll
    offset: usize,
    last_offset: usize,
    /// Start of the first displayed line
    screen_top: usize,
    /// Where the terminal cursor is believed to be
    cursor: Option<(usize, usize)>,
    /// Status text and standout flag last drawn
    status: Option<(Vec<u8>, bool)>,
}

impl ScreenRenderer {
    pub fn new(columns: usize, rows: usize, tabstop: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(2);
        Self {
            grid: ScreenBuffer::new(columns, rows),
            columns,
            rows,
            tabstop: tabstop.max(1),
            offset: 0,
            last_offset: 0,
            screen_top: 0,
            cursor: None,
            status: None,
        }
    }

    /// Rebuild the grid for a new terminal size
    pub fn resize(&mut self, columns: usize, rows: usize) {
        tracing::debug!("Resizing screen to {}x{}", columns, rows);
        self.columns = columns.max(1);
        self.rows = rows.max(2);
        self.grid.resize(self.columns, self.rows);
        self.offset = 0;
        self.last_offset = 0;
        self.invalidate();
    }

    /// Forget the believed terminal state; the next refresh repaints everything
    pub fn invalidate(&mut self) {
        self.grid.invalidate();
        self.cursor = None;
        self.status = None;
    }

    /// Something else wrote to the terminal; keep the believed rows but
    /// position the cursor absolutely next time
    pub fn forget_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn set_tabstop(&mut self, tabstop: usize) {
        if tabstop.max(1) != self.tabstop {
            self.tabstop = tabstop.max(1);
            self.invalidate();
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Rows available for text (everything but the status row)
    pub fn text_rows(&self) -> usize {
        self.rows - 1
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn screen_top(&self) -> usize {
        self.screen_top
    }

    /// Make the line containing `pos` the first displayed line
    pub fn set_screen_top(&mut self, buffer: &TextBuffer, pos: usize) {
        self.screen_top = buffer.line_start(pos);
    }

    // === Offset maintenance ===

    /// Shift screen-top after `count` bytes were inserted at `pos`
    pub fn note_insert(&mut self, pos: usize, count: usize) {
        if self.screen_top > pos {
            self.screen_top += count;
        }
    }

    /// Shift screen-top after the inclusive range `[lo, hi]` was deleted
    pub fn note_delete(&mut self, lo: usize, hi: usize) {
        if self.screen_top > hi {
            self.screen_top -= hi - lo + 1;
        } else if self.screen_top > lo {
            self.screen_top = lo;
        }
    }

    // === Formatting ===

    /// Display form of the line starting at `start`, before horizontal scroll
    pub fn expand_line(&self, buffer: &TextBuffer, start: usize) -> Vec<u8> {
        let text = buffer.as_bytes();
        let end = buffer.line_end(start);
        let mut out = Vec::with_capacity(end.saturating_sub(start));
        for &byte in &text[start.min(end)..end] {
            match byte {
                b'\t' => {
                    let width = self.tabstop - out.len() % self.tabstop;
                    out.resize(out.len() + width, b' ');
                }
                0x00..=0x1f => {
                    out.push(b'^');
                    out.push(byte + b'@');
                }
                0x7f => out.extend_from_slice(b"^?"),
                0x80..=0xff => out.push(b'.'),
                _ => out.push(byte),
            }
        }
        out
    }

    /// Render one display row: the line starting at `line`, or `~` past the end
    /// of the buffer, scrolled by the horizontal offset and padded to width
    pub fn format_line(&self, buffer: &TextBuffer, line: Option<usize>) -> Vec<u8> {
        let mut row = match line {
            Some(start) => {
                let expanded = self.expand_line(buffer, start);
                expanded
                    .get(self.offset..)
                    .map(|visible| visible.iter().take(self.columns).copied().collect())
                    .unwrap_or_default()
            }
            None => vec![b'~'],
        };
        row.resize(self.columns, b' ');
        row
    }

    /// Screen column (before horizontal scroll) of `pos` within its line
    pub fn display_column(&self, buffer: &TextBuffer, pos: usize, mode: Mode) -> usize {
        let text = buffer.as_bytes();
        let start = buffer.line_start(pos);
        let mut col = 0;
        for &byte in &text[start..pos.min(text.len())] {
            col += self.byte_width(byte, col);
        }
        // A Command-mode cursor sits on the last column a tab covers.
        if mode == Mode::Command && buffer.byte_at(pos) == Some(b'\t') {
            col += self.byte_width(b'\t', col) - 1;
        }
        col
    }

    fn byte_width(&self, byte: u8, col: usize) -> usize {
        match byte {
            b'\t' => self.tabstop - col % self.tabstop,
            0x00..=0x1f | 0x7f => 2,
            _ => 1,
        }
    }

    // === Window placement ===

    /// Scroll so `dot` is visible and return its (row, column) on screen
    ///
    /// Moving further than half a screen re-centres on `dot` instead of
    /// scrolling. The horizontal offset follows the cursor column.
    pub fn sync_cursor(&mut self, buffer: &TextBuffer, dot: usize, mode: Mode) -> (usize, usize) {
        let half = self.text_rows() / 2;
        let dot_line = buffer.line_start(dot);
        self.screen_top = buffer.line_start(self.screen_top);

        if dot_line < self.screen_top {
            let distance = buffer.count_lines(dot_line, self.screen_top);
            if distance > half {
                self.center_on(buffer, dot_line);
            } else {
                self.screen_top = dot_line;
            }
        }

        let last_shown = buffer.line_end(self.last_screen_line(buffer));
        if dot > last_shown {
            let distance = buffer.count_lines(last_shown, dot);
            if distance > half {
                self.center_on(buffer, dot_line);
            } else {
                self.scroll_lines(buffer, distance as isize);
            }
        }

        let row = buffer.count_lines(self.screen_top, dot_line);
        let col = self.display_column(buffer, dot, mode);

        if col < self.offset {
            self.offset = col;
        } else if col >= self.offset + self.columns {
            self.offset = col + 1 - self.columns;
        }
        if dot == dot_line && buffer.byte_at(dot) == Some(b'\t') {
            self.offset = 0;
        }

        (row, col.saturating_sub(self.offset).min(self.columns - 1))
    }

    fn center_on(&mut self, buffer: &TextBuffer, line: usize) {
        let mut top = line;
        for _ in 0..self.text_rows() / 2 {
            match buffer.prev_line(top) {
                Some(prev) => top = prev,
                None => break,
            }
        }
        self.screen_top = top;
    }

    /// Move screen-top by `lines` (negative is up); returns whether it moved
    pub fn scroll_lines(&mut self, buffer: &TextBuffer, lines: isize) -> bool {
        let before = self.screen_top;
        let mut top = buffer.line_start(self.screen_top);
        for _ in 0..lines.unsigned_abs() {
            let next = if lines < 0 {
                buffer.prev_line(top)
            } else {
                buffer.next_line(top)
            };
            match next {
                Some(pos) => top = pos,
                None => break,
            }
        }
        self.screen_top = top;
        top != before
    }

    /// Start of the buffer line shown on screen row `row`, clamped to the
    /// last line on screen
    pub fn row_position(&self, buffer: &TextBuffer, row: usize) -> usize {
        let mut pos = buffer.line_start(self.screen_top);
        for _ in 0..row.min(self.text_rows() - 1) {
            match buffer.next_line(pos) {
                Some(next) => pos = next,
                None => break,
            }
        }
        pos
    }

    /// Start of the last line on screen
    pub fn last_screen_line(&self, buffer: &TextBuffer) -> usize {
        self.row_position(buffer, self.text_rows() - 1)
    }

    /// Number of buffer lines currently on screen
    pub fn lines_on_screen(&self, buffer: &TextBuffer) -> usize {
        let top = buffer.line_start(self.screen_top);
        buffer.count_lines(top, self.last_screen_line(buffer)) + 1
    }

    // === Output ===

    /// Bring the terminal in line with the buffer
    ///
    /// With `full` every row is rewritten. Otherwise each row is compared with
    /// the believed contents and only the changed span is emitted, so a second
    /// refresh without intervening changes writes nothing. `overlay` lines
    /// replace the bottom text rows.
    pub fn refresh(
        &mut self,
        buffer: &TextBuffer,
        dot: usize,
        mode: Mode,
        status: StatusView<'_>,
        overlay: &[String],
        full: bool,
    ) -> RenderFrame {
        if full {
            self.invalidate();
        }
        let mut frame = RenderFrame::default();
        let text_cursor = self.sync_cursor(buffer, dot, mode);
        let offset_changed = self.offset != self.last_offset;
        self.last_offset = self.offset;

        let text_rows = self.text_rows();
        // An overlay taller than the screen keeps its last lines.
        let overlay = &overlay[overlay.len().saturating_sub(text_rows)..];
        let overlay_start = text_rows.saturating_sub(overlay.len());
        let mut line = Some(buffer.line_start(self.screen_top));

        for row in 0..text_rows {
            let contents = if row >= overlay_start {
                let mut bytes = overlay[row - overlay_start].as_bytes().to_vec();
                bytes.resize(self.columns, b' ');
                bytes.truncate(self.columns);
                bytes
            } else {
                self.format_line(buffer, line)
            };
            line = line.and_then(|pos| buffer.next_line(pos));

            let span = if offset_changed {
                Some((0, self.columns - 1))
            } else {
                self.grid.changed_span(row, &contents)
            };
            if let Some((first, last)) = span {
                let bytes = contents[first..=last].to_vec();
                self.place_cursor(&mut frame.output, row, first);
                frame.output.extend_from_slice(&bytes);
                self.grid.write(row, first, &bytes);
                self.advance_cursor(row, last + 1);
                frame.writes.push(ScreenWrite {
                    row,
                    col: first,
                    bytes,
                });
            }
        }

        self.draw_status(&mut frame, status);

        let target = if status.owns_cursor {
            (self.rows - 1, status.text.len().min(self.columns - 1))
        } else {
            text_cursor
        };
        self.place_cursor(&mut frame.output, target.0, target.1);
        frame.cursor = target;

        if !frame.writes.is_empty() {
            tracing::debug!(
                "Refresh wrote {} spans, {} bytes of output",
                frame.writes.len(),
                frame.output.len()
            );
        }
        frame
    }

    fn draw_status(&mut self, frame: &mut RenderFrame, status: StatusView<'_>) {
        let row = self.rows - 1;
        let mut text = status.text.as_bytes().to_vec();
        text.truncate(self.columns);

        let unchanged = self
            .status
            .as_ref()
            .is_some_and(|(drawn, standout)| *drawn == text && *standout == status.standout);
        if unchanged && self.grid.is_row_known(row) {
            return;
        }

        self.place_cursor(&mut frame.output, row, 0);
        if status.standout {
            frame.output.extend(ansi(SetAttribute(Attribute::Reverse)));
        }
        frame.output.extend_from_slice(&text);
        if status.standout {
            frame.output.extend(ansi(SetAttribute(Attribute::Reset)));
        }
        frame.output.extend(ansi(Clear(ClearType::UntilNewLine)));

        self.grid.set_row(row, &text);
        self.advance_cursor(row, text.len());
        self.status = Some((text.clone(), status.standout));
        frame.writes.push(ScreenWrite {
            row,
            col: 0,
            bytes: text,
        });
    }

    /// Record the cursor after output ending at `col`; past the last column
    /// the terminal position is not reliable
    fn advance_cursor(&mut self, row: usize, col: usize) {
        self.cursor = (col < self.columns).then_some((row, col));
    }

    /// Emit the shorter of an absolute move and a relative move that
    /// redraws the row prefix
    fn place_cursor(&mut self, out: &mut Vec<u8>, row: usize, col: usize) {
        if self.cursor == Some((row, col)) {
            return;
        }
        let absolute = ansi(MoveTo(col as u16, row as u16));
        let relative = self.relative_move(row, col);
        match relative {
            Some(relative) if relative.len() < absolute.len() => out.extend(relative),
            _ => out.extend(absolute),
        }
        self.cursor = Some((row, col));
    }

    fn relative_move(&self, row: usize, col: usize) -> Option<Vec<u8>> {
        let (current_row, _) = self.cursor?;
        if row >= self.rows - 1 {
            return None;
        }
        let prefix = self.grid.row(row)?.get(..col)?;
        if prefix.contains(&0) {
            return None;
        }

        let mut out = vec![b'\r'];
        if row < current_row {
            out.extend(ansi(MoveUp((current_row - row) as u16)));
        } else if row > current_row {
            out.extend(ansi(MoveDown((row - current_row) as u16)));
        }
        out.extend_from_slice(prefix);
        Some(out)
    }
}

/// ANSI bytes of a crossterm command
fn ansi(command: impl Command) -> Vec<u8> {
    let mut text = String::new();
    // Formatting into a String does not fail.
    let _ = command.write_ansi(&mut text);
    text.into_bytes()
}
