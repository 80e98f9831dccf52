//! Command-mode dispatch.
//!
//! Keys collect in `pending` until the parser reports a complete command,
//! which then runs start to finish here. Commands that change the buffer move
//! the editing context, save the cursor line for `U`, and have their keys
//! recorded for `.`.

use crate::editor::commands::parser::{
    parse_command, Action, InsertEntry, Operator, OperatorTarget, ParseOutcome, ParsedCommand,
    Scroll,
};
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::{AddressRange, Direction, Key, Mode, RenderRequest, CR, LF};
use crate::editor::models::{MarkName, RegisterName};
use crate::editor::services::Host;
use crate::editor::session::EditorSession;

impl EditorSession {
    pub(crate) fn command_key(&mut self, key: Key, host: &mut dyn Host) -> EditorResult<RenderRequest> {
        if self.pending.is_empty() && !self.replaying {
            self.status.clear_message();
        }
        self.pending.push(key);

        let command = match parse_command(&self.pending) {
            ParseOutcome::Incomplete => return Ok(RenderRequest::None),
            ParseOutcome::Invalid => {
                self.pending.clear();
                return Err(EditorError::UnknownKey);
            }
            ParseOutcome::Complete(command) => command,
        };
        let keys = std::mem::take(&mut self.pending);
        tracing::debug!("Executing {:?}", command);

        let is_change = command.action.is_change();
        if is_change {
            self.registers.update_context(&self.buffer, self.buffer.dot());
            self.save_undo_line();
            if !self.replaying {
                self.recording = Some(keys);
            }
        }

        let result = self.execute(command, host);

        // A change that entered Insert mode finishes recording on Esc.
        if is_change && !self.mode.is_text_entry() {
            if let (Ok(()), Some(keys)) = (&result, self.recording.take()) {
                self.last_change = keys;
            }
        }
        if self.mode == Mode::Command {
            self.settle_dot();
        }
        result.map(|()| RenderRequest::Refresh)
    }

    fn execute(&mut self, command: ParsedCommand, host: &mut dyn Host) -> EditorResult<()> {
        let count = command.count;
        let n = command.repeat();
        let register = command.register;

        match command.action {
            Action::Move(motion) => {
                let target = self.motion_target(motion, count, false)?;
                self.buffer.set_dot(target);
            }
            Action::Operate {
                operator,
                target,
                motion_count,
            } => {
                let count = match (count, motion_count) {
                    (None, None) => None,
                    (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
                };
                self.operate(operator, target, count, register)?;
            }
            Action::Insert(entry) => self.begin_insert(entry)?,
            Action::ReplaceMode => self.enter_text_mode(Mode::Replace),
            Action::ReplaceChar(byte) => self.replace_chars(byte, n)?,
            Action::Put { before } => self.put(register, before, n)?,
            Action::DeleteChar { before } => self.delete_chars(before, n, register)?,
            Action::Join => self.join_lines(n)?,
            Action::ToggleCase => self.toggle_case(n)?,
            Action::RepeatChange => self.repeat_change(n, host)?,
            Action::RestoreLine => self.restore_line()?,
            Action::SetMark(mark) => {
                self.registers
                    .set_mark(MarkName::Named(mark), self.buffer.dot());
            }
            Action::Prompt(prompt) => self.status.begin_command(char::from(prompt)),
            Action::Scroll(scroll) => self.scroll(scroll, count)?,
            Action::Redraw => self.full_redraw = true,
            Action::FileInfo => {
                let info = self.file_info();
                self.status.set_message(info);
            }
            Action::WriteQuit => self.execute_line_command("x", host)?,
            Action::Escape | Action::Interrupt => {}
        }
        Ok(())
    }

    pub(crate) fn enter_text_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.status.set_message(match mode {
            Mode::Replace => "-- REPLACE --",
            _ => "-- INSERT --",
        });
    }

    // === Operators ===

    fn operate(
        &mut self,
        operator: Operator,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<RegisterName>,
    ) -> EditorResult<()> {
        let dot = self.buffer.dot();
        let range = match target {
            OperatorTarget::Lines => {
                let mut last = self.buffer.line_start(dot);
                for _ in 1..count.unwrap_or(1).max(1) {
                    match self.buffer.next_line(last) {
                        Some(next) => last = next,
                        None => break,
                    }
                }
                Some(self.line_range(dot, last))
            }
            OperatorTarget::Motion(motion) => self.motion_range(operator, motion, count)?,
        };

        let Some(range) = range else {
            if operator == Operator::Change {
                self.enter_text_mode(Mode::Insert);
            }
            return Ok(());
        };

        match operator {
            Operator::Yank => {
                self.yank_range(range, register);
                if range.start < self.buffer.line_start(dot) || !range.linewise {
                    self.buffer.set_dot(range.start.min(dot));
                }
                let lines = self.buffer.count_lines(range.start, range.end + 1);
                if range.linewise && lines > 2 {
                    self.status.set_message(format!("{lines} lines yanked"));
                }
            }
            Operator::Delete => {
                self.delete_into(range, register);
                let pos = range.start.min(self.buffer.len() - 1);
                if range.linewise {
                    self.buffer.set_dot(self.buffer.first_non_blank(pos));
                } else {
                    self.buffer.set_dot(pos);
                }
            }
            Operator::Change => self.change_range(range, register)?,
            Operator::ShiftLeft | Operator::ShiftRight => {
                let lines = self.line_range(range.start, range.end);
                self.shift_lines(lines, operator == Operator::ShiftRight)?;
            }
        }
        Ok(())
    }

    /// Delete the range and continue in Insert mode; whole lines leave one
    /// empty line (keeping the indent with autoindent)
    fn change_range(&mut self, range: AddressRange, register: Option<RegisterName>) -> EditorResult<()> {
        if range.linewise {
            self.yank_range(range, register);
            let lo = if self.options.autoindent() {
                self.buffer.first_non_blank(range.start)
            } else {
                range.start
            };
            let hi = if self.buffer.byte_at(range.end) == Some(b'\n') {
                range.end.checked_sub(1)
            } else {
                Some(range.end)
            };
            if let Some(hi) = hi.filter(|&hi| hi >= lo) {
                self.delete_text(lo, hi);
            }
            self.buffer.set_dot(lo);
        } else {
            self.delete_into(range, register);
            self.buffer.set_dot(range.start);
        }
        self.enter_text_mode(Mode::Insert);
        Ok(())
    }

    fn shift_lines(&mut self, range: AddressRange, right: bool) -> EditorResult<()> {
        let indent: Vec<u8> = if self.options.expandtab() {
            vec![b' '; self.options.tabstop]
        } else {
            vec![b'\t']
        };
        let first = range.start;
        let lines = self.buffer.count_lines(range.start, range.end) + 1;
        let mut line = first;

        for _ in 0..lines {
            if right {
                if !self.buffer.is_empty_line(line) {
                    self.insert_text(line, &indent)?;
                }
            } else {
                let text = self.buffer.as_bytes();
                let removable = if text.get(line) == Some(&b'\t') {
                    1
                } else {
                    text[line..]
                        .iter()
                        .take(self.options.tabstop)
                        .take_while(|&&b| b == b' ')
                        .count()
                };
                if removable > 0 {
                    self.delete_text(line, line + removable - 1);
                }
            }
            match self.buffer.next_line(line) {
                Some(next) => line = next,
                None => break,
            }
        }
        self.buffer.set_dot(self.buffer.first_non_blank(first));
        Ok(())
    }

    // === Single-key edits ===

    fn begin_insert(&mut self, entry: InsertEntry) -> EditorResult<()> {
        let dot = self.buffer.dot();
        match entry {
            InsertEntry::BeforeDot => {}
            InsertEntry::AfterDot => {
                if self.buffer.byte_at(dot) != Some(b'\n') {
                    self.buffer.set_dot(dot + 1);
                }
            }
            InsertEntry::LineEnd => self.buffer.set_dot(self.buffer.line_end(dot)),
            InsertEntry::FirstNonBlank => self.buffer.set_dot(self.buffer.first_non_blank(dot)),
            InsertEntry::OpenBelow => {
                let mut text = vec![b'\n'];
                text.extend(self.auto_indent(dot));
                let end = self.buffer.line_end(dot);
                let after = self.insert_text(end, &text)?;
                self.buffer.set_dot(after);
            }
            InsertEntry::OpenAbove => {
                let mut text = self.auto_indent(dot);
                let indent = text.len();
                text.push(b'\n');
                let start = self.buffer.line_start(dot);
                self.insert_text(start, &text)?;
                self.buffer.set_dot(start + indent);
            }
        }
        self.enter_text_mode(Mode::Insert);
        Ok(())
    }

    /// Indent for a new line opened next to `pos`
    pub(crate) fn auto_indent(&self, pos: usize) -> Vec<u8> {
        if self.options.autoindent() {
            self.buffer.indent_of(pos).to_vec()
        } else {
            Vec::new()
        }
    }

    fn replace_chars(&mut self, byte: u8, n: usize) -> EditorResult<()> {
        let dot = self.buffer.dot();
        if n > self.buffer.line_end(dot) - dot {
            return Err(EditorError::Bell);
        }
        if byte == CR || byte == LF {
            let after = self.replace_text(dot, n, b"\n")?;
            self.buffer.set_dot(after);
            return Ok(());
        }
        for pos in dot..dot + n {
            self.buffer.replace_byte(pos, byte);
        }
        self.buffer.set_dot(dot + n - 1);
        Ok(())
    }

    fn put(&mut self, register: Option<RegisterName>, before: bool, n: usize) -> EditorResult<()> {
        let name = register.unwrap_or(RegisterName::Default);
        let plan = self
            .registers
            .plan_put(name, &self.buffer, self.buffer.dot(), before)?;

        let mut position = plan.position;
        if plan.linewise
            && position == self.buffer.len()
            && self.buffer.as_bytes().last() != Some(&b'\n')
        {
            position = self.insert_text(position, b"\n")?;
        }
        let end = self.insert_text(position, &repeat_text(&plan.text, n)?)?;

        if plan.linewise {
            self.buffer.set_dot(self.buffer.first_non_blank(position));
        } else {
            self.buffer.set_dot(end - 1);
        }
        Ok(())
    }

    fn delete_chars(&mut self, before: bool, n: usize, register: Option<RegisterName>) -> EditorResult<()> {
        let dot = self.buffer.dot();
        if before {
            let start = self.buffer.line_start(dot);
            if dot == start {
                return Err(EditorError::Bell);
            }
            let lo = dot - n.min(dot - start);
            self.delete_into(AddressRange::new(lo, dot - 1, false), register);
            self.buffer.set_dot(lo);
        } else {
            let end = self.buffer.line_end(dot);
            if dot >= end {
                return Err(EditorError::Bell);
            }
            let hi = dot.saturating_add(n - 1).min(end - 1);
            self.delete_into(AddressRange::new(dot, hi, false), register);
            self.buffer.set_dot(dot);
        }
        Ok(())
    }

    fn join_lines(&mut self, n: usize) -> EditorResult<()> {
        for join in 0..n.max(2) - 1 {
            let end = self.buffer.line_end(self.buffer.dot());
            if end + 1 >= self.buffer.len() {
                if join == 0 {
                    return Err(EditorError::Bell);
                }
                break;
            }
            let next_text = self.buffer.first_non_blank(end + 1);
            self.delete_text(end, next_text - 1);

            let line_empty = end == self.buffer.line_start(end);
            let ends_blank = end > 0 && matches!(self.buffer.byte_at(end - 1), Some(b' ' | b'\t'));
            let next_blank = matches!(self.buffer.byte_at(end), None | Some(b'\n' | b')'));
            if !line_empty && !ends_blank && !next_blank {
                self.insert_text(end, b" ")?;
            }
            self.buffer.set_dot(end);
        }
        Ok(())
    }

    fn toggle_case(&mut self, n: usize) -> EditorResult<()> {
        let dot = self.buffer.dot();
        let end = self.buffer.line_end(dot);
        if dot >= end {
            return Err(EditorError::Bell);
        }
        let hi = dot.saturating_add(n).min(end);
        for pos in dot..hi {
            let Some(byte) = self.buffer.byte_at(pos) else {
                break;
            };
            let toggled = if byte.is_ascii_lowercase() {
                byte.to_ascii_uppercase()
            } else {
                byte.to_ascii_lowercase()
            };
            if toggled != byte {
                self.buffer.replace_byte(pos, toggled);
            }
        }
        self.buffer.set_dot(hi.min(self.buffer.line_last_char(dot)));
        Ok(())
    }

    /// `.`: feed the keys of the last change back through `handle_input`
    fn repeat_change(&mut self, n: usize, host: &mut dyn Host) -> EditorResult<()> {
        if self.last_change.is_empty() {
            return Err(EditorError::Bell);
        }
        let keys = self.last_change.clone();
        tracing::debug!("Repeating {} keys {} time(s)", keys.len(), n);
        let errors = self.errors;
        self.replaying = true;
        for _ in 0..n {
            for &key in &keys {
                self.handle_input(key, host);
            }
            // A replay that failed will fail the same way again.
            if self.errors != errors {
                break;
            }
        }
        self.replaying = false;
        Ok(())
    }

    /// `U`: swap the cursor line with its saved original text
    fn restore_line(&mut self) -> EditorResult<()> {
        let start = self.buffer.line_start(self.buffer.dot());
        if self.undo_anchor != Some(start) {
            return Err(EditorError::Bell);
        }
        let saved = self
            .registers
            .register(RegisterName::Undo)
            .ok_or(EditorError::Bell)?
            .to_vec();
        let end = self.line_span_end(start);
        let current = self.buffer.text_range(start, end).to_vec();

        self.replace_text(start, current.len(), &saved)?;
        self.registers.set_register(RegisterName::Undo, current);
        self.undo_anchor = Some(start);
        self.buffer.set_dot(start);
        Ok(())
    }

    // === Screen ===

    fn scroll(&mut self, scroll: Scroll, count: Option<usize>) -> EditorResult<()> {
        let dot = self.buffer.dot();
        self.renderer.sync_cursor(&self.buffer, dot, self.mode);
        let rows = self.renderer.text_rows();
        let n = isize::try_from(count.unwrap_or(1).max(1)).unwrap_or(isize::MAX);
        let page = rows.saturating_sub(1).max(1) as isize;
        let half = (rows / 2).max(1) as isize;

        let (lines, moves_cursor) = match scroll {
            Scroll::PageForward => (page.saturating_mul(n), false),
            Scroll::PageBackward => (-page.saturating_mul(n), false),
            Scroll::HalfDown => (half, true),
            Scroll::HalfUp => (-half, true),
            Scroll::LineDown => (n, false),
            Scroll::LineUp => (-n, false),
        };

        let scrolled = self.renderer.scroll_lines(&self.buffer, lines);
        if moves_cursor {
            let direction = if lines < 0 {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let mut line = self.buffer.line_start(dot);
            for _ in 0..lines.unsigned_abs() {
                let next = match direction {
                    Direction::Forward => self.buffer.next_line(line),
                    Direction::Backward => self.buffer.prev_line(line),
                };
                match next {
                    Some(next) => line = next,
                    None => break,
                }
            }
            self.buffer.set_dot(self.buffer.first_non_blank(line));
        }
        if !scrolled && self.buffer.line_start(self.buffer.dot()) == self.buffer.line_start(dot) {
            return Err(EditorError::Bell);
        }

        let top = self.renderer.screen_top();
        let bottom = self.renderer.last_screen_line(&self.buffer);
        let dot = self.buffer.dot();
        if dot < top {
            self.buffer.set_dot(self.buffer.first_non_blank(top));
        } else if dot > self.buffer.line_end(bottom) {
            self.buffer.set_dot(self.buffer.first_non_blank(bottom));
        }
        Ok(())
    }
}

/// `n` copies of `text`, refused before anything is allocated when the
/// total cannot be held
fn repeat_text(text: &[u8], n: usize) -> EditorResult<Vec<u8>> {
    let total = text.len().checked_mul(n).ok_or(EditorError::CountTooLarge)?;
    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| EditorError::CountTooLarge)?;
    for _ in 0..n {
        out.extend_from_slice(text);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use crate::editor::events::{keys, Mode};
    use crate::editor::models::RegisterName;
    use crate::editor::services::MemoryHost;
    use crate::editor::session::EditorSession;

    fn run(text: &str, dot: usize, input: &str) -> EditorSession {
        let mut session = EditorSession::open(40, 10, Some(text.as_bytes().to_vec()));
        session.set_cursor(dot);
        let mut host = MemoryHost::new();
        for key in keys(input) {
            session.handle_input(key, &mut host);
        }
        session
    }

    fn text(session: &EditorSession) -> &str {
        std::str::from_utf8(session.text()).unwrap()
    }

    #[test]
    fn dw_should_stop_at_end_of_line() {
        let session = run("abc\ndef\n", 0, "dw");
        assert_eq!(text(&session), "\ndef\n");
        assert_eq!(session.register(RegisterName::Default), Some(&b"abc"[..]));
    }

    #[test]
    fn dw_should_delete_word_and_trailing_space() {
        let session = run("one two three\n", 4, "dw");
        assert_eq!(text(&session), "one three\n");
        assert_eq!(session.dot(), 4);
    }

    #[test]
    fn counts_should_multiply() {
        let session = run("a b c d e\n", 0, "2d2w");
        assert_eq!(text(&session), "e\n");
    }

    #[test]
    fn dd_should_delete_lines_and_land_on_next() {
        let session = run("one\n  two\nthree\n", 0, "dd");
        assert_eq!(text(&session), "  two\nthree\n");
        assert_eq!(session.dot(), 2);
        assert_eq!(session.register(RegisterName::Default), Some(&b"one\n"[..]));

        let session = run("one\ntwo\nthree\n", 4, "5dd");
        assert_eq!(text(&session), "one\n");
        assert_eq!(session.dot(), 0);
    }

    #[test]
    fn cw_should_change_to_end_of_word() {
        let session = run("one two\n", 0, "cwxyz\x1b");
        assert_eq!(text(&session), "xyz two\n");
        assert_eq!(session.mode(), Mode::Command);
        assert_eq!(session.dot(), 2);
    }

    #[test]
    fn cc_should_keep_an_empty_line() {
        let session = run("one\ntwo\nthree\n", 4, "ccnew\x1b");
        assert_eq!(text(&session), "one\nnew\nthree\n");
    }

    #[test]
    fn d_dollar_and_shorthands_should_work_within_line() {
        assert_eq!(text(&run("hello world\n", 5, "D")), "hello\n");
        assert_eq!(text(&run("hello world\n", 5, "d0")), " world\n");
        assert_eq!(text(&run("hello\n", 1, "x")), "hllo\n");
        assert_eq!(text(&run("hello\n", 1, "3X")), "ello\n");
        assert_eq!(text(&run("hello\n", 3, "5x")), "hel\n");
        assert_eq!(text(&run("hello\n", 0, "sj\x1b")), "jello\n");
    }

    #[test]
    fn find_and_till_should_operate_inclusively() {
        assert_eq!(text(&run("a(b, c)\n", 0, "df,")), " c)\n");
        assert_eq!(text(&run("a(b, c)\n", 0, "dt)")), ")\n");
        assert_eq!(text(&run("a,b,c\n", 0, "f,;x")), "a,bc\n");
    }

    #[test]
    fn yank_and_put_should_round_trip() {
        let session = run("one two\n", 0, "dwP");
        assert_eq!(text(&session), "one two\n");

        let session = run("a\nb\nc\n", 2, "ddP");
        assert_eq!(text(&session), "a\nb\nc\n");

        let session = run("a\nb\n", 0, "yyp");
        assert_eq!(text(&session), "a\na\nb\n");
        assert_eq!(session.dot(), 2);

        let session = run("ab\n", 0, "ylp");
        assert_eq!(text(&session), "aab\n");
        assert_eq!(session.dot(), 1);
    }

    #[test]
    fn named_registers_should_keep_their_text() {
        let session = run("one\ntwo\n", 0, "\"ayyj\"byy\"aP");
        assert_eq!(text(&session), "one\none\ntwo\n");
        assert_eq!(session.register(RegisterName::Named(b'b')), Some(&b"two\n"[..]));
    }

    #[test]
    fn put_from_empty_register_should_report() {
        let session = run("abc\n", 0, "\"zp");
        assert_eq!(session.status_text(), "Nothing in register z");
        assert_eq!(text(&session), "abc\n");
    }

    #[test]
    fn replace_char_should_respect_count_and_line() {
        assert_eq!(text(&run("abcd\n", 1, "2rx")), "axxd\n");
        assert_eq!(text(&run("ab\n", 1, "3rx")), "ab\n");
        assert_eq!(text(&run("ab cd\n", 2, "r\r")), "ab\ncd\n");
    }

    #[test]
    fn join_should_collapse_leading_whitespace() {
        let session = run("one\n   two\nthree\n", 0, "J");
        assert_eq!(text(&session), "one two\nthree\n");
        assert_eq!(session.dot(), 3);
        assert_eq!(text(&run("a\nb\nc\n", 0, "3J")), "a b c\n");
        assert_eq!(text(&run("a\n", 0, "J")), "a\n");
    }

    #[test]
    fn tilde_should_flip_case_and_advance() {
        let session = run("abC\n", 0, "3~");
        assert_eq!(text(&session), "ABc\n");
        assert_eq!(session.dot(), 2);
    }

    #[test]
    fn open_line_should_copy_indent_with_autoindent() {
        let mut session = EditorSession::open(40, 10, Some(b"  one\n".to_vec()));
        let mut host = MemoryHost::new();
        session.run_line_command("set ai", &mut host);
        for key in keys("otwo\x1bOzero\x1b") {
            session.handle_input(key, &mut host);
        }
        assert_eq!(text(&session), "  one\n  zero\n  two\n");
    }

    #[test]
    fn shift_operators_should_indent_lines() {
        assert_eq!(text(&run("a\nb\n", 0, "2>>")), "\ta\n\tb\n");
        assert_eq!(text(&run("\ta\n    b\n", 0, "<j")), "a\nb\n");
    }

    #[test]
    fn dot_should_repeat_last_change() {
        assert_eq!(text(&run("a b c d\n", 0, "dw..")), "d\n");
        assert_eq!(text(&run("x\ny\n", 0, "A!\x1bj.")), "x!\ny!\n");
        assert_eq!(text(&run("abcdef\n", 0, "x3.")), "ef\n");
    }

    #[test]
    fn restore_line_should_undo_changes_on_line() {
        let session = run("hello world\n", 0, "dwxU");
        assert_eq!(text(&session), "hello world\n");
        let session = run("hello world\n", 0, "dwxUU");
        assert_eq!(text(&session), "orld\n");
    }

    #[test]
    fn marks_should_jump_and_track_edits() {
        let session = run("one\ntwo\nthree\n", 5, "mb1Gdd'b");
        assert_eq!(session.dot(), 0);
        assert_eq!(session.mark(b'b'), Some(1));

        let session = run("one\ntwo\nthree\n", 5, "mb1G`b");
        assert_eq!(session.dot(), 5);
    }

    #[test]
    fn escape_in_command_mode_should_do_nothing() {
        let session = run("abc\n", 1, "\x1b");
        assert_eq!(session.dot(), 1);
        assert_eq!(session.mode(), Mode::Command);
    }

    #[test]
    fn scroll_commands_should_move_window_and_cursor() {
        let lines: String = (1..=50).map(|n| format!("line {n}\n")).collect();
        let session = run(&lines, 0, "\x06");
        assert!(session.renderer.screen_top() > 0);
        assert!(session.dot() >= session.renderer.screen_top());

        let session = run(&lines, 0, "\x04");
        assert_eq!(session.buffer().line_number(session.dot()), 5);
    }

    #[test]
    fn file_info_should_describe_position() {
        let session = run("a\nb\nc\nd\n", 2, "\x07");
        assert_eq!(session.status_text(), "\"No file\" line 2 of 4 --50%--");
    }
}
