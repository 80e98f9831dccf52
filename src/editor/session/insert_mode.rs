//! Typing in Insert and Replace mode.

use crate::editor::commands::parser::Motion;
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::{ctrl, Key, Mode, RenderRequest, BACKSPACE, CR, DEL, ESC, LF};
use crate::editor::services::find_matching_bracket;
use crate::editor::session::EditorSession;

impl EditorSession {
    pub(crate) fn insert_key(&mut self, key: Key) -> EditorResult<RenderRequest> {
        if let Some(keys) = self.recording.as_mut() {
            keys.push(key);
        }

        if std::mem::take(&mut self.literal_next) {
            if let Some(byte) = key.byte() {
                self.type_byte(byte)?;
            }
            return Ok(RenderRequest::Refresh);
        }

        match key {
            Key::Byte(byte) if byte == ESC || byte == ctrl(b'c') => self.leave_insert(),
            Key::Byte(byte) if byte == ctrl(b'v') => self.literal_next = true,
            Key::Byte(CR | LF) => self.break_line()?,
            Key::Byte(BACKSPACE | DEL) => self.backspace()?,
            Key::Byte(b'\t') => self.insert_tab()?,
            Key::Byte(byte) => self.type_byte(byte)?,
            Key::Left => {
                let dot = self.buffer.dot();
                if dot == self.buffer.line_start(dot) {
                    return Err(EditorError::Bell);
                }
                self.buffer.set_dot(dot - 1);
            }
            Key::Right => {
                let dot = self.buffer.dot();
                if dot >= self.buffer.line_end(dot) {
                    return Err(EditorError::Bell);
                }
                self.buffer.set_dot(dot + 1);
            }
            Key::Up | Key::Down => {
                let motion = if key == Key::Up { Motion::Up } else { Motion::Down };
                let target = self.motion_target(motion, None, true)?;
                self.buffer.set_dot(target);
            }
            Key::Home => self.buffer.set_dot(self.buffer.line_start(self.buffer.dot())),
            Key::End => self.buffer.set_dot(self.buffer.line_end(self.buffer.dot())),
            Key::Insert => {
                let mode = if self.mode == Mode::Insert {
                    Mode::Replace
                } else {
                    Mode::Insert
                };
                self.enter_text_mode(mode);
            }
            Key::Delete => {
                let dot = self.buffer.dot();
                if dot >= self.buffer.line_end(dot) {
                    return Err(EditorError::Bell);
                }
                self.delete_text(dot, dot);
            }
            Key::PageUp | Key::PageDown | Key::Function(_) => return Err(EditorError::Bell),
        }
        Ok(RenderRequest::Refresh)
    }

    /// Back to Command mode; the cursor steps back onto the last character typed
    fn leave_insert(&mut self) {
        self.mode = Mode::Command;
        self.status.clear_message();
        let dot = self.buffer.dot();
        if dot > 0 && self.buffer.byte_at(dot - 1) != Some(b'\n') {
            self.buffer.set_dot(dot - 1);
        }
        if let Some(keys) = self.recording.take() {
            self.last_change = keys;
        }
        self.settle_dot();
    }

    fn break_line(&mut self) -> EditorResult<()> {
        let dot = self.buffer.dot();
        let mut text = vec![b'\n'];
        if self.options.autoindent() {
            let indent = self.buffer.indent_of(dot);
            let keep = indent.len().min(dot - self.buffer.line_start(dot));
            text.extend_from_slice(&indent[..keep]);
        }
        let after = self.insert_text(dot, &text)?;
        self.buffer.set_dot(after);
        Ok(())
    }

    fn backspace(&mut self) -> EditorResult<()> {
        let dot = self.buffer.dot();
        if dot == 0 {
            return Err(EditorError::Bell);
        }
        if self.mode == Mode::Replace {
            if self.buffer.byte_at(dot - 1) == Some(b'\n') {
                return Err(EditorError::Bell);
            }
        } else {
            self.delete_text(dot - 1, dot - 1);
        }
        self.buffer.set_dot(dot - 1);
        Ok(())
    }

    fn insert_tab(&mut self) -> EditorResult<()> {
        if !self.options.expandtab() {
            return self.type_byte(b'\t');
        }
        let dot = self.buffer.dot();
        let column = self.renderer.display_column(&self.buffer, dot, Mode::Insert);
        let tabstop = self.options.tabstop;
        let spaces = vec![b' '; tabstop - column % tabstop];
        let after = self.insert_text(dot, &spaces)?;
        self.buffer.set_dot(after);
        Ok(())
    }

    fn type_byte(&mut self, byte: u8) -> EditorResult<()> {
        let dot = self.buffer.dot();
        let overwrite = self.mode == Mode::Replace
            && self.buffer.byte_at(dot).is_some_and(|b| b != b'\n');
        if overwrite {
            self.buffer.replace_byte(dot, byte);
            self.buffer.set_dot(dot + 1);
        } else {
            let after = self.insert_text(dot, &[byte])?;
            self.buffer.set_dot(after);
        }

        if self.options.showmatch() && matches!(byte, b')' | b']' | b'}') {
            match find_matching_bracket(&self.buffer, dot) {
                Some(pos) => self.showmatch = Some(pos),
                None => self.bell = true,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::events::{keys, Key, Mode};
    use crate::editor::services::MemoryHost;
    use crate::editor::session::EditorSession;

    fn run(session: &mut EditorSession, input: &str) {
        let mut host = MemoryHost::new();
        for key in keys(input) {
            session.handle_input(key, &mut host);
        }
    }

    fn session(text: &str) -> EditorSession {
        EditorSession::open(40, 10, Some(text.as_bytes().to_vec()))
    }

    fn text(session: &EditorSession) -> &str {
        std::str::from_utf8(session.text()).unwrap()
    }

    #[test]
    fn escape_should_step_back_onto_last_typed_char() {
        let mut session = session("abc\n");
        run(&mut session, "ixy");
        assert_eq!(session.mode(), Mode::Insert);
        assert_eq!(session.status_text(), "-- INSERT --");
        run(&mut session, "\x1b");
        assert_eq!(text(&session), "xyabc\n");
        assert_eq!(session.dot(), 1);
        assert_eq!(session.mode(), Mode::Command);
        assert_eq!(session.status_text(), "");
    }

    #[test]
    fn inserted_text_should_repeat_with_dot() {
        let mut session = session("abc\n");
        run(&mut session, "ixy\x1b.");
        assert_eq!(text(&session), "xxyyabc\n");
    }

    #[test]
    fn enter_should_copy_indent_with_autoindent() {
        let mut session = session("  ab\n");
        run(&mut session, ":set ai\rA\rcd\x1b");
        assert_eq!(text(&session), "  ab\n  cd\n");
    }

    #[test]
    fn backspace_should_join_lines_in_insert_mode() {
        let mut session = session("ab\ncd\n");
        session.set_cursor(3);
        run(&mut session, "i\x7f\x1b");
        assert_eq!(text(&session), "abcd\n");
        assert_eq!(session.dot(), 1);
    }

    #[test]
    fn replace_mode_should_overwrite_then_append() {
        let mut session = session("abcd\n");
        run(&mut session, "Rxy\x1b");
        assert_eq!(text(&session), "xycd\n");

        let mut session = self::session("ab\n");
        run(&mut session, "Rxyz\x1b");
        assert_eq!(text(&session), "xyz\n");
    }

    #[test]
    fn backspace_in_replace_mode_should_only_move() {
        let mut session = session("abcd\n");
        run(&mut session, "Rxy\x7f\x7f\x1b");
        assert_eq!(text(&session), "xycd\n");
        assert_eq!(session.dot(), 0);
    }

    #[test]
    fn tab_should_expand_with_expandtab() {
        let mut session = session("\n");
        run(&mut session, ":set et\r:set ts=4\rix\tx\x1b");
        assert_eq!(text(&session), "x   x\n");
    }

    #[test]
    fn ctrl_v_should_insert_next_key_literally() {
        let mut session = session("\n");
        run(&mut session, "i\x16\x1b\x1b");
        assert_eq!(session.text(), b"\x1b\n");
        assert_eq!(session.mode(), Mode::Command);
    }

    #[test]
    fn showmatch_should_point_at_opening_bracket() {
        let mut session = session("\n");
        run(&mut session, ":set sm\ri(x)");
        let frame = session.showmatch_frame();
        assert!(frame.is_some());
        assert!(session.showmatch_frame().is_none());
    }

    #[test]
    fn insert_key_should_toggle_replace_mode() {
        let mut session = session("ab\n");
        let mut host = MemoryHost::new();
        run(&mut session, "i");
        session.handle_input(Key::Insert, &mut host);
        assert_eq!(session.mode(), Mode::Replace);
        assert_eq!(session.status_text(), "-- REPLACE --");
        run(&mut session, "z\x1b");
        assert_eq!(text(&session), "zb\n");
    }
}
