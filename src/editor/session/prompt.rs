//! The `:`, `/` and `?` line typed on the status row.

use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::{ctrl, Direction, Key, Mode, RenderRequest, BACKSPACE, CR, DEL, ESC, LF};
use crate::editor::services::Host;
use crate::editor::session::EditorSession;

impl EditorSession {
    pub(crate) fn prompt_key(&mut self, key: Key, host: &mut dyn Host) -> EditorResult<RenderRequest> {
        let Some(byte) = key.byte() else {
            return Ok(RenderRequest::None);
        };
        match byte {
            ESC => self.status.cancel_command(),
            b if b == ctrl(b'c') => self.status.cancel_command(),
            BACKSPACE | DEL => {
                if !self.status.backspace_command_buffer() {
                    self.status.cancel_command();
                }
            }
            CR | LF => return self.finish_prompt(host),
            b'\t' | 0x20..=0x7e => self.status.append_to_command_buffer(char::from(byte)),
            _ => return Err(EditorError::Bell),
        }
        Ok(RenderRequest::Refresh)
    }

    fn finish_prompt(&mut self, host: &mut dyn Host) -> EditorResult<RenderRequest> {
        let prompt = self
            .status
            .command_buffer()
            .and_then(|buffer| buffer.chars().next());
        let text = self.status.take_command_buffer().unwrap_or_default();
        self.status.clear_message();

        let result = match prompt {
            Some(':') => self.execute_line_command(&text, host),
            Some('/') => self.search_prompt(text, Direction::Forward),
            Some('?') => self.search_prompt(text, Direction::Backward),
            _ => Ok(()),
        };
        if self.mode == Mode::Command {
            self.settle_dot();
        }
        result.map(|()| RenderRequest::Refresh)
    }

    /// Search from the cursor; an empty pattern reuses the last one
    fn search_prompt(&mut self, text: String, direction: Direction) -> EditorResult<()> {
        let pattern = if text.is_empty() {
            self.last_search.clone().ok_or(EditorError::NoPreviousPattern)?
        } else {
            text
        };
        tracing::debug!("Searching {:?} for {:?}", direction, pattern);
        self.last_search = Some(pattern.clone());
        self.last_search_direction = direction;
        let target = self.search_from(self.buffer.dot(), &pattern, direction)?;
        self.buffer.set_dot(target);
        Ok(())
    }
}
