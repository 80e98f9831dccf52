//! Loading and writing files through the host.

use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::AddressRange;
use crate::editor::services::Host;
use crate::editor::session::EditorSession;

/// `"name" 3L, 42C`
fn size_summary(name: &str, bytes: &[u8]) -> String {
    let lines = bytes.iter().filter(|&&b| b == b'\n').count();
    format!("\"{name}\" {lines}L, {}C", bytes.len())
}

impl EditorSession {
    /// Replace the buffer with the contents of `name`
    ///
    /// A file that does not exist yet starts an empty buffer under that name.
    pub fn load_file(&mut self, name: &str, host: &mut dyn Host) -> EditorResult<()> {
        let message = match host.load_file(name) {
            Ok(bytes) => {
                let message = size_summary(name, &bytes);
                self.buffer.replace_all(bytes);
                message
            }
            Err(_) if !host.exists(name) => {
                self.buffer.replace_all(Vec::new());
                format!("\"{name}\" [New file]")
            }
            Err(error) => return Err(EditorError::io(name, error)),
        };
        tracing::info!("Editing '{}'", name);

        self.file_name = Some(name.to_string());
        self.registers.clear_marks();
        self.undo_anchor = None;
        self.renderer.set_screen_top(&self.buffer, 0);
        self.full_redraw = true;
        if self.read_only {
            self.status.set_message(format!("{message} [Readonly]"));
        } else {
            self.status.set_message(message);
        }
        Ok(())
    }

    /// Insert the contents of `name` after the line containing `pos`
    ///
    /// `None` inserts above the first line (`:0r`).
    pub(crate) fn read_file_after(
        &mut self,
        name: &str,
        pos: Option<usize>,
        host: &mut dyn Host,
    ) -> EditorResult<()> {
        let mut bytes = host.load_file(name).map_err(|e| EditorError::io(name, e))?;
        if bytes.is_empty() {
            self.status.set_message(size_summary(name, &bytes));
            return Ok(());
        }
        let message = size_summary(name, &bytes);
        if bytes.last() != Some(&b'\n') {
            bytes.push(b'\n');
        }

        let mut at = match pos {
            None => 0,
            Some(pos) => self
                .buffer
                .next_line(pos)
                .unwrap_or_else(|| self.buffer.len()),
        };
        if at == self.buffer.len() && self.buffer.as_bytes().last() != Some(&b'\n') {
            at = self.insert_text(at, b"\n")?;
        }
        self.insert_text(at, &bytes)?;
        self.buffer.set_dot(self.buffer.first_non_blank(at));
        self.status.set_message(message);
        Ok(())
    }

    /// Write `range` (the whole buffer when `None`) to `target`, or to the
    /// current file when no target is named
    pub(crate) fn write_lines(
        &mut self,
        range: Option<AddressRange>,
        target: Option<&str>,
        force: bool,
        host: &mut dyn Host,
    ) -> EditorResult<()> {
        let name = match target {
            Some(name) => name.to_string(),
            None => self.file_name.clone().ok_or(EditorError::NoFileName)?,
        };
        let is_current = target.is_none() || self.file_name.as_deref() == Some(name.as_str());
        if is_current && self.read_only && !force {
            return Err(EditorError::ReadOnly(name));
        }
        if !is_current && !force && host.exists(&name) {
            return Err(EditorError::FileExists(name));
        }

        let last = self.buffer.len().saturating_sub(1);
        let whole = range.map_or(true, |r| r.start == 0 && r.end >= last);
        let bytes = match range {
            Some(r) if !whole => self.buffer.text_range(r.start, r.end),
            _ => self.buffer.as_bytes(),
        };
        let message = size_summary(&name, bytes);
        host.save_range(&name, bytes)
            .map_err(|e| EditorError::io(name.clone(), e))?;
        tracing::info!("Wrote '{}'", name);

        if whole && (is_current || self.file_name.is_none()) {
            self.buffer.set_modified(false);
        }
        if self.file_name.is_none() {
            self.file_name = Some(name);
        }
        self.status.set_message(message);
        Ok(())
    }

    /// `^G` and `:f` summary of the file and cursor position
    pub(crate) fn file_info(&self) -> String {
        let name = self.file_name.as_deref().unwrap_or("No file");
        let mut info = format!("\"{name}\"");
        if self.buffer.is_modified() {
            info.push_str(" [Modified]");
        }
        if self.read_only {
            info.push_str(" [Readonly]");
        }
        let total = self.buffer.total_lines();
        let line = self.buffer.line_number(self.buffer.dot());
        let percent = if total > 0 { line * 100 / total } else { 0 };
        info.push_str(&format!(" line {line} of {total} --{percent}%--"));
        info
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::error::EditorError;
    use crate::editor::events::AddressRange;
    use crate::editor::services::MemoryHost;
    use crate::editor::session::EditorSession;

    #[test]
    fn load_file_should_report_size() {
        let mut session = EditorSession::open(40, 10, None);
        let mut host = MemoryHost::new().with_file("notes.txt", "one\ntwo\n");
        session.load_file("notes.txt", &mut host).unwrap();
        assert_eq!(session.text(), b"one\ntwo\n");
        assert_eq!(session.file_name(), Some("notes.txt"));
        assert_eq!(session.status_text(), "\"notes.txt\" 2L, 8C");
        assert!(!session.is_modified());
    }

    #[test]
    fn missing_file_should_start_new_buffer() {
        let mut session = EditorSession::open(40, 10, None);
        let mut host = MemoryHost::new();
        session.load_file("new.txt", &mut host).unwrap();
        assert_eq!(session.text(), b"\n");
        assert_eq!(session.status_text(), "\"new.txt\" [New file]");
    }

    #[test]
    fn read_only_should_block_plain_write() {
        let mut session = EditorSession::open(40, 10, None);
        session.set_read_only(true);
        let mut host = MemoryHost::new().with_file("a", "x\n");
        session.load_file("a", &mut host).unwrap();
        assert_eq!(session.status_text(), "\"a\" 1L, 2C [Readonly]");
        let error = session.write_lines(None, None, false, &mut host).unwrap_err();
        assert!(matches!(error, EditorError::ReadOnly(_)));
        session.write_lines(None, None, true, &mut host).unwrap();
    }

    #[test]
    fn writing_other_existing_file_should_need_force() {
        let mut session = EditorSession::open(40, 10, Some(b"abc\n".to_vec()));
        let mut host = MemoryHost::new().with_file("other", "old\n");
        let error = session
            .write_lines(None, Some("other"), false, &mut host)
            .unwrap_err();
        assert!(matches!(error, EditorError::FileExists(_)));
        session.write_lines(None, Some("other"), true, &mut host).unwrap();
        assert_eq!(host.file("other"), Some(&b"abc\n"[..]));
        assert_eq!(session.file_name(), Some("other"));
    }

    #[test]
    fn partial_write_should_keep_modified_flag() {
        let mut session = EditorSession::open(40, 10, None);
        let mut host = MemoryHost::new().with_file("f", "a\nb\nc\n");
        session.load_file("f", &mut host).unwrap();
        session.insert_text(0, b"x").unwrap();
        let range = AddressRange::new(0, 4, true);
        session.write_lines(Some(range), Some("part"), false, &mut host).unwrap();
        assert_eq!(host.file("part"), Some(&b"xa\nb\n"[..]));
        assert!(session.is_modified());
        session.write_lines(None, None, false, &mut host).unwrap();
        assert!(!session.is_modified());
        assert_eq!(session.status_text(), "\"f\" 3L, 7C");
    }

    #[test]
    fn read_file_should_insert_after_line() {
        let mut session = EditorSession::open(40, 10, Some(b"one\ntwo\n".to_vec()));
        let mut host = MemoryHost::new().with_file("inc", "mid");
        session.read_file_after("inc", Some(0), &mut host).unwrap();
        assert_eq!(session.text(), b"one\nmid\ntwo\n");
        assert_eq!(session.dot(), 4);
        session.read_file_after("inc", None, &mut host).unwrap();
        assert_eq!(session.text(), b"mid\none\nmid\ntwo\n");
    }
}
