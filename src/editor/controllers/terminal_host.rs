//! # Terminal Host
//!
//! The capabilities a session borrows while the controller owns the
//! terminal: local files, and shell commands that need the terminal handed
//! back in cooked mode for as long as they run.

use crate::editor::io::RenderStream;
use crate::editor::services::{ExternalRunner, FileSystem, LocalFileSystem, ProcessRunner};
use anyhow::Result;
use std::io::Write;

/// Raw mode is off while this lives and back on once it drops, however the
/// child process ended
struct RawModeSuspension<'a, RS: RenderStream> {
    stream: &'a mut RS,
}

impl<'a, RS: RenderStream> RawModeSuspension<'a, RS> {
    fn new(stream: &'a mut RS) -> Result<Self> {
        stream.disable_raw_mode()?;
        Ok(Self { stream })
    }
}

impl<RS: RenderStream> Drop for RawModeSuspension<'_, RS> {
    fn drop(&mut self) {
        if let Err(e) = self.stream.enable_raw_mode() {
            tracing::error!("Failed to restore raw mode: {}", e);
        }
    }
}

/// Host handed to the session for the duration of one event
pub struct TerminalHost<'a, RS: RenderStream> {
    stream: &'a mut RS,
    files: &'a mut LocalFileSystem,
    runner: &'a mut ProcessRunner,
}

impl<'a, RS: RenderStream> TerminalHost<'a, RS> {
    pub fn new(
        stream: &'a mut RS,
        files: &'a mut LocalFileSystem,
        runner: &'a mut ProcessRunner,
    ) -> Self {
        Self {
            stream,
            files,
            runner,
        }
    }
}

impl<RS: RenderStream> FileSystem for TerminalHost<'_, RS> {
    fn load_file(&mut self, path: &str) -> Result<Vec<u8>> {
        self.files.load_file(path)
    }

    fn save_range(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        self.files.save_range(path, bytes)
    }

    fn exists(&self, path: &str) -> bool {
        self.files.exists(path)
    }
}

impl<RS: RenderStream> ExternalRunner for TerminalHost<'_, RS> {
    fn run_external(&mut self, command: &str, inherit_terminal: bool) -> Result<i32> {
        if !inherit_terminal {
            return self.runner.run_external(command, false);
        }
        // Start the child's output on a fresh line below the status row.
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;
        let _cooked = RawModeSuspension::new(&mut *self.stream)?;
        self.runner.run_external(command, true)
    }

    fn filter(&mut self, command: &str, input: &[u8]) -> Result<Vec<u8>> {
        self.runner.filter(command, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::io::{MockRenderStream, RenderCommand};

    #[test]
    fn shell_command_should_run_with_raw_mode_suspended() {
        let mut stream = MockRenderStream::new();
        let mut files = LocalFileSystem::new();
        let mut runner = ProcessRunner::with_shell("/bin/sh");
        let mut host = TerminalHost::new(&mut stream, &mut files, &mut runner);

        let status = host.run_external("exit 3", true).unwrap();
        assert_eq!(status, 3);

        let modes: Vec<_> = stream
            .get_commands()
            .into_iter()
            .filter(|c| matches!(c, RenderCommand::EnableRawMode | RenderCommand::DisableRawMode))
            .collect();
        assert_eq!(
            modes,
            vec![RenderCommand::DisableRawMode, RenderCommand::EnableRawMode]
        );
    }

    #[test]
    fn raw_mode_should_come_back_when_the_shell_cannot_start() {
        let mut stream = MockRenderStream::new();
        let mut files = LocalFileSystem::new();
        let mut runner = ProcessRunner::with_shell("/nonexistent/shell");
        let mut host = TerminalHost::new(&mut stream, &mut files, &mut runner);

        assert!(host.run_external("true", true).is_err());
        assert_eq!(
            stream.get_commands().last(),
            Some(&RenderCommand::EnableRawMode)
        );
    }

    #[test]
    fn filter_should_not_touch_the_terminal() {
        let mut stream = MockRenderStream::new();
        let mut files = LocalFileSystem::new();
        let mut runner = ProcessRunner::with_shell("/bin/sh");
        let mut host = TerminalHost::new(&mut stream, &mut files, &mut runner);

        let output = host.filter("tr a-z A-Z", b"abc\n").unwrap();
        assert_eq!(output, b"ABC\n");
        assert!(stream.get_commands().is_empty());
    }
}
