//! # Application Controller
//!
//! Owns the terminal streams and one editing session, and runs the loop that
//! feeds terminal events into the session and writes its frames back out.
//! Start-up (`EXINIT`, the first file, `-c` commands) happens before the
//! first frame; the terminal is restored on every exit path from `run`.

use crate::cmd_args::CommandLineArgs;
use crate::config;
use crate::editor::controllers::terminal_host::TerminalHost;
use crate::editor::events::{keys_from_event, RenderRequest};
use crate::editor::io::{
    EventStream, RenderStream, TerminalEventStream, TerminalRenderStream,
};
use crate::editor::services::{LocalFileSystem, ProcessRunner};
use crate::editor::session::EditorSession;
use anyhow::Result;
use crossterm::event::Event;
use std::io::Stdout;
use std::time::Duration;

/// Runs one editing session against a terminal
pub struct AppController<ES: EventStream, RS: RenderStream> {
    session: EditorSession,
    event_stream: ES,
    render_stream: RS,
    files: LocalFileSystem,
    runner: ProcessRunner,
    /// Output owed to the terminal once queued input is drained
    dirty: bool,
}

impl AppController<TerminalEventStream, TerminalRenderStream<Stdout>> {
    /// Controller on the process's own terminal
    pub fn new(cmd_args: CommandLineArgs) -> Result<Self> {
        Self::with_io_streams(
            cmd_args,
            TerminalEventStream::new(),
            TerminalRenderStream::new(),
        )
    }
}

impl<ES: EventStream, RS: RenderStream> AppController<ES, RS> {
    /// Create a controller over the given streams and run the start-up commands
    pub fn with_io_streams(
        cmd_args: CommandLineArgs,
        event_stream: ES,
        mut render_stream: RS,
    ) -> Result<Self> {
        let (columns, rows) = render_stream.get_size().unwrap_or_else(|e| {
            tracing::warn!("Cannot query terminal size, assuming 80x24: {}", e);
            config::FALLBACK_TERMINAL_SIZE
        });
        tracing::debug!("Terminal is {}x{}", columns, rows);

        let mut session = EditorSession::open(columns.into(), rows.into(), None);
        session.set_read_only(cmd_args.read_only());
        session.set_file_list(cmd_args.files().to_vec());

        let mut files = LocalFileSystem::new();
        let mut runner = ProcessRunner::new();
        {
            let mut host = TerminalHost::new(&mut render_stream, &mut files, &mut runner);
            for command in config::get_exinit_commands() {
                tracing::debug!("EXINIT: {}", command);
                session.run_line_command(&command, &mut host);
            }
            if let Some(first) = cmd_args.files().first() {
                if let Err(error) = session.load_file(first, &mut host) {
                    session.report_error(error);
                }
            }
            for command in cmd_args.commands() {
                tracing::debug!("-c: {}", command);
                session.run_line_command(command, &mut host);
            }
        }

        Ok(Self {
            session,
            event_stream,
            render_stream,
            files,
            runner,
            dirty: true,
        })
    }

    /// Run until the session quits
    pub fn run(&mut self) -> Result<()> {
        self.render_stream.enable_raw_mode()?;
        if let Err(e) = self.render_stream.enter_alternate_screen() {
            self.render_stream.disable_raw_mode()?;
            return Err(e);
        }

        let result = self.event_loop();
        let restored = self.restore_terminal();
        result?;
        restored?;

        if let Some(error) = self.session.take_fatal_error() {
            return Err(error.into());
        }
        Ok(())
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.session.should_quit() {
            // Frames are only drawn once the queued input is drained.
            let wait = if self.dirty {
                Duration::ZERO
            } else {
                config::INPUT_POLL_INTERVAL
            };
            if self.event_stream.poll(wait)? {
                let event = self.event_stream.read()?;
                if self.process_event(event) != RenderRequest::None {
                    self.dirty = true;
                }
            } else if self.dirty {
                self.draw()?;
            }
        }
        Ok(())
    }

    fn restore_terminal(&mut self) -> Result<()> {
        self.render_stream.flush()?;
        self.render_stream.leave_alternate_screen()?;
        self.render_stream.disable_raw_mode()
    }

    /// Feed one terminal event to the session without drawing
    pub fn process_event(&mut self, event: Event) -> RenderRequest {
        match event {
            Event::Key(key_event) => {
                let mut host =
                    TerminalHost::new(&mut self.render_stream, &mut self.files, &mut self.runner);
                let mut request = RenderRequest::None;
                for key in keys_from_event(key_event) {
                    request = request.max(self.session.handle_input(key, &mut host));
                    if self.session.should_quit() {
                        break;
                    }
                }
                request
            }
            Event::Resize(columns, rows) => {
                tracing::debug!("Terminal resized to {}x{}", columns, rows);
                self.session.resize(columns.into(), rows.into());
                RenderRequest::FullRedraw
            }
            _ => RenderRequest::None,
        }
    }

    /// Bring the terminal up to date with the session
    pub fn draw(&mut self) -> Result<()> {
        if let Some(frame) = self.session.showmatch_frame() {
            self.write_output(&frame.output)?;
            // Rest on the bracket, unless the user keeps typing.
            self.event_stream.poll(config::SHOWMATCH_FLASH)?;
        }
        let frame = self.session.render();
        self.write_output(&frame.output)?;
        self.dirty = false;
        Ok(())
    }

    fn write_output(&mut self, output: &[u8]) -> Result<()> {
        if output.is_empty() {
            return Ok(());
        }
        self.render_stream.write_all(output)?;
        self.render_stream.flush()?;
        Ok(())
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn render_stream(&self) -> &RS {
        &self.render_stream
    }

    pub fn should_quit(&self) -> bool {
        self.session.should_quit()
    }
}
