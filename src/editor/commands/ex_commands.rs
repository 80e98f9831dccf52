//! # Line Commands
//!
//! Commands typed after `:` use the command pattern. The registry parses the
//! address range and the command name once, then hands a [`LineInvocation`]
//! to the first [`LineCommand`] that accepts the name. Names may be
//! abbreviated down to each command's shortest accepted prefix.

use crate::editor::commands::ex_address::{AddressResolver, LineRange};
use crate::editor::commands::substitute::Substitution;
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::AddressRange;
use crate::editor::models::RegisterName;
use crate::editor::services::Host;
use crate::editor::session::EditorSession;

/// One parsed line command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInvocation<'a> {
    pub range: LineRange,
    /// Command name as typed, possibly abbreviated
    pub name: &'a str,
    /// `!` followed the name
    pub force: bool,
    pub args: &'a str,
}

impl LineInvocation<'_> {
    /// The addressed lines as a linewise range
    fn lines(&self, session: &EditorSession) -> AddressRange {
        session.numbered_line_range(self.range.first.max(1), self.range.last.max(1))
    }

    /// Argument naming a file, if any
    fn file_arg(&self) -> Option<&str> {
        Some(self.args.trim()).filter(|name| !name.is_empty())
    }

    /// Register named by the first argument character
    fn register_arg(&self) -> EditorResult<Option<RegisterName>> {
        match self.args.trim().as_bytes() {
            [] => Ok(None),
            [key] => RegisterName::from_key(*key)
                .map(Some)
                .ok_or_else(|| EditorError::TrailingCharacters(self.args.to_string())),
            _ => Err(EditorError::TrailingCharacters(self.args.to_string())),
        }
    }
}

/// Trait for line commands
pub trait LineCommand: Send {
    /// Whether this command answers to `name`
    fn can_handle(&self, name: &str) -> bool;

    /// Run the command against the session
    fn execute(
        &self,
        invocation: &LineInvocation,
        session: &mut EditorSession,
        host: &mut dyn Host,
    ) -> EditorResult<()>;

    /// Get command name for debugging
    fn name(&self) -> &'static str;
}

/// `name` is a prefix of `full` at least `min` bytes long
fn abbreviates(name: &str, full: &str, min: usize) -> bool {
    name.len() >= min && full.starts_with(name)
}

/// Refuse to drop unsaved changes without `!`
fn check_unsaved(session: &EditorSession, force: bool, command: &'static str) -> EditorResult<()> {
    if session.buffer.is_modified() && !force {
        return Err(EditorError::NoWriteSinceLastChange(command));
    }
    Ok(())
}

/// `:N`, `:$`, `:/pat/`: move to the addressed line
pub struct GotoLineCommand;

impl LineCommand for GotoLineCommand {
    fn can_handle(&self, name: &str) -> bool {
        name.is_empty()
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        if !invocation.args.trim().is_empty() {
            return Err(EditorError::TrailingCharacters(invocation.args.to_string()));
        }
        if invocation.range.is_given() {
            let line = session.buffer.find_line(invocation.range.last);
            session.buffer.set_dot(session.buffer.first_non_blank(line));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GotoLineCommand"
    }
}

/// `:=` shows the last line number, or the addressed line's number
pub struct LineNumberCommand;

impl LineCommand for LineNumberCommand {
    fn can_handle(&self, name: &str) -> bool {
        name == "="
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        let line = if invocation.range.is_given() {
            invocation.range.last
        } else {
            session.buffer.total_lines()
        };
        session.status.set_message(line.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LineNumberCommand"
    }
}

/// `:d[elete] [x]`
pub struct DeleteCommand;

impl LineCommand for DeleteCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "delete", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        let register = invocation.register_arg()?;
        let range = invocation.lines(session);
        session.delete_into(range, register);
        let pos = range.start.min(session.buffer.len() - 1);
        session.buffer.set_dot(session.buffer.first_non_blank(pos));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DeleteCommand"
    }
}

/// `:y[ank] [x]`
pub struct YankCommand;

impl LineCommand for YankCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "yank", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        let register = invocation.register_arg()?;
        let range = invocation.lines(session);
        session.yank_range(range, register);
        let lines = invocation.range.last.max(1) - invocation.range.first.max(1) + 1;
        if lines > 2 {
            session.status.set_message(format!("{lines} lines yanked"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "YankCommand"
    }
}

/// `:e[dit][!] [file]`; without a file the current one is reloaded
pub struct EditCommand;

impl LineCommand for EditCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "edit", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        check_unsaved(session, invocation.force, "e")?;
        let name = match invocation.file_arg() {
            Some(name) => name.to_string(),
            None => session.file_name.clone().ok_or(EditorError::NoFileName)?,
        };
        session.load_file(&name, host)
    }

    fn name(&self) -> &'static str {
        "EditCommand"
    }
}

/// `:f[ile] [name]` shows file information, optionally renaming first
pub struct FileCommand;

impl LineCommand for FileCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "file", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        if let Some(name) = invocation.file_arg() {
            session.file_name = Some(name.to_string());
        }
        let info = session.file_info();
        session.status.set_message(info);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FileCommand"
    }
}

/// `:n[ext][!]` edits the next file from the command line
pub struct NextCommand;

impl LineCommand for NextCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "next", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        check_unsaved(session, invocation.force, "n")?;
        let name = session
            .files
            .get(session.next_file)
            .cloned()
            .ok_or(EditorError::NoMoreFiles)?;
        session.next_file += 1;
        session.load_file(&name, host)
    }

    fn name(&self) -> &'static str {
        "NextCommand"
    }
}

/// `:q[uit][!]`
pub struct QuitCommand;

impl LineCommand for QuitCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "quit", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        if !invocation.force {
            check_unsaved(session, false, "q")?;
            let remaining = session.files.len().saturating_sub(session.next_file);
            if remaining > 0 && !session.quit_warned {
                session.quit_warned = true;
                return Err(EditorError::MoreFiles(remaining));
            }
        }
        session.quit = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "QuitCommand"
    }
}

/// `:r[ead] [file]` inserts a file after the addressed line
pub struct ReadCommand;

impl LineCommand for ReadCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "read", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        let name = match invocation.file_arg() {
            Some(name) => name.to_string(),
            None => session.file_name.clone().ok_or(EditorError::NoFileName)?,
        };
        let after = match invocation.range.last {
            0 => None,
            line => Some(session.buffer.find_line(line)),
        };
        session.read_file_after(&name, after, host)
    }

    fn name(&self) -> &'static str {
        "ReadCommand"
    }
}

/// `:s[ubstitute]/pattern/replacement/[g]`
pub struct SubstituteCommand;

impl LineCommand for SubstituteCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "substitute", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        let substitution = Substitution::parse(invocation.args)?;
        let pattern = if substitution.pattern.is_empty() {
            session
                .last_search
                .clone()
                .ok_or(EditorError::NoPreviousPattern)?
        } else {
            session.last_search = Some(substitution.pattern.clone());
            substitution.pattern.clone()
        };
        let regex = session.search.compile(&pattern)?;

        let first = invocation.range.first.max(1);
        let last = invocation.range.last.max(first);
        let mut line = session.buffer.find_line(first);
        let mut last_changed = None;

        for _ in first..=last {
            let end = session.buffer.line_end(line);
            let text = session.buffer.as_bytes()[line..end].to_vec();
            if let Some(replaced) = substitution.apply(&regex, &text) {
                session.replace_text(line, text.len(), &replaced)?;
                last_changed = Some(line);
            }
            match session.buffer.next_line(line) {
                Some(next) => line = next,
                None => break,
            }
        }

        let changed = last_changed.ok_or(EditorError::NoMatch)?;
        tracing::debug!("Substituted {:?} through line {}", pattern, session.buffer.line_number(changed));
        session.buffer.set_dot(session.buffer.first_non_blank(changed));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SubstituteCommand"
    }
}

/// `:se[t] [option]...`; no arguments or `all` lists every option
pub struct SetCommand;

impl LineCommand for SetCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "set", 2)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        let args = invocation.args.trim();
        if args.is_empty() || args == "all" {
            let lines = session.options.describe();
            session.status.show_until_key(lines);
            return Ok(());
        }
        let result = args
            .split_whitespace()
            .try_for_each(|word| session.options.apply(word));

        // Options set before a bad word still take effect.
        session.renderer.set_tabstop(session.options.tabstop);
        session.search.set_ignorecase(session.options.ignorecase());
        result
    }

    fn name(&self) -> &'static str {
        "SetCommand"
    }
}

/// `:w[rite][!] [file]`
pub struct WriteCommand;

impl LineCommand for WriteCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "write", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        let range = invocation
            .range
            .is_given()
            .then(|| invocation.lines(session));
        session.write_lines(range, invocation.file_arg(), invocation.force, host)
    }

    fn name(&self) -> &'static str {
        "WriteCommand"
    }
}

/// `:wq[!] [file]` writes, then quits
pub struct WriteQuitCommand;

impl LineCommand for WriteQuitCommand {
    fn can_handle(&self, name: &str) -> bool {
        name == "wq"
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        session.write_lines(None, invocation.file_arg(), invocation.force, host)?;
        session.quit = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "WriteQuitCommand"
    }
}

/// `:x[it]` writes only when modified, then quits
pub struct ExitCommand;

impl LineCommand for ExitCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "xit", 1)
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        if session.buffer.is_modified() {
            session.write_lines(None, invocation.file_arg(), invocation.force, host)?;
        }
        session.quit = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ExitCommand"
    }
}

/// `:ve[rsion]`
pub struct VersionCommand;

impl LineCommand for VersionCommand {
    fn can_handle(&self, name: &str) -> bool {
        abbreviates(name, "version", 2)
    }

    fn execute(&self, _invocation: &LineInvocation, session: &mut EditorSession, _host: &mut dyn Host) -> EditorResult<()> {
        session
            .status
            .set_message(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "VersionCommand"
    }
}

/// `:!cmd` runs a shell command; `:range!cmd` filters lines through it
pub struct ShellCommand;

impl LineCommand for ShellCommand {
    fn can_handle(&self, name: &str) -> bool {
        name == "!"
    }

    fn execute(&self, invocation: &LineInvocation, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        let command = invocation.args.trim();
        if command.is_empty() {
            return Err(EditorError::Bell);
        }

        if !invocation.range.is_given() {
            let result = host.run_external(command, true);
            // The terminal was handed over even when the command never started.
            session.renderer.forget_cursor();
            let status = match result {
                Ok(status) => status,
                Err(error) => {
                    session.full_redraw = true;
                    return Err(EditorError::Shell(error));
                }
            };
            tracing::debug!("'{}' exited with {}", command, status);
            // The command's output stays visible until the next key.
            session.status.show_until_key(Vec::new());
            return Ok(());
        }

        let range = invocation.lines(session);
        let input = session.buffer.text_range(range.start, range.end).to_vec();
        let mut output = host.filter(command, &input).map_err(EditorError::Shell)?;
        if !output.is_empty() && output.last() != Some(&b'\n') {
            output.push(b'\n');
        }
        session.replace_text(range.start, input.len(), &output)?;
        let pos = range.start.min(session.buffer.len() - 1);
        session.buffer.set_dot(session.buffer.first_non_blank(pos));
        session.full_redraw = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ShellCommand"
    }
}

/// Type alias to reduce complexity for line command collection
type LineCommandCollection = Vec<Box<dyn LineCommand + Send>>;

/// Registry for managing line commands
pub struct LineCommandRegistry {
    commands: LineCommandCollection,
}

impl LineCommandRegistry {
    /// Create a new registry with all default commands
    pub fn new() -> Self {
        let commands: LineCommandCollection = vec![
            Box::new(GotoLineCommand),
            Box::new(LineNumberCommand),
            Box::new(ShellCommand),
            Box::new(WriteQuitCommand),
            Box::new(DeleteCommand),
            Box::new(YankCommand),
            Box::new(EditCommand),
            Box::new(FileCommand),
            Box::new(NextCommand),
            Box::new(QuitCommand),
            Box::new(ReadCommand),
            Box::new(SetCommand),
            Box::new(SubstituteCommand),
            Box::new(WriteCommand),
            Box::new(ExitCommand),
            Box::new(VersionCommand),
        ];

        Self { commands }
    }

    /// Parse and execute one line command
    pub fn execute(&self, text: &str, session: &mut EditorSession, host: &mut dyn Host) -> EditorResult<()> {
        let trimmed = text.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        if trimmed.trim_end().is_empty() {
            return Ok(());
        }

        let mut resolver = AddressResolver {
            buffer: &session.buffer,
            dot: session.buffer.dot(),
            marks: &session.registers,
            search: &mut session.search,
            last_pattern: &mut session.last_search,
        };
        let (range, rest) = resolver.parse_range(trimmed)?;
        let rest = rest.trim_start();

        let name_len = if rest.starts_with(['!', '=']) {
            1
        } else {
            rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).len()
        };
        let (name, after) = rest.split_at(name_len);
        let (force, args) = match after.strip_prefix('!') {
            Some(args) if name != "!" => (true, args),
            _ => (false, after),
        };
        let invocation = LineInvocation {
            range,
            name,
            force,
            args: args.trim_start(),
        };

        let command = self
            .commands
            .iter()
            .find(|command| command.can_handle(name))
            .ok_or_else(|| EditorError::UnknownCommand(rest.trim_end().to_string()))?;
        tracing::debug!("Line command '{}' handled by {}", trimmed.trim_end(), command.name());
        command.execute(&invocation, session, host)
    }
}

impl Default for LineCommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::services::MemoryHost;

    fn session(text: &str) -> EditorSession {
        EditorSession::open(40, 10, Some(text.as_bytes().to_vec()))
    }

    fn run(session: &mut EditorSession, host: &mut MemoryHost, command: &str) -> EditorResult<()> {
        LineCommandRegistry::new().execute(command, session, host)
    }

    fn text(session: &EditorSession) -> &str {
        std::str::from_utf8(session.text()).unwrap()
    }

    #[test]
    fn commands_should_accept_abbreviations() {
        assert!(DeleteCommand.can_handle("d"));
        assert!(DeleteCommand.can_handle("del"));
        assert!(!DeleteCommand.can_handle("dx"));
        assert!(SetCommand.can_handle("se"));
        assert!(!SetCommand.can_handle("s"));
        assert!(SubstituteCommand.can_handle("s"));
        assert!(!SubstituteCommand.can_handle("se"));
        assert!(WriteQuitCommand.can_handle("wq"));
        assert!(!WriteCommand.can_handle("wq"));
    }

    #[test]
    fn delete_should_remove_addressed_lines() {
        let mut session = session("line1\nline2\nline3\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "2d").unwrap();
        assert_eq!(text(&session), "line1\nline3\n");
        assert_eq!(session.register(RegisterName::Default), Some(&b"line2\n"[..]));
    }

    #[test]
    fn delete_should_fill_named_register() {
        let mut session = session("a\nb\nc\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "1,2d x").unwrap();
        assert_eq!(text(&session), "c\n");
        assert_eq!(session.register(RegisterName::Named(b'x')), Some(&b"a\nb\n"[..]));
    }

    #[test]
    fn substitute_should_replace_on_current_line() {
        let mut session = session("foo bar foo\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "s/foo/baz/g").unwrap();
        assert_eq!(text(&session), "baz bar baz\n");

        let mut session = self::session("foo foo\nfoo\n");
        run(&mut session, &mut host, "%s/foo/x/").unwrap();
        assert_eq!(text(&session), "x foo\nx\n");
        assert_eq!(session.dot(), 6);
    }

    #[test]
    fn substitute_without_match_should_fail() {
        let mut session = session("abc\n");
        let mut host = MemoryHost::new();
        let error = run(&mut session, &mut host, "s/zzz/y/").unwrap_err();
        assert!(matches!(error, EditorError::NoMatch));
        assert_eq!(text(&session), "abc\n");
    }

    #[test]
    fn substitute_should_reuse_last_search() {
        let mut session = session("abc abc\n");
        let mut host = MemoryHost::new();
        session.last_search = Some("b".to_string());
        run(&mut session, &mut host, "s//X/g").unwrap();
        assert_eq!(text(&session), "aXc aXc\n");
    }

    #[test]
    fn goto_should_move_to_line() {
        let mut session = session("a\n  b\nc\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "2").unwrap();
        assert_eq!(session.dot(), 4);
        run(&mut session, &mut host, "$").unwrap();
        assert_eq!(session.dot(), 6);
        run(&mut session, &mut host, "99").unwrap();
        assert_eq!(session.dot(), 6);
    }

    #[test]
    fn equals_should_report_line_numbers() {
        let mut session = session("a\nb\nc\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "=").unwrap();
        assert_eq!(session.status_text(), "3");
        run(&mut session, &mut host, ".=").unwrap();
        assert_eq!(session.status_text(), "1");
    }

    #[test]
    fn set_should_update_options_and_list_them() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "set ai ic ts=4").unwrap();
        assert!(session.options().autoindent());
        assert!(session.options().ignorecase());
        assert_eq!(session.options().tabstop, 4);

        let error = run(&mut session, &mut host, "set bogus").unwrap_err();
        assert!(matches!(error, EditorError::BadOption(_)));

        run(&mut session, &mut host, "set").unwrap();
        assert!(session.status.is_awaiting_key());
        assert!(session.status.overlay().contains(&"tabstop=4".to_string()));
    }

    #[test]
    fn quit_should_refuse_unsaved_changes() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        session.insert_text(0, b"x").unwrap();
        let error = run(&mut session, &mut host, "q").unwrap_err();
        assert_eq!(error.to_string(), "No write since last change (:q! overrides)");
        assert!(!session.should_quit());
        run(&mut session, &mut host, "q!").unwrap();
        assert!(session.should_quit());
    }

    #[test]
    fn quit_should_warn_once_about_remaining_files() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        session.set_file_list(vec!["one".into(), "two".into()]);
        let error = run(&mut session, &mut host, "q").unwrap_err();
        assert!(matches!(error, EditorError::MoreFiles(1)));
        run(&mut session, &mut host, "q").unwrap();
        assert!(session.should_quit());
    }

    #[test]
    fn next_should_move_through_file_list() {
        let mut session = session("\n");
        let mut host = MemoryHost::new().with_file("one", "1\n").with_file("two", "2\n");
        session.set_file_list(vec!["one".into(), "two".into()]);
        run(&mut session, &mut host, "n").unwrap();
        assert_eq!(text(&session), "2\n");
        assert_eq!(session.file_name(), Some("two"));
        let error = run(&mut session, &mut host, "n").unwrap_err();
        assert!(matches!(error, EditorError::NoMoreFiles));
    }

    #[test]
    fn edit_should_need_force_when_modified() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new().with_file("f", "file\n");
        session.insert_text(0, b"x").unwrap();
        assert!(run(&mut session, &mut host, "e f").is_err());
        run(&mut session, &mut host, "e! f").unwrap();
        assert_eq!(text(&session), "file\n");
    }

    #[test]
    fn write_and_read_should_go_through_host() {
        let mut session = session("one\ntwo\n");
        let mut host = MemoryHost::new().with_file("extra", "more\n");
        run(&mut session, &mut host, "w out").unwrap();
        assert_eq!(host.file("out"), Some(&b"one\ntwo\n"[..]));
        assert_eq!(session.status_text(), "\"out\" 2L, 8C");

        run(&mut session, &mut host, "1r extra").unwrap();
        assert_eq!(text(&session), "one\nmore\ntwo\n");

        run(&mut session, &mut host, "2,3w part").unwrap();
        assert_eq!(host.file("part"), Some(&b"more\ntwo\n"[..]));
    }

    #[test]
    fn write_quit_should_save_and_quit() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        assert!(matches!(
            run(&mut session, &mut host, "wq").unwrap_err(),
            EditorError::NoFileName
        ));
        run(&mut session, &mut host, "wq saved").unwrap();
        assert_eq!(host.file("saved"), Some(&b"a\n"[..]));
        assert!(session.should_quit());
    }

    #[test]
    fn shell_should_run_and_wait_for_key() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        run(&mut session, &mut host, "!ls -l").unwrap();
        assert_eq!(host.commands(), ["ls -l".to_string()]);
        assert!(session.status.is_awaiting_key());
    }

    #[test]
    fn range_shell_should_filter_lines() {
        let mut session = session("b\na\nc\n");
        let mut host = MemoryHost::new().with_filter_output("sort", "a\nb\n");
        run(&mut session, &mut host, "1,2!sort").unwrap();
        assert_eq!(text(&session), "a\nb\nc\n");
    }

    #[test]
    fn unknown_command_should_be_reported() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        let error = run(&mut session, &mut host, "frobnicate").unwrap_err();
        assert_eq!(error.to_string(), "Not an editor command: frobnicate");
    }

    #[test]
    fn address_errors_should_propagate() {
        let mut session = session("a\n");
        let mut host = MemoryHost::new();
        let error = run(&mut session, &mut host, "'a").unwrap_err();
        assert!(matches!(error, EditorError::MarkNotSet));
    }
}
