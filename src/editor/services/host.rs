//! # Host Capabilities
//!
//! The editor core never touches the file system or spawns processes itself.
//! It calls through these traits, which the host implements:
//!
//! - [`FileSystem`]: read a whole file, write a byte range to a file
//! - [`ExternalRunner`]: run a shell command with the terminal handed over,
//!   or pipe text through a command and collect its output
//!
//! `LocalFileSystem` and `ProcessRunner` are the production implementations;
//! `MemoryHost` keeps everything in memory for tests.

use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::process::{Command, Stdio};

/// Whole-file reads and range writes
pub trait FileSystem {
    /// Read the complete contents of `path`
    fn load_file(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Write `bytes` to `path`, replacing it, and return the number of bytes written
    fn save_range(&mut self, path: &str, bytes: &[u8]) -> Result<usize>;

    /// Whether `path` names an existing file
    fn exists(&self, path: &str) -> bool;
}

/// Shell commands run on behalf of the editor
pub trait ExternalRunner {
    /// Run `command`; with `inherit_terminal` the child owns the terminal
    /// until it exits. Returns the exit status.
    fn run_external(&mut self, command: &str, inherit_terminal: bool) -> Result<i32>;

    /// Feed `input` to `command` and return what it writes to stdout
    fn filter(&mut self, command: &str, input: &[u8]) -> Result<Vec<u8>>;
}

/// Everything a session needs from its host
pub trait Host: FileSystem + ExternalRunner {}

impl<T: FileSystem + ExternalRunner> Host for T {}

/// Expand `~` and environment variables in a user-typed path
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Files on the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn load_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let expanded = expand_path(path);
        tracing::debug!("Loading file '{}'", expanded);
        std::fs::read(&expanded).with_context(|| format!("cannot open {expanded}"))
    }

    fn save_range(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        let expanded = expand_path(path);
        tracing::debug!("Writing {} bytes to '{}'", bytes.len(), expanded);
        std::fs::write(&expanded, bytes).with_context(|| format!("cannot write {expanded}"))?;
        Ok(bytes.len())
    }

    fn exists(&self, path: &str) -> bool {
        std::path::Path::new(&expand_path(path)).is_file()
    }
}

/// Runs commands through `sh -c`
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: String,
}

impl ProcessRunner {
    pub fn new() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        Self { shell }
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalRunner for ProcessRunner {
    fn run_external(&mut self, command: &str, inherit_terminal: bool) -> Result<i32> {
        tracing::debug!("Running '{}' (inherit terminal: {})", command, inherit_terminal);
        let mut child = Command::new(&self.shell);
        child.arg("-c").arg(command);
        if !inherit_terminal {
            child.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        }
        let status = child
            .status()
            .with_context(|| format!("cannot run {command}"))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn filter(&mut self, command: &str, input: &[u8]) -> Result<Vec<u8>> {
        tracing::debug!("Filtering {} bytes through '{}'", input.len(), command);
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("cannot run {command}"))?;

        // The child may fill stdout before it has read all of stdin.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("no stdin for {command}"))?;
        let input = input.to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| anyhow!("writer thread for {command} panicked"))?
            .or_else(|e| {
                // Early exit closes the pipe.
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    Ok(())
                } else {
                    Err(e)
                }
            })?;
        Ok(output.stdout)
    }
}

/// In-memory host used by tests and scripted sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    files: HashMap<String, Vec<u8>>,
    filters: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    commands: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to seed a file
    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.as_bytes().to_vec());
        self
    }

    /// Canned output for a filter command
    pub fn with_filter_output(mut self, command: &str, output: &str) -> Self {
        self.filters
            .insert(command.to_string(), output.as_bytes().to_vec());
        self
    }

    /// A command `run_external` cannot start
    pub fn with_failing_command(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Commands passed to `run_external` and `filter`, in order
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl FileSystem for MemoryHost {
    fn load_file(&mut self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("No such file or directory"))
    }

    fn save_range(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(bytes.len())
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

impl ExternalRunner for MemoryHost {
    fn run_external(&mut self, command: &str, _inherit_terminal: bool) -> Result<i32> {
        self.commands.push(command.to_string());
        if self.failing.contains(command) {
            return Err(anyhow!("cannot run {command}"));
        }
        Ok(0)
    }

    fn filter(&mut self, command: &str, _input: &[u8]) -> Result<Vec<u8>> {
        self.commands.push(command.to_string());
        self.filters
            .get(command)
            .cloned()
            .ok_or_else(|| anyhow!("{command}: command not found"))
    }
}
