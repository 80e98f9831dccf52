//! Configuration constants and utilities for vedit
//!
//! Defaults for editor options and terminal timing, plus the environment
//! variables the binary consults at start-up.

use std::time::Duration;

/// Default tab stop width
pub const DEFAULT_TABSTOP: usize = 8;

/// Largest tab stop `:set tabstop` accepts
pub const MAX_TABSTOP: usize = 32;

/// How long the cursor rests on a matching bracket when `showmatch` is on
pub const SHOWMATCH_FLASH: Duration = Duration::from_millis(400);

/// Poll interval of the main input loop
pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal size assumed when the real size cannot be queried
pub const FALLBACK_TERMINAL_SIZE: (u16, u16) = (80, 24);

/// Environment variable selecting the log level (tracing `EnvFilter` syntax)
pub const LOG_LEVEL_ENV_VAR: &str = "VEDIT_LOG_LEVEL";

/// Environment variable naming the log file
pub const LOG_FILE_ENV_VAR: &str = "VEDIT_LOG_FILE";

/// Environment variable holding start-up line commands, one per line
pub const EXINIT_ENV_VAR: &str = "EXINIT";

/// Default log file used when a level is set but no file is named
pub const DEFAULT_LOG_FILE: &str = "vedit.log";

/// Get the log file path, checking the environment variable first
pub fn get_log_file_path() -> String {
    std::env::var_os(LOG_FILE_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
}

/// Whether logging was requested at all
pub fn logging_requested() -> bool {
    std::env::var_os(LOG_LEVEL_ENV_VAR).is_some()
}

/// Line commands from `EXINIT`, split on newlines and `|`
pub fn get_exinit_commands() -> Vec<String> {
    std::env::var(EXINIT_ENV_VAR)
        .map(|value| split_init_commands(&value))
        .unwrap_or_default()
}

fn split_init_commands(value: &str) -> Vec<String> {
    value
        .split(['\n', '|'])
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .map(|cmd| cmd.trim_start_matches(':').to_string())
        .collect()
}
