//! Shared CLI error type and exit codes.

use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::services::{EditorSession, ImportOutcome, ImportSummary, KmlService};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// File system or serialization failure
    IoError = 1,
    /// Invalid input (malformed KML, bad arguments, bad config)
    ValidationError = 2,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Category of a CLI failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// See [`ExitCode::IoError`]
    Io,
    /// See [`ExitCode::ValidationError`]
    Validation,
}

/// Error reported by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Failure category, decides the exit code
    pub kind: CliErrorKind,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// I/O failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Io => ExitCode::IoError,
            CliErrorKind::Validation => ExitCode::ValidationError,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration, treating a broken file as invalid input.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Reads and imports a KML file into a fresh session.
pub fn import_file(path: &Path) -> CliResult<(EditorSession, ImportSummary)> {
    let config = load_config()?;
    let text = KmlService::load(path).map_err(|e| CliError::io(format!("{e:#}")))?;

    let mut session = EditorSession::new(config);
    let ticket = session.begin_import(KmlService::file_name(path).as_deref());
    let outcome = session
        .complete_import(ticket, &text)
        .map_err(|e| CliError::validation(format!("{e:#}")))?;

    match outcome {
        ImportOutcome::Applied(summary) => Ok((session, summary)),
        ImportOutcome::Superseded => Err(CliError::io("Import was superseded")),
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize output to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(CliError::io("x").exit_code().code(), 1);
        assert_eq!(CliError::validation("x").exit_code().code(), 2);
        assert_eq!(CliError::validation("bad input").to_string(), "bad input");
    }
}
