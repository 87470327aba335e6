//! Error types for permission derivation.
//!
//! Every variant that involves an external command or a file carries the
//! command line or path, so the user can see exactly what failed.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while deriving permissions.
#[derive(Debug, Error)]
pub enum Error {
    /// An external command could not be started
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully
    #[error("command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status reported by the OS
        status: ExitStatus,
        /// Tail of the captured standard error
        stderr: String,
    },

    /// The permissions document could not be read
    #[error("could not read permissions file {path}: {source}")]
    PermissionsRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The permissions document is not valid JSON
    #[error("invalid permissions file {path}: {source}")]
    PermissionsParse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The plan JSON could not be read
    #[error("could not read plan file {path}: {source}")]
    PlanRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The plan JSON exists but is not valid JSON
    #[error("invalid plan JSON in {path}: {source}")]
    PlanParse {
        /// Path that was parsed (`<memory>` for in-memory documents)
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Invalid configuration (empty provider list, bad pattern, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the error came from running an external command.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Spawn { .. } | Error::CommandFailed { .. })
    }

    /// Returns true if the executable itself was not found on PATH.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Result type for permission derivation
pub type Result<T> = std::result::Result<T, Error>;
