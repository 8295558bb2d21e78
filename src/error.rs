//! Error types for doctables.

use crate::pipeline::Diagnostics;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for doctables operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a module or a whole operation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document violates a structural precondition.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Options are inconsistent or out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A pipeline module failed as a whole.
    #[error("Module '{module}' failed: {message}")]
    Module {
        /// Name of the failing module
        module: String,
        /// Failure description
        message: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Per-page extraction failures.
///
/// These never abort a run; the table detection module records them as
/// diagnostics and leaves the page untouched.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The extractor reported a non-success status.
    #[error("extractor exited with status {status}: {stderr}")]
    Process {
        /// Exit status (or -1 when killed by a signal)
        status: i32,
        /// Captured diagnostic output
        stderr: String,
    },

    /// The extractor process could not be started.
    #[error("failed to start extractor: {0}")]
    Spawn(#[source] io::Error),

    /// The extractor did not finish within its allotted time.
    #[error("extractor timed out after {after:?}")]
    Timeout {
        /// The timeout that was exceeded
        after: Duration,
    },

    /// The payload did not match the descriptor schema.
    #[error("failed to parse extractor output: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// The run was cancelled while the call was in flight.
    #[error("extraction cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Exit status carried by the error, if any.
    pub fn status(&self) -> Option<i32> {
        match self {
            ExtractionError::Process { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Captured diagnostic text carried by the error, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExtractionError::Process { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Parse {
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the pipeline runner.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A module failed under the fatal policy.
    #[error("pipeline aborted in module '{module}': {source}")]
    ModuleFailed {
        /// Name of the failing module
        module: String,
        /// The module's error
        #[source]
        source: Error,
    },

    /// The run was cancelled before every module completed.
    #[error("pipeline cancelled after {completed_modules} module(s)")]
    Cancelled {
        /// Number of modules that ran to completion
        completed_modules: usize,
        /// Diagnostics recorded before the run stopped
        diagnostics: Diagnostics,
    },
}
