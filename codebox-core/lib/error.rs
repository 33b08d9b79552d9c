use std::{io, path::PathBuf};

use codebox_utils::CodeboxUtilsError;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a codebox-related operation.
pub type CodeboxResult<T> = Result<T, CodeboxError>;

/// An error that occurred while preparing or driving an execution.
///
/// A program that crashes, hangs or fails to compile is not an error; that is reported through
/// [`ExecutionResult`](crate::ExecutionResult).
#[derive(pretty_error_debug::Debug, Error)]
pub enum CodeboxError {
    /// The requested language has no profile in the registry.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The request is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The compiler or interpreter named by a profile could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    SpawnFailure {
        /// The program that failed to start.
        program: String,

        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A workspace directory or source file could not be created.
    #[error("workspace error at {path}: {source}")]
    WorkspaceIo {
        /// The path being operated on.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The executor or registry configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Waiting on a child process failed.
    #[error("process error: {0}")]
    Process(#[source] io::Error),

    /// An error from the shared utilities.
    #[error(transparent)]
    Utils(#[from] CodeboxUtilsError),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CodeboxError {
    /// Whether the error was caused by the caller's request rather than the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CodeboxError::UnsupportedLanguage(_) | CodeboxError::InvalidInput(_)
        )
    }
}
