use codebox_core::CodeboxError;
use codebox_server::ServerError;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a CLI operation.
pub type CodeboxCliResult<T> = Result<T, CodeboxCliError>;

/// An error that occurred while running a command line tool.
#[derive(pretty_error_debug::Debug, Error)]
pub enum CodeboxCliError {
    /// An I/O error, e.g. reading the source file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error from the execution pipeline.
    #[error(transparent)]
    Core(#[from] CodeboxError),

    /// An error from the HTTP service.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// A result could not be rendered as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A command line argument is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
