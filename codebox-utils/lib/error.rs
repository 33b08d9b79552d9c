use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a codebox-utils related operation.
pub type CodeboxUtilsResult<T> = Result<T, CodeboxUtilsError>;

/// An error that occurred in one of the codebox utilities.
#[derive(pretty_error_debug::Debug, Error)]
pub enum CodeboxUtilsError {
    /// An environment variable is set but its value cannot be parsed.
    #[error("invalid value for environment variable {var}: {value:?}")]
    InvalidEnvVar {
        /// The name of the variable.
        var: String,

        /// The raw value that failed to parse.
        value: String,
    },
}
