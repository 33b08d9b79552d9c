//! Default values shared across the codebox crates.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default port the execution server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 5001;

/// The default host the execution server binds to.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// The subdirectory of the current working directory that holds workspaces.
pub const WORKSPACE_SUBDIR: &str = ".tmp";

/// Timeout applied when a request does not carry one.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Lower bound a requested timeout is clamped to.
pub const MIN_TIMEOUT_MS: u64 = 500;

/// Upper bound a requested timeout is clamped to.
pub const MAX_TIMEOUT_MS: u64 = 10_000;

/// Maximum number of bytes captured from each of stdout and stderr.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// How long output readers may keep draining after a process has been killed or has exited.
pub const DEFAULT_KILL_GRACE_MS: u64 = 250;

/// Maximum accepted size of an HTTP request body.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
