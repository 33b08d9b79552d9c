//! `codebox` runs untrusted source code in isolated, time-bounded workspaces.
//!
//! # Overview
//!
//! A caller hands over source text, a language tag and stdin. codebox materializes the source
//! in a fresh workspace directory, optionally compiles it, runs it against the given stdin and
//! returns stdout, stderr and exit status. It handles:
//! - Per-language build and run pipelines
//! - Hard wall-clock timeouts that kill the whole process group
//! - Bounded capture of stdout and stderr
//! - Guaranteed workspace cleanup on every exit path
//!
//! Misbehaving programs (crashes, hangs, huge output, compile errors) are reported as data in an
//! [`ExecutionResult`]. Only faults of the request itself or of the host environment surface as
//! a [`CodeboxError`].
//!
//! # Modules
//!
//! - [`config`] - Timeout bounds, output caps and the workspace root
//! - [`language`] - Supported languages and the profile registry
//! - [`workspace`] - Per-execution temporary directories
//! - [`runner`] - Spawning a single command with timeout and output capture
//! - [`executor`] - The validate, prepare, build, run pipeline
//! - [`suite`] - Running a program against a list of expected outputs
//!
//! Process-group termination relies on POSIX signals, so the crate targets unix hosts.

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod config;
pub mod executor;
pub mod language;
pub mod runner;
pub mod suite;
pub mod types;
pub mod workspace;

pub use config::*;
pub use error::*;
pub use executor::*;
pub use language::*;
pub use types::*;
pub use workspace::*;
