//! Command line tools for codebox.
//!
//! - `codebox` runs a local source file through the executor
//! - `codeboxd` starts the HTTP service

#![warn(missing_docs)]

mod args;
mod error;
mod exit;
mod logging;
mod styles;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use args::*;
pub use error::*;
pub use exit::*;
pub use logging::*;
pub use styles::*;
