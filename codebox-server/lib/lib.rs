//! Codebox Server - HTTP front end for the codebox executor.
//!
//! Routes:
//! - `GET /health` reports liveness and which toolchains are installed
//! - `POST /execute` builds and runs one program
//! - `POST /execute/suite` runs one program against a list of test cases

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod payload;
pub mod route;
pub mod state;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use config::*;
pub use error::*;
pub use handler::*;
pub use middleware::*;
pub use payload::*;
pub use route::*;
pub use state::*;
