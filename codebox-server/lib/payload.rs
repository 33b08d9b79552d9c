//! Request and response payload definitions for the codebox server.
//!
//! Field names are camelCase on the wire.

use codebox_core::{suite::TestCase, ExecutionResult, LanguageAvailability};
use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types: Requests
//--------------------------------------------------------------------------------------------------

/// Request payload for running one program
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Language identifier, e.g. `python`
    pub language: String,

    /// Program source
    pub code: String,

    /// Text fed to standard input
    #[serde(default)]
    pub stdin: String,

    /// Requested timeout, clamped by the server
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Request payload for running one program against a list of test cases
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRequest {
    /// Language identifier, e.g. `cpp`
    pub language: String,

    /// Program source
    pub code: String,

    /// Timeout for cases that do not carry their own
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Cases, evaluated in order
    pub cases: Vec<TestCase>,
}

//--------------------------------------------------------------------------------------------------
// Types: Responses
//--------------------------------------------------------------------------------------------------

/// Response payload for a single execution
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    /// What the program did
    pub result: ExecutionResult,
}

/// Response payload for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` when the server answers
    pub status: String,

    /// Toolchain availability per language
    pub languages: Vec<LanguageAvailability>,
}
