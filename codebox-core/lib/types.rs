//! Request and result value objects for an execution.

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::language::Language;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A request to build and run one program.
///
/// ## Example
/// ```
/// use codebox_core::{ExecutionRequest, Language};
///
/// let request = ExecutionRequest::builder()
///     .language(Language::Python)
///     .code("print(input())")
///     .stdin("42\n")
///     .timeout_ms(2_000)
///     .build();
///
/// assert_eq!(request.get_timeout_ms(), Some(2_000));
/// ```
#[derive(Debug, Clone, TypedBuilder, Getters, CopyGetters)]
pub struct ExecutionRequest {
    /// The language the source is written in.
    #[getset(get_copy = "pub with_prefix")]
    language: Language,

    /// The program source.
    #[builder(setter(into))]
    #[getset(get = "pub with_prefix")]
    code: String,

    /// Text fed to the program's standard input.
    #[builder(default, setter(into))]
    #[getset(get = "pub with_prefix")]
    stdin: String,

    /// Requested wall-clock limit per step, clamped by the executor.
    #[builder(default, setter(strip_option(fallback = timeout_ms_opt)))]
    #[getset(get_copy = "pub with_prefix")]
    timeout_ms: Option<u64>,
}

/// The step of the pipeline that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The compile step of a compiled language.
    Build,

    /// The step that runs the program against its stdin.
    Run,
}

/// The observable outcome of one build or run step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Captured standard output, possibly truncated.
    pub stdout: String,

    /// Captured standard error, possibly truncated.
    pub stderr: String,

    /// Exit code, absent when the process was killed before reporting one.
    pub exit_code: Option<i32>,

    /// Whether the step hit its timeout and was killed.
    pub timed_out: bool,

    /// Wall-clock milliseconds from spawn to exit or kill.
    pub duration_ms: u64,

    /// The step that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,

    /// The signal that terminated the process, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,

    /// Whether either stream exceeded the capture limit.
    #[serde(default)]
    pub truncated: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ExecutionResult {
    /// Whether the step ran to completion with exit code zero.
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Tags the result with the step that produced it.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
