//! Running one program against an ordered list of test cases.
//!
//! Each case feeds its input to a fresh execution and compares the program's stdout with the
//! expected output after normalization. Cases run sequentially and evaluation stops at the first
//! failing case.

use serde::{Deserialize, Serialize};

use crate::{CodeboxResult, ExecutionResult, Executor, Language};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One input and the output it must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Text fed to the program's stdin
    #[serde(default)]
    pub input: String,

    /// What the program must print
    pub expected_output: String,

    /// Per-case timeout, overriding the suite's
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

/// The outcome of one evaluated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    /// One-based position of the case in the suite
    pub case: usize,

    /// The input the case was run with
    pub input: String,

    /// The output the case expected
    pub expected: String,

    /// What the execution produced
    #[serde(flatten)]
    pub result: ExecutionResult,

    /// Whether the case passed
    pub pass: bool,
}

/// The outcome of a whole suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    /// Number of cases in the suite
    pub total: usize,

    /// Whether every case ran and passed
    pub passed: bool,

    /// Outcomes of the cases that were run, in order
    pub results: Vec<CaseOutcome>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Removes carriage returns and surrounding whitespace.
pub fn normalize_output(output: &str) -> String {
    output.replace('\r', "").trim().to_string()
}

/// Whether `result` completed cleanly and printed `expected`.
pub fn passes(result: &ExecutionResult, expected: &str) -> bool {
    result.succeeded() && normalize_output(&result.stdout) == normalize_output(expected)
}

/// Runs `code` against every case in order, stopping at the first failure.
///
/// Cases without their own time limit use `timeout_ms`. Errors that prevent an execution from
/// happening at all (unsupported language, spawn failure) abort the suite.
pub async fn run_suite(
    executor: &Executor,
    language: Language,
    code: &str,
    cases: &[TestCase],
    timeout_ms: Option<u64>,
) -> CodeboxResult<SuiteReport> {
    let mut results = Vec::with_capacity(cases.len());

    for (index, case) in cases.iter().enumerate() {
        let result = executor
            .execute_code(
                language,
                code,
                case.input.as_str(),
                case.time_limit_ms.or(timeout_ms),
            )
            .await?;

        let pass = passes(&result, &case.expected_output);
        tracing::debug!("case {} of {}: pass = {}", index + 1, cases.len(), pass);

        results.push(CaseOutcome {
            case: index + 1,
            input: case.input.clone(),
            expected: case.expected_output.clone(),
            result,
            pass,
        });

        if !pass {
            break;
        }
    }

    let passed = results.len() == cases.len() && results.iter().all(|outcome| outcome.pass);

    Ok(SuiteReport {
        total: cases.len(),
        passed,
        results,
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
