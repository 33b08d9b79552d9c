use codebox_core::ExecutionResult;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Exit code reported when the program hit its timeout, as `timeout(1)` does.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// The process exit code `codebox run` should finish with for `result`.
///
/// Signal deaths follow the shell convention of `128 + signal`.
pub fn exit_code_for(result: &ExecutionResult) -> i32 {
    if result.timed_out {
        return TIMEOUT_EXIT_CODE;
    }

    match (result.exit_code, result.signal) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
