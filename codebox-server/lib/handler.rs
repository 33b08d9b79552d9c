//! Request handlers for the codebox server.
//!
//! Input is validated before an execution slot is claimed, so malformed requests are answered
//! even when the server is saturated.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use codebox_core::{suite, ExecutionRequest, Language};

use crate::{
    payload::{ExecuteRequest, ExecuteResponse, HealthResponse, SuiteRequest},
    state::AppState,
    ServerError, ServerResult,
};

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

/// Handler for health check
pub async fn health(State(state): State<AppState>) -> ServerResult<impl IntoResponse> {
    let languages = state.get_executor().get_registry().availability();

    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            languages,
        }),
    ))
}

/// Handler that builds and runs one program
pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let language = payload.language.parse::<Language>()?;
    validate_program(&state, &payload.code, [payload.timeout_ms])?;

    let _permit = state.admit()?;

    let request = ExecutionRequest::builder()
        .language(language)
        .code(payload.code)
        .stdin(payload.stdin)
        .timeout_ms_opt(payload.timeout_ms)
        .build();

    let result = state.get_executor().execute(&request).await?;
    tracing::info!(
        "executed {} program: exit code {:?}, timed out {}, {}ms",
        language,
        result.exit_code,
        result.timed_out,
        result.duration_ms
    );

    Ok((StatusCode::OK, Json(ExecuteResponse { result })))
}

/// Handler that runs one program against an ordered list of test cases
pub async fn execute_suite(
    State(state): State<AppState>,
    payload: Result<Json<SuiteRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let language = payload.language.parse::<Language>()?;

    if payload.cases.is_empty() {
        return Err(ServerError::ValidationError(
            "cases must not be empty".to_string(),
        ));
    }
    validate_program(
        &state,
        &payload.code,
        payload
            .cases
            .iter()
            .map(|case| case.time_limit_ms.or(payload.timeout_ms)),
    )?;

    // One slot covers the whole suite since its cases run one after another.
    let _permit = state.admit()?;

    let report = suite::run_suite(
        state.get_executor(),
        language,
        &payload.code,
        &payload.cases,
        payload.timeout_ms,
    )
    .await?;

    tracing::info!(
        "suite for {} program: {} of {} cases run, passed {}",
        language,
        report.results.len(),
        report.total,
        report.passed
    );

    Ok((StatusCode::OK, Json(report)))
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// Rejects requests the executor would refuse, so they never take an execution slot.
fn validate_program(
    state: &AppState,
    code: &str,
    timeouts: impl IntoIterator<Item = Option<u64>>,
) -> ServerResult<()> {
    if code.is_empty() {
        return Err(ServerError::ValidationError(
            "code must not be empty".to_string(),
        ));
    }

    let config = state.get_executor().get_config();
    for timeout_ms in timeouts {
        config.clamp_timeout(timeout_ms)?;
    }

    Ok(())
}
