//! Router configuration for the codebox server.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use codebox_utils::MAX_REQUEST_BODY_BYTES;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{handler, middleware as app_middleware, state::AppState, ServerError, ServerResult};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Create a new router with the given state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/execute", post(handler::execute))
        .route("/execute/suite", post(handler::execute_suite))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(app_middleware::logging_middleware))
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES)),
        )
        .with_state(state)
}

/// Build the CORS layer for the configured origins.
///
/// An empty list or a `*` entry allows any origin.
pub fn cors_layer(origins: &[String]) -> ServerResult<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ServerError::ConfigError(format!("invalid CORS origin: {origin}")))
        })
        .collect::<ServerResult<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
