//! Middleware components for the codebox server.

use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::IntoResponse,
};

//--------------------------------------------------------------------------------------------------
// Middleware Functions
//--------------------------------------------------------------------------------------------------

/// Log incoming requests and the status they were answered with
pub async fn logging_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    tracing::info!("Request: {} {}", method, uri);

    let response = next.run(req).await;

    tracing::info!(
        "Response: {} {}: {} in {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    Ok(response)
}
