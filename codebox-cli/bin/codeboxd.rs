use std::sync::Arc;

use clap::Parser;
use codebox_cli::{init_tracing, log_level, CodeboxCliResult, CodeboxdArgs};
use codebox_server::{route, state::AppState, Config};
use codebox_utils::CHECKMARK;

//--------------------------------------------------------------------------------------------------
// Functions: Main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
pub async fn main() -> CodeboxCliResult<()> {
    // Load .env before parsing so it can supply argument fallbacks
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("{} failed to load .env: {}", &*codebox_utils::CROSS, e);
        }
    }

    let args = CodeboxdArgs::parse();

    log_level(&args.verbosity);
    init_tracing("info");

    let config = Arc::new(Config::new(
        args.host,
        args.port,
        args.workspace_root,
        args.max_concurrency,
        args.cors_origins,
    )?);

    let state = AppState::new(config.clone())?;
    for availability in state.get_executor().get_registry().availability() {
        if !availability.available {
            tracing::warn!(
                "{} toolchain not found: missing {}",
                availability.language,
                availability.missing.join(", ")
            );
        }
    }

    let cors = route::cors_layer(config.get_cors_origins())?;
    let app = route::create_router(state).layer(cors);

    tracing::info!(
        "Starting server on {} with {} execution slots, workspaces under {}",
        config.get_addr(),
        config.get_max_concurrency(),
        config.get_executor().get_workspace_root().display()
    );
    println!(
        "{} Server listening on {}",
        &*CHECKMARK,
        console::style(config.get_addr()).yellow()
    );

    let listener = tokio::net::TcpListener::bind(config.get_addr()).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
