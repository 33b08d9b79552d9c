//! Configuration module for the codebox server.
//!
//! This module handles:
//! - The listen address
//! - Allowed CORS origins
//! - The admission-control limit
//! - The executor settings the server hands to every request

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroUsize,
    path::PathBuf,
};

use codebox_core::ExecutorConfig;
use getset::Getters;

use crate::{ServerError, ServerResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Settings for one running server.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Config {
    /// Address to listen on
    addr: SocketAddr,

    /// Origins allowed to call the API from a browser, `*` for any
    cors_origins: Vec<String>,

    /// Executions allowed to run at the same time
    max_concurrency: usize,

    /// Settings for the executor
    executor: ExecutorConfig,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Config {
    /// Create a new configuration.
    ///
    /// Executor settings come from the `CODEBOX_*` environment, with `workspace_root` taking
    /// precedence when given. `max_concurrency` defaults to the host's available parallelism.
    pub fn new(
        host: IpAddr,
        port: u16,
        workspace_root: Option<PathBuf>,
        max_concurrency: Option<usize>,
        cors_origins: Vec<String>,
    ) -> ServerResult<Self> {
        let mut executor = ExecutorConfig::from_env()?;
        if let Some(root) = workspace_root {
            executor = executor.with_workspace_root(root);
        }
        executor.validate()?;

        let max_concurrency = match max_concurrency {
            Some(0) => {
                return Err(ServerError::ConfigError(
                    "max concurrency must be at least 1".to_string(),
                ))
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            cors_origins,
            max_concurrency,
            executor,
        })
    }

    /// A configuration with an explicit executor, used when embedding the server.
    pub fn with_executor(
        addr: SocketAddr,
        executor: ExecutorConfig,
        max_concurrency: usize,
    ) -> ServerResult<Self> {
        if max_concurrency == 0 {
            return Err(ServerError::ConfigError(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        executor.validate()?;

        Ok(Self {
            addr,
            cors_origins: Vec::new(),
            max_concurrency,
            executor,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
