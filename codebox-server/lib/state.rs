//! Application state shared by every handler.

use std::sync::Arc;

use codebox_core::Executor;
use getset::Getters;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{config::Config, ServerError, ServerResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Application state structure
#[derive(Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct AppState {
    /// The application configuration
    config: Arc<Config>,

    /// The executor every request runs through
    executor: Executor,

    /// Free execution slots
    #[getset(skip)]
    slots: Arc<Semaphore>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AppState {
    /// Create a new application state instance with the built-in language registry.
    pub fn new(config: Arc<Config>) -> ServerResult<Self> {
        let executor = Executor::new(config.get_executor().clone())?;
        Ok(Self::with_executor(config, executor))
    }

    /// Create a state around an already-built executor.
    pub fn with_executor(config: Arc<Config>, executor: Executor) -> Self {
        let slots = Arc::new(Semaphore::new(*config.get_max_concurrency()));
        Self {
            config,
            executor,
            slots,
        }
    }

    /// Claims an execution slot, held until the returned permit is dropped.
    ///
    /// Fails with [`ServerError::Busy`] instead of queueing when every slot is taken.
    pub fn admit(&self) -> ServerResult<OwnedSemaphorePermit> {
        self.slots.clone().try_acquire_owned().map_err(|_| {
            tracing::warn!(
                "rejecting execution: all {} slots busy",
                self.config.get_max_concurrency()
            );
            ServerError::Busy
        })
    }

    /// Number of execution slots currently free.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}
