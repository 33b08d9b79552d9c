//! Configuration for the execution pipeline.
//!
//! This module handles:
//! - Timeout bounds and the timeout clamp
//! - The per-stream output cap
//! - The root directory that holds workspaces
//! - Environment-based overrides

use std::{path::PathBuf, time::Duration};

use codebox_utils::{
    env::{self, get_env_parsed},
    DEFAULT_KILL_GRACE_MS, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS,
    MIN_TIMEOUT_MS,
};
use getset::Getters;
use typed_builder::TypedBuilder;

use crate::{CodeboxError, CodeboxResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Settings consumed by the [`Executor`](crate::Executor).
#[derive(Debug, Clone, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ExecutorConfig {
    /// Directory under which every execution gets its own workspace
    #[builder(default = env::get_workspace_root_path(), setter(into))]
    workspace_root: PathBuf,

    /// Smallest timeout a request can be clamped to
    #[builder(default = MIN_TIMEOUT_MS)]
    min_timeout_ms: u64,

    /// Largest timeout a request can be clamped to
    #[builder(default = MAX_TIMEOUT_MS)]
    max_timeout_ms: u64,

    /// Timeout used when a request carries none
    #[builder(default = DEFAULT_TIMEOUT_MS)]
    default_timeout_ms: u64,

    /// Bytes captured from each of stdout and stderr
    #[builder(default = DEFAULT_MAX_OUTPUT_BYTES)]
    max_output_bytes: usize,

    /// How long output readers may drain after a process is gone
    #[builder(default = DEFAULT_KILL_GRACE_MS)]
    kill_grace_ms: u64,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ExecutorConfig {
    /// Builds a configuration from the defaults and any `CODEBOX_*` environment overrides.
    pub fn from_env() -> CodeboxResult<Self> {
        let mut config = Self::default();

        if let Some(ms) = get_env_parsed::<u64>(env::MIN_TIMEOUT_ENV_VAR)? {
            config.min_timeout_ms = ms;
        }

        if let Some(ms) = get_env_parsed::<u64>(env::MAX_TIMEOUT_ENV_VAR)? {
            config.max_timeout_ms = ms;
        }

        if let Some(ms) = get_env_parsed::<u64>(env::DEFAULT_TIMEOUT_ENV_VAR)? {
            config.default_timeout_ms = ms;
        }

        if let Some(bytes) = get_env_parsed::<usize>(env::MAX_OUTPUT_ENV_VAR)? {
            config.max_output_bytes = bytes;
        }

        config.validate()?;
        Ok(config)
    }

    /// Replaces the workspace root.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Checks that the bounds are consistent.
    pub fn validate(&self) -> CodeboxResult<()> {
        if self.min_timeout_ms == 0 {
            return Err(CodeboxError::Config(
                "minimum timeout must be greater than zero".to_string(),
            ));
        }

        if self.min_timeout_ms > self.max_timeout_ms {
            return Err(CodeboxError::Config(format!(
                "minimum timeout {}ms exceeds maximum timeout {}ms",
                self.min_timeout_ms, self.max_timeout_ms
            )));
        }

        if !(self.min_timeout_ms..=self.max_timeout_ms).contains(&self.default_timeout_ms) {
            return Err(CodeboxError::Config(format!(
                "default timeout {}ms is outside [{}, {}]",
                self.default_timeout_ms, self.min_timeout_ms, self.max_timeout_ms
            )));
        }

        if self.max_output_bytes == 0 {
            return Err(CodeboxError::Config(
                "output cap must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolves a requested timeout into the configured range.
    ///
    /// A missing timeout falls back to the default. Zero is rejected as malformed.
    pub fn clamp_timeout(&self, requested_ms: Option<u64>) -> CodeboxResult<Duration> {
        let ms = match requested_ms {
            Some(0) => {
                return Err(CodeboxError::InvalidInput(
                    "timeout must be a positive number of milliseconds".to_string(),
                ))
            }
            Some(ms) => ms.clamp(self.min_timeout_ms, self.max_timeout_ms),
            None => self.default_timeout_ms,
        };

        Ok(Duration::from_millis(ms))
    }

    /// The grace period as a [`Duration`].
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_clamp_timeout() {
        let config = ExecutorConfig::default();

        assert_eq!(
            config.clamp_timeout(None).unwrap(),
            Duration::from_millis(3_000)
        );
        assert_eq!(
            config.clamp_timeout(Some(100)).unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(
            config.clamp_timeout(Some(60_000)).unwrap(),
            Duration::from_millis(10_000)
        );
        assert_eq!(
            config.clamp_timeout(Some(1_234)).unwrap(),
            Duration::from_millis(1_234)
        );
        assert!(matches!(
            config.clamp_timeout(Some(0)),
            Err(CodeboxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inconsistent_bounds() {
        let inverted = ExecutorConfig::builder()
            .min_timeout_ms(5_000)
            .max_timeout_ms(1_000)
            .default_timeout_ms(2_000)
            .build();
        assert!(matches!(inverted.validate(), Err(CodeboxError::Config(_))));

        let default_out_of_range = ExecutorConfig::builder().default_timeout_ms(20_000).build();
        assert!(default_out_of_range.validate().is_err());

        let zero_min = ExecutorConfig::builder()
            .min_timeout_ms(0)
            .default_timeout_ms(0)
            .build();
        assert!(zero_min.validate().is_err());

        let no_output = ExecutorConfig::builder().max_output_bytes(0).build();
        assert!(no_output.validate().is_err());

        assert!(ExecutorConfig::default().validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var(env::MAX_TIMEOUT_ENV_VAR, "20000");
        std::env::set_var(env::MAX_OUTPUT_ENV_VAR, "4096");

        let config = ExecutorConfig::from_env().unwrap();
        assert_eq!(*config.get_max_timeout_ms(), 20_000);
        assert_eq!(*config.get_max_output_bytes(), 4096);
        assert_eq!(*config.get_min_timeout_ms(), MIN_TIMEOUT_MS);

        std::env::set_var(env::MAX_TIMEOUT_ENV_VAR, "100");
        assert!(ExecutorConfig::from_env().is_err());

        std::env::remove_var(env::MAX_TIMEOUT_ENV_VAR);
        std::env::remove_var(env::MAX_OUTPUT_ENV_VAR);
    }
}
