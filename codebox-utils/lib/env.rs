//! Utility functions for working with environment variables.

use std::{path::PathBuf, str::FromStr};

use crate::{CodeboxUtilsError, CodeboxUtilsResult, WORKSPACE_SUBDIR};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Environment variable for the directory that holds per-execution workspaces
pub const WORKSPACE_ROOT_ENV_VAR: &str = "CODEBOX_WORKSPACE_ROOT";

/// Environment variable for the lower timeout bound in milliseconds
pub const MIN_TIMEOUT_ENV_VAR: &str = "CODEBOX_MIN_TIMEOUT_MS";

/// Environment variable for the upper timeout bound in milliseconds
pub const MAX_TIMEOUT_ENV_VAR: &str = "CODEBOX_MAX_TIMEOUT_MS";

/// Environment variable for the default timeout in milliseconds
pub const DEFAULT_TIMEOUT_ENV_VAR: &str = "CODEBOX_DEFAULT_TIMEOUT_MS";

/// Environment variable for the per-stream output cap in bytes
pub const MAX_OUTPUT_ENV_VAR: &str = "CODEBOX_MAX_OUTPUT_BYTES";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the directory that holds per-execution workspaces.
/// If the CODEBOX_WORKSPACE_ROOT environment variable is set, returns that path.
/// Otherwise, returns `.tmp` under the current working directory.
pub fn get_workspace_root_path() -> PathBuf {
    if let Ok(root) = std::env::var(WORKSPACE_ROOT_ENV_VAR) {
        PathBuf::from(root)
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(WORKSPACE_SUBDIR)
    }
}

/// Reads and parses an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or empty and an error when it is set to
/// something that does not parse as `T`.
pub fn get_env_parsed<T: FromStr>(var: &str) -> CodeboxUtilsResult<Option<T>> {
    match std::env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CodeboxUtilsError::InvalidEnvVar {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
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
    #[serial]
    fn test_get_env_parsed() {
        let var = "CODEBOX_TEST_PARSED";

        std::env::remove_var(var);
        assert_eq!(get_env_parsed::<u64>(var).unwrap(), None);

        std::env::set_var(var, " 1500 ");
        assert_eq!(get_env_parsed::<u64>(var).unwrap(), Some(1500));

        std::env::set_var(var, "");
        assert_eq!(get_env_parsed::<u64>(var).unwrap(), None);

        std::env::set_var(var, "soon");
        assert!(matches!(
            get_env_parsed::<u64>(var),
            Err(CodeboxUtilsError::InvalidEnvVar { .. })
        ));

        std::env::remove_var(var);
    }

    #[test]
    #[serial]
    fn test_workspace_root_env_override() {
        std::env::set_var(WORKSPACE_ROOT_ENV_VAR, "/srv/codebox/work");
        assert_eq!(get_workspace_root_path(), PathBuf::from("/srv/codebox/work"));

        std::env::remove_var(WORKSPACE_ROOT_ENV_VAR);
        assert!(get_workspace_root_path().ends_with(WORKSPACE_SUBDIR));
    }
}
