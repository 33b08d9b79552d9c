//! The execution pipeline.
//!
//! This module drives one request through its stages:
//! - Validating: the language must be in the registry, the code non-empty, the timeout sane
//! - Preparing: a fresh workspace receives the source file
//! - Building: the profile's build command, if any
//! - Running: the profile's run command against the request's stdin
//! - Completed: the workspace is released and the producing step's result returned
//!
//! A failed or timed out build short-circuits the pipeline; its result is returned as the
//! overall result and the run command is never invoked.

use std::{fmt, sync::Arc, time::Duration};

use tracing::Instrument;

use crate::{
    runner::{self, RunOptions},
    CodeboxError, CodeboxResult, ExecutionRequest, ExecutionResult, ExecutorConfig, Language,
    LanguageProfile, Phase, Registry, Workspace,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Builds and runs programs according to a [`Registry`] and an [`ExecutorConfig`].
///
/// The executor holds no per-request state and is cheap to clone, so one instance can serve any
/// number of concurrent executions.
#[derive(Debug, Clone)]
pub struct Executor {
    config: Arc<ExecutorConfig>,
    registry: Arc<Registry>,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Validating,
    Preparing,
    Building,
    Running,
    Completed,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Executor {
    /// Creates an executor backed by the built-in language registry.
    pub fn new(config: ExecutorConfig) -> CodeboxResult<Self> {
        Self::with_registry(config, Registry::builtin())
    }

    /// Creates an executor backed by a custom registry.
    pub fn with_registry(config: ExecutorConfig, registry: Arc<Registry>) -> CodeboxResult<Self> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            registry,
        })
    }

    /// The configuration in use.
    pub fn get_config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// The registry in use.
    pub fn get_registry(&self) -> &Registry {
        &self.registry
    }

    /// Builds and runs the request's program.
    ///
    /// ## Example
    /// ```no_run
    /// use codebox_core::{ExecutionRequest, Executor, ExecutorConfig, Language};
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let executor = Executor::new(ExecutorConfig::default())?;
    /// let request = ExecutionRequest::builder()
    ///     .language(Language::Python)
    ///     .code("print('hello')")
    ///     .build();
    ///
    /// let result = executor.execute(&request).await?;
    /// assert_eq!(result.stdout, "hello\n");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, request: &ExecutionRequest) -> CodeboxResult<ExecutionResult> {
        let language = request.get_language();

        enter(Stage::Validating, language);
        let profile = self.registry.resolve(language)?;

        if request.get_code().is_empty() {
            return Err(CodeboxError::InvalidInput(
                "code must not be empty".to_string(),
            ));
        }

        let timeout = self.config.clamp_timeout(request.get_timeout_ms())?;

        enter(Stage::Preparing, language);
        let workspace = Workspace::create(self.config.get_workspace_root()).await?;

        let span = tracing::info_span!("execution", id = %workspace.id(), %language);
        let outcome = self
            .build_and_run(profile, request, &workspace, timeout)
            .instrument(span)
            .await;

        workspace.release().await;
        enter(Stage::Completed, language);

        outcome
    }

    /// Shorthand for [`Executor::execute`] taking the request fields directly.
    pub async fn execute_code(
        &self,
        language: Language,
        code: impl Into<String>,
        stdin: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> CodeboxResult<ExecutionResult> {
        let request = ExecutionRequest::builder()
            .language(language)
            .code(code)
            .stdin(stdin)
            .timeout_ms_opt(timeout_ms)
            .build();

        self.execute(&request).await
    }

    async fn build_and_run(
        &self,
        profile: &LanguageProfile,
        request: &ExecutionRequest,
        workspace: &Workspace,
        timeout: Duration,
    ) -> CodeboxResult<ExecutionResult> {
        let language = request.get_language();

        workspace
            .write_source(profile.get_source_file(), request.get_code())
            .await?;

        if let Some(build) = profile.get_build() {
            enter(Stage::Building, language);

            let argv = build.render(workspace.path());
            let result = runner::run(&argv, &self.options(workspace, String::new(), timeout))
                .await?
                .with_phase(Phase::Build);

            if !result.succeeded() {
                tracing::debug!(
                    "build failed (exit code {:?}, timed out {}), skipping run",
                    result.exit_code,
                    result.timed_out
                );
                return Ok(result);
            }
        }

        enter(Stage::Running, language);

        let argv = profile.get_run().render(workspace.path());
        let result = runner::run(
            &argv,
            &self.options(workspace, request.get_stdin().clone(), timeout),
        )
        .await?
        .with_phase(Phase::Run);

        tracing::debug!(
            "run finished in {}ms (exit code {:?}, timed out {})",
            result.duration_ms,
            result.exit_code,
            result.timed_out
        );

        Ok(result)
    }

    fn options(&self, workspace: &Workspace, stdin: String, timeout: Duration) -> RunOptions {
        RunOptions::builder()
            .cwd(workspace.path())
            .stdin(stdin)
            .timeout(timeout)
            .max_output_bytes(*self.config.get_max_output_bytes())
            .kill_grace(self.config.kill_grace())
            .build()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Preparing => "preparing",
            Stage::Building => "building",
            Stage::Running => "running",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn enter(stage: Stage, language: Language) {
    tracing::debug!("{} {} execution", stage, language);
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Instant};

    use crate::{CommandTemplate, LanguageProfile};

    use super::*;

    /// A registry whose profiles only need `/bin/sh`.
    ///
    /// - `python` runs the source as a shell script
    /// - `cpp` "compiles" by copying the source to `main` unless it contains `SYNTAX ERROR`
    fn shell_registry() -> Arc<Registry> {
        Arc::new(
            Registry::new([
                LanguageProfile::new(
                    Language::Python,
                    "main.py",
                    None,
                    CommandTemplate::new(["sh", "{workdir}/main.py"]),
                ),
                LanguageProfile::new(
                    Language::Cpp,
                    "main.cpp",
                    Some(CommandTemplate::new([
                        "sh",
                        "-c",
                        "if grep -q 'SYNTAX ERROR' {workdir}/main.cpp; then echo 'main.cpp:1: error' >&2; exit 1; fi; cp {workdir}/main.cpp {workdir}/main && chmod +x {workdir}/main",
                    ])),
                    CommandTemplate::new(["{workdir}/main"]),
                ),
            ])
            .unwrap(),
        )
    }

    fn executor(root: &Path) -> Executor {
        let config = ExecutorConfig::builder()
            .workspace_root(root)
            .min_timeout_ms(100)
            .build();
        Executor::with_registry(config, shell_registry()).unwrap()
    }

    fn leftover_workspaces(root: &Path) -> usize {
        std::fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_interpreted() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let result = executor
            .execute_code(Language::Python, "read x; echo \"echo $x\"", "42\n", None)
            .await
            .unwrap();

        assert_eq!(result.stdout, "echo 42\n");
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.phase, Some(Phase::Run));
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_execute_with_relative_workspace_root() {
        let root = std::path::PathBuf::from(format!(".tmp-executor-{}", uuid::Uuid::new_v4()));
        let executor = executor(&root);

        let result = executor
            .execute_code(Language::Python, "echo hello", "", None)
            .await
            .unwrap();

        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(leftover_workspaces(&root), 0);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_execute_build_then_run() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let result = executor
            .execute_code(Language::Cpp, "#!/bin/sh\necho compiled", "", None)
            .await
            .unwrap();

        assert_eq!(result.stdout, "compiled\n");
        assert_eq!(result.phase, Some(Phase::Run));
        assert!(result.succeeded());
    }

    #[tokio::test]
    async fn test_build_failure_skips_run() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let result = executor
            .execute_code(Language::Cpp, "SYNTAX ERROR", "", None)
            .await
            .unwrap();

        assert_eq!(result.phase, Some(Phase::Build));
        assert_eq!(result.exit_code, Some(1));
        assert!(result.stderr.contains("error"));
        assert!(result.stdout.is_empty());
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_clamped_and_reported() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let started = Instant::now();
        let result = executor
            .execute_code(Language::Python, "sleep 30", "", Some(300))
            .await
            .unwrap();

        assert!(result.timed_out);
        assert_eq!(result.exit_code, None);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(leftover_workspaces(root.path()), 0);

        // Above the maximum the clamp applies.
        let config = ExecutorConfig::builder()
            .workspace_root(root.path())
            .min_timeout_ms(100)
            .max_timeout_ms(400)
            .default_timeout_ms(400)
            .build();
        let bounded = Executor::with_registry(config, shell_registry()).unwrap();

        let started = Instant::now();
        let result = bounded
            .execute_code(Language::Python, "sleep 30", "", Some(60_000))
            .await
            .unwrap();
        assert!(result.timed_out);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_rejects_invalid_requests() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let unsupported = executor
            .execute_code(Language::Java, "class Main {}", "", None)
            .await
            .unwrap_err();
        assert!(matches!(unsupported, CodeboxError::UnsupportedLanguage(_)));
        assert!(unsupported.is_client_error());

        let empty = executor
            .execute_code(Language::Python, "", "", None)
            .await
            .unwrap_err();
        assert!(matches!(empty, CodeboxError::InvalidInput(_)));

        let zero_timeout = executor
            .execute_code(Language::Python, "echo hi", "", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(zero_timeout, CodeboxError::InvalidInput(_)));

        // Nothing was prepared for rejected requests.
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_spawn_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let registry = Registry::new([LanguageProfile::new(
            Language::Python,
            "main.py",
            None,
            CommandTemplate::new(["codebox-missing-python", "{workdir}/main.py"]),
        )])
        .unwrap();
        let config = ExecutorConfig::builder().workspace_root(root.path()).build();
        let executor = Executor::with_registry(config, Arc::new(registry)).unwrap();

        let err = executor
            .execute_code(Language::Python, "print(1)", "", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CodeboxError::SpawnFailure { .. }));
        assert!(!err.is_client_error());
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_executions_do_not_interfere() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let mut handles = Vec::new();
        for i in 0..8 {
            let executor = executor.clone();
            handles.push(tokio::spawn(async move {
                let code = format!("echo {i} > mine.txt; sleep 0.2; cat mine.txt; pwd");
                (
                    i,
                    executor
                        .execute_code(Language::Python, code, "", None)
                        .await
                        .unwrap(),
                )
            }));
        }

        let mut workdirs = std::collections::HashSet::new();
        for handle in handles {
            let (i, result) = handle.await.unwrap();
            let mut lines = result.stdout.lines();
            assert_eq!(lines.next(), Some(i.to_string().as_str()));
            workdirs.insert(lines.next().unwrap().to_string());
        }

        assert_eq!(workdirs.len(), 8);
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_repeated_execution_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let first = executor
            .execute_code(Language::Python, "echo same; echo warn >&2; exit 2", "", None)
            .await
            .unwrap();
        let second = executor
            .execute_code(Language::Python, "echo same; echo warn >&2; exit 2", "", None)
            .await
            .unwrap();

        assert_eq!(first.stdout, second.stdout);
        assert_eq!(first.stderr, second.stderr);
        assert_eq!(first.exit_code, second.exit_code);
        assert_eq!(leftover_workspaces(root.path()), 0);
    }

    #[tokio::test]
    async fn test_dropped_execution_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let executor = executor(root.path());

        let pending = executor.execute_code(Language::Python, "sleep 30", "", Some(10_000));
        let outcome = tokio::time::timeout(Duration::from_millis(300), pending).await;
        assert!(outcome.is_err());

        assert_eq!(leftover_workspaces(root.path()), 0);
    }
}
