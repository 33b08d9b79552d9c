//! End-to-end runs against the real toolchains.
//!
//! Each test skips a language whose compiler or interpreter is not installed on the host.

use std::time::{Duration, Instant};

use codebox_core::{
    CodeboxError, ExecutionResult, Executor, ExecutorConfig, Language, Phase, Registry,
};
use tempfile::TempDir;

//--------------------------------------------------------------------------------------------------
// Helpers
//--------------------------------------------------------------------------------------------------

/// Generous enough for JVM start-up and ts-node type checking.
const SLOW_TIMEOUT_MS: u64 = 10_000;

fn toolchain_ready(language: Language) -> bool {
    let available = Registry::builtin()
        .availability()
        .into_iter()
        .any(|entry| entry.language == language && entry.available);

    // npx would otherwise try to download ts-node.
    let ready = available && (language != Language::TypeScript || which::which("ts-node").is_ok());
    if !ready {
        eprintln!("skipping {language}: toolchain not installed");
    }
    ready
}

fn executor() -> (TempDir, Executor) {
    let root = tempfile::tempdir().unwrap();
    let config = ExecutorConfig::builder().workspace_root(root.path()).build();
    (root, Executor::new(config).unwrap())
}

fn leftover_workspaces(root: &TempDir) -> usize {
    std::fs::read_dir(root.path()).unwrap().count()
}

fn hello_world(language: Language) -> &'static str {
    match language {
        Language::JavaScript => r#"console.log("Hello, World!");"#,
        Language::TypeScript => {
            r#"const greeting: string = "Hello, World!";
console.log(greeting);"#
        }
        Language::Python => r#"print("Hello, World!")"#,
        Language::Cpp => {
            r#"#include <iostream>
int main() {
    std::cout << "Hello, World!" << std::endl;
    return 0;
}"#
        }
        Language::Java => {
            r#"public class Main {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}"#
        }
    }
}

fn echo_line(language: Language) -> &'static str {
    match language {
        Language::JavaScript => {
            r#"const input = require("fs").readFileSync(0, "utf8");
console.log(input.trim());"#
        }
        Language::TypeScript => {
            r#"declare const require: any;
const input: string = require("fs").readFileSync(0, "utf8");
console.log(input.trim());"#
        }
        Language::Python => "print(input())",
        Language::Cpp => {
            r#"#include <iostream>
#include <string>
int main() {
    std::string line;
    std::getline(std::cin, line);
    std::cout << line << std::endl;
}"#
        }
        Language::Java => {
            r#"import java.util.Scanner;
public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        System.out.println(in.nextLine());
    }
}"#
        }
    }
}

fn spin_forever(language: Language) -> &'static str {
    match language {
        Language::JavaScript | Language::TypeScript => "while (true) {}",
        Language::Python => "while True:\n    pass",
        Language::Cpp => {
            r#"int main() {
    volatile unsigned long n = 0;
    while (true) { n++; }
}"#
        }
        Language::Java => {
            r#"public class Main {
    public static void main(String[] args) {
        while (true) {}
    }
}"#
        }
    }
}

async fn run(
    executor: &Executor,
    language: Language,
    code: &str,
    stdin: &str,
    timeout_ms: u64,
) -> ExecutionResult {
    executor
        .execute_code(language, code, stdin, Some(timeout_ms))
        .await
        .unwrap()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_hello_world_in_every_language() {
    let (root, executor) = executor();

    for language in Language::ALL {
        if !toolchain_ready(language) {
            continue;
        }

        let result = run(&executor, language, hello_world(language), "", SLOW_TIMEOUT_MS).await;
        assert_eq!(result.exit_code, Some(0), "{language}: {result:?}");
        assert!(!result.timed_out, "{language}");
        assert!(result.stdout.contains("Hello, World!"), "{language}");
        assert_eq!(result.phase, Some(Phase::Run));
    }

    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_echo_stdin_in_every_language() {
    let (root, executor) = executor();

    for language in Language::ALL {
        if !toolchain_ready(language) {
            continue;
        }

        let result = run(&executor, language, echo_line(language), "42\n", SLOW_TIMEOUT_MS).await;
        assert!(result.stdout.contains("42"), "{language}: {result:?}");
        assert_eq!(result.exit_code, Some(0), "{language}");
    }

    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_cpp_syntax_error_stops_at_build() {
    if !toolchain_ready(Language::Cpp) {
        return;
    }
    let (root, executor) = executor();

    let result = run(
        &executor,
        Language::Cpp,
        "int main() { return 0 }",
        "",
        SLOW_TIMEOUT_MS,
    )
    .await;

    assert_eq!(result.phase, Some(Phase::Build));
    assert_ne!(result.exit_code, Some(0));
    assert!(!result.stderr.is_empty());
    assert!(result.stdout.is_empty());
    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_java_compile_error_stops_at_build() {
    if !toolchain_ready(Language::Java) {
        return;
    }
    let (_root, executor) = executor();

    let result = run(
        &executor,
        Language::Java,
        "public class Main { void broken( }",
        "",
        SLOW_TIMEOUT_MS,
    )
    .await;

    assert_eq!(result.phase, Some(Phase::Build));
    assert!(!result.succeeded());
    assert!(!result.stderr.is_empty());
}

#[tokio::test]
async fn test_infinite_loops_time_out() {
    let (root, executor) = executor();
    let timeout_ms = 1_000;

    for language in Language::ALL {
        if !toolchain_ready(language) {
            continue;
        }

        let started = Instant::now();
        let result = run(&executor, language, spin_forever(language), "", timeout_ms).await;

        assert!(result.timed_out, "{language}: {result:?}");
        assert_eq!(result.exit_code, None, "{language}");
        // A build step and a run step may each use the full timeout.
        assert!(
            started.elapsed() < Duration::from_millis(2 * timeout_ms + 3_000),
            "{language} overshot: {:?}",
            started.elapsed()
        );
    }

    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_runtime_error_is_a_result() {
    if !toolchain_ready(Language::Python) {
        return;
    }
    let (_root, executor) = executor();

    let result = run(&executor, Language::Python, "raise SystemExit(7)", "", 5_000).await;
    assert_eq!(result.exit_code, Some(7));
    assert!(!result.timed_out);

    let result = run(&executor, Language::Python, "1 / 0", "", 5_000).await;
    assert_eq!(result.exit_code, Some(1));
    assert!(result.stderr.contains("ZeroDivisionError"));
}

#[tokio::test]
async fn test_huge_output_is_capped() {
    if !toolchain_ready(Language::Python) {
        return;
    }
    let (_root, executor) = executor();
    let cap = *executor.get_config().get_max_output_bytes();

    let result = run(
        &executor,
        Language::Python,
        "import sys\nsys.stdout.write('y' * (8 * 1024 * 1024))",
        "",
        SLOW_TIMEOUT_MS,
    )
    .await;

    assert!(!result.timed_out);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout.len(), cap);
    assert!(result.truncated);
}

#[tokio::test]
async fn test_concurrent_python_requests() {
    if !toolchain_ready(Language::Python) {
        return;
    }
    let (root, executor) = executor();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move {
                let code = format!("import time\ntime.sleep(0.1)\nprint({i} * {i})");
                let result = executor
                    .execute_code(Language::Python, code, "", Some(5_000))
                    .await
                    .unwrap();
                (i, result)
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        assert_eq!(result.stdout.trim(), (i * i).to_string());
    }

    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    if !toolchain_ready(Language::Python) {
        return;
    }
    let (root, executor) = executor();
    let code = "import sys\nprint('out')\nprint('err', file=sys.stderr)\nsys.exit(4)";

    let first = run(&executor, Language::Python, code, "", 5_000).await;
    let second = run(&executor, Language::Python, code, "", 5_000).await;

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stderr, second.stderr);
    assert_eq!(first.exit_code, Some(4));
    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(leftover_workspaces(&root), 0);
}

#[tokio::test]
async fn test_empty_code_is_rejected() {
    let (root, executor) = executor();

    let err = executor
        .execute_code(Language::Python, "", "", None)
        .await
        .unwrap_err();

    assert!(matches!(err, CodeboxError::InvalidInput(_)));
    assert_eq!(leftover_workspaces(&root), 0);
}
