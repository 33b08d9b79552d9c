use std::{io::Write, path::PathBuf};

use clap::Parser;
use codebox_cli::{
    exit_code_for, init_tracing, log_level, CodeboxArgs, CodeboxCliResult, CodeboxSubcommand,
};
use codebox_core::{ExecutionRequest, Executor, ExecutorConfig, Language, Phase, Registry};
use codebox_utils::{CHECKMARK, CROSS};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> CodeboxCliResult<()> {
    let args = CodeboxArgs::parse();

    log_level(&args.verbosity);
    init_tracing("warn");

    match args.subcommand {
        CodeboxSubcommand::Run {
            language,
            file,
            stdin,
            stdin_file,
            timeout,
            json,
        } => {
            let code = run_subcommand(language, file, stdin, stdin_file, timeout, json).await?;
            std::process::exit(code);
        }
        CodeboxSubcommand::Languages => languages_subcommand()?,
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

async fn run_subcommand(
    language: Language,
    file: PathBuf,
    stdin: Option<String>,
    stdin_file: Option<PathBuf>,
    timeout: Option<u64>,
    json: bool,
) -> CodeboxCliResult<i32> {
    let code = tokio::fs::read_to_string(&file).await?;
    let stdin = match (stdin, stdin_file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => String::new(),
    };

    let executor = Executor::new(ExecutorConfig::from_env()?)?;
    let request = ExecutionRequest::builder()
        .language(language)
        .code(code)
        .stdin(stdin)
        .timeout_ms_opt(timeout)
        .build();

    tracing::info!("running {} with {}", file.display(), language);
    let result = executor.execute(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result.stdout);
        eprint!("{}", result.stderr);

        if result.phase == Some(Phase::Build) {
            eprintln!("{} build failed", &*CROSS);
        }
        if result.timed_out {
            eprintln!("{} timed out after {}ms", &*CROSS, result.duration_ms);
        }
        if result.truncated {
            eprintln!("{} output truncated", &*CROSS);
        }
    }

    std::io::stdout().flush()?;
    Ok(exit_code_for(&result))
}

fn languages_subcommand() -> CodeboxCliResult<()> {
    let registry = Registry::builtin();

    for availability in registry.availability() {
        let profile = registry.resolve(availability.language)?;
        let mark = if availability.available {
            &*CHECKMARK
        } else {
            &*CROSS
        };

        println!(
            "{} {} {}",
            mark,
            console::style(format!("{:<10}", availability.language)).bold(),
            profile.get_run()
        );

        if let Some(build) = profile.get_build() {
            println!("    build: {}", build);
        }
        if !availability.missing.is_empty() {
            println!(
                "    missing: {}",
                console::style(availability.missing.join(", ")).yellow()
            );
        }
    }

    Ok(())
}
