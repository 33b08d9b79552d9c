use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use codebox_core::Language;

use crate::styles;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Build and run programs in throwaway workspaces
#[derive(Debug, Parser)]
#[command(name = "codebox", author, version, styles=styles::styles())]
pub struct CodeboxArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: CodeboxSubcommand,

    /// Logging verbosity
    #[command(flatten)]
    pub verbosity: VerbosityArgs,
}

/// Log level flags shared by the binaries
#[derive(Debug, Default, Args)]
pub struct VerbosityArgs {
    /// Show logs with error level
    #[arg(long, global = true)]
    pub error: bool,

    /// Show logs with warn level
    #[arg(long, global = true)]
    pub warn: bool,

    /// Show logs with info level
    #[arg(long, global = true)]
    pub info: bool,

    /// Show logs with debug level
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show logs with trace level
    #[arg(long, global = true)]
    pub trace: bool,
}

/// Available subcommands for `codebox`
#[derive(Debug, Subcommand)]
pub enum CodeboxSubcommand {
    /// Build and run a source file
    Run {
        /// Language of the source file
        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Path to the source file
        file: PathBuf,

        /// Text to feed to the program's standard input
        #[arg(long, conflicts_with = "stdin_file")]
        stdin: Option<String>,

        /// File whose contents are fed to the program's standard input
        #[arg(long)]
        stdin_file: Option<PathBuf>,

        /// Timeout per step in milliseconds, clamped to the configured bounds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Print the full result as JSON instead of the program's output
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List supported languages and whether their toolchains are installed
    Languages,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn parse_language(value: &str) -> Result<Language, String> {
    value.parse::<Language>().map_err(|e| e.to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
