use std::{net::IpAddr, path::PathBuf};

use clap::Parser;
use codebox_utils::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

use crate::{styles, VerbosityArgs};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Arguments for the codeboxd command
#[derive(Debug, Parser)]
#[command(name = "codeboxd", author, version, styles=styles::styles())]
pub struct CodeboxdArgs {
    /// Address to bind to
    #[arg(long, env = "CODEBOX_HOST", default_value = DEFAULT_SERVER_HOST)]
    pub host: IpAddr,

    /// Port number to listen on
    #[arg(long, env = "CODEBOX_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Directory under which per-execution workspaces are created
    #[arg(short = 'w', long)]
    pub workspace_root: Option<PathBuf>,

    /// Executions allowed to run at once, defaults to the number of CPUs
    #[arg(long, env = "CODEBOX_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Allowed CORS origin, repeatable or comma separated; `*` allows any
    #[arg(long = "cors-origin", env = "CORS_ORIGIN", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbosity: VerbosityArgs,
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
