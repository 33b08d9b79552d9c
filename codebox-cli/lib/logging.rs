use tracing_subscriber::EnvFilter;

use crate::VerbosityArgs;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const LOG_TARGETS: [&str; 5] = [
    "codebox",
    "codeboxd",
    "codebox_cli",
    "codebox_core",
    "codebox_server",
];

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VerbosityArgs {
    /// The most verbose level requested on the command line, if any.
    pub fn level(&self) -> Option<&'static str> {
        if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else if self.info {
            Some("info")
        } else if self.warn {
            Some("warn")
        } else if self.error {
            Some("error")
        } else {
            None
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Sets `RUST_LOG` for the codebox crates when a level flag was passed.
pub fn log_level(verbosity: &VerbosityArgs) {
    if let Some(level) = verbosity.level() {
        std::env::set_var("RUST_LOG", log_directive(level));
    }
}

/// Installs the global tracing subscriber, filtering with `RUST_LOG` or `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(default_level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_directive(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
