//! Tracing setup for the CLI.
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! takes precedence unless a level was given explicitly with `-v`/`-q`.

use std::io::{self, IsTerminal};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

const CRATES: [&str; 5] = [
    "jugglegraph",
    "jugglegraph_state",
    "jugglegraph_layout",
    "jugglegraph_engine",
    "jugglegraph_ascii_render",
];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Honour `RUST_LOG` when it is set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: io::stderr().is_terminal(),
        }
    }
}

pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();
    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(layer)
        .try_init()
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    // Dependencies stay at warn; our crates follow the requested level.
    let level = config.level_filter.to_string().to_lowercase();
    let directives: Vec<String> = CRATES.iter().map(|krate| format!("{krate}={level}")).collect();
    EnvFilter::new(format!("warn,{}", directives.join(",")))
}
