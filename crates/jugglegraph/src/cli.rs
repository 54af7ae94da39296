//! Command-line definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use jugglegraph_engine::{EngineConfig, RetryPolicy};
use jugglegraph_state::LabelFlags;

#[derive(Parser)]
#[command(
    name = "jugglegraph",
    version,
    about = "Explore juggling state graphs and build siteswap patterns"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q to silence).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the full state graph and draw it.
    Graph(GraphArgs),
    /// List the throws available from one state.
    Throws(ThrowsArgs),
    /// Print the state transition table.
    Table(TableArgs),
    /// Build a pattern throw by throw.
    Build(BuildArgs),
}

#[derive(Args)]
pub struct EngineArgs {
    /// Base URL of the engine service. Without it the URL comes from
    /// JUGGLEGRAPH_ENGINE_URL, falling back to http://localhost:3000.
    #[arg(long = "engine-url", value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(
        long = "timeout",
        value_name = "SECS",
        default_value_t = 30,
        global = true
    )]
    pub timeout_secs: u64,

    /// How often a failed request is retried on server or network errors.
    #[arg(long = "retries", default_value_t = 3, global = true)]
    pub retries: u32,
}

impl EngineArgs {
    pub fn config(&self) -> EngineConfig {
        let config = match &self.url {
            Some(url) => EngineConfig::new(url.clone()),
            None => EngineConfig::from_env(),
        };
        config
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(RetryPolicy {
                max_retries: self.retries,
                ..RetryPolicy::default()
            })
    }
}

#[derive(Args, Clone, Copy)]
pub struct PatternArgs {
    /// Number of props.
    #[arg(long = "props", short = 'n')]
    pub props: u32,

    /// Highest throw allowed.
    #[arg(long = "max-height", short = 'm')]
    pub max_height: u32,
}

#[derive(Args, Clone, Copy)]
pub struct LabelArgs {
    /// Print binary labels lowest slot first.
    #[arg(long)]
    pub reversed: bool,

    /// Print labels as gap counts between props.
    #[arg(long)]
    pub abbreviated: bool,
}

impl LabelArgs {
    pub fn flags(self) -> LabelFlags {
        LabelFlags {
            reversed: self.reversed,
            abbreviated: self.abbreviated,
        }
    }
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub pattern: PatternArgs,

    #[command(flatten)]
    pub labels: LabelArgs,

    #[arg(long = "format", value_enum, default_value = "ascii")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ThrowsArgs {
    /// State as an integer bitmask, bit 0 being the next beat.
    #[arg(long = "state")]
    pub state: u64,

    #[arg(long = "max-height", short = 'm')]
    pub max_height: u32,

    #[command(flatten)]
    pub labels: LabelArgs,
}

#[derive(Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub pattern: PatternArgs,

    #[command(flatten)]
    pub labels: LabelArgs,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub pattern: PatternArgs,

    #[command(flatten)]
    pub labels: LabelArgs,

    /// Tokens to apply instead of prompting, e.g. "3 3 u 5 r".
    #[arg(long = "sequence", short = 's')]
    pub sequence: Option<String>,

    /// Format used to draw the built graph at the end of a sequence.
    #[arg(long = "format", value_enum, default_value = "ascii")]
    pub format: OutputFormat,

    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Ascii,
    Svg,
    Json,
}
