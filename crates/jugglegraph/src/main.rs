//! jugglegraph command-line interface.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use jugglegraph::logging::{LogConfig, init_logging};
use jugglegraph_engine::{EngineClient, EngineError};
use tracing::debug;

mod cli;
mod commands;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        ..LogConfig::default()
    };
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let Some(status) = error
                .downcast_ref::<EngineError>()
                .and_then(EngineError::status)
            {
                debug!(status, "engine answered with an error status");
            }
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = EngineClient::new(cli.engine.config())?;
    match &cli.command {
        Command::Graph(args) => commands::run_graph(&client, args).await,
        Command::Throws(args) => commands::run_throws(&client, args).await,
        Command::Table(args) => commands::run_table(&client, args).await,
        Command::Build(args) => commands::run_build(&client, args).await,
    }
}
