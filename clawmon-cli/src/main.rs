//! clawmon -- OpenClaw activity monitor CLI.

mod cli;
mod commands;
mod error;
mod logging;
mod notify;
mod output;
mod probe;

use clap::Parser;

use clawmon_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config errors surface from the command itself; logging falls back to defaults.
    let general = commands::load_config(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("warning: {e:#}");
    }

    let writer = OutputWriter::new(cli.output);
    if let Err(e) = dispatch(cli, &writer).await {
        use colored::Colorize;

        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn dispatch(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let config_path = cli.config;
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config_path, writer).await,
        Commands::Analyze(args) => commands::analyze::execute(args, &config_path, writer).await,
        Commands::Status(args) => commands::status::execute(args, &config_path, writer).await,
        Commands::Config(args) => commands::config::execute(args, &config_path, writer).await,
    }
}
