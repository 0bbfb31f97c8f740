//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// clawmon -- OpenClaw activity monitor.
///
/// Use `clawmon <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "clawmon", version, about, long_about = None)]
pub struct Cli {
    /// Path to the clawmon.toml configuration file.
    #[arg(short, long, default_value = "clawmon.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one daily pass over the OpenClaw logs.
    Run(RunArgs),

    /// Classify a system log file and print the analysis report.
    Analyze(AnalyzeArgs),

    /// Show the last execution mark and the stored daily report.
    Status(StatusArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run one daily pass.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target date (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    pub date: Option<String>,

    /// Ignore the stored watermark and re-read the whole day.
    #[arg(long)]
    pub full: bool,
}

// ---- analyze ----

/// Classify a system log file.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log file to analyze. Defaults to the latest `*.log` in `system_log_dir`.
    pub file: Option<PathBuf>,
}

// ---- status ----

/// Show pass history for a date.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Report date (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    pub date: Option<String>,
}

// ---- config ----

/// Manage clawmon configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, log_sources, database, report).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["clawmon", "run"]).expect("should parse 'run'");
        match cli.command {
            Commands::Run(run_args) => {
                assert!(run_args.date.is_none(), "date should default to None");
                assert!(!run_args.full, "full should default to false");
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_with_date_and_full() {
        let cli = Cli::try_parse_from(["clawmon", "run", "--date", "2024-01-15", "--full"])
            .expect("should parse run with flags");
        match cli.command {
            Commands::Run(run_args) => {
                assert_eq!(run_args.date.as_deref(), Some("2024-01-15"));
                assert!(run_args.full);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_without_file() {
        let cli = Cli::try_parse_from(["clawmon", "analyze"]).expect("should parse 'analyze'");
        match cli.command {
            Commands::Analyze(args) => assert!(args.file.is_none()),
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_with_file() {
        let cli = Cli::try_parse_from(["clawmon", "analyze", "/tmp/openclaw/openclaw.log"])
            .expect("should parse analyze with file");
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(
                    args.file,
                    Some(PathBuf::from("/tmp/openclaw/openclaw.log"))
                );
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_status_with_date() {
        let cli = Cli::try_parse_from(["clawmon", "status", "--date", "2024-01-15"])
            .expect("should parse status");
        match cli.command {
            Commands::Status(args) => assert_eq!(args.date.as_deref(), Some("2024-01-15")),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let cli = Cli::try_parse_from(["clawmon", "config", "validate"])
            .expect("should parse 'config validate'");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Validate => {}
                _ => panic!("expected Validate action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["clawmon", "config", "show", "--section", "database"])
            .expect("should parse config show with section");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("database".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_default_config_path() {
        let cli = Cli::try_parse_from(["clawmon", "status"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("clawmon.toml"));
    }

    #[test]
    fn test_cli_parse_custom_config_path() {
        let cli = Cli::try_parse_from(["clawmon", "-c", "/etc/clawmon.toml", "status"])
            .expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/etc/clawmon.toml"));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "clawmon",
            "run",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("global flags should be accepted after the subcommand");
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["clawmon", "--output", "yaml", "status"]);
        assert!(result.is_err(), "unknown output format should be rejected");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["clawmon"]);
        assert!(result.is_err(), "missing subcommand should be rejected");
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
