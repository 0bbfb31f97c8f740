//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod config;
pub mod run;
pub mod status;

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use clawmon_core::config::ClawmonConfig;
use clawmon_log_pipeline::resolver::{default_target_date, parse_target_date};

use crate::error::CliError;

/// Load the effective configuration.
///
/// A missing file falls back to defaults; env overrides and validation still apply.
pub async fn load_config(config_path: &Path) -> Result<ClawmonConfig, CliError> {
    if config_path.exists() {
        return Ok(ClawmonConfig::load(config_path).await?);
    }

    info!(path = %config_path.display(), "config file not found, using defaults");
    let mut config = ClawmonConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// `--date` value, or yesterday when absent.
pub fn resolve_date(date: Option<&str>) -> Result<NaiveDate, CliError> {
    match date {
        Some(value) => Ok(parse_target_date(value)?),
        None => Ok(default_target_date()),
    }
}
