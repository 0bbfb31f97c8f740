//! `clawmon config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use clawmon_core::config::ClawmonConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: [&str; 4] = ["general", "log_sources", "database", "report"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// Unlike other commands, a missing file is reported as invalid.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = validation_report(config_path).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Validation result for a configuration file.
pub async fn validation_report(config_path: &Path) -> ConfigValidationReport {
    let errors = match ClawmonConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = load_config(config_path).await?;
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "(defaults)".to_owned()
    };

    let report = show_report(&config, source, section.as_deref())?;
    writer.render(&report)?;

    Ok(())
}

/// Serialize the whole configuration or one section of it.
pub fn show_report(
    config: &ClawmonConfig,
    source: String,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => toml_text(config),
        Some("general") => toml_text(&config.general),
        Some("log_sources") => toml_text(&config.log_sources),
        Some("database") => toml_text(&config.database),
        Some("report") => toml_text(&config.report),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source,
        section: section.map(str::to_owned),
        config_toml,
    })
}

fn toml_text<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {})", e))
}

/// Configuration display report.
///
/// The `config_toml` field is only used for text rendering.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(report: &impl Render) -> String {
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn show_report_full_config() {
        let report = show_report(&ClawmonConfig::default(), "clawmon.toml".to_owned(), None)
            .expect("full config should serialize");
        assert!(report.section.is_none());
        assert!(report.config_toml.contains("[log_sources]"));
        assert!(report.config_toml.contains("file_prefix = \"openclaw\""));
    }

    #[test]
    fn show_report_single_section() {
        let report = show_report(
            &ClawmonConfig::default(),
            "clawmon.toml".to_owned(),
            Some("database"),
        )
        .expect("database section should serialize");

        let output = render(&report);
        assert!(output.contains("[database]"), "should show section name");
        assert!(output.contains("database/clawmon.db"));
        assert!(!output.contains("file_prefix"));
    }

    #[test]
    fn show_report_unknown_section() {
        let err = show_report(&ClawmonConfig::default(), "x".to_owned(), Some("ebpf"))
            .err()
            .expect("unknown section should fail");
        assert!(err.to_string().contains("unknown section: ebpf"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_report_json_skips_toml_body() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: Some("report".to_owned()),
            config_toml: "output_dir = \"/tmp\"".to_owned(),
        };

        let parsed = serde_json::to_value(&report).expect("JSON serialization should succeed");
        assert_eq!(parsed["source"].as_str(), Some("test.toml"));
        assert_eq!(parsed["section"].as_str(), Some("report"));
        assert!(parsed.get("config_toml").is_none());
    }

    #[tokio::test]
    async fn validation_report_for_missing_file_is_invalid() {
        let tmp = TempDir::new().expect("temp dir");
        let report = validation_report(&tmp.path().join("clawmon.toml")).await;
        assert!(!report.valid);
        assert!(report.errors[0].contains("not found"));

        let output = render(&report);
        assert!(output.contains("INVALID"));
    }

    #[tokio::test]
    async fn validation_report_for_valid_file() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("clawmon.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").expect("write config");

        let report = validation_report(&path).await;
        assert!(report.valid, "errors: {:?}", report.errors);
        assert!(render(&report).contains("VALID"));
    }
}
