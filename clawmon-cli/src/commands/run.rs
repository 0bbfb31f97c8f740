//! `clawmon run` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use clawmon_core::config::ClawmonConfig;
use clawmon_log_pipeline::resolver::expand_path;
use clawmon_log_pipeline::{DailyPipelineBuilder, PassOutcome, PassRequest, PipelineConfig};
use clawmon_store::SqliteStore;

use crate::cli::RunArgs;
use crate::commands::{load_config, resolve_date};
use crate::error::CliError;
use crate::notify::JsonReportWriter;
use crate::output::{OutputWriter, Render};
use crate::probe::SnapshotProbe;

/// Execute the `run` command.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let mut request = PassRequest::for_date(resolve_date(args.date.as_deref())?);
    if args.full {
        request = request.full();
    }

    let report = tokio::task::spawn_blocking(move || run_pass(&config, &request))
        .await
        .map_err(|e| CliError::Command(format!("daily pass task failed: {e}")))??;

    writer.render(&report)?;

    Ok(())
}

/// Open the store, wire collaborators from config and run one pass.
pub fn run_pass(config: &ClawmonConfig, request: &PassRequest) -> Result<RunReport, CliError> {
    let db_path = expand_path(&config.database.path);
    let store = SqliteStore::open(&db_path)?;

    let mut builder = DailyPipelineBuilder::new().config(PipelineConfig::from_core(config));
    if let Some(snapshot) = config.report.process_snapshot.as_deref() {
        builder = builder.probe(Box::new(SnapshotProbe::new(expand_path(snapshot))));
    }
    if let Some(dir) = config.report.output_dir.as_deref() {
        builder = builder.notifier(Box::new(JsonReportWriter::new(expand_path(dir))));
    }
    let mut pipeline = builder.build(store)?;

    info!(
        database = %db_path.display(),
        notifiers = pipeline.notifier_count(),
        full = !request.use_watermark,
        "running daily pass"
    );
    let outcome = pipeline.run_pass(request)?;

    Ok(RunReport {
        database: db_path.display().to_string(),
        outcome,
    })
}

/// Daily pass result.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// SQLite database path
    pub database: String,
    #[serde(flatten)]
    pub outcome: PassOutcome,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let o = &self.outcome;
        writeln!(w, "Daily pass {} ({})", o.date.bold(), o.execution_id)?;
        writeln!(w, "  Database: {}", self.database)?;
        writeln!(w, "  Security score: {}", colored_score(o.security_score))?;
        writeln!(
            w,
            "  Watermark: {} -> {}",
            o.since.as_deref().unwrap_or("-"),
            o.watermark.as_deref().unwrap_or("-")
        )?;
        writeln!(
            w,
            "  Facts: {}  Process samples: {}",
            o.facts, o.process_samples
        )?;
        writeln!(
            w,
            "  Activities: {} inserted, {} duplicate",
            o.activities.inserted, o.activities.duplicates
        )?;
        writeln!(
            w,
            "  Security events: {} inserted, {} duplicate",
            o.security_events.inserted, o.security_events.duplicates
        )?;
        writeln!(
            w,
            "  Day totals: {} activities ({} command, {} file access, {} process), {} security events",
            o.report.total_events,
            o.report.command_count,
            o.report.file_access_count,
            o.report.process_count,
            o.report.security_event_count
        )?;
        if o.missing_logs {
            writeln!(w, "  {}", "No log files found for this date".yellow())?;
        }
        let notified = if o.notified { "yes".green() } else { "no".normal() };
        writeln!(w, "  Report delivered: {}", notified)?;

        Ok(())
    }
}

/// Score colored by band.
pub(crate) fn colored_score(score: u8) -> colored::ColoredString {
    use colored::Colorize;

    let text = format!("{score}/100");
    match score {
        90..=100 => text.green().bold(),
        70..=89 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawmon_core::types::DailyReport;
    use clawmon_log_pipeline::InsertTally;

    fn outcome(missing_logs: bool) -> PassOutcome {
        PassOutcome {
            execution_id: "exec-1".to_owned(),
            date: "2024-01-15".to_owned(),
            since: None,
            watermark: Some("2024-01-15T10:00:00".to_owned()),
            security_score: 93,
            facts: 3,
            process_samples: 0,
            missing_logs,
            activities: InsertTally {
                inserted: 3,
                duplicates: 0,
            },
            security_events: InsertTally::default(),
            report: DailyReport {
                date: "2024-01-15".to_owned(),
                generated_at: "2024-01-16T00:00:00Z".to_owned(),
                security_score: 93,
                total_events: 3,
                process_count: 0,
                command_count: 2,
                file_access_count: 1,
                security_event_count: 0,
                summary: serde_json::json!({}),
            },
            notified: false,
        }
    }

    #[test]
    fn render_text_shows_score_and_watermark() {
        let report = RunReport {
            database: "/tmp/clawmon.db".to_owned(),
            outcome: outcome(false),
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("2024-01-15"));
        assert!(output.contains("93/100"));
        assert!(output.contains("- -> 2024-01-15T10:00:00"));
        assert!(output.contains("3 inserted, 0 duplicate"));
        assert!(!output.contains("No log files"));
    }

    #[test]
    fn render_text_flags_missing_logs() {
        let report = RunReport {
            database: "clawmon.db".to_owned(),
            outcome: outcome(true),
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("No log files found"));
    }

    #[test]
    fn json_flattens_outcome() {
        let report = RunReport {
            database: "clawmon.db".to_owned(),
            outcome: outcome(false),
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["database"], "clawmon.db");
        assert_eq!(json["security_score"], 93);
        assert_eq!(json["activities"]["inserted"], 3);
    }

    #[test]
    fn colored_score_keeps_value() {
        assert!(colored_score(100).to_string().contains("100/100"));
        assert!(colored_score(42).to_string().contains("42/100"));
    }
}
