//! `clawmon status` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use clawmon_core::types::{DailyReport, ExecutionMark, ExecutionStatus};
use clawmon_log_pipeline::resolver::{DATE_FORMAT, expand_path};
use clawmon_store::SqliteStore;

use crate::cli::StatusArgs;
use crate::commands::run::colored_score;
use crate::commands::{load_config, resolve_date};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execution marks listed under the latest one.
const HISTORY_LIMIT: usize = 5;

/// Execute the `status` command.
pub async fn execute(
    args: StatusArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let date = resolve_date(args.date.as_deref())?
        .format(DATE_FORMAT)
        .to_string();
    let db_path = expand_path(&config.database.path);

    let report = tokio::task::spawn_blocking(move || build_status_report(&db_path, &date))
        .await
        .map_err(|e| CliError::Command(format!("status task failed: {e}")))??;

    writer.render(&report)?;

    Ok(())
}

/// Read pass history for `date` without creating a missing database.
pub fn build_status_report(db_path: &Path, date: &str) -> Result<StatusReport, CliError> {
    let mut report = StatusReport {
        database: db_path.display().to_string(),
        database_exists: db_path.exists(),
        date: date.to_owned(),
        last_execution: None,
        recent_executions: Vec::new(),
        daily_report: None,
    };
    if !report.database_exists {
        debug!(path = %report.database, "database not found");
        return Ok(report);
    }

    let store = SqliteStore::open(db_path)?;
    report.recent_executions = store.recent_executions(HISTORY_LIMIT)?;
    report.last_execution = report.recent_executions.first().cloned();
    report.daily_report = store.daily_report(date)?;
    Ok(report)
}

/// Pass history and stored report for a date.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database: String,
    pub database_exists: bool,
    pub date: String,
    pub last_execution: Option<ExecutionMark>,
    pub recent_executions: Vec<ExecutionMark>,
    pub daily_report: Option<DailyReport>,
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "clawmon status ({})", self.database.bold())?;
        if !self.database_exists {
            writeln!(w, "  {}", "No database yet; run `clawmon run` first".yellow())?;
            return Ok(());
        }

        writeln!(w)?;
        match &self.last_execution {
            Some(mark) => {
                writeln!(w, "Last execution: {}", mark.execution_time)?;
                writeln!(w, "  Status:    {}", colored_status(mark.status))?;
                writeln!(
                    w,
                    "  Watermark: {}",
                    mark.last_activity_timestamp.as_deref().unwrap_or("-")
                )?;
                writeln!(w, "  Collected: {}", mark.data_collected)?;
            }
            None => writeln!(w, "Last execution: {}", "none".dimmed())?,
        }

        if self.recent_executions.len() > 1 {
            writeln!(w)?;
            writeln!(w, "Recent executions:")?;
            for mark in &self.recent_executions {
                writeln!(
                    w,
                    "  {:<32} {:<8} {}",
                    mark.execution_time,
                    mark.status.as_str(),
                    mark.data_collected
                )?;
            }
        }

        writeln!(w)?;
        match &self.daily_report {
            Some(report) => {
                writeln!(w, "Daily report {}:", report.date.bold())?;
                writeln!(w, "  Security score:  {}", colored_score(report.security_score))?;
                writeln!(w, "  Activities:      {}", report.total_events)?;
                writeln!(w, "    process:       {}", report.process_count)?;
                writeln!(w, "    command:       {}", report.command_count)?;
                writeln!(w, "    file access:   {}", report.file_access_count)?;
                writeln!(w, "  Security events: {}", report.security_event_count)?;
                writeln!(w, "  Generated at:    {}", report.generated_at)?;
            }
            None => writeln!(w, "Daily report {}: {}", self.date, "not found".dimmed())?,
        }

        Ok(())
    }
}

fn colored_status(status: ExecutionStatus) -> colored::ColoredString {
    use colored::Colorize;

    match status {
        ExecutionStatus::Success => status.as_str().green(),
        ExecutionStatus::Failed => status.as_str().red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mark(id: &str, time: &str, status: ExecutionStatus) -> ExecutionMark {
        ExecutionMark {
            execution_id: id.to_owned(),
            execution_time: time.to_owned(),
            last_log_timestamp: None,
            last_activity_timestamp: Some("2024-01-15T10:00:00".to_owned()),
            status,
            data_collected: 3,
            email_sent: false,
        }
    }

    #[test]
    fn missing_database_is_not_created() {
        let tmp = TempDir::new().expect("temp dir");
        let db = tmp.path().join("database/clawmon.db");

        let report = build_status_report(&db, "2024-01-15").expect("status should succeed");
        assert!(!report.database_exists);
        assert!(report.last_execution.is_none());
        assert!(!db.exists(), "status must not create the database");
    }

    #[test]
    fn reads_latest_execution_and_report() {
        let tmp = TempDir::new().expect("temp dir");
        let db = tmp.path().join("clawmon.db");
        let store = SqliteStore::open(&db).expect("open store");
        store
            .add_execution(&mark("a", "2024-01-16T00:00:00.000001Z", ExecutionStatus::Success))
            .expect("add first");
        store
            .add_execution(&mark("b", "2024-01-16T01:00:00.000001Z", ExecutionStatus::Failed))
            .expect("add second");
        drop(store);

        let report = build_status_report(&db, "2024-01-15").expect("status should succeed");
        assert!(report.database_exists);
        assert_eq!(
            report.last_execution.as_ref().map(|m| m.execution_id.as_str()),
            Some("b")
        );
        assert_eq!(report.recent_executions.len(), 2);
        assert!(report.daily_report.is_none());
    }

    #[test]
    fn render_text_without_database() {
        let report = StatusReport {
            database: "/tmp/none.db".to_owned(),
            database_exists: false,
            date: "2024-01-15".to_owned(),
            last_execution: None,
            recent_executions: Vec::new(),
            daily_report: None,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("No database yet"));
    }

    #[test]
    fn render_text_with_mark_and_missing_report() {
        let last = mark("a", "2024-01-16T00:00:00Z", ExecutionStatus::Success);
        let report = StatusReport {
            database: "clawmon.db".to_owned(),
            database_exists: true,
            date: "2024-01-15".to_owned(),
            last_execution: Some(last.clone()),
            recent_executions: vec![last],
            daily_report: None,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Last execution: 2024-01-16T00:00:00Z"));
        assert!(output.contains("2024-01-15T10:00:00"));
        assert!(output.contains("not found"));
        assert!(!output.contains("Recent executions"));
    }
}
