//! Daily report delivery to a local directory.

use std::path::{Path, PathBuf};

use tracing::info;

use clawmon_core::error::ClawmonError;
use clawmon_core::pipeline::Notifier;
use clawmon_core::types::DailyReport;

/// Writes each daily report as `daily-report-YYYY-MM-DD.json` into a directory.
///
/// A later pass for the same date replaces the file.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target file for a report date.
    pub fn report_path(&self, date: &str) -> PathBuf {
        self.dir.join(format!("daily-report-{date}.json"))
    }

    fn write(&self, path: &Path, report: &DailyReport) -> Result<(), ClawmonError> {
        std::fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec_pretty(report).map_err(|e| ClawmonError::Collector {
            name: self.name().to_owned(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, body)?;
        Ok(())
    }
}

impl Notifier for JsonReportWriter {
    fn name(&self) -> &str {
        "json-report"
    }

    fn send(&self, report: &DailyReport) -> Result<bool, ClawmonError> {
        let path = self.report_path(&report.date);
        self.write(&path, report)?;
        info!(path = %path.display(), score = report.security_score, "daily report written");
        Ok(true)
    }
}
