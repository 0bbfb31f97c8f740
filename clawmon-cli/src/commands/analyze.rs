//! `clawmon analyze` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use clawmon_log_pipeline::resolver::{expand_path, latest_log_file};
use clawmon_log_pipeline::{ClassifierReport, EventClassifier};

use crate::cli::AnalyzeArgs;
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Number of API methods and channels listed in text output.
const TOP_ENTRIES: usize = 5;

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let file = match args.file {
        Some(file) => file,
        None => {
            let config = load_config(config_path).await?;
            let dir = expand_path(&config.log_sources.system_log_dir);
            latest_log_file(&dir)?.ok_or_else(|| {
                CliError::Command(format!("no *.log files found in {}", dir.display()))
            })?
        }
    };

    let report = tokio::task::spawn_blocking(move || analyze_file(file))
        .await
        .map_err(|e| CliError::Command(format!("analysis task failed: {e}")))??;

    writer.render(&report)?;

    Ok(())
}

/// Classify one system log file.
pub fn analyze_file(file: PathBuf) -> Result<AnalyzeReport, CliError> {
    let mut classifier = EventClassifier::new()?;
    let report = classifier.analyze_file(&file)?;
    Ok(AnalyzeReport {
        file: file.display().to_string(),
        report,
    })
}

/// System log analysis result.
#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    /// Analyzed log file
    pub file: String,
    #[serde(flatten)]
    pub report: ClassifierReport,
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "System log: {}", self.file.bold())?;
        writeln!(w, "{}", self.report.summary_text())?;

        let range = &self.report.time_range;
        if let (Some(start), Some(end)) = (&range.start, &range.end) {
            writeln!(w, "Time range: {start} .. {end}")?;
        }

        write_top(w, "API methods", &self.report.api_usage.methods)?;
        write_top(w, "Channels", &self.report.external_conversations.channels)?;

        if self.report.errors.total > 0 {
            writeln!(
                w,
                "{}",
                format!("Errors: {}", self.report.errors.total).red()
            )?;
        }

        Ok(())
    }
}

fn write_top(
    w: &mut dyn Write,
    title: &str,
    counts: &std::collections::BTreeMap<String, u64>,
) -> std::io::Result<()> {
    if counts.is_empty() {
        return Ok(());
    }
    let mut entries: Vec<_> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    writeln!(w, "{title}:")?;
    for (name, count) in entries.into_iter().take(TOP_ENTRIES) {
        writeln!(w, "  {name:<24} {count}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOG: &str = concat!(
        r#"{"0":"req chat.send","_meta":{"name":"gateway","date":"2024-01-15T10:00:00Z","logLevelName":"INFO"}}"#,
        "\n",
        r#"{"0":"inbound message","_meta":{"name":"gateway/channels/telegram","date":"2024-01-15T10:00:01Z","logLevelName":"INFO"}}"#,
        "\n",
        "not json\n",
    );

    #[test]
    fn analyze_file_counts_lines() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("openclaw-2024-01-15.log");
        std::fs::write(&path, LOG).expect("write log");

        let report = analyze_file(path).expect("analysis should succeed");
        assert_eq!(report.report.statistics.total_lines, 3);
        assert_eq!(report.report.statistics.parsed_lines, 2);
        assert_eq!(report.report.statistics.unparsed_lines, 1);
    }

    #[test]
    fn analyze_missing_file_is_pipeline_error() {
        let tmp = TempDir::new().expect("temp dir");
        let err = analyze_file(tmp.path().join("absent.log")).expect_err("should fail");
        assert!(matches!(err, CliError::Pipeline(_)));
    }

    #[test]
    fn render_text_includes_summary_and_top_entries() {
        let mut report = ClassifierReport::default();
        report.statistics.total_lines = 3;
        report.statistics.parsed_lines = 2;
        report.api_usage.methods.insert("chat.send".to_owned(), 4);
        report.api_usage.methods.insert("agent".to_owned(), 1);
        report.errors.total = 1;

        let payload = AnalyzeReport {
            file: "/tmp/openclaw/openclaw.log".to_owned(),
            report,
        };
        let mut buffer = Vec::new();
        payload.render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Lines parsed: 2/3"));
        assert!(output.contains("API methods:"));
        let chat = output.find("chat.send").expect("chat.send listed");
        let agent = output.find("  agent").expect("agent listed");
        assert!(chat < agent, "methods should be sorted by count");
        assert!(!output.contains("Channels:"), "empty histogram is omitted");
        assert!(output.contains("Errors: 1"));
    }
}
