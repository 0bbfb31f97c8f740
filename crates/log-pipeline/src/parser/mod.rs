//! 증분 JSONL 로그 파서
//!
//! 탐색된 파일을 순서대로 읽어 워터마크 이후의 라인에서 사실을 추출합니다.
//!
//! - 구조적으로 잘못된 라인은 건너뛰고 카운터만 올립니다.
//! - `timestamp`가 워터마크 이하인 라인은 추출 전에 걸러집니다.
//! - `timestamp`가 없는 라인은 워터마크로 걸러지지 않습니다.
//! - 읽을 수 없는 파일은 경고 후 건너뜁니다.
//!
//! # 사용 예시
//! ```no_run
//! use clawmon_log_pipeline::config::PipelineConfig;
//! use clawmon_log_pipeline::parser::IncrementalLogParser;
//! use clawmon_log_pipeline::resolver::parse_target_date;
//!
//! let config = PipelineConfig::default();
//! let parser = IncrementalLogParser::new(&config);
//! let date = parse_target_date("2024-01-15").unwrap();
//! let parsed = parser
//!     .parse_all(&config.roots, date, Some("2024-01-15T10:00:00"))
//!     .unwrap();
//! println!("{} commands", parsed.commands.len());
//! ```

pub mod facts;
pub mod record;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use clawmon_core::metrics as m;
use clawmon_core::types::later_timestamp;

use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::resolver::{DATE_FORMAT, PathResolver};

pub use facts::{CommandFact, FileAccessFact, RawEvent, RawEventKind};
pub use record::LogRecord;

/// 파싱 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// 읽은 파일 수
    pub files_read: usize,
    /// 읽지 못한 파일 수
    pub files_skipped: usize,
    /// 비어 있지 않은 라인 수
    pub lines_total: usize,
    /// JSON 객체로 파싱된 라인 수
    pub lines_parsed: usize,
    /// 파싱 실패 라인 수
    pub parse_errors: usize,
    /// 워터마크로 걸러진 라인 수
    pub before_watermark: usize,
}

/// 한 패스의 파싱 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLogs {
    /// 대상 날짜
    pub target_date: NaiveDate,
    /// 적용된 워터마크
    pub since: Option<String>,
    /// 명령 사실 (승인 목록 포함)
    pub commands: Vec<CommandFact>,
    /// 파일 접근 사실
    pub file_accesses: Vec<FileAccessFact>,
    /// 원시 이벤트
    pub events: Vec<RawEvent>,
    /// 탐색된 파일이 하나도 없음
    pub missing_logs: bool,
    /// 탐색된 파일 수
    pub found_logs_count: usize,
    /// 파싱 통계
    pub stats: ParseStats,
}

impl ParsedLogs {
    /// 비어 있는 결과를 생성합니다.
    pub fn empty(target_date: NaiveDate, since: Option<&str>) -> Self {
        Self {
            target_date,
            since: since.map(str::to_owned),
            commands: Vec::new(),
            file_accesses: Vec::new(),
            events: Vec::new(),
            missing_logs: false,
            found_logs_count: 0,
            stats: ParseStats::default(),
        }
    }

    /// 대상 날짜 문자열 (`YYYY-MM-DD`)
    pub fn date_str(&self) -> String {
        self.target_date.format(DATE_FORMAT).to_string()
    }

    /// 전체 사실 수
    pub fn fact_count(&self) -> usize {
        self.commands.len() + self.file_accesses.len() + self.events.len()
    }

    /// 레코드에서 사실을 추출해 누적합니다.
    pub fn absorb(&mut self, record: &LogRecord) {
        if let Some(fact) = CommandFact::from_record(record) {
            metrics::counter!(m::LOG_PIPELINE_FACTS_TOTAL, m::LABEL_KIND => "command").increment(1);
            self.commands.push(fact);
        }
        if let Some(fact) = FileAccessFact::from_record(record) {
            metrics::counter!(m::LOG_PIPELINE_FACTS_TOTAL, m::LABEL_KIND => "file_access")
                .increment(1);
            self.file_accesses.push(fact);
        }
        if let Some(fact) = RawEvent::from_record(record) {
            metrics::counter!(m::LOG_PIPELINE_FACTS_TOTAL, m::LABEL_KIND => "event").increment(1);
            self.events.push(fact);
        }
    }

    /// 승인 목록 항목을 명령 목록 뒤에 합칩니다.
    pub fn merge_approvals(&mut self, approvals: Vec<CommandFact>) {
        self.commands.extend(approvals);
    }

    /// 로그에서 나온 사실 중 가장 늦은 타임스탬프
    ///
    /// 승인 목록 항목은 제외합니다.
    pub fn max_log_timestamp(&self) -> Option<&str> {
        let commands = self
            .commands
            .iter()
            .filter(|c| !c.from_approvals)
            .filter_map(|c| c.timestamp.as_deref());
        let accesses = self
            .file_accesses
            .iter()
            .filter_map(|f| f.timestamp.as_deref());
        let events = self.events.iter().filter_map(|e| e.timestamp.as_deref());

        commands
            .chain(accesses)
            .chain(events)
            .reduce(|acc, ts| later_timestamp(acc, ts))
    }
}

/// 증분 로그 파서
#[derive(Debug, Clone)]
pub struct IncrementalLogParser {
    resolver: PathResolver,
    max_line_bytes: usize,
}

impl IncrementalLogParser {
    /// 설정으로 파서를 생성합니다.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            resolver: PathResolver::new(config.file_prefix.clone()),
            max_line_bytes: config.max_line_bytes,
        }
    }

    /// 탐색기 참조
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// 모든 루트에서 대상 날짜 로그를 파싱합니다.
    ///
    /// `since`가 주어지면 그 이하 타임스탬프의 라인은 건너뜁니다.
    pub fn parse_all(
        &self,
        roots: &[String],
        target_date: NaiveDate,
        since: Option<&str>,
    ) -> Result<ParsedLogs, LogPipelineError> {
        let resolved = self.resolver.resolve(roots, target_date)?;
        let mut parsed = ParsedLogs::empty(target_date, since);
        parsed.found_logs_count = resolved.file_count();
        parsed.missing_logs = resolved.is_empty();

        if parsed.missing_logs {
            warn!(date = %parsed.date_str(), "no log files found for target date");
        }

        for path in resolved.files() {
            self.parse_file(path, &mut parsed);
        }

        info!(
            date = %parsed.date_str(),
            files = parsed.found_logs_count,
            commands = parsed.commands.len(),
            file_accesses = parsed.file_accesses.len(),
            events = parsed.events.len(),
            parse_errors = parsed.stats.parse_errors,
            before_watermark = parsed.stats.before_watermark,
            "log parsing complete"
        );

        Ok(parsed)
    }

    /// 파일 하나를 파싱합니다. 읽기 실패는 경고 후 건너뜁니다.
    ///
    /// 읽는 도중 실패하면 그때까지 추출한 사실은 유지됩니다.
    pub fn parse_file(&self, path: &Path, parsed: &mut ParsedLogs) {
        let source = path.display().to_string();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %source, error = %e, "failed to open log file, skipping");
                parsed.stats.files_skipped += 1;
                metrics::counter!(m::LOG_PIPELINE_FILES_SKIPPED_TOTAL).increment(1);
                return;
            }
        };

        match self.parse_reader(&source, BufReader::new(file), parsed) {
            Ok(()) => {
                parsed.stats.files_read += 1;
                metrics::counter!(m::LOG_PIPELINE_FILES_READ_TOTAL).increment(1);
            }
            Err(e) => {
                warn!(path = %source, error = %e, "failed while reading log file, keeping partial facts");
                parsed.stats.files_skipped += 1;
                metrics::counter!(m::LOG_PIPELINE_FILES_SKIPPED_TOTAL).increment(1);
            }
        }
    }

    /// 리더에서 JSONL 라인을 읽어 사실을 누적합니다.
    pub fn parse_reader<R: BufRead>(
        &self,
        source: &str,
        mut reader: R,
        parsed: &mut ParsedLogs,
    ) -> Result<(), LogPipelineError> {
        let mut buf = Vec::with_capacity(1024);
        let mut line_number = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| LogPipelineError::FileRead {
                    path: source.to_owned(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            parsed.stats.lines_total += 1;

            if line.len() > self.max_line_bytes {
                debug!(path = source, line = line_number, size = line.len(), "line exceeds size limit, skipping");
                parsed.stats.parse_errors += 1;
                metrics::counter!(m::LOG_PIPELINE_PARSE_ERRORS_TOTAL).increment(1);
                continue;
            }

            let record = match LogRecord::decode(source, line_number, line) {
                Ok(record) => record,
                Err(e) => {
                    debug!(error = %e, "skipping malformed log line");
                    parsed.stats.parse_errors += 1;
                    metrics::counter!(m::LOG_PIPELINE_PARSE_ERRORS_TOTAL).increment(1);
                    continue;
                }
            };
            parsed.stats.lines_parsed += 1;
            metrics::counter!(m::LOG_PIPELINE_LINES_PARSED_TOTAL).increment(1);

            if let Some(since) = parsed.since.as_deref() {
                if record.is_covered_by(since) {
                    parsed.stats.before_watermark += 1;
                    metrics::counter!(m::LOG_PIPELINE_LINES_BEFORE_WATERMARK_TOTAL).increment(1);
                    continue;
                }
            }

            parsed.absorb(&record);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn parser() -> IncrementalLogParser {
        IncrementalLogParser::new(&PipelineConfig::default())
    }

    fn parse_str(input: &str, since: Option<&str>) -> ParsedLogs {
        let mut parsed = ParsedLogs::empty(date(), since);
        parser()
            .parse_reader("mem.log", Cursor::new(input.as_bytes()), &mut parsed)
            .unwrap();
        parsed
    }

    #[test]
    fn extracts_facts_per_line() {
        let input = concat!(
            r#"{"timestamp":"2024-01-15T10:00:00","exec":"ls -la"}"#, "\n",
            r#"{"timestamp":"2024-01-15T10:01:00","path":"/tmp/test.txt","type":"access"}"#, "\n",
            r#"{"timestamp":"2024-01-15T10:02:00","error":"disk full"}"#, "\n",
        );
        let parsed = parse_str(input, None);
        assert_eq!(parsed.commands.len(), 1);
        assert_eq!(parsed.file_accesses.len(), 1);
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.stats.lines_parsed, 3);
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let input = "\n   \n{broken\n[1,2]\n{\"exec\":\"pwd\"}\n";
        let parsed = parse_str(input, None);
        assert_eq!(parsed.stats.lines_total, 3);
        assert_eq!(parsed.stats.parse_errors, 2);
        assert_eq!(parsed.commands.len(), 1);
        assert_eq!(parsed.commands[0].line, 5);
    }

    #[test]
    fn watermark_filters_at_or_before() {
        let input = concat!(
            r#"{"timestamp":"2024-01-15T10:00:00","exec":"old"}"#, "\n",
            r#"{"timestamp":"2024-01-15T10:05:00","exec":"edge"}"#, "\n",
            r#"{"timestamp":"2024-01-15T10:06:00","exec":"new"}"#, "\n",
        );
        let parsed = parse_str(input, Some("2024-01-15T10:05:00"));
        let commands: Vec<_> = parsed
            .commands
            .iter()
            .filter_map(|c| c.command.as_deref())
            .collect();
        assert_eq!(commands, vec!["new"]);
        assert_eq!(parsed.stats.before_watermark, 2);
    }

    #[test]
    fn untimed_lines_are_never_watermark_filtered() {
        let input = "{\"exec\":\"no-ts\"}\n";
        let parsed = parse_str(input, Some("2099-12-31T23:59:59"));
        assert_eq!(parsed.commands.len(), 1);
        assert_eq!(parsed.stats.before_watermark, 0);
    }

    #[test]
    fn oversized_line_counts_as_parse_error() {
        let config = PipelineConfig {
            max_line_bytes: 16,
            ..PipelineConfig::default()
        };
        let parser = IncrementalLogParser::new(&config);
        let mut parsed = ParsedLogs::empty(date(), None);
        parser
            .parse_reader(
                "mem.log",
                Cursor::new(br#"{"exec":"a very long command line"}"#.as_slice()),
                &mut parsed,
            )
            .unwrap();
        assert_eq!(parsed.stats.parse_errors, 1);
        assert!(parsed.commands.is_empty());
    }

    #[test]
    fn missing_logs_when_nothing_resolved() {
        let dir = TempDir::new().unwrap();
        let roots = vec![dir.path().to_string_lossy().into_owned()];
        let parsed = parser().parse_all(&roots, date(), None).unwrap();
        assert!(parsed.missing_logs);
        assert_eq!(parsed.found_logs_count, 0);
    }

    #[test]
    fn missing_logs_false_even_without_facts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openclaw-2024-01-15.log"), "{\"note\":1}\n").unwrap();
        let roots = vec![dir.path().to_string_lossy().into_owned()];
        let parsed = parser().parse_all(&roots, date(), None).unwrap();
        assert!(!parsed.missing_logs);
        assert_eq!(parsed.found_logs_count, 1);
        assert_eq!(parsed.fact_count(), 0);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut parsed = ParsedLogs::empty(date(), None);
        parser().parse_file(&dir.path().join("gone.log"), &mut parsed);
        assert_eq!(parsed.stats.files_skipped, 1);
        assert_eq!(parsed.stats.files_read, 0);
    }

    #[test]
    fn max_log_timestamp_ignores_approvals() {
        let input = concat!(
            r#"{"timestamp":"2024-01-15T10:00:00","exec":"a"}"#, "\n",
            r#"{"timestamp":"2024-01-15T12:00:00","path":"/tmp/x"}"#, "\n",
            r#"{"timestamp":"2024-01-15T11:00:00","error":"boom"}"#, "\n",
        );
        let mut parsed = parse_str(input, None);
        parsed.merge_approvals(vec![CommandFact {
            source_file: "approvals.json".to_owned(),
            line: 1,
            timestamp: Some("2030-01-01T00:00:00".to_owned()),
            command: Some("later".to_owned()),
            from_approvals: true,
            raw: None,
        }]);
        assert_eq!(parsed.max_log_timestamp(), Some("2024-01-15T12:00:00"));
    }

    #[test]
    fn max_log_timestamp_none_without_timestamps() {
        let parsed = parse_str("{\"exec\":\"ls\"}\n", None);
        assert!(parsed.max_log_timestamp().is_none());
    }
}
