//! 시스템 로그 이벤트 분류기
//!
//! 파일 하나를 순차적으로 한 번 읽으며 각 라인을 고정 어휘의 이벤트 유형으로 분류하고,
//! 실행/세션 상관관계와 사용량 통계를 함께 집계합니다.
//!
//! 상태는 분석마다 새로 만들어지며 이전 분석 결과가 섞이지 않습니다.
//!
//! # 사용 예시
//! ```no_run
//! use clawmon_log_pipeline::classifier::EventClassifier;
//!
//! let mut classifier = EventClassifier::new().unwrap();
//! let report = classifier
//!     .analyze_file(std::path::Path::new("/tmp/openclaw/openclaw-2024-01-15.log"))
//!     .unwrap();
//! println!("{}", report.summary_text());
//! ```

pub mod correlation;
pub mod detectors;
pub mod event;
pub mod ladder;
pub mod patterns;
pub mod report;

use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info};

use clawmon_core::metrics as m;
use clawmon_core::types::compare_timestamps;

use crate::error::LogPipelineError;

pub use correlation::{CorrelationTables, Run, RunStatus, Session, SessionState};
pub use event::{ClassifiedEvent, EventType};
pub use patterns::ClassifierPatterns;
pub use report::{ClassifierReport, ClassifierStatistics};

/// 보고서에 남기는 최근 이벤트 수
pub const RECENT_EVENTS: usize = 100;
/// 상위 에러 요약에 사용하는 에러 수
pub const TOP_ERROR_SAMPLE: usize = 50;
/// 에러 메시지 묶음 기준 길이 (문자 수)
pub const ERROR_PREVIEW_CHARS: usize = 60;

/// 상태를 가진 단일 패스 분류기
#[derive(Debug)]
pub struct EventClassifier {
    patterns: ClassifierPatterns,
    stats: ClassifierStatistics,
    distribution: BTreeMap<EventType, u64>,
    tables: CorrelationTables,
    error_previews: Vec<String>,
    api_methods: BTreeMap<String, u64>,
    channels: BTreeMap<String, u64>,
    first_seen: Option<String>,
    last_seen: Option<String>,
    recent: VecDeque<ClassifiedEvent>,
}

impl EventClassifier {
    /// 분류기를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self::with_patterns(ClassifierPatterns::compile()?))
    }

    /// 컴파일된 패턴으로 분류기를 생성합니다.
    pub fn with_patterns(patterns: ClassifierPatterns) -> Self {
        Self {
            patterns,
            stats: ClassifierStatistics::default(),
            distribution: BTreeMap::new(),
            tables: CorrelationTables::default(),
            error_previews: Vec::new(),
            api_methods: BTreeMap::new(),
            channels: BTreeMap::new(),
            first_seen: None,
            last_seen: None,
            recent: VecDeque::with_capacity(RECENT_EVENTS),
        }
    }

    /// 누적 상태를 비웁니다.
    pub fn reset(&mut self) {
        let patterns = self.patterns.clone();
        *self = Self::with_patterns(patterns);
    }

    /// 파일을 분석해 보고서를 반환합니다.
    pub fn analyze_file(&mut self, path: &Path) -> Result<ClassifierReport, LogPipelineError> {
        let source = path.display().to_string();
        info!(path = %source, "analyzing system log");
        let file = File::open(path).map_err(|e| LogPipelineError::FileRead {
            path: source.clone(),
            source: e,
        })?;
        let report = self.analyze_reader(&source, BufReader::new(file))?;
        info!(
            path = %source,
            parsed = report.statistics.parsed_lines,
            total = report.statistics.total_lines,
            "system log analysis complete"
        );
        Ok(report)
    }

    /// 리더의 모든 라인을 분석합니다. 이전 상태는 초기화됩니다.
    pub fn analyze_reader<R: BufRead>(
        &mut self,
        source: &str,
        mut reader: R,
    ) -> Result<ClassifierReport, LogPipelineError> {
        self.reset();
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
            self.ingest_line(line_number, &buf);
        }

        Ok(self.report())
    }

    /// 라인 하나를 반영합니다. 분류된 이벤트가 있으면 반환합니다.
    pub fn ingest_line(&mut self, line_number: usize, raw: &[u8]) -> Option<EventType> {
        let line = raw.trim_ascii();
        if line.is_empty() {
            return None;
        }
        self.stats.total_lines += 1;

        let value: Value = match serde_json::from_slice(line) {
            Ok(value) => value,
            Err(e) => {
                debug!(line = line_number, error = %e, "unparsable system log line");
                self.stats.unparsed_lines += 1;
                return None;
            }
        };
        self.stats.parsed_lines += 1;

        let event = ClassifiedEvent::from_value(&value, line_number, &self.patterns)?;
        let event_type = event.event_type;
        self.observe(event);
        Some(event_type)
    }

    fn observe(&mut self, event: ClassifiedEvent) {
        metrics::counter!(
            m::CLASSIFIER_EVENTS_TOTAL,
            m::LABEL_EVENT_TYPE => event.event_type.as_str()
        )
        .increment(1);
        *self.distribution.entry(event.event_type).or_insert(0) += 1;

        if let Some(ts) = event.timestamp.as_deref() {
            self.widen_time_range(ts);
        }

        if event.event_type.is_run() {
            self.stats.runs += 1;
        }
        if event.event_type.is_session() {
            self.stats.sessions += 1;
        }
        self.tables.observe(&event, &self.patterns);

        if event.is_error_level() {
            self.stats.errors += 1;
            if self.error_previews.len() < TOP_ERROR_SAMPLE {
                self.error_previews
                    .push(event.message.chars().take(ERROR_PREVIEW_CHARS).collect());
            }
        }

        if event.event_type == EventType::FileAccess {
            self.stats.file_accesses += 1;
        }

        if let Some(method) =
            detectors::detect_api_method(&event.message, &event.subsystem, &self.patterns)
        {
            self.stats.api_calls += 1;
            *self.api_methods.entry(method).or_insert(0) += 1;
            if event.is_error_level() || event.message.to_lowercase().contains("failed") {
                self.stats.api_errors += 1;
            }
        }

        if let Some(channel) = detectors::detect_channel(&event.message, &event.subsystem) {
            self.stats.external_conversations += 1;
            *self.channels.entry(channel).or_insert(0) += 1;
        }

        if self.recent.len() == RECENT_EVENTS {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }

    fn widen_time_range(&mut self, ts: &str) {
        let earlier = self
            .first_seen
            .as_deref()
            .is_none_or(|first| compare_timestamps(ts, first).is_lt());
        if earlier {
            self.first_seen = Some(ts.to_owned());
        }
        let later = self
            .last_seen
            .as_deref()
            .is_none_or(|last| compare_timestamps(ts, last).is_gt());
        if later {
            self.last_seen = Some(ts.to_owned());
        }
    }

    /// 현재까지 누적된 상태로 보고서를 만듭니다.
    pub fn report(&self) -> ClassifierReport {
        let mut top_errors = BTreeMap::new();
        for preview in &self.error_previews {
            *top_errors.entry(preview.clone()).or_insert(0) += 1;
        }

        ClassifierReport {
            analysis_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            time_range: report::TimeRange {
                start: self.first_seen.clone(),
                end: self.last_seen.clone(),
            },
            statistics: self.stats.clone(),
            event_distribution: self
                .distribution
                .iter()
                .map(|(ty, n)| (ty.as_str().to_owned(), *n))
                .collect(),
            runs: report::RunBreakdown {
                total: self.tables.runs.len(),
                completed: self.tables.runs_with(RunStatus::Complete),
                running: self.tables.runs_with(RunStatus::Running),
                unknown: self.tables.runs_with(RunStatus::Unknown),
            },
            sessions: report::SessionBreakdown {
                total: self.tables.sessions.len(),
                active: self.tables.sessions_with(SessionState::Active),
                inactive: self.tables.sessions_with(SessionState::Inactive),
                unknown: self.tables.sessions_with(SessionState::Unknown),
            },
            api_usage: report::ApiUsage {
                total_calls: self.stats.api_calls,
                errors: self.stats.api_errors,
                methods: self.api_methods.clone(),
            },
            external_conversations: report::ExternalConversations {
                total: self.stats.external_conversations,
                channels: self.channels.clone(),
            },
            errors: report::ErrorSummary {
                total: self.stats.errors,
                top_errors,
            },
            details: report::ReportDetails {
                runs: self.tables.runs.clone(),
                sessions: self.tables.sessions.clone(),
                recent_events: self.recent.iter().cloned().collect(),
            },
        }
    }
}
