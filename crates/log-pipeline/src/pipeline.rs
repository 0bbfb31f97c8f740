//! 일일 패스 오케스트레이션 -- 탐색/파싱/분석/저장/알림의 전체 흐름을 관리합니다.
//!
//! [`DailyPipeline`]은 저장소를 [`ActivityStore`] trait으로만 다루므로
//! SQLite 구현과 테스트용 메모리 구현을 동일하게 사용할 수 있습니다.
//!
//! # 패스 흐름
//! ```text
//! last_execution -> ProcessMonitor -> IncrementalLogParser (+ approvals)
//!   -> SecurityAnalyzer -> ActivityStore (dedup insert) -> DailyReport -> Notifier
//!   -> ExecutionMark
//! ```
//!
//! 저장소가 열린 뒤의 실패는 `failed` 실행 마크를 남기고(최선 노력) 호출자에게 전달됩니다.
//! 재시도는 외부 스케줄러의 몫입니다.

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use clawmon_core::metrics as m;
use clawmon_core::pipeline::{ActivityStore, Monitor, Notifier, ProcessProbe};
use clawmon_core::types::{
    ActivityRecord, ActivityType, DailyReport, ExecutionMark, ExecutionStatus, ProcessSample,
    SecurityEventRecord, Severity, later_timestamp,
};

use crate::approvals::load_approvals;
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::parser::{IncrementalLogParser, ParsedLogs};
use crate::process::{ProcessAnalysis, ProcessMonitor, StaticProbe};
use crate::resolver::{DATE_FORMAT, default_target_date, expand_path};
use crate::security::{FindingKind, SecurityAnalysis, SecurityAnalyzer, SecurityFinding};

/// 패스 요청
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassRequest {
    /// 대상 날짜
    pub target_date: NaiveDate,
    /// 마지막 실행 마크의 워터마크를 사용할지 여부
    pub use_watermark: bool,
}

impl PassRequest {
    /// 대상 날짜에 대한 증분 패스
    pub fn for_date(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            use_watermark: true,
        }
    }

    /// 저장된 워터마크를 무시합니다.
    pub fn full(mut self) -> Self {
        self.use_watermark = false;
        self
    }
}

impl Default for PassRequest {
    /// 어제 날짜에 대한 증분 패스
    fn default() -> Self {
        Self::for_date(default_target_date())
    }
}

/// 삽입 결과 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertTally {
    /// 새로 추가된 행
    pub inserted: u64,
    /// 이미 존재해 무시된 행
    pub duplicates: u64,
}

impl InsertTally {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.duplicates += 1;
        }
    }
}

/// 패스 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassOutcome {
    /// 실행 ID
    pub execution_id: String,
    /// 대상 날짜
    pub date: String,
    /// 이번 패스에 적용된 워터마크
    pub since: Option<String>,
    /// 다음 패스로 넘길 워터마크
    pub watermark: Option<String>,
    /// 보안 점수
    pub security_score: u8,
    /// 추출된 사실 수 (승인 목록 포함)
    pub facts: usize,
    /// 프로세스 샘플 수
    pub process_samples: usize,
    /// 로그 누락 여부
    pub missing_logs: bool,
    /// 활동 레코드 삽입 결과
    pub activities: InsertTally,
    /// 보안 이벤트 삽입 결과
    pub security_events: InsertTally,
    /// 저장된 일일 리포트
    pub report: DailyReport,
    /// 알림 전달 여부
    pub notified: bool,
}

/// 일일 패스 파이프라인
pub struct DailyPipeline<S: ActivityStore> {
    config: PipelineConfig,
    parser: IncrementalLogParser,
    process_monitor: ProcessMonitor,
    notifiers: Vec<Box<dyn Notifier>>,
    store: S,
}

impl<S: ActivityStore> DailyPipeline<S> {
    /// 파이프라인 설정
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 저장소 참조
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 저장소를 돌려받습니다.
    pub fn into_store(self) -> S {
        self.store
    }

    /// 등록된 알림 채널 수
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// 일일 패스를 한 번 실행합니다.
    pub fn run_pass(&mut self, request: &PassRequest) -> Result<PassOutcome, LogPipelineError> {
        let execution_id = Uuid::new_v4().to_string();

        let since = if request.use_watermark {
            match self.store.last_execution() {
                Ok(mark) => mark.and_then(|mark| mark.last_activity_timestamp),
                Err(e) => return Err(self.fail_pass(execution_id, None, e.into())),
            }
        } else {
            None
        };

        info!(
            execution_id = %execution_id,
            date = %request.target_date.format(DATE_FORMAT),
            since = since.as_deref().unwrap_or("-"),
            "daily pass started"
        );

        match self.execute(&execution_id, request, since.as_deref()) {
            Ok(outcome) => {
                metrics::counter!(m::PASSES_TOTAL, m::LABEL_RESULT => "success").increment(1);
                metrics::gauge!(m::SECURITY_SCORE).set(f64::from(outcome.security_score));
                info!(
                    execution_id = %execution_id,
                    score = outcome.security_score,
                    facts = outcome.facts,
                    inserted = outcome.activities.inserted,
                    duplicates = outcome.activities.duplicates,
                    "daily pass finished"
                );
                Ok(outcome)
            }
            Err(e) => Err(self.fail_pass(execution_id, since, e)),
        }
    }

    /// 실패한 패스를 기록하고 원래 에러를 돌려줍니다.
    ///
    /// 실패 마크 기록은 최선 노력이며, 그 실패는 경고로만 남습니다.
    fn fail_pass(
        &mut self,
        execution_id: String,
        since: Option<String>,
        e: LogPipelineError,
    ) -> LogPipelineError {
        metrics::counter!(m::PASSES_TOTAL, m::LABEL_RESULT => "failed").increment(1);
        error!(execution_id = %execution_id, error = %e, "daily pass failed");
        let mark = ExecutionMark {
            execution_id,
            execution_time: now_rfc3339(),
            last_log_timestamp: since.clone(),
            last_activity_timestamp: since,
            status: ExecutionStatus::Failed,
            data_collected: 0,
            email_sent: false,
        };
        if let Err(mark_err) = self.store.record_execution(&mark) {
            warn!(error = %mark_err, "failed to record failed execution mark");
        }
        e
    }

    fn execute(
        &mut self,
        execution_id: &str,
        request: &PassRequest,
        since: Option<&str>,
    ) -> Result<PassOutcome, LogPipelineError> {
        let date = request.target_date.format(DATE_FORMAT).to_string();

        let samples = self.process_monitor.collect(&())?.to_vec();
        let process_analysis = self.process_monitor.analyze();

        let mut parsed = self
            .parser
            .parse_all(&self.config.roots, request.target_date, since)?;
        let watermark = match (since, parsed.max_log_timestamp()) {
            (Some(a), Some(b)) => Some(later_timestamp(a, b).to_owned()),
            (a, b) => a.or(b).map(str::to_owned),
        };

        if let Some(path) = self.config.approvals_file.as_deref() {
            parsed.merge_approvals(load_approvals(&expand_path(path)));
        }

        let mut analyzer = SecurityAnalyzer::new();
        analyzer.collect(&parsed)?;
        let analysis = analyzer.analyze();

        let (activities, security_events) = self.persist(&date, &samples, &analysis.events)?;

        let report = self.build_report(
            &date,
            execution_id,
            since,
            watermark.as_deref(),
            &parsed,
            &analysis,
            &process_analysis,
        )?;
        self.store.upsert_daily_report(&report)?;

        let notified = self.notify(&report);
        let facts = parsed.fact_count();

        let mark = ExecutionMark {
            execution_id: execution_id.to_owned(),
            execution_time: now_rfc3339(),
            last_log_timestamp: since.map(str::to_owned),
            last_activity_timestamp: watermark.clone(),
            status: ExecutionStatus::Success,
            data_collected: (facts + samples.len()) as u64,
            email_sent: notified,
        };
        self.store.record_execution(&mark)?;

        Ok(PassOutcome {
            execution_id: execution_id.to_owned(),
            date,
            since: since.map(str::to_owned),
            watermark,
            security_score: analysis.security_score,
            facts,
            process_samples: samples.len(),
            missing_logs: parsed.missing_logs,
            activities,
            security_events,
            report,
            notified,
        })
    }

    /// 활동 레코드와 보안 이벤트를 저장합니다. 중복은 에러가 아닙니다.
    fn persist(
        &mut self,
        date: &str,
        samples: &[ProcessSample],
        findings: &[SecurityFinding],
    ) -> Result<(InsertTally, InsertTally), LogPipelineError> {
        let mut activities = InsertTally::default();
        let mut events = InsertTally::default();

        for sample in samples {
            let record = ActivityRecord::new(
                date,
                sample.timestamp.as_str(),
                ActivityType::Process,
                &sample.name,
                Severity::Info,
            )
            .with_details(serde_json::to_value(sample)?);
            activities.record(self.store.insert_activity(&record)?);
        }

        for finding in findings {
            let timestamp = finding.timestamp.clone().unwrap_or_default();
            let details = serde_json::to_value(finding)?;
            match finding.kind {
                FindingKind::Command => {
                    // 승인 목록 항목은 원본 그대로 남깁니다.
                    let details = finding.raw.clone().unwrap_or(details);
                    let record = ActivityRecord::new(
                        date,
                        timestamp,
                        ActivityType::Command,
                        finding.message.as_deref().unwrap_or("unknown"),
                        finding.severity,
                    )
                    .with_details(details);
                    activities.record(self.store.insert_activity(&record)?);
                }
                FindingKind::FileAccess => {
                    let record = ActivityRecord::new(
                        date,
                        timestamp,
                        ActivityType::FileAccess,
                        finding.message.as_deref().unwrap_or("unknown path"),
                        finding.severity,
                    )
                    .with_details(details);
                    activities.record(self.store.insert_activity(&record)?);
                }
                FindingKind::SecurityEvent | FindingKind::LogWarning => {
                    let mut record = SecurityEventRecord::new(
                        date,
                        timestamp,
                        finding.category.as_deref().unwrap_or("general"),
                        finding.message.as_deref().unwrap_or("unknown event"),
                        finding.severity,
                    )
                    .with_details(details);
                    if let Some(source) = finding.source.as_deref() {
                        record = record.with_source(source);
                    }
                    events.record(self.store.insert_security_event(&record)?);
                }
            }
        }

        Ok((activities, events))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_report(
        &self,
        date: &str,
        execution_id: &str,
        since: Option<&str>,
        watermark: Option<&str>,
        parsed: &ParsedLogs,
        analysis: &SecurityAnalysis,
        processes: &ProcessAnalysis,
    ) -> Result<DailyReport, LogPipelineError> {
        let counts = self.store.activity_counts(date)?;
        let security_event_count = self.store.security_event_count(date)?;

        let summary = json!({
            "security": {
                "security_score": analysis.security_score,
                "event_counts": analysis.event_counts,
                "severity_counts": analysis.severity_counts,
                "total_events": analysis.total_events,
                "missing_logs": analysis.missing_logs,
            },
            "processes": processes,
            "pass": {
                "execution_id": execution_id,
                "since": since,
                "watermark": watermark,
                "found_logs": parsed.found_logs_count,
                "parse": parsed.stats,
            },
        });

        Ok(DailyReport {
            date: date.to_owned(),
            generated_at: now_rfc3339(),
            security_score: analysis.security_score,
            total_events: counts.total,
            process_count: counts.process,
            command_count: counts.command,
            file_access_count: counts.file_access,
            security_event_count,
            summary,
        })
    }

    /// 모든 알림 채널에 리포트를 전달합니다. 실패는 경고로만 남깁니다.
    fn notify(&self, report: &DailyReport) -> bool {
        let mut delivered = false;
        for notifier in &self.notifiers {
            match notifier.send(report) {
                Ok(sent) => delivered |= sent,
                Err(e) => {
                    warn!(notifier = notifier.name(), error = %e, "failed to deliver daily report");
                }
            }
        }
        delivered
    }
}

impl<S: ActivityStore> std::fmt::Debug for DailyPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyPipeline")
            .field("config", &self.config)
            .field("process_monitor", &self.process_monitor)
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 일일 패스 파이프라인 빌더
pub struct DailyPipelineBuilder {
    config: PipelineConfig,
    probe: Option<Box<dyn ProcessProbe>>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl DailyPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            probe: None,
            notifiers: Vec::new(),
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 프로세스 프로브를 지정합니다. 지정하지 않으면 빈 프로브를 사용합니다.
    pub fn probe(mut self, probe: Box<dyn ProcessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// 알림 채널을 추가합니다.
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// 저장소와 함께 파이프라인을 빌드합니다.
    pub fn build<S: ActivityStore>(self, store: S) -> Result<DailyPipeline<S>, LogPipelineError> {
        self.config.validate()?;

        let probe = self
            .probe
            .unwrap_or_else(|| Box::new(StaticProbe::empty()));

        Ok(DailyPipeline {
            parser: IncrementalLogParser::new(&self.config),
            process_monitor: ProcessMonitor::new(probe),
            notifiers: self.notifiers,
            config: self.config,
            store,
        })
    }
}

impl Default for DailyPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
