//! 분류기 보고서

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use super::correlation::{Run, Session};
use super::event::ClassifiedEvent;

/// 라인 및 이벤트 집계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifierStatistics {
    /// 비어 있지 않은 라인 수
    pub total_lines: u64,
    /// JSON으로 디코딩된 라인 수 (객체가 아닌 값 포함)
    pub parsed_lines: u64,
    /// JSON 디코딩 실패 라인 수
    pub unparsed_lines: u64,
    pub runs: u64,
    pub sessions: u64,
    pub errors: u64,
    pub file_accesses: u64,
    pub api_calls: u64,
    pub api_errors: u64,
    pub external_conversations: u64,
}

/// 관측된 타임스탬프 범위
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// 실행 상태별 수
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunBreakdown {
    pub total: usize,
    pub completed: usize,
    pub running: usize,
    pub unknown: usize,
}

/// 세션 상태별 수
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionBreakdown {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub unknown: usize,
}

/// API 사용량
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiUsage {
    pub total_calls: u64,
    pub errors: u64,
    pub methods: BTreeMap<String, u64>,
}

/// 외부 대화 채널 히스토그램
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalConversations {
    pub total: u64,
    pub channels: BTreeMap<String, u64>,
}

/// 에러 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub total: u64,
    /// 앞부분 60자로 묶은 상위 에러 메시지
    pub top_errors: BTreeMap<String, u64>,
}

/// 상세 데이터
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportDetails {
    pub runs: BTreeMap<String, Run>,
    pub sessions: BTreeMap<String, Session>,
    /// 마지막 100개 이벤트
    pub recent_events: Vec<ClassifiedEvent>,
}

/// 시스템 로그 분석 보고서
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifierReport {
    /// 분석 시각 (RFC 3339)
    pub analysis_time: String,
    pub time_range: TimeRange,
    pub statistics: ClassifierStatistics,
    pub event_distribution: BTreeMap<String, u64>,
    pub runs: RunBreakdown,
    pub sessions: SessionBreakdown,
    pub api_usage: ApiUsage,
    pub external_conversations: ExternalConversations,
    pub errors: ErrorSummary,
    pub details: ReportDetails,
}

impl ClassifierReport {
    /// 사람이 읽는 요약 텍스트
    pub fn summary_text(&self) -> String {
        let rule = "=".repeat(60);
        let s = &self.statistics;
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "OpenClaw system log summary");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Lines parsed: {}/{}",
            s.parsed_lines, s.total_lines
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Statistics:");
        let _ = writeln!(out, "  - run events:             {}", s.runs);
        let _ = writeln!(out, "  - sessions:               {}", self.sessions.total);
        let _ = writeln!(out, "  - file accesses:          {}", s.file_accesses);
        let _ = writeln!(out, "  - errors/warnings:        {}", s.errors);
        let _ = writeln!(out, "  - API calls:              {}", s.api_calls);
        let _ = writeln!(out, "  - external conversations: {}", s.external_conversations);
        let _ = writeln!(out);
        let _ = writeln!(out, "Runs:");
        let _ = writeln!(out, "  - total:     {}", self.runs.total);
        let _ = writeln!(out, "  - completed: {}", self.runs.completed);
        let _ = writeln!(out, "  - running:   {}", self.runs.running);
        let _ = writeln!(out);
        let _ = writeln!(out, "Sessions:");
        let _ = writeln!(out, "  - total:    {}", self.sessions.total);
        let _ = writeln!(out, "  - active:   {}", self.sessions.active);
        let _ = writeln!(out, "  - inactive: {}", self.sessions.inactive);
        let _ = writeln!(out);
        let _ = write!(out, "{rule}");
        out
    }
}
