//! 보안 분석기
//!
//! 파싱된 사실을 심각도가 붙은 보안 발견 항목으로 매핑하고 점수를 계산합니다.
//!
//! # 점수 규칙
//! - 매 패스 100점에서 시작합니다 (패스 간 누적 없음).
//! - 로그 누락 시 한 번 10점을 차감합니다.
//! - critical ×10, high ×5, medium ×2를 차감합니다. info/low/warning은 차감 없음.
//! - 결과는 `0..=100`으로 제한됩니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use clawmon_core::error::ClawmonError;
use clawmon_core::pipeline::Monitor;
use clawmon_core::types::Severity;

use crate::parser::{ParsedLogs, RawEvent};

/// 민감 경로 접두사 (medium)
pub const SENSITIVE_PATHS: [&str; 8] = [
    "/Users", "/etc", "/private", "/System", "/Library", "/.aws", "/.ssh", "/.gnupg",
];

/// 시스템 경로 접두사 (low)
pub const SYSTEM_PATHS: [&str; 7] = ["/System", "/Library", "/usr", "/var", "/bin", "/sbin", "/opt"];

/// 높은 심각도 키워드
const HIGH_KEYWORDS: [&str; 3] = ["permission denied", "access denied", "unauthorized"];

/// 중간 심각도 키워드
const MEDIUM_KEYWORDS: [&str; 3] = ["error", "failed", "exception"];

/// 로그 누락 경고 메시지
pub const MISSING_LOGS_MESSAGE: &str =
    "Log files are missing or were not found; security analysis may be incomplete";

/// 로그 누락 차감 점수
pub const MISSING_LOGS_PENALTY: i64 = 10;

/// 파일 경로 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathClass {
    /// 민감 경로
    Sensitive,
    /// 시스템 경로
    System,
    /// 사용자 경로
    User,
}

impl PathClass {
    /// 경로 접두사로 분류합니다. 민감 경로가 우선합니다.
    pub fn of(path: &str) -> Self {
        if SENSITIVE_PATHS.iter().any(|p| path.starts_with(p)) {
            Self::Sensitive
        } else if SYSTEM_PATHS.iter().any(|p| path.starts_with(p)) {
            Self::System
        } else {
            Self::User
        }
    }

    /// 분류에 따른 심각도
    pub fn severity(&self) -> Severity {
        match self {
            Self::Sensitive => Severity::Medium,
            Self::System | Self::User => Severity::Low,
        }
    }

    /// 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sensitive => "sensitive",
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// 발견 항목 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// 실행된 명령
    Command,
    /// 파일 접근
    FileAccess,
    /// 로그 내 보안 이벤트
    SecurityEvent,
    /// 로그 누락 경고
    LogWarning,
}

impl FindingKind {
    /// 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::FileAccess => "file_access",
            Self::SecurityEvent => "security_event",
            Self::LogWarning => "log_warning",
        }
    }

    /// 보안 이벤트 테이블에 저장되는 종류인지 여부
    pub fn is_persisted_event(&self) -> bool {
        matches!(self, Self::SecurityEvent | Self::LogWarning)
    }
}

/// 보안 발견 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    /// 종류
    pub kind: FindingKind,
    /// 타임스탬프
    pub timestamp: Option<String>,
    /// 심각도
    pub severity: Severity,
    /// 분류 (security_event, log_warning 전용)
    pub category: Option<String>,
    /// 요약 (명령, 경로, 메시지)
    pub message: Option<String>,
    /// 파일 경로 분류 (file_access 전용)
    pub path_class: Option<PathClass>,
    /// 원본 로그 파일
    pub source: Option<String>,
    /// 승인 목록에서 온 명령의 원본 항목
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityAnalysis {
    /// 보안 점수 (0..=100)
    pub security_score: u8,
    /// 종류별 발견 수
    pub event_counts: BTreeMap<String, u64>,
    /// 심각도별 발견 수
    pub severity_counts: BTreeMap<String, u64>,
    /// 전체 발견 수
    pub total_events: usize,
    /// 로그 누락 차감 적용 여부
    pub missing_logs: bool,
    /// 발견 항목
    pub events: Vec<SecurityFinding>,
}

/// 원시 이벤트의 심각도를 결정합니다.
pub fn event_severity(message: Option<&str>, level: &str) -> Severity {
    let message = message.unwrap_or_default().to_lowercase();
    if HIGH_KEYWORDS.iter().any(|k| message.contains(k)) {
        Severity::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| message.contains(k)) {
        Severity::Medium
    } else if level.eq_ignore_ascii_case("warn") {
        Severity::Medium
    } else {
        Severity::Info
    }
}

/// 이벤트 유형 문자열로 분류를 결정합니다.
pub fn event_category(event_type: &str) -> &'static str {
    let lower = event_type.to_lowercase();
    if lower.contains("permission") {
        "permission"
    } else if lower.contains("security") {
        "security"
    } else {
        "general"
    }
}

/// 심각도 집계로 점수를 계산합니다.
pub fn compute_score(critical: u64, high: u64, medium: u64, missing_logs: bool) -> u8 {
    let mut score: i64 = 100;
    if missing_logs {
        score -= MISSING_LOGS_PENALTY;
    }
    let deduction = critical
        .saturating_mul(10)
        .saturating_add(high.saturating_mul(5))
        .saturating_add(medium.saturating_mul(2));
    score = score.saturating_sub(i64::try_from(deduction).unwrap_or(i64::MAX));
    score.clamp(0, 100) as u8
}

/// 보안 분석기
#[derive(Debug, Default)]
pub struct SecurityAnalyzer {
    findings: Vec<SecurityFinding>,
    missing_logs: bool,
}

impl SecurityAnalyzer {
    /// 새 분석기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 원시 이벤트를 보안 발견 항목으로 변환합니다.
    fn finding_for_event(event: &RawEvent) -> SecurityFinding {
        SecurityFinding {
            kind: FindingKind::SecurityEvent,
            timestamp: event.timestamp.clone(),
            severity: event_severity(event.message.as_deref(), &event.level),
            category: Some(event_category(event.kind.as_str()).to_owned()),
            message: event.message.clone(),
            path_class: None,
            source: Some(event.source_file.clone()),
            raw: None,
        }
    }
}

impl Monitor for SecurityAnalyzer {
    type Input = ParsedLogs;
    type Record = SecurityFinding;
    type Analysis = SecurityAnalysis;

    fn name(&self) -> &str {
        "security-analyzer"
    }

    /// 이전 수집 결과를 버리고 새로 수집합니다.
    fn collect(&mut self, input: &ParsedLogs) -> Result<&[SecurityFinding], ClawmonError> {
        self.findings.clear();
        self.missing_logs = input.missing_logs;

        for cmd in &input.commands {
            self.findings.push(SecurityFinding {
                kind: FindingKind::Command,
                timestamp: cmd.timestamp.clone(),
                severity: Severity::Info,
                category: None,
                message: cmd.command.clone(),
                path_class: None,
                source: Some(cmd.source_file.clone()),
                raw: cmd.raw.clone(),
            });
        }

        for access in &input.file_accesses {
            let class = PathClass::of(access.path.as_deref().unwrap_or_default());
            self.findings.push(SecurityFinding {
                kind: FindingKind::FileAccess,
                timestamp: access.timestamp.clone(),
                severity: class.severity(),
                category: None,
                message: access.path.clone(),
                path_class: Some(class),
                source: Some(access.source_file.clone()),
                raw: None,
            });
        }

        for event in &input.events {
            self.findings.push(Self::finding_for_event(event));
        }

        if input.missing_logs {
            let midnight = input.target_date.format("%Y-%m-%dT00:00:00").to_string();
            self.findings.push(SecurityFinding {
                kind: FindingKind::LogWarning,
                timestamp: Some(midnight),
                severity: Severity::Warning,
                category: Some("log_management".to_owned()),
                message: Some(MISSING_LOGS_MESSAGE.to_owned()),
                path_class: None,
                source: None,
                raw: None,
            });
        }

        debug!(findings = self.findings.len(), missing_logs = self.missing_logs, "security findings collected");
        Ok(&self.findings)
    }

    fn analyze(&self) -> SecurityAnalysis {
        let mut event_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut severity_counts: BTreeMap<String, u64> = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
        ]
        .iter()
        .map(|s| (s.as_str().to_owned(), 0))
        .collect();

        for finding in &self.findings {
            *event_counts.entry(finding.kind.as_str().to_owned()).or_default() += 1;
            *severity_counts
                .entry(finding.severity.as_str().to_owned())
                .or_default() += 1;
        }

        let count = |s: Severity| severity_counts.get(s.as_str()).copied().unwrap_or(0);
        let security_score = compute_score(
            count(Severity::Critical),
            count(Severity::High),
            count(Severity::Medium),
            self.missing_logs,
        );

        SecurityAnalysis {
            security_score,
            event_counts,
            severity_counts,
            total_events: self.findings.len(),
            missing_logs: self.missing_logs,
            events: self.findings.clone(),
        }
    }
}
