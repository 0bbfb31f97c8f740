//! 도메인 타입 -- 파이프라인 전역에서 사용되는 공통 타입
//!
//! 영속 레코드(활동, 보안 이벤트, 일일 리포트, 실행 마크)와
//! 타임스탬프 비교 규칙을 정의합니다.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 설명 필드 최대 길이 (문자 수). 자연 키에 포함됩니다.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// 심각도 레벨
///
/// `Warning`은 로그 누락 경고 전용이며 점수 차감 사다리에 포함되지 않습니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 정보성 이벤트
    #[default]
    Info,
    /// 경고 (로그 누락)
    Warning,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적
    Critical,
}

impl Severity {
    /// 저장용 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 활동 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// 프로세스 샘플
    Process,
    /// 실행된 명령
    Command,
    /// 파일 접근
    FileAccess,
    /// 보안 이벤트
    SecurityEvent,
}

impl ActivityType {
    /// 저장용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Command => "command",
            Self::FileAccess => "file_access",
            Self::SecurityEvent => "security_event",
        }
    }

    /// 저장된 이름에서 유형을 복원합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "process" => Some(Self::Process),
            "command" => Some(Self::Command),
            "file_access" => Some(Self::FileAccess),
            "security_event" => Some(Self::SecurityEvent),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 외부 프로세스 프로브가 제공하는 샘플
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    /// 샘플링 시각
    pub timestamp: String,
    /// 프로세스 ID
    pub pid: u32,
    /// 프로세스 이름
    pub name: String,
    /// 상주 메모리 (MB)
    #[serde(default)]
    pub memory_mb: f64,
    /// CPU 사용률 (%)
    #[serde(default)]
    pub cpu_percent: f64,
    /// 프로세스 생성 시각
    #[serde(default)]
    pub create_time: Option<String>,
    /// 실행 시간 (초)
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// 영속 활동 레코드
///
/// 자연 키: (date, timestamp, activity_type, description)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// 대상 날짜 (YYYY-MM-DD)
    pub date: String,
    /// 원본 타임스탬프 (없으면 빈 문자열)
    pub timestamp: String,
    /// 활동 유형
    pub activity_type: ActivityType,
    /// 설명 (최대 200자)
    pub description: String,
    /// 심각도
    pub severity: Severity,
    /// 원본 상세 정보
    pub details: Option<serde_json::Value>,
}

impl ActivityRecord {
    /// 새 활동 레코드를 생성합니다. 설명은 200자로 잘립니다.
    pub fn new(
        date: impl Into<String>,
        timestamp: impl Into<String>,
        activity_type: ActivityType,
        description: &str,
        severity: Severity,
    ) -> Self {
        Self {
            date: date.into(),
            timestamp: timestamp.into(),
            activity_type,
            description: truncate_chars(description, DESCRIPTION_MAX_CHARS),
            severity,
            details: None,
        }
    }

    /// 상세 정보를 첨부합니다.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// 영속 보안 이벤트
///
/// 자연 키: (date, timestamp, event_type, description)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEventRecord {
    /// 대상 날짜 (YYYY-MM-DD)
    pub date: String,
    /// 원본 타임스탬프 (없으면 빈 문자열)
    pub timestamp: String,
    /// 이벤트 분류 (permission, security, general, log_management)
    pub event_type: String,
    /// 설명 (최대 200자)
    pub description: String,
    /// 심각도
    pub severity: Severity,
    /// 발생 소스 (로그 파일 경로)
    pub source: Option<String>,
    /// 원본 상세 정보
    pub details: Option<serde_json::Value>,
}

impl SecurityEventRecord {
    /// 새 보안 이벤트를 생성합니다. 설명은 200자로 잘립니다.
    pub fn new(
        date: impl Into<String>,
        timestamp: impl Into<String>,
        event_type: impl Into<String>,
        description: &str,
        severity: Severity,
    ) -> Self {
        Self {
            date: date.into(),
            timestamp: timestamp.into(),
            event_type: event_type.into(),
            description: truncate_chars(description, DESCRIPTION_MAX_CHARS),
            severity,
            source: None,
            details: None,
        }
    }

    /// 발생 소스를 지정합니다.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 상세 정보를 첨부합니다.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// 날짜별 일일 리포트 스냅샷 (날짜 기준 교체 저장)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// 대상 날짜
    pub date: String,
    /// 생성 시각 (RFC 3339)
    pub generated_at: String,
    /// 보안 점수 (0..=100)
    pub security_score: u8,
    /// 해당 날짜 전체 활동 수
    pub total_events: u64,
    /// 프로세스 활동 수
    pub process_count: u64,
    /// 명령 활동 수
    pub command_count: u64,
    /// 파일 접근 활동 수
    pub file_access_count: u64,
    /// 보안 이벤트 수
    pub security_event_count: u64,
    /// 요약 블롭
    pub summary: serde_json::Value,
}

/// 날짜별 활동 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
    /// 전체
    pub total: u64,
    /// 프로세스
    pub process: u64,
    /// 명령
    pub command: u64,
    /// 파일 접근
    pub file_access: u64,
    /// 보안 이벤트 활동
    pub security_event: u64,
}

impl ActivityCounts {
    /// 유형별 카운트를 누적합니다.
    pub fn add(&mut self, activity_type: ActivityType, count: u64) {
        self.total += count;
        match activity_type {
            ActivityType::Process => self.process += count,
            ActivityType::Command => self.command += count,
            ActivityType::FileAccess => self.file_access += count,
            ActivityType::SecurityEvent => self.security_event += count,
        }
    }
}

/// 실행 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// 정상 완료
    #[default]
    Success,
    /// 실패
    Failed,
}

impl ExecutionStatus {
    /// 저장용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// 저장된 이름에서 상태를 복원합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 실행 마크 (추가 전용)
///
/// 다음 패스의 워터마크를 `last_activity_timestamp`로 전달합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMark {
    /// 고유 실행 ID
    pub execution_id: String,
    /// 실행 시각 (RFC 3339)
    pub execution_time: String,
    /// 이번 패스가 사용한 워터마크
    pub last_log_timestamp: Option<String>,
    /// 이번 패스에서 관찰한 최대 활동 타임스탬프
    pub last_activity_timestamp: Option<String>,
    /// 실행 상태
    pub status: ExecutionStatus,
    /// 수집한 사실 수
    pub data_collected: u64,
    /// 알림 전송 여부
    pub email_sent: bool,
}

/// 문자 단위로 문자열을 자릅니다.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

/// 로그 타임스탬프 문자열을 UTC 시각으로 해석합니다.
///
/// 지원 형식:
/// - RFC 3339 (`2024-01-15T10:00:00Z`, `+09:00`)
/// - 오프셋 없는 ISO 8601 (`2024-01-15T10:00:00`, 소수 초 허용, UTC로 간주)
/// - Unix 초 / 밀리초 정수
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(n) = value.parse::<i64>() {
        // 10^12 이상이면 밀리초로 간주
        return if n.abs() >= 1_000_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            Utc.timestamp_opt(n, 0).single()
        };
    }

    None
}

/// 두 타임스탬프를 비교합니다.
///
/// 둘 다 시각으로 해석되면 시각으로, 아니면 문자열 사전순으로 비교합니다.
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// 두 타임스탬프 중 늦은 쪽을 반환합니다.
pub fn later_timestamp<'a>(a: &'a str, b: &'a str) -> &'a str {
    if compare_timestamps(b, a) == Ordering::Greater {
        b
    } else {
        a
    }
}
