//! 사실(fact) 추출
//!
//! 한 라인은 키 이름에 따라 0개 이상의 사실을 만듭니다.
//! 추출은 서로 배타적이지 않습니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{LogRecord, value_text};

/// 명령 사실을 만드는 키
pub const COMMAND_KEYS: [&str; 3] = ["exec", "command", "cmd"];

/// 파일 접근 사실을 만드는 키
pub const PATH_KEYS: [&str; 4] = ["path", "file", "read", "write"];

/// 원시 이벤트를 만드는 키
pub const EVENT_KEYS: [&str; 3] = ["error", "permission", "security"];

/// 실행된 명령
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandFact {
    /// 원본 파일
    pub source_file: String,
    /// 라인 번호 (승인 목록은 항목 순번)
    pub line: usize,
    /// 타임스탬프
    pub timestamp: Option<String>,
    /// 명령 (`exec`, `command`, `cmd` 순으로 첫 값)
    pub command: Option<String>,
    /// 승인 목록에서 합쳐진 항목 여부
    #[serde(default)]
    pub from_approvals: bool,
    /// 승인 목록의 원본 항목 (알 수 없는 필드까지 그대로 보존)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl CommandFact {
    /// 레코드에서 명령 사실을 추출합니다.
    pub fn from_record(record: &LogRecord) -> Option<Self> {
        if !record.has_any(&COMMAND_KEYS) {
            return None;
        }
        Some(Self {
            source_file: record.source_file.clone(),
            line: record.line_number,
            timestamp: record.timestamp.clone(),
            command: record.first_text(&COMMAND_KEYS),
            from_approvals: false,
            raw: None,
        })
    }

    /// 승인 목록 항목을 명령 사실로 변환합니다.
    ///
    /// 객체 항목은 `command`/`timestamp` 필드를, 문자열 항목은 값 자체를 명령으로 씁니다.
    /// `command`가 없는 객체는 `pattern`을 명령으로 씁니다. 원본 항목은 `raw`에 그대로 남습니다.
    pub fn from_approval(source_file: &str, index: usize, entry: &Value) -> Self {
        let (timestamp, command) = match entry {
            Value::Object(map) => (
                map.get("timestamp").and_then(value_text),
                map.get("command")
                    .or_else(|| map.get("pattern"))
                    .and_then(value_text),
            ),
            other => (None, value_text(other)),
        };
        Self {
            source_file: source_file.to_owned(),
            line: index + 1,
            timestamp,
            command,
            from_approvals: true,
            raw: Some(entry.clone()),
        }
    }
}

/// 파일 접근
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAccessFact {
    /// 원본 파일
    pub source_file: String,
    /// 라인 번호
    pub line: usize,
    /// 타임스탬프
    pub timestamp: Option<String>,
    /// 접근 경로 (`path`, `file` 순으로 첫 값)
    pub path: Option<String>,
    /// 접근 유형 (`type` 필드, 기본값 `access`)
    pub access_type: String,
    /// 읽기 여부
    pub read: bool,
    /// 쓰기 여부
    pub write: bool,
}

impl FileAccessFact {
    /// 레코드에서 파일 접근 사실을 추출합니다.
    pub fn from_record(record: &LogRecord) -> Option<Self> {
        if !record.has_any(&PATH_KEYS) {
            return None;
        }
        Some(Self {
            source_file: record.source_file.clone(),
            line: record.line_number,
            timestamp: record.timestamp.clone(),
            path: record.first_text(&["path", "file"]),
            access_type: record
                .first_text(&["type"])
                .unwrap_or_else(|| "access".to_owned()),
            read: record.flag("read"),
            write: record.flag("write"),
        })
    }
}

/// 원시 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEventKind {
    /// `permission` 키가 있는 보안 이벤트
    Security,
    /// 그 외 이벤트
    Event,
}

impl RawEventKind {
    /// 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Event => "event",
        }
    }
}

/// 에러/권한/보안 키에서 나온 원시 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// 원본 파일
    pub source_file: String,
    /// 라인 번호
    pub line: usize,
    /// 타임스탬프
    pub timestamp: Option<String>,
    /// 로그 레벨 (기본값 `info`)
    pub level: String,
    /// 메시지 (`message`, `error` 순으로 첫 값)
    pub message: Option<String>,
    /// 종류
    pub kind: RawEventKind,
}

impl RawEvent {
    /// 레코드에서 원시 이벤트를 추출합니다.
    pub fn from_record(record: &LogRecord) -> Option<Self> {
        if !record.has_any(&EVENT_KEYS) {
            return None;
        }
        let kind = if record.has_any(&["permission"]) {
            RawEventKind::Security
        } else {
            RawEventKind::Event
        };
        Some(Self {
            source_file: record.source_file.clone(),
            line: record.line_number,
            timestamp: record.timestamp.clone(),
            level: record
                .first_text(&["level"])
                .unwrap_or_else(|| "info".to_owned()),
            message: record.first_text(&["message", "error"]),
            kind,
        })
    }
}
