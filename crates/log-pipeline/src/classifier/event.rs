//! 분류 이벤트 -- 시스템 로그 한 줄에서 추출한 이벤트

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ladder;
use super::patterns::ClassifierPatterns;

/// 메시지를 구성하는 위치 인덱스 필드 수 (`"0"`..`"9"`)
const MESSAGE_PARTS: usize = 10;

/// 이벤트 유형 (닫힌 어휘)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RunStart,
    RunComplete,
    RunEvent,
    SessionState,
    SessionEvent,
    GatewayListening,
    GatewayMounted,
    GatewayEvent,
    ConnectionClosed,
    ConnectionEvent,
    Error,
    FileAccess,
    /// 어느 규칙에도 해당하지 않음
    Other,
}

impl EventType {
    /// 전체 어휘
    pub const ALL: [EventType; 13] = [
        Self::RunStart,
        Self::RunComplete,
        Self::RunEvent,
        Self::SessionState,
        Self::SessionEvent,
        Self::GatewayListening,
        Self::GatewayMounted,
        Self::GatewayEvent,
        Self::ConnectionClosed,
        Self::ConnectionEvent,
        Self::Error,
        Self::FileAccess,
        Self::Other,
    ];

    /// 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStart => "run_start",
            Self::RunComplete => "run_complete",
            Self::RunEvent => "run_event",
            Self::SessionState => "session_state",
            Self::SessionEvent => "session_event",
            Self::GatewayListening => "gateway_listening",
            Self::GatewayMounted => "gateway_mounted",
            Self::GatewayEvent => "gateway_event",
            Self::ConnectionClosed => "connection_closed",
            Self::ConnectionEvent => "connection_event",
            Self::Error => "error",
            Self::FileAccess => "file_access",
            Self::Other => "other",
        }
    }

    /// 실행(run) 계열 여부
    pub fn is_run(&self) -> bool {
        matches!(self, Self::RunStart | Self::RunComplete | Self::RunEvent)
    }

    /// 세션 계열 여부
    pub fn is_session(&self) -> bool {
        matches!(self, Self::SessionState | Self::SessionEvent)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 분류된 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    /// `_meta.date` 또는 `time`
    pub timestamp: Option<String>,
    /// `_meta.name`
    pub subsystem: String,
    /// `_meta.logLevelName` (기본값 `INFO`)
    pub log_level: String,
    /// ANSI 제거된 메시지
    pub message: String,
    /// 라인 번호
    pub line_number: usize,
    /// 유형
    #[serde(rename = "type")]
    pub event_type: EventType,
}

impl ClassifiedEvent {
    /// JSON 값에서 이벤트를 추출하고 분류합니다.
    ///
    /// 객체가 아니면 `None`입니다.
    pub fn from_value(
        value: &Value,
        line_number: usize,
        patterns: &ClassifierPatterns,
    ) -> Option<Self> {
        let obj = value.as_object()?;
        let meta = obj.get("_meta").and_then(Value::as_object);
        let meta_text = |key: &str| meta.and_then(|m| m.get(key)).and_then(scalar_text);

        let timestamp = meta_text("date").or_else(|| obj.get("time").and_then(scalar_text));
        let subsystem = meta_text("name").unwrap_or_default();
        let log_level = meta_text("logLevelName").unwrap_or_else(|| "INFO".to_owned());

        let parts: Vec<String> = (0..MESSAGE_PARTS)
            .filter_map(|i| obj.get(i.to_string().as_str()))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let message = patterns.strip_ansi(&parts.join(" "));
        let event_type = ladder::classify(&message, &subsystem);

        Some(Self {
            timestamp,
            subsystem,
            log_level,
            message,
            line_number,
            event_type,
        })
    }

    /// 로그 레벨이 정확히 `ERROR` 또는 `WARN`인지 여부 (대소문자 구분)
    pub fn is_error_level(&self) -> bool {
        matches!(self.log_level.as_str(), "ERROR" | "WARN")
    }
}

/// 비어 있지 않은 문자열/숫자를 텍스트로 변환합니다.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: &Value, line: usize) -> Option<ClassifiedEvent> {
        let patterns = ClassifierPatterns::compile().unwrap();
        ClassifiedEvent::from_value(value, line, &patterns)
    }

    #[test]
    fn extracts_meta_fields_and_message() {
        let value = json!({
            "0": "embedded run start",
            "1": {"runId": "abc"},
            "2": 42,
            "_meta": {"date": "2024-01-15T10:00:00Z", "name": "agent/embedded", "logLevelName": "DEBUG"}
        });
        let event = classify(&value, 7).unwrap();
        assert_eq!(event.timestamp.as_deref(), Some("2024-01-15T10:00:00Z"));
        assert_eq!(event.subsystem, "agent/embedded");
        assert_eq!(event.log_level, "DEBUG");
        assert_eq!(event.message, r#"embedded run start {"runId":"abc"} 42"#);
        assert_eq!(event.event_type, EventType::RunStart);
        assert_eq!(event.line_number, 7);
    }

    #[test]
    fn falls_back_to_time_and_defaults() {
        let value = json!({"time": "2024-01-15T11:00:00Z", "0": "hello"});
        let event = classify(&value, 1).unwrap();
        assert_eq!(event.timestamp.as_deref(), Some("2024-01-15T11:00:00Z"));
        assert_eq!(event.subsystem, "");
        assert_eq!(event.log_level, "INFO");
        assert_eq!(event.event_type, EventType::Other);
    }

    #[test]
    fn only_first_ten_positional_fields_are_used() {
        let mut map = serde_json::Map::new();
        for i in 0..12 {
            map.insert(i.to_string(), json!(format!("p{i}")));
        }
        let event = classify(&Value::Object(map), 1).unwrap();
        assert!(event.message.ends_with("p9"));
        assert!(!event.message.contains("p10"));
    }

    #[test]
    fn non_object_yields_none() {
        assert!(classify(&json!("text"), 1).is_none());
        assert!(classify(&json!([1, 2]), 1).is_none());
    }

    #[test]
    fn message_is_stripped_of_ansi_codes() {
        let value = json!({"0": "\x1b[32mready\x1b[0m", "1": "ok"});
        assert_eq!(classify(&value, 1).unwrap().message, "ready ok");
    }

    #[test]
    fn error_level_detection() {
        let value = json!({"0": "x", "_meta": {"logLevelName": "WARN"}});
        assert!(classify(&value, 1).unwrap().is_error_level());
        let value = json!({"0": "x", "_meta": {"logLevelName": "INFO"}});
        assert!(!classify(&value, 1).unwrap().is_error_level());
    }

    #[test]
    fn error_level_match_is_case_sensitive() {
        for level in ["warn", "Error", "WARNING"] {
            let value = json!({"0": "x", "_meta": {"logLevelName": level}});
            assert!(!classify(&value, 1).unwrap().is_error_level(), "{level}");
        }
        let value = json!({"0": "x", "_meta": {"logLevelName": "ERROR"}});
        assert!(classify(&value, 1).unwrap().is_error_level());
    }

    #[test]
    fn event_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EventType::GatewayListening).unwrap(),
            "\"gateway_listening\""
        );
        for ty in EventType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }
}
