//! 로그 레코드 -- JSONL 한 줄의 파싱 결과

use serde_json::{Map, Value};

use clawmon_core::types::compare_timestamps;

use crate::error::LogPipelineError;

/// 파싱된 로그 한 줄 (패스 동안만 유지)
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 원본 파일 경로
    pub source_file: String,
    /// 라인 번호 (1부터)
    pub line_number: usize,
    /// `timestamp` 필드 (없거나 비어 있으면 `None`)
    pub timestamp: Option<String>,
    /// 원본 필드
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// 원시 바이트 한 줄을 레코드로 디코딩합니다.
    ///
    /// 최상위 값이 JSON 객체가 아니면 에러입니다.
    pub fn decode(
        source_file: &str,
        line_number: usize,
        raw: &[u8],
    ) -> Result<Self, LogPipelineError> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| LogPipelineError::Parse {
            file: source_file.to_owned(),
            line: line_number,
            reason: e.to_string(),
        })?;

        let Value::Object(fields) = value else {
            return Err(LogPipelineError::Parse {
                file: source_file.to_owned(),
                line: line_number,
                reason: "expected JSON object at top level".to_owned(),
            });
        };

        let timestamp = fields.get("timestamp").and_then(value_text);

        Ok(Self {
            source_file: source_file.to_owned(),
            line_number,
            timestamp,
            fields,
        })
    }

    /// 키 중 하나라도 존재하면 true (값이 null이어도 존재로 봄)
    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.fields.contains_key(*k))
    }

    /// 키 순서대로 처음으로 비어 있지 않은 값을 텍스트로 반환합니다.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|k| self.fields.get(*k).and_then(value_text))
    }

    /// 필드 값의 참/거짓 판정 (없으면 false)
    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(is_truthy)
    }

    /// 워터마크 이하의 타임스탬프를 가진 레코드인지 확인합니다.
    ///
    /// 타임스탬프가 없는 레코드는 항상 false입니다.
    pub fn is_covered_by(&self, watermark: &str) -> bool {
        self.timestamp
            .as_deref()
            .is_some_and(|ts| compare_timestamps(ts, watermark).is_le())
    }
}

/// JSON 값을 텍스트로 변환합니다.
///
/// null, 빈 문자열, false, 빈 배열/객체는 `None`입니다.
/// 문자열은 그대로, 나머지는 compact JSON 텍스트로 변환합니다.
pub fn value_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
