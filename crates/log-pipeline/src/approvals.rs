//! 명령 승인 목록 로더
//!
//! 승인 파일은 항목 배열이거나 `{"approvals": [...]}` 객체입니다.
//! 파일이 없거나 잘못된 경우 빈 목록을 반환하며 패스를 중단하지 않습니다.

use std::path::Path;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::parser::CommandFact;

/// 승인 파일을 읽어 명령 사실 목록으로 변환합니다.
pub fn load_approvals(path: &Path) -> Vec<CommandFact> {
    let source = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %source, "approvals file not found, no approvals merged");
            return Vec::new();
        }
        Err(e) => {
            error!(path = %source, error = %e, "failed to read approvals file");
            return Vec::new();
        }
    };

    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            error!(path = %source, error = %e, "failed to parse approvals file");
            return Vec::new();
        }
    };

    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("approvals") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                warn!(path = %source, "'approvals' is not a list, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        },
        _ => {
            warn!(path = %source, "approvals file is neither a list nor an object, ignoring");
            Vec::new()
        }
    };

    let approvals: Vec<CommandFact> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| CommandFact::from_approval(&source, idx, entry))
        .collect();

    info!(path = %source, count = approvals.len(), "loaded command approvals");
    approvals
}
