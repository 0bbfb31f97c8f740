//! 보조 탐지기: API 메서드와 외부 대화 채널
//!
//! 주 분류와 독립적으로 모든 이벤트에 대해 실행됩니다.

use super::patterns::ClassifierPatterns;

/// 메시지에 자주 등장하는 API 메서드
const COMMON_METHODS: &[&str] = &[
    "chat.history",
    "agent.turn",
    "agent.reply",
    "gateway.call",
    "models.status",
    "models.list",
];

/// 외부 대화 채널 키워드 (검사 순서 유지)
const CHANNELS: &[&str] = &[
    "telegram",
    "whatsapp",
    "discord",
    "slack",
    "signal",
    "imessage",
    "nostr",
    "msteams",
    "mattermost",
    "matrix",
    "bluebubbles",
    "line",
    "zalo",
    "googlechat",
    "webchat",
    "wechat",
    "qq",
    "sms",
];

/// API 메서드 탐지가 활성화되는 서브시스템 키워드
const API_SUBSYSTEMS: &[&str] = &["gateway", "agent"];

/// API 메서드 이름을 찾습니다.
///
/// 서브시스템이 게이트웨이/에이전트일 때만 동작하며
/// `req|res <method>`, `method=<name>`, 공통 메서드 목록 순으로 시도합니다.
pub fn detect_api_method(
    message: &str,
    subsystem: &str,
    patterns: &ClassifierPatterns,
) -> Option<String> {
    if message.is_empty() {
        return None;
    }
    let subsystem = subsystem.to_lowercase();
    if !API_SUBSYSTEMS.iter().any(|s| subsystem.contains(s)) {
        return None;
    }

    if let Some(method) = patterns
        .req_res_method(message)
        .or_else(|| patterns.method_param(message))
    {
        return Some(method.to_owned());
    }

    let lower = message.to_lowercase();
    COMMON_METHODS
        .iter()
        .find(|m| lower.contains(*m))
        .map(|m| (*m).to_owned())
}

/// 외부 대화 채널을 찾습니다.
pub fn detect_channel(message: &str, subsystem: &str) -> Option<String> {
    let subsystem = subsystem.to_lowercase();
    let lower = message.to_lowercase();

    if subsystem.contains("gateway/channels/") {
        return subsystem
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
    }

    if subsystem.contains("gateway/ws") && (lower.contains("webchat") || lower.contains("control-ui"))
    {
        return Some("webchat".to_owned());
    }

    CHANNELS
        .iter()
        .find(|c| lower.contains(*c))
        .map(|c| (*c).to_owned())
}
