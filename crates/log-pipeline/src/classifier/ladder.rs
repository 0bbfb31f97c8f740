//! 키워드 분류 사다리
//!
//! `(조건, 라벨)` 쌍을 고정 순서로 평가하며 첫 번째로 일치하는 규칙이 유형을 결정합니다.
//! 어느 규칙도 일치하지 않으면 [`EventType::Other`]입니다.

use super::event::EventType;

/// 파일 접근으로 간주하는 메시지 키워드
const FILE_KEYWORDS: &[&str] = &["file", "path", "/users", "/tmp"];

/// 메시지 전체가 이 단어 중 하나이면 에러 이벤트입니다.
const ERROR_WORDS: &[&str] = &["error", "warn", "warning"];

/// 규칙 평가에 쓰이는 소문자 신호
#[derive(Debug)]
pub struct Signals {
    message: String,
    subsystem: String,
}

impl Signals {
    /// 메시지와 서브시스템을 소문자로 정규화합니다.
    pub fn new(message: &str, subsystem: &str) -> Self {
        Self {
            message: message.to_lowercase(),
            subsystem: subsystem.to_lowercase(),
        }
    }

    fn says(&self, word: &str) -> bool {
        self.message.contains(word)
    }

    fn says_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.message.contains(w))
    }
}

type Predicate = fn(&Signals) -> bool;
type Labeler = fn(&Signals) -> EventType;

/// 평가 순서가 곧 우선순위입니다.
const LADDER: &[(Predicate, Labeler)] = &[
    (|s| s.says("run") && s.says("embedded"), label_run),
    (|s| s.says("session"), label_session),
    (|s| s.subsystem.contains("gateway"), label_gateway),
    (|s| s.says_any(&["connection", "connect"]), label_connection),
    (
        |s| ERROR_WORDS.contains(&s.message.trim()),
        |_| EventType::Error,
    ),
    (|s| s.says_any(FILE_KEYWORDS), |_| EventType::FileAccess),
];

fn label_run(s: &Signals) -> EventType {
    if s.says("start") {
        EventType::RunStart
    } else if s.says_any(&["done", "complete"]) {
        EventType::RunComplete
    } else {
        EventType::RunEvent
    }
}

fn label_session(s: &Signals) -> EventType {
    if s.says("state") {
        EventType::SessionState
    } else {
        EventType::SessionEvent
    }
}

fn label_gateway(s: &Signals) -> EventType {
    if s.says("listening") {
        EventType::GatewayListening
    } else if s.says("mounted") {
        EventType::GatewayMounted
    } else {
        EventType::GatewayEvent
    }
}

fn label_connection(s: &Signals) -> EventType {
    if s.says("close") {
        EventType::ConnectionClosed
    } else {
        EventType::ConnectionEvent
    }
}

/// ANSI가 제거된 메시지와 서브시스템으로 이벤트 유형을 결정합니다.
pub fn classify(message: &str, subsystem: &str) -> EventType {
    let signals = Signals::new(message, subsystem);
    LADDER
        .iter()
        .find(|(matches, _)| matches(&signals))
        .map(|(_, label)| label(&signals))
        .unwrap_or(EventType::Other)
}
