//! 실행/세션 상관관계 테이블
//!
//! 식별자(`runId=`, `sessionId=`)를 가진 이벤트만 테이블을 갱신합니다.
//! 식별자가 없으면 집계에만 반영됩니다.

use std::collections::BTreeMap;

use serde::Serialize;

use super::event::{ClassifiedEvent, EventType};
use super::patterns::ClassifierPatterns;

/// 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Complete,
    Unknown,
}

/// 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Inactive,
    Unknown,
}

impl SessionState {
    /// 상태 메시지에서 세션 상태를 읽습니다.
    ///
    /// `inactive`는 `active`를 포함하므로 먼저 검사합니다.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("inactive") || lower.contains("closed") {
            Self::Inactive
        } else if lower.contains("active") {
            Self::Active
        } else {
            Self::Unknown
        }
    }
}

/// 실행 상관관계 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub start: Option<String>,
    pub complete: Option<String>,
    pub status: RunStatus,
}

/// 세션 상관관계 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub start: Option<String>,
    pub state: SessionState,
}

/// 분석 패스 하나에서 만들어지는 상관관계 테이블
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationTables {
    pub runs: BTreeMap<String, Run>,
    pub sessions: BTreeMap<String, Session>,
}

impl CorrelationTables {
    /// 이벤트 하나를 반영합니다.
    pub fn observe(&mut self, event: &ClassifiedEvent, patterns: &ClassifierPatterns) {
        if event.event_type.is_run() {
            if let Some(id) = patterns.run_id(&event.message) {
                self.observe_run(id, event);
            }
        }
        if event.event_type.is_session() {
            if let Some(id) = patterns.session_id(&event.message) {
                self.observe_session(id, event);
            }
        }
    }

    fn observe_run(&mut self, id: &str, event: &ClassifiedEvent) {
        let run = self.runs.entry(id.to_owned()).or_insert(Run {
            start: None,
            complete: None,
            status: RunStatus::Unknown,
        });
        match event.event_type {
            EventType::RunStart => {
                run.start = event.timestamp.clone();
                run.status = RunStatus::Running;
            }
            EventType::RunComplete => {
                run.complete = event.timestamp.clone();
                run.status = RunStatus::Complete;
            }
            _ => {}
        }
    }

    fn observe_session(&mut self, id: &str, event: &ClassifiedEvent) {
        let session = self.sessions.entry(id.to_owned()).or_insert(Session {
            start: event.timestamp.clone(),
            state: SessionState::Active,
        });
        if event.event_type == EventType::SessionState {
            session.state = SessionState::from_message(&event.message);
        }
    }

    /// 상태별 실행 수
    pub fn runs_with(&self, status: RunStatus) -> usize {
        self.runs.values().filter(|r| r.status == status).count()
    }

    /// 상태별 세션 수
    pub fn sessions_with(&self, state: SessionState) -> usize {
        self.sessions.values().filter(|s| s.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: EventType, message: &str, ts: &str) -> ClassifiedEvent {
        ClassifiedEvent {
            timestamp: Some(ts.to_owned()),
            subsystem: "agent/embedded".to_owned(),
            log_level: "INFO".to_owned(),
            message: message.to_owned(),
            line_number: 1,
            event_type,
        }
    }

    #[test]
    fn run_lifecycle() {
        let patterns = ClassifierPatterns::compile().unwrap();
        let mut tables = CorrelationTables::default();

        tables.observe(&event(EventType::RunEvent, "embedded run prompt runId=abc-1", "t0"), &patterns);
        assert_eq!(tables.runs["abc-1"].status, RunStatus::Unknown);

        tables.observe(&event(EventType::RunStart, "embedded run start runId=abc-1", "t1"), &patterns);
        assert_eq!(tables.runs["abc-1"].status, RunStatus::Running);
        assert_eq!(tables.runs["abc-1"].start.as_deref(), Some("t1"));

        tables.observe(&event(EventType::RunComplete, "embedded run done runId=abc-1", "t2"), &patterns);
        let run = &tables.runs["abc-1"];
        assert_eq!(run.status, RunStatus::Complete);
        assert_eq!(run.complete.as_deref(), Some("t2"));
        assert_eq!(tables.runs_with(RunStatus::Complete), 1);
    }

    #[test]
    fn events_without_identifier_leave_tables_untouched() {
        let patterns = ClassifierPatterns::compile().unwrap();
        let mut tables = CorrelationTables::default();
        tables.observe(&event(EventType::RunStart, "embedded run start", "t1"), &patterns);
        tables.observe(&event(EventType::SessionEvent, "session created", "t1"), &patterns);
        assert!(tables.runs.is_empty());
        assert!(tables.sessions.is_empty());
    }

    #[test]
    fn session_starts_active_and_tracks_state() {
        let patterns = ClassifierPatterns::compile().unwrap();
        let mut tables = CorrelationTables::default();

        tables.observe(&event(EventType::SessionEvent, "session created sessionId=ff01", "t1"), &patterns);
        assert_eq!(tables.sessions["ff01"].state, SessionState::Active);
        assert_eq!(tables.sessions["ff01"].start.as_deref(), Some("t1"));

        tables.observe(
            &event(EventType::SessionState, "session state inactive sessionId=ff01", "t2"),
            &patterns,
        );
        assert_eq!(tables.sessions["ff01"].state, SessionState::Inactive);
        assert_eq!(tables.sessions["ff01"].start.as_deref(), Some("t1"));
        assert_eq!(tables.sessions_with(SessionState::Active), 0);
    }

    #[test]
    fn session_state_parsing() {
        assert_eq!(SessionState::from_message("state=active"), SessionState::Active);
        assert_eq!(SessionState::from_message("state=INACTIVE"), SessionState::Inactive);
        assert_eq!(SessionState::from_message("channel closed"), SessionState::Inactive);
        assert_eq!(SessionState::from_message("state=idle"), SessionState::Unknown);
    }

    #[test]
    fn inactive_takes_precedence_over_active_substring() {
        assert_eq!(SessionState::from_message("session inactive"), SessionState::Inactive);
        assert_eq!(
            SessionState::from_message("active session closed"),
            SessionState::Inactive
        );
    }
}
