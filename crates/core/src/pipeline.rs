//! 파이프라인 trait -- 구성 요소 확장 포인트 정의
//!
//! 일일 패스는 구체 타입 대신 이 trait들에 의존합니다.
//! 모니터는 수집+분석, 알림 채널은 전송, 저장소는 멱등 저장을 담당합니다.

use crate::error::{ClawmonError, StorageError};
use crate::types::{
    ActivityCounts, ActivityRecord, DailyReport, ExecutionMark, ProcessSample,
    SecurityEventRecord,
};

/// 수집 후 분석하는 모니터 trait
///
/// `collect`는 입력에서 레코드를 모아 내부 상태에 쌓고,
/// `analyze`는 누적된 상태로부터 집계 결과를 계산합니다.
pub trait Monitor {
    /// 수집 입력
    type Input: ?Sized;
    /// 수집된 레코드
    type Record;
    /// 분석 결과
    type Analysis;

    /// 모니터 이름
    fn name(&self) -> &str;

    /// 입력에서 레코드를 수집합니다.
    fn collect(&mut self, input: &Self::Input) -> Result<&[Self::Record], ClawmonError>;

    /// 수집된 레코드를 분석합니다.
    fn analyze(&self) -> Self::Analysis;
}

/// 일일 리포트 전달 채널 trait
pub trait Notifier: Send + Sync {
    /// 채널 이름
    fn name(&self) -> &str;

    /// 리포트를 전달하고 실제 전달 여부를 반환합니다.
    fn send(&self, report: &DailyReport) -> Result<bool, ClawmonError>;
}

/// 외부 프로세스 리소스 프로브 trait
pub trait ProcessProbe: Send + Sync {
    /// 프로브 이름
    fn name(&self) -> &str;

    /// 현재 프로세스 샘플을 반환합니다.
    fn sample(&self) -> Result<Vec<ProcessSample>, ClawmonError>;
}

/// 활동/보안 이벤트 저장소 trait
///
/// 삽입은 자연 키 기준으로 멱등이어야 합니다.
/// 이미 존재하는 키를 삽입하면 에러 없이 `Ok(false)`를 반환합니다.
pub trait ActivityStore {
    /// 활동 레코드를 삽입하고 새로 추가되었는지 반환합니다.
    fn insert_activity(&mut self, record: &ActivityRecord) -> Result<bool, StorageError>;

    /// 보안 이벤트를 삽입하고 새로 추가되었는지 반환합니다.
    fn insert_security_event(&mut self, event: &SecurityEventRecord)
    -> Result<bool, StorageError>;

    /// 날짜별 일일 리포트를 교체 저장합니다.
    fn upsert_daily_report(&mut self, report: &DailyReport) -> Result<(), StorageError>;

    /// 실행 마크를 추가합니다.
    fn record_execution(&mut self, mark: &ExecutionMark) -> Result<(), StorageError>;

    /// 실행 시각 기준 가장 최근 마크를 반환합니다.
    fn last_execution(&self) -> Result<Option<ExecutionMark>, StorageError>;

    /// 날짜별 활동 집계를 반환합니다.
    fn activity_counts(&self, date: &str) -> Result<ActivityCounts, StorageError>;

    /// 날짜별 보안 이벤트 수를 반환합니다.
    fn security_event_count(&self, date: &str) -> Result<u64, StorageError>;
}
