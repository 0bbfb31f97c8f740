//! 메트릭 이름 상수
//!
//! 모든 메트릭은 `clawmon_` 접두사를 사용합니다.
//! `metrics` 파사드로 기록되며, 레코더 설치는 호스트 프로세스의 몫입니다.

// ─── 레이블 키 ──────────────────────────────────────────────────────

/// 사실 종류 레이블 (command, file_access, event)
pub const LABEL_KIND: &str = "kind";

/// 저장 테이블 레이블
pub const LABEL_TABLE: &str = "table";

/// 결과 레이블 (success, failed)
pub const LABEL_RESULT: &str = "result";

/// 분류 이벤트 유형 레이블
pub const LABEL_EVENT_TYPE: &str = "event_type";

// ─── 로그 파이프라인 ─────────────────────────────────────────────────

/// 읽은 로그 파일 수 (counter)
pub const LOG_PIPELINE_FILES_READ_TOTAL: &str = "clawmon_log_pipeline_files_read_total";

/// 읽지 못하고 건너뛴 파일 수 (counter)
pub const LOG_PIPELINE_FILES_SKIPPED_TOTAL: &str = "clawmon_log_pipeline_files_skipped_total";

/// 파싱된 라인 수 (counter)
pub const LOG_PIPELINE_LINES_PARSED_TOTAL: &str = "clawmon_log_pipeline_lines_parsed_total";

/// 파싱 실패 라인 수 (counter)
pub const LOG_PIPELINE_PARSE_ERRORS_TOTAL: &str = "clawmon_log_pipeline_parse_errors_total";

/// 워터마크로 걸러진 라인 수 (counter)
pub const LOG_PIPELINE_LINES_BEFORE_WATERMARK_TOTAL: &str =
    "clawmon_log_pipeline_lines_before_watermark_total";

/// 추출된 사실 수 (counter, labels: kind)
pub const LOG_PIPELINE_FACTS_TOTAL: &str = "clawmon_log_pipeline_facts_total";

/// 분류된 시스템 로그 이벤트 수 (counter, labels: event_type)
pub const CLASSIFIER_EVENTS_TOTAL: &str = "clawmon_classifier_events_total";

// ─── 저장소 ──────────────────────────────────────────────────────────

/// 새로 삽입된 행 수 (counter, labels: table)
pub const STORE_ROWS_INSERTED_TOTAL: &str = "clawmon_store_rows_inserted_total";

/// 자연 키 중복으로 무시된 행 수 (counter, labels: table)
pub const STORE_ROWS_DEDUPLICATED_TOTAL: &str = "clawmon_store_rows_deduplicated_total";

// ─── 일일 패스 ───────────────────────────────────────────────────────

/// 완료된 패스 수 (counter, labels: result)
pub const PASSES_TOTAL: &str = "clawmon_passes_total";

/// 최근 보안 점수 (gauge)
pub const SECURITY_SCORE: &str = "clawmon_security_score";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더가 설치되지 않았으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        LOG_PIPELINE_FILES_READ_TOTAL,
        "Total number of resolved log files read"
    );
    describe_counter!(
        LOG_PIPELINE_FILES_SKIPPED_TOTAL,
        "Total number of resolved log files skipped because they could not be read"
    );
    describe_counter!(
        LOG_PIPELINE_LINES_PARSED_TOTAL,
        "Total number of log lines parsed as JSON objects"
    );
    describe_counter!(
        LOG_PIPELINE_PARSE_ERRORS_TOTAL,
        "Total number of log lines that failed structural parsing"
    );
    describe_counter!(
        LOG_PIPELINE_LINES_BEFORE_WATERMARK_TOTAL,
        "Total number of log lines at or before the incremental watermark"
    );
    describe_counter!(
        LOG_PIPELINE_FACTS_TOTAL,
        "Facts extracted from log lines by kind"
    );
    describe_counter!(
        CLASSIFIER_EVENTS_TOTAL,
        "System log events classified by event type"
    );
    describe_counter!(
        STORE_ROWS_INSERTED_TOTAL,
        "Rows newly inserted into the store by table"
    );
    describe_counter!(
        STORE_ROWS_DEDUPLICATED_TOTAL,
        "Rows ignored because their natural key already existed"
    );
    describe_counter!(PASSES_TOTAL, "Daily pipeline passes by result");
    describe_gauge!(SECURITY_SCORE, "Security score of the most recent pass");
}
