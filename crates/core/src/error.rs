//! 에러 타입 -- 도메인별 에러 정의

/// clawmon 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ClawmonError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 외부 수집기(프로세스 프로브, 알림 채널) 에러
    #[error("collector '{name}' failed: {reason}")]
    Collector { name: String, reason: String },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 로그 파일 탐색 실패
    #[error("log resolution failed: {0}")]
    Resolve(String),

    /// 일일 패스 실패
    #[error("daily pass failed: {0}")]
    PassFailed(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 구조적으로 잘못된 JSON 라인
    #[error("malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// 최상위 값이 객체가 아님
    #[error("record at line {line} is not a JSON object")]
    NotAnObject { line: usize },

    /// 날짜 형식 오류
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),
}
