//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for ClawmonError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use clawmon_core::error::{ClawmonError, ConfigError, ParseError, PipelineError, StorageError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 로그 라인 파싱 실패
    #[error("parse error: {file}:{line}: {reason}")]
    Parse {
        /// 로그 파일 경로
        file: String,
        /// 라인 번호 (1부터)
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// glob 패턴 에러
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Pattern {
        /// 문제가 된 패턴
        pattern: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 읽기 실패
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// 파일 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 날짜 형식 에러
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StorageError),

    /// 외부 협력자(프로브, 알림 채널) 에러
    #[error(transparent)]
    Core(#[from] ClawmonError),

    /// JSON 인코딩 에러
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for ClawmonError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Store(e) => ClawmonError::Storage(e),
            LogPipelineError::Core(e) => e,
            LogPipelineError::Io(e) => ClawmonError::Io(e),
            LogPipelineError::Config { field, reason } => {
                ClawmonError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::InvalidDate(value) => {
                ClawmonError::Parse(ParseError::InvalidDate { value })
            }
            LogPipelineError::Parse { line, reason, .. } => {
                ClawmonError::Parse(ParseError::Malformed { line, reason })
            }
            other @ LogPipelineError::Pattern { .. } => {
                ClawmonError::Pipeline(PipelineError::Resolve(other.to_string()))
            }
            other => ClawmonError::Pipeline(PipelineError::PassFailed(other.to_string())),
        }
    }
}
