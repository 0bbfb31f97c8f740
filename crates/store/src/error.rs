//! 저장소 에러 타입
//!
//! [`StoreError`]는 `From` trait을 통해 core의 [`StorageError`]로 변환되어
//! [`ActivityStore`](clawmon_core::pipeline::ActivityStore) 경계를 넘어갑니다.

use clawmon_core::error::StorageError;

/// SQLite 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 데이터베이스 열기 실패
    #[error("failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite 에러
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// 상세 정보 JSON 인코딩/디코딩 에러
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// 저장된 값이 알려진 어휘가 아님
    #[error("invalid value in column '{column}': '{value}'")]
    InvalidValue { column: String, value: String },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Open { .. } | StoreError::Io(_) => StorageError::Connection(err.to_string()),
            other => StorageError::Query(other.to_string()),
        }
    }
}
