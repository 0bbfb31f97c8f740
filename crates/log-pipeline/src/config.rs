//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`ClawmonConfig`]에서
//! 로그 소스 관련 값을 가져와 파이프라인 전용 설정을 구성합니다.
//!
//! # 사용 예시
//! ```
//! use clawmon_core::config::ClawmonConfig;
//! use clawmon_log_pipeline::config::PipelineConfig;
//!
//! let core_config = ClawmonConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! assert_eq!(config.file_prefix, "openclaw");
//! ```

use serde::{Deserialize, Serialize};

use clawmon_core::config::ClawmonConfig;

use crate::error::LogPipelineError;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 로그 루트 목록 (확장 전 원본 문자열)
    pub roots: Vec<String>,
    /// 로그 파일 이름 접두사
    pub file_prefix: String,
    /// 명령 승인 목록 파일 (없으면 승인 목록을 읽지 않음)
    pub approvals_file: Option<String>,
    /// 시스템 로그 디렉토리
    pub system_log_dir: String,
    /// 한 라인의 최대 크기 (바이트). 초과 라인은 파싱 실패로 처리
    pub max_line_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&ClawmonConfig::default())
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &ClawmonConfig) -> Self {
        let approvals = core.log_sources.approvals_file.trim();
        Self {
            roots: core.log_sources.paths.clone(),
            file_prefix: core.log_sources.file_prefix.clone(),
            approvals_file: (!approvals.is_empty()).then(|| approvals.to_owned()),
            system_log_dir: core.log_sources.system_log_dir.clone(),
            max_line_bytes: 1024 * 1024, // 1MB
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.roots.is_empty() {
            return Err(LogPipelineError::Config {
                field: "roots".to_owned(),
                reason: "at least one log root is required".to_owned(),
            });
        }

        if self.file_prefix.is_empty() {
            return Err(LogPipelineError::Config {
                field: "file_prefix".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        // 접두사는 glob 패턴에 그대로 들어갑니다
        if self
            .file_prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '*' | '?' | '[' | ']'))
        {
            return Err(LogPipelineError::Config {
                field: "file_prefix".to_owned(),
                reason: format!(
                    "'{}' must not contain path separators or glob metacharacters",
                    self.file_prefix
                ),
            });
        }

        if self.max_line_bytes == 0 {
            return Err(LogPipelineError::Config {
                field: "max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}
