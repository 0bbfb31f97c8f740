//! 설정 관리 -- clawmon.toml 파싱 및 런타임 설정
//!
//! [`ClawmonConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//! 시작 시 한 번 생성되어 명시적으로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CLAWMON_DATABASE_PATH=/data/clawmon.db` 형식)
//! 3. 설정 파일 (`clawmon.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), clawmon_core::error::ClawmonError> {
//! use clawmon_core::config::ClawmonConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ClawmonConfig::load("clawmon.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ClawmonConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ClawmonError, ConfigError};

/// clawmon 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClawmonConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub log_sources: LogSourcesConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 리포트 출력 설정
    #[serde(default)]
    pub report: ReportConfig,
}

impl ClawmonConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ClawmonError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 읽습니다 (환경변수 오버라이드 없음, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ClawmonError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClawmonError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ClawmonError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ClawmonError> {
        toml::from_str(toml_str).map_err(|e| {
            ClawmonError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CLAWMON_{SECTION}_{FIELD}`
    /// 예: `CLAWMON_LOG_SOURCES_PATHS=~/.openclaw/logs,/tmp/openclaw`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CLAWMON_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CLAWMON_GENERAL_LOG_FORMAT");

        // Log sources
        override_csv(&mut self.log_sources.paths, "CLAWMON_LOG_SOURCES_PATHS");
        override_string(
            &mut self.log_sources.file_prefix,
            "CLAWMON_LOG_SOURCES_FILE_PREFIX",
        );
        override_string(
            &mut self.log_sources.approvals_file,
            "CLAWMON_LOG_SOURCES_APPROVALS_FILE",
        );
        override_string(
            &mut self.log_sources.system_log_dir,
            "CLAWMON_LOG_SOURCES_SYSTEM_LOG_DIR",
        );

        // Database
        override_string(&mut self.database.path, "CLAWMON_DATABASE_PATH");

        // Report
        override_opt_string(&mut self.report.output_dir, "CLAWMON_REPORT_OUTPUT_DIR");
        override_opt_string(
            &mut self.report.process_snapshot,
            "CLAWMON_REPORT_PROCESS_SNAPSHOT",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ClawmonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.log_sources.paths.is_empty()
            || self.log_sources.paths.iter().any(|p| p.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "log_sources.paths".to_owned(),
                reason: "at least one non-empty log root is required".to_owned(),
            }
            .into());
        }

        if self.log_sources.file_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_sources.file_prefix".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSourcesConfig {
    /// 로그 루트 디렉토리 목록 (`~`와 환경변수 확장)
    pub paths: Vec<String>,
    /// 로그 파일 이름 접두사
    pub file_prefix: String,
    /// 명령 승인 목록 파일
    pub approvals_file: String,
    /// 시스템 로그 디렉토리 (`analyze`에서 파일 미지정 시 사용)
    pub system_log_dir: String,
}

impl Default for LogSourcesConfig {
    fn default() -> Self {
        Self {
            paths: vec!["~/.openclaw/logs".to_owned(), "/tmp/openclaw".to_owned()],
            file_prefix: "openclaw".to_owned(),
            approvals_file: "~/.openclaw/exec-approvals.json".to_owned(),
            system_log_dir: "/tmp/openclaw".to_owned(),
        }
    }
}

/// 데이터베이스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite 파일 경로
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "database/clawmon.db".to_owned(),
        }
    }
}

/// 리포트 출력 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 일일 리포트 JSON을 기록할 디렉토리
    pub output_dir: Option<String>,
    /// 프로세스 샘플 스냅샷 JSON 파일
    pub process_snapshot: Option<String>,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            warn!(env_key, "empty value in env var, clearing option");
            *target = None;
        } else {
            *target = Some(trimmed.to_owned());
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = ClawmonConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.log_sources.file_prefix, "openclaw");
        assert_eq!(config.database.path, "database/clawmon.db");
        assert!(config.report.output_dir.is_none());
    }

    #[test]
    fn default_config_passes_validation() {
        ClawmonConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = ClawmonConfig::parse("").unwrap();
        assert_eq!(config.log_sources.system_log_dir, "/tmp/openclaw");
        assert_eq!(config.log_sources.paths.len(), 2);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[log_sources]
paths = ["/var/log/openclaw"]

[report]
output_dir = "reports"
"#;
        let config = ClawmonConfig::parse(toml).unwrap();
        assert_eq!(config.log_sources.paths, vec!["/var/log/openclaw"]);
        // file_prefix는 기본값 유지
        assert_eq!(config.log_sources.file_prefix, "openclaw");
        assert_eq!(config.report.output_dir.as_deref(), Some("reports"));
        assert!(config.report.process_snapshot.is_none());
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = ClawmonConfig::parse("paths = [[[").unwrap_err();
        assert!(matches!(
            err,
            ClawmonError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = ClawmonConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = ClawmonConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_paths() {
        let mut config = ClawmonConfig::default();
        config.log_sources.paths.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_sources.paths"));
    }

    #[test]
    fn validate_rejects_blank_path_entry() {
        let mut config = ClawmonConfig::default();
        config.log_sources.paths.push("  ".to_owned());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_database_path() {
        let mut config = ClawmonConfig::default();
        config.database.path = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.path"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 환경변수 동시 접근이 없습니다.
        unsafe { std::env::set_var("TEST_CLAWMON_STR", "overridden") };
        override_string(&mut val, "TEST_CLAWMON_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_CLAWMON_STR") };
    }

    #[test]
    #[serial]
    fn env_override_csv_drops_empty_items() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트로 환경변수 동시 접근이 없습니다.
        unsafe { std::env::set_var("TEST_CLAWMON_CSV", "x, ,y,") };
        override_csv(&mut val, "TEST_CLAWMON_CSV");
        assert_eq!(val, vec!["x", "y"]);
        unsafe { std::env::remove_var("TEST_CLAWMON_CSV") };
    }

    #[test]
    #[serial]
    fn env_override_opt_string_sets_and_clears() {
        let mut val = None;
        // SAFETY: serial 테스트로 환경변수 동시 접근이 없습니다.
        unsafe { std::env::set_var("TEST_CLAWMON_OPT", "/srv/reports") };
        override_opt_string(&mut val, "TEST_CLAWMON_OPT");
        assert_eq!(val.as_deref(), Some("/srv/reports"));

        unsafe { std::env::set_var("TEST_CLAWMON_OPT", "") };
        override_opt_string(&mut val, "TEST_CLAWMON_OPT");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_CLAWMON_OPT") };
    }

    #[test]
    #[serial]
    fn env_override_missing_var_keeps_original() {
        let mut val = "keep".to_owned();
        override_string(&mut val, "TEST_CLAWMON_DEFINITELY_UNSET");
        assert_eq!(val, "keep");
    }

    #[test]
    #[serial]
    fn apply_env_overrides_updates_database_path() {
        let mut config = ClawmonConfig::default();
        // SAFETY: serial 테스트로 환경변수 동시 접근이 없습니다.
        unsafe { std::env::set_var("CLAWMON_DATABASE_PATH", "/data/override.db") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("CLAWMON_DATABASE_PATH") };
        assert_eq!(config.database.path, "/data/override.db");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = ClawmonConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = ClawmonConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.database.path, config.database.path);
        assert_eq!(parsed.log_sources.paths, config.log_sources.paths);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = ClawmonConfig::from_file("/nonexistent/clawmon.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClawmonError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
