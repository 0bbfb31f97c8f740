#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ClawmonError, ConfigError, ParseError, PipelineError, StorageError};

// 설정
pub use config::ClawmonConfig;

// 파이프라인 trait
pub use pipeline::{ActivityStore, Monitor, Notifier, ProcessProbe};

// 도메인 타입
pub use types::{
    ActivityCounts, ActivityRecord, ActivityType, DailyReport, ExecutionMark, ExecutionStatus,
    ProcessSample, SecurityEventRecord, Severity,
};
