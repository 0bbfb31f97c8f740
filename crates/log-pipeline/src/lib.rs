#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`resolver`]: 로그 루트 확장 및 대상 날짜 파일 탐색 (glob)
//! - [`parser`]: 워터마크 기반 증분 JSONL 파서와 사실 추출
//! - [`approvals`]: 명령 승인 목록 로더
//! - [`classifier`]: 시스템 로그 이벤트 분류기 (실행/세션 상관관계, API/채널 탐지)
//! - [`security`]: 보안 분석기와 점수 계산
//! - [`process`]: 프로세스 모니터
//! - [`pipeline`]: 일일 패스 오케스트레이션
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! PathResolver -> IncrementalLogParser -> SecurityAnalyzer -> ActivityStore -> Notifier
//!      |                  |                     |                  |
//!  glob patterns    facts + watermark     score + findings    dedup insert
//! ```

pub mod approvals;
pub mod classifier;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod process;
pub mod resolver;
pub mod security;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{DailyPipeline, DailyPipelineBuilder, InsertTally, PassOutcome, PassRequest};

// 설정
pub use config::PipelineConfig;

// 에러
pub use error::LogPipelineError;

// 탐색/파서
pub use parser::{IncrementalLogParser, ParsedLogs};
pub use resolver::{PathResolver, ResolvedLogs};

// 분류기
pub use classifier::{ClassifiedEvent, ClassifierReport, EventClassifier, EventType};

// 분석기
pub use process::{ProcessAnalysis, ProcessMonitor, StaticProbe};
pub use security::{SecurityAnalysis, SecurityAnalyzer, SecurityFinding};
