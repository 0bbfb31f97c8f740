#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`sqlite`]: [`ActivityStore`](clawmon_core::pipeline::ActivityStore) SQLite 구현
//! - [`schema`]: 테이블 스키마
//! - [`error`]: 저장소 에러 타입

pub mod error;
pub mod schema;
pub mod sqlite;

pub use error::StoreError;
pub use sqlite::SqliteStore;
