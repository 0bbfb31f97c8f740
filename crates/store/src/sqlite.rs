//! SQLite 저장소 구현

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use clawmon_core::error::StorageError;
use clawmon_core::metrics as m;
use clawmon_core::pipeline::ActivityStore;
use clawmon_core::types::{
    ActivityCounts, ActivityRecord, ActivityType, DailyReport, ExecutionMark, ExecutionStatus,
    SecurityEventRecord, Severity,
};

use crate::error::StoreError;
use crate::schema::{SCHEMA, TABLE_ACTIVITY, TABLE_SECURITY_EVENTS};

/// SQLite 기반 활동 저장소
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// 파일 데이터베이스를 열고 스키마를 초기화합니다.
    ///
    /// 상위 디렉토리가 없으면 생성합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        info!(path = %path.display(), "database opened");
        Ok(store)
    }

    /// 메모리 데이터베이스를 엽니다.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open {
            path: ":memory:".to_owned(),
            source: e,
        })?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// 데이터베이스 파일 경로 (메모리 DB면 `None`)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 활동 레코드를 삽입합니다. 자연 키가 이미 있으면 `false`입니다.
    pub fn add_activity(&self, record: &ActivityRecord) -> Result<bool, StoreError> {
        let details = encode_details(record.details.as_ref())?;
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO activity_records
                 (date, timestamp, activity_type, description, severity, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.date,
                record.timestamp,
                record.activity_type.as_str(),
                record.description,
                record.severity.as_str(),
                details,
            ],
        )?;
        Ok(count_insert(TABLE_ACTIVITY, changed))
    }

    /// 보안 이벤트를 삽입합니다. 자연 키가 이미 있으면 `false`입니다.
    pub fn add_security_event(&self, event: &SecurityEventRecord) -> Result<bool, StoreError> {
        let details = encode_details(event.details.as_ref())?;
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO security_events
                 (date, timestamp, event_type, description, severity, source, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.date,
                event.timestamp,
                event.event_type,
                event.description,
                event.severity.as_str(),
                event.source,
                details,
            ],
        )?;
        Ok(count_insert(TABLE_SECURITY_EVENTS, changed))
    }

    /// 날짜별 일일 리포트를 교체 저장합니다.
    pub fn save_daily_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        let summary = serde_json::to_string(&report.summary)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_reports
                 (date, generated_at, security_score, total_events, process_count,
                  command_count, file_access_count, security_event_count, summary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.date,
                report.generated_at,
                i64::from(report.security_score),
                to_sql_int(report.total_events),
                to_sql_int(report.process_count),
                to_sql_int(report.command_count),
                to_sql_int(report.file_access_count),
                to_sql_int(report.security_event_count),
                summary,
            ],
        )?;
        debug!(date = %report.date, score = report.security_score, "daily report saved");
        Ok(())
    }

    /// 실행 마크를 추가합니다.
    pub fn add_execution(&self, mark: &ExecutionMark) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO execution_tracking
                 (execution_id, execution_time, last_log_timestamp, last_activity_timestamp,
                  execution_status, data_collected, email_sent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                mark.execution_id,
                mark.execution_time,
                mark.last_log_timestamp,
                mark.last_activity_timestamp,
                mark.status.as_str(),
                to_sql_int(mark.data_collected),
                mark.email_sent,
            ],
        )?;
        debug!(execution_id = %mark.execution_id, status = %mark.status, "execution recorded");
        Ok(())
    }

    /// 가장 최근 실행 마크
    pub fn latest_execution(&self) -> Result<Option<ExecutionMark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT execution_id, execution_time, last_log_timestamp, last_activity_timestamp,
                    execution_status, data_collected, email_sent
             FROM execution_tracking
             ORDER BY execution_time DESC, id DESC
             LIMIT 1",
        )?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_execution(row)?)),
            None => Ok(None),
        }
    }

    /// 최근 실행 마크 목록 (최신순)
    pub fn recent_executions(&self, limit: usize) -> Result<Vec<ExecutionMark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT execution_id, execution_time, last_log_timestamp, last_activity_timestamp,
                    execution_status, data_collected, email_sent
             FROM execution_tracking
             ORDER BY execution_time DESC, id DESC
             LIMIT ?1",
        )?;
        let mut rows = stmt.query(params![i64::try_from(limit).unwrap_or(i64::MAX)])?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(row_to_execution(row)?);
        }
        Ok(marks)
    }

    /// 날짜별 활동 레코드 (타임스탬프순)
    pub fn activities_by_date(&self, date: &str) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, timestamp, activity_type, description, severity, details
             FROM activity_records
             WHERE date = ?1
             ORDER BY timestamp, id",
        )?;
        let mut rows = stmt.query(params![date])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(row_to_activity(row)?);
        }
        Ok(records)
    }

    /// 날짜별 보안 이벤트 (타임스탬프순)
    pub fn security_events_by_date(
        &self,
        date: &str,
    ) -> Result<Vec<SecurityEventRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, timestamp, event_type, description, severity, source, details
             FROM security_events
             WHERE date = ?1
             ORDER BY timestamp, id",
        )?;
        let mut rows = stmt.query(params![date])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(row_to_security_event(row)?);
        }
        Ok(events)
    }

    /// 날짜별 일일 리포트
    pub fn daily_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT date, generated_at, security_score, total_events, process_count,
                        command_count, file_access_count, security_event_count, summary
                 FROM daily_reports
                 WHERE date = ?1",
                params![date],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        [
                            row.get::<_, i64>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, i64>(5)?,
                            row.get::<_, i64>(6)?,
                            row.get::<_, i64>(7)?,
                        ],
                        row.get::<_, Option<String>>(8)?,
                    ))
                },
            )
            .optional()?;

        let Some((date, generated_at, score, counts, summary)) = row else {
            return Ok(None);
        };
        let summary = match summary {
            Some(text) => serde_json::from_str(&text)?,
            None => serde_json::Value::Null,
        };
        let [total_events, process_count, command_count, file_access_count, security_event_count] =
            counts.map(from_sql_int);

        Ok(Some(DailyReport {
            date,
            generated_at,
            security_score: u8::try_from(score.clamp(0, 100)).unwrap_or(0),
            total_events,
            process_count,
            command_count,
            file_access_count,
            security_event_count,
            summary,
        }))
    }

    /// 날짜별 활동 유형 집계
    pub fn count_activities(&self, date: &str) -> Result<ActivityCounts, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT activity_type, COUNT(*) FROM activity_records
             WHERE date = ?1
             GROUP BY activity_type",
        )?;
        let mut rows = stmt.query(params![date])?;
        let mut counts = ActivityCounts::default();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            counts.add(parse_activity_type(&name)?, from_sql_int(count));
        }
        Ok(counts)
    }

    /// 날짜별 보안 이벤트 수
    pub fn count_security_events(&self, date: &str) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM security_events WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )?;
        Ok(from_sql_int(count))
    }
}

impl ActivityStore for SqliteStore {
    fn insert_activity(&mut self, record: &ActivityRecord) -> Result<bool, StorageError> {
        Ok(self.add_activity(record)?)
    }

    fn insert_security_event(&mut self, event: &SecurityEventRecord) -> Result<bool, StorageError> {
        Ok(self.add_security_event(event)?)
    }

    fn upsert_daily_report(&mut self, report: &DailyReport) -> Result<(), StorageError> {
        Ok(self.save_daily_report(report)?)
    }

    fn record_execution(&mut self, mark: &ExecutionMark) -> Result<(), StorageError> {
        Ok(self.add_execution(mark)?)
    }

    fn last_execution(&self) -> Result<Option<ExecutionMark>, StorageError> {
        Ok(self.latest_execution()?)
    }

    fn activity_counts(&self, date: &str) -> Result<ActivityCounts, StorageError> {
        Ok(self.count_activities(date)?)
    }

    fn security_event_count(&self, date: &str) -> Result<u64, StorageError> {
        Ok(self.count_security_events(date)?)
    }
}

fn count_insert(table: &'static str, changed: usize) -> bool {
    let inserted = changed == 1;
    if inserted {
        metrics::counter!(m::STORE_ROWS_INSERTED_TOTAL, m::LABEL_TABLE => table).increment(1);
    } else {
        metrics::counter!(m::STORE_ROWS_DEDUPLICATED_TOTAL, m::LABEL_TABLE => table).increment(1);
    }
    inserted
}

fn encode_details(details: Option<&serde_json::Value>) -> Result<Option<String>, StoreError> {
    details.map(serde_json::to_string).transpose().map_err(StoreError::from)
}

fn decode_details(text: Option<String>) -> Result<Option<serde_json::Value>, StoreError> {
    text.as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(StoreError::from)
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn parse_activity_type(value: &str) -> Result<ActivityType, StoreError> {
    ActivityType::parse(value).ok_or_else(|| StoreError::InvalidValue {
        column: "activity_type".to_owned(),
        value: value.to_owned(),
    })
}

fn parse_severity(value: &str) -> Result<Severity, StoreError> {
    Severity::from_str_loose(value).ok_or_else(|| StoreError::InvalidValue {
        column: "severity".to_owned(),
        value: value.to_owned(),
    })
}

fn row_to_activity(row: &Row<'_>) -> Result<ActivityRecord, StoreError> {
    let activity_type: String = row.get(2)?;
    let severity: String = row.get(4)?;
    Ok(ActivityRecord {
        date: row.get(0)?,
        timestamp: row.get(1)?,
        activity_type: parse_activity_type(&activity_type)?,
        description: row.get(3)?,
        severity: parse_severity(&severity)?,
        details: decode_details(row.get(5)?)?,
    })
}

fn row_to_security_event(row: &Row<'_>) -> Result<SecurityEventRecord, StoreError> {
    let severity: String = row.get(4)?;
    Ok(SecurityEventRecord {
        date: row.get(0)?,
        timestamp: row.get(1)?,
        event_type: row.get(2)?,
        description: row.get(3)?,
        severity: parse_severity(&severity)?,
        source: row.get(5)?,
        details: decode_details(row.get(6)?)?,
    })
}

fn row_to_execution(row: &Row<'_>) -> Result<ExecutionMark, StoreError> {
    let status: String = row.get(4)?;
    let data_collected: i64 = row.get(5)?;
    Ok(ExecutionMark {
        execution_id: row.get(0)?,
        execution_time: row.get(1)?,
        last_log_timestamp: row.get(2)?,
        last_activity_timestamp: row.get(3)?,
        status: ExecutionStatus::parse(&status).ok_or_else(|| StoreError::InvalidValue {
            column: "execution_status".to_owned(),
            value: status.clone(),
        })?,
        data_collected: from_sql_int(data_collected),
        email_sent: row.get(6)?,
    })
}
