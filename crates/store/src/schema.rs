//! 테이블 스키마

/// 스키마 초기화 SQL (멱등)
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activity_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    description TEXT NOT NULL,
    severity TEXT NOT NULL DEFAULT 'info',
    details TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (date, timestamp, activity_type, description)
);

CREATE TABLE IF NOT EXISTS security_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    event_type TEXT NOT NULL,
    description TEXT NOT NULL,
    severity TEXT NOT NULL DEFAULT 'info',
    source TEXT,
    details TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (date, timestamp, event_type, description)
);

CREATE TABLE IF NOT EXISTS daily_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    generated_at TEXT NOT NULL,
    security_score INTEGER NOT NULL,
    total_events INTEGER NOT NULL DEFAULT 0,
    process_count INTEGER NOT NULL DEFAULT 0,
    command_count INTEGER NOT NULL DEFAULT 0,
    file_access_count INTEGER NOT NULL DEFAULT 0,
    security_event_count INTEGER NOT NULL DEFAULT 0,
    summary TEXT
);

CREATE TABLE IF NOT EXISTS execution_tracking (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    execution_id TEXT NOT NULL UNIQUE,
    execution_time TEXT NOT NULL,
    last_log_timestamp TEXT,
    last_activity_timestamp TEXT,
    execution_status TEXT NOT NULL,
    data_collected INTEGER NOT NULL DEFAULT 0,
    email_sent INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_activity_records_date ON activity_records(date);
CREATE INDEX IF NOT EXISTS idx_security_events_date ON security_events(date);
CREATE INDEX IF NOT EXISTS idx_daily_reports_date ON daily_reports(date);
CREATE INDEX IF NOT EXISTS idx_execution_tracking_time ON execution_tracking(execution_time);
"#;

/// 테이블 이름 (메트릭 라벨)
pub const TABLE_ACTIVITY: &str = "activity_records";
/// 테이블 이름 (메트릭 라벨)
pub const TABLE_SECURITY_EVENTS: &str = "security_events";
