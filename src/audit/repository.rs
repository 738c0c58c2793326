use super::{AuditEntry, AuditError, AuditRecord, AuditSink};
use crate::runtime::now_millis;
use rusqlite::{params, Connection, Row};
use std::fs;
use std::path::{Path, PathBuf};

/// SQLite-backed audit table. Rows are only ever inserted.
#[derive(Debug)]
pub struct SqliteAuditLog {
    db_path: PathBuf,
    last_timestamp: i64,
}

impl SqliteAuditLog {
    pub fn open(db_path: &Path) -> Result<Self, AuditError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|source| AuditError::CreateParent {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut log = Self {
            db_path: db_path.to_path_buf(),
            last_timestamp: 0,
        };
        log.ensure_schema()?;
        log.last_timestamp = log.max_timestamp()?;
        Ok(log)
    }

    fn connect(&self) -> Result<Connection, AuditError> {
        Connection::open(&self.db_path).map_err(|source| AuditError::Open {
            path: self.db_path.display().to_string(),
            source,
        })
    }

    fn ensure_schema(&self) -> Result<(), AuditError> {
        self.connect()?
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    student_id TEXT NOT NULL DEFAULT 'unknown',
                    model_name TEXT NOT NULL DEFAULT 'default',
                    action TEXT NOT NULL,
                    details TEXT NOT NULL,
                    timestamp INTEGER NOT NULL
                        DEFAULT (CAST(strftime('%s','now') AS INTEGER) * 1000)
                );

                CREATE INDEX IF NOT EXISTS idx_logs_user_timestamp
                    ON logs(user_id, timestamp);
                ",
            )
            .map_err(|source| AuditError::Sql { source })
    }

    fn max_timestamp(&self) -> Result<i64, AuditError> {
        self.connect()?
            .query_row("SELECT COALESCE(MAX(timestamp), 0) FROM logs", [], |row| {
                row.get(0)
            })
            .map_err(|source| AuditError::Sql { source })
    }

    /// Administrative listing in insertion order. With `limit`, only the most
    /// recent `limit` records are returned.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<AuditRecord>, AuditError> {
        let connection = self.connect()?;
        let limit = limit.map_or(-1, |value| i64::try_from(value).unwrap_or(i64::MAX));
        let mut statement = connection
            .prepare(
                "
                SELECT id, user_id, student_id, model_name, action, details, timestamp
                FROM logs
                ORDER BY id DESC
                LIMIT ?1
                ",
            )
            .map_err(|source| AuditError::Sql { source })?;
        let rows = statement
            .query_map(params![limit], record_from_row)
            .map_err(|source| AuditError::Sql { source })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|source| AuditError::Sql { source })?);
        }
        records.reverse();
        Ok(records)
    }

    fn next_timestamp(&mut self) -> i64 {
        self.last_timestamp = now_millis().max(self.last_timestamp);
        self.last_timestamp
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    Ok(AuditRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        student_id: row.get(2)?,
        model_name: row.get(3)?,
        action: row.get(4)?,
        details: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

impl AuditSink for SqliteAuditLog {
    fn append(&mut self, entry: &AuditEntry) -> Result<AuditRecord, AuditError> {
        let details = serde_json::to_string(&entry.details)
            .map_err(|source| AuditError::Encode { source })?;
        let timestamp = self.next_timestamp();
        let connection = self.connect()?;
        connection
            .execute(
                "
                INSERT INTO logs (user_id, student_id, model_name, action, details, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    entry.user_id,
                    entry.student_id_or_default(),
                    entry.model_name_or_default(),
                    entry.action,
                    details,
                    timestamp,
                ],
            )
            .map_err(|source| AuditError::Sql { source })?;

        Ok(AuditRecord {
            id: connection.last_insert_rowid(),
            user_id: entry.user_id.clone(),
            student_id: entry.student_id_or_default().to_string(),
            model_name: entry.model_name_or_default().to_string(),
            action: entry.action.clone(),
            details,
            timestamp,
        })
    }
}
