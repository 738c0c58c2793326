pub mod record;
pub mod repository;

pub use record::{AuditEntry, AuditRecord, CREDENTIAL_ACTION, DEFAULT_MODEL_NAME, UNKNOWN_STUDENT_ID};
pub use repository::SqliteAuditLog;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to create audit database parent {path}: {source}")]
    CreateParent {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sqlite open failed at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("sqlite statement failed: {source}")]
    Sql {
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to encode audit details: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Append-only destination for audit records.
pub trait AuditSink {
    fn append(&mut self, entry: &AuditEntry) -> Result<AuditRecord, AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for &mut T {
    fn append(&mut self, entry: &AuditEntry) -> Result<AuditRecord, AuditError> {
        (**self).append(entry)
    }
}
