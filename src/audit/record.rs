use crate::credential::CredentialError;
use crate::pipeline::{Session, Stage};
use serde::Serialize;
use serde_json::{Map, Value};

pub const UNKNOWN_STUDENT_ID: &str = "unknown";
pub const DEFAULT_MODEL_NAME: &str = "default";
pub const CREDENTIAL_ACTION: &str = "credential";

/// A record about to be written. `id` and `timestamp` are assigned by the
/// sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub user_id: String,
    pub student_id: Option<String>,
    pub model_name: Option<String>,
    pub action: String,
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: String,
    pub student_id: String,
    pub model_name: String,
    pub action: String,
    pub details: String,
    pub timestamp: i64,
}

impl AuditEntry {
    fn for_session(session: &Session, action: &str, details: Map<String, Value>) -> Self {
        Self {
            user_id: session.session_id().to_string(),
            student_id: session.student_id().map(str::to_string),
            model_name: session.model().map(str::to_string),
            action: action.to_string(),
            details,
        }
    }

    /// Records the outcome of a credential entry. The key itself is never
    /// recorded.
    pub fn credential_entered(
        session: &Session,
        key_length: usize,
        outcome: Result<(), &CredentialError>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("valid".to_string(), Value::Bool(outcome.is_ok()));
        details.insert("keyLength".to_string(), Value::from(key_length));
        if let Err(err) = outcome {
            details.insert("error".to_string(), Value::String(err.to_string()));
        }
        Self::for_session(session, CREDENTIAL_ACTION, details)
    }

    pub fn stage_completed(session: &Session, stage: Stage, input: &str, output: &str) -> Self {
        let details = Map::from_iter([
            ("input".to_string(), Value::String(input.to_string())),
            ("output".to_string(), Value::String(output.to_string())),
        ]);
        Self::for_session(session, stage.as_str(), details)
    }

    pub fn student_id_or_default(&self) -> &str {
        self.student_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(UNKNOWN_STUDENT_ID)
    }

    pub fn model_name_or_default(&self) -> &str {
        self.model_name
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL_NAME)
    }
}
