use super::StatePaths;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

pub fn append_runtime_log(paths: &StatePaths, level: LogLevel, event: &str, message: &str) {
    append_runtime_event(paths, level, event, message, &[]);
}

/// Appends one JSON line to the runtime log. Write failures are dropped so
/// logging can never fail the caller's action.
pub fn append_runtime_event(
    paths: &StatePaths,
    level: LogLevel,
    event: &str,
    message: &str,
    fields: &[(&str, Value)],
) {
    let mut payload = Map::new();
    payload.insert("timestamp".to_string(), Value::from(super::now_secs()));
    payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), Value::String(event.to_string()));
    payload.insert("message".to_string(), Value::String(message.to_string()));
    for (key, value) in fields {
        payload.insert((*key).to_string(), value.clone());
    }

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = paths.runtime_log_path();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
