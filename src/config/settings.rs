use super::ConfigError;
use crate::provider::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::runtime::StatePaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub audit_db_path: Option<PathBuf>,
    #[serde(default)]
    pub student_id: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            default_model: default_model(),
            request_timeout_seconds: default_request_timeout_seconds(),
            audit_db_path: None,
            student_id: None,
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.api_base.trim();
        if api_base.is_empty() {
            return Err(ConfigError::Settings("`api_base` must be non-empty".to_string()));
        }
        if !api_base.starts_with("https://") && !api_base.starts_with("http://") {
            return Err(ConfigError::Settings(format!(
                "`api_base` must be an http(s) url, got `{api_base}`"
            )));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`default_model` must be non-empty".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`request_timeout_seconds` must be greater than zero".to_string(),
            ));
        }
        if let Some(path) = &self.audit_db_path {
            if !path.is_absolute() {
                return Err(ConfigError::Settings(format!(
                    "`audit_db_path` must be an absolute path, got `{}`",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn resolve_audit_db_path(&self, paths: &StatePaths) -> PathBuf {
        self.audit_db_path
            .clone()
            .unwrap_or_else(|| paths.audit_db_path())
    }
}
