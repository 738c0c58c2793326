use super::{ConfigError, Settings};
use crate::runtime::StatePaths;

pub const API_BASE_ENV: &str = "REQPILOT_API_BASE";
pub const CREDENTIAL_ENV: &str = "GROQ_API_KEY";

/// Loads `config.yaml` from the state root, falling back to defaults when the
/// file does not exist, then applies env overrides and validates.
pub fn load_settings(paths: &StatePaths) -> Result<Settings, ConfigError> {
    load_settings_with_env(paths, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env<F>(paths: &StatePaths, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = paths.settings_file();
    let mut settings = if path.exists() {
        Settings::from_path(&path)?
    } else {
        Settings::default()
    };
    if let Some(api_base) = env(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
        settings.api_base = api_base;
    }
    settings.validate()?;
    Ok(settings)
}

pub fn credential_from_env() -> Option<String> {
    std::env::var(CREDENTIAL_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
