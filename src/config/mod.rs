pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::{
    credential_from_env, load_settings, load_settings_with_env, API_BASE_ENV, CREDENTIAL_ENV,
};
pub use settings::Settings;
