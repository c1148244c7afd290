use crate::error::AppError;
use config::{Config, Environment as EnvSource, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Environment variable selecting the optional per-environment overlay file.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Deployment environment. Drives cookie security and the overlay file name.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    /// Reads `APP_ENVIRONMENT`, falling back to development.
    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) => value
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e))),
            Err(_) => Ok(Environment::Development),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" | "local" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Loads `base.yaml`, then `{environment}.yaml` if present, then
/// `{prefix}_SECTION__KEY` environment variables, into `T`.
pub fn load_layered<T: DeserializeOwned>(config_dir: &Path, env_prefix: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    let settings = Config::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(true))
        .add_source(File::from(config_dir.join(format!("{}.yaml", environment.as_str()))).required(false))
        .add_source(
            EnvSource::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
