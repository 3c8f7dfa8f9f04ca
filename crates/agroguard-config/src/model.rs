//! Configuration schema for the AgroGuard service.

use crate::ConfigError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config filename looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "agroguard.json5";

/// Root config for the AgroGuard service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgroGuardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Default bind address.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default listen port.
fn default_port() -> u16 {
    8000
}

/// Storage file location for the relational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Default SQLite file path.
fn default_database_path() -> String {
    "agroguard.db".to_string()
}

/// Classifier artifact location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

/// Default model artifact path alongside the service.
fn default_model_path() -> String {
    "plant_disease_model.onnx".to_string()
}

/// Directories for uploaded images and generated reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

/// Default directory for uploaded source images.
fn default_upload_dir() -> String {
    "static/uploads".to_string()
}

/// Default directory for rendered reports.
fn default_reports_dir() -> String {
    "static/reports".to_string()
}

/// Token signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared signing secret; when unset a development secret is used.
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// Default token lifetime in hours.
fn default_token_ttl_hours() -> i64 {
    24
}

impl AgroGuardConfig {
    /// Load a config from a path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let config: AgroGuardConfig = json5::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `agroguard.json5` from the working directory, or defaults when
    /// the file is absent. Environment overrides apply either way.
    pub fn load_or_default(cwd: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = cwd.as_ref().join(DEFAULT_CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            debug!("no config file at {}; using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the loaded values.
    ///
    /// `MODEL_PATH` is honored as an alias for `AGROGUARD_MODEL_PATH`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("AGROGUARD_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Ok(path) = std::env::var("AGROGUARD_MODEL_PATH") {
            self.model.path = path;
        } else if let Ok(path) = std::env::var("MODEL_PATH") {
            self.model.path = path;
        }
        if let Ok(dir) = std::env::var("AGROGUARD_DATA_DIR") {
            let root = Path::new(&dir);
            self.storage.upload_dir = root.join("uploads").to_string_lossy().to_string();
            self.storage.reports_dir = root.join("reports").to_string_lossy().to_string();
        }
        if let Ok(secret) = std::env::var("AGROGUARD_TOKEN_SECRET") {
            self.auth.token_secret = Some(secret);
        }
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_hours must be positive".to_string(),
            ));
        }
        if let Some(secret) = &self.auth.token_secret
            && secret.is_empty()
        {
            return Err(ConfigError::Invalid(
                "auth.token_secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the signing secret, falling back to a development default.
    pub fn token_secret(&self) -> String {
        match &self.auth.token_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("auth.token_secret not set; using development secret");
                "agroguard-dev-secret-change-me".to_string()
            }
        }
    }
}
