use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix for every environment variable the service reads
pub const ENV_PREFIX: &str = "CAFETERIA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_seed_on_startup")]
    pub seed_on_startup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default)]
    pub session_secure_cookie: bool,
    #[serde(default = "default_session_inactivity_minutes")]
    pub session_inactivity_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load configuration from `CAFETERIA_*` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to read environment: {}", e),
            })?;

        let config = Self::from_settings(&settings)?;
        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// Build every section from an already assembled settings source
    pub fn from_settings(settings: &config::Config) -> Result<Self, ConfigError> {
        Ok(Config {
            server: load_section(settings, "server")?,
            database: load_section(settings, "database")?,
            session: load_section(settings, "session")?,
            observability: load_section(settings, "observability")?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: &str| {
            Err(ConfigError::ValidationError {
                message: message.to_string(),
            })
        };

        if self.server.port == 0 {
            return fail("Server port cannot be 0");
        }
        if self.server.request_timeout_seconds == 0 {
            return fail("Request timeout cannot be 0");
        }
        if self.server.max_request_size == 0 {
            return fail("Max request size cannot be 0");
        }
        if !self.database.database_url.starts_with("sqlite:") {
            return fail("Database URL must be a sqlite: URL");
        }
        if self.database.max_connections == 0 {
            return fail("Database max connections cannot be 0");
        }
        if self.session.session_cookie_name.trim().is_empty() {
            return fail("Session cookie name cannot be empty");
        }
        if self.session.session_inactivity_minutes <= 0 {
            return fail("Session inactivity timeout must be positive");
        }

        Ok(())
    }
}

fn load_section<T: serde::de::DeserializeOwned>(
    settings: &config::Config,
    section: &str,
) -> Result<T, ConfigError> {
    settings
        .clone()
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl SessionConfig {
    pub fn inactivity_limit(&self) -> tower_sessions::cookie::time::Duration {
        tower_sessions::cookie::time::Duration::minutes(self.session_inactivity_minutes)
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    5000
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024
}

pub(crate) fn default_database_url() -> String {
    "sqlite://cafeteria.db?mode=rwc".to_string()
}

pub(crate) fn default_max_connections() -> u32 {
    5
}

pub(crate) fn default_seed_on_startup() -> bool {
    true
}

pub(crate) fn default_session_cookie_name() -> String {
    "cafeteria_session".to_string()
}

pub(crate) fn default_session_inactivity_minutes() -> i64 {
    120
}

pub(crate) fn default_service_name() -> String {
    "cafeteria-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
