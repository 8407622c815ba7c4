//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration for the relay server
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    /// Present only when `REDIS_URL` is set
    pub redis: Option<RedisConfig>,
    pub cors: CorsConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration (backs shared client storage)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Like synchronizer settings
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the like relay, used by the remote client
    #[serde(default)]
    pub relay_url: Option<String>,
    /// Attempts after the first failure before a load gives up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

impl SyncConfig {
    /// Load synchronizer settings alone, for clients that do not run the relay
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            relay_url: env::var("RELAY_URL").ok().filter(|s| !s.is_empty()),
            max_retries: parse_var("SYNC_MAX_RETRIES").unwrap_or_else(default_max_retries),
            retry_base_ms: parse_var("SYNC_RETRY_BASE_MS").unwrap_or_else(default_retry_base_ms),
            retry_max_ms: parse_var("SYNC_RETRY_MAX_MS").unwrap_or_else(default_retry_max_ms),
        }
    }

    /// Backoff before retry number `attempt` (0-based), doubling up to the cap
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
        let ms = self.retry_base_ms.saturating_mul(factor).min(self.retry_max_ms);
        Duration::from_millis(ms)
    }
}

/// Client storage limits
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Largest value accepted by a single `set_item`
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
    /// Key namespace separating one device's storage from another's
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_value_bytes: default_max_value_bytes(),
            namespace: default_namespace(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "forum-likes".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    200
}

fn default_retry_max_ms() -> u64 {
    5_000
}

fn default_max_value_bytes() -> usize {
    5 * 1024 * 1024 // browsers cap localStorage around 5 MiB
}

fn default_namespace() -> String {
    "default".to_string()
}

/// Read and parse an environment variable, treating unset or unparsable as absent
fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env_value = match env::var("APP_ENV") {
            Ok(raw) => Environment::parse(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("APP_ENV", raw))?,
            Err(_) => Environment::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env_value,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("API_PORT").ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(default_min_connections),
            },
            redis: env::var("REDIS_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|url| RedisConfig {
                    url,
                    max_connections: parse_var("REDIS_MAX_CONNECTIONS")
                        .unwrap_or_else(default_redis_max_connections),
                }),
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            sync: SyncConfig::from_env(),
            storage: StorageConfig {
                max_value_bytes: parse_var("STORAGE_MAX_VALUE_BYTES")
                    .unwrap_or_else(default_max_value_bytes),
                namespace: env::var("STORAGE_NAMESPACE").unwrap_or_else(|_| default_namespace()),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
