/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration,
 * plus the optional PostgreSQL connection.
 *
 * # Configuration Sources
 *
 * Values are resolved in this order, later sources winning:
 * 1. Built-in defaults suitable for local development
 * 2. A TOML file named by `MARKETCHAT_CONFIG`, if set
 * 3. Environment variables (`SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`, ...)
 *
 * # Error Handling
 *
 * Invalid values are reported as `ConfigError` and stop startup. A missing
 * or unreachable database is not an error: the server logs it and falls
 * back to the in-memory store.
 */

use serde::Deserialize;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::backend::auth::resolver::MissingKindPolicy;

/// Secret used when `JWT_SECRET` is not configured
const DEV_JWT_SECRET: &str = "marketchat-dev-secret-change-in-production";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HS256 secret shared with the identity service
    pub jwt_secret: String,
    /// What to do with credentials that carry no kind tag
    pub missing_kind_policy: MissingKindPolicy,
    /// Shared secret required on `POST /notifications`, if set
    pub bridge_key: Option<String>,
    /// Longest accepted message body, in bytes
    pub max_message_length: usize,
    /// Cap on concurrently open chat connections
    pub max_connections: usize,
    /// Frames queued per connection before deliveries are dropped
    pub outbound_buffer: usize,
    /// Seconds between sweeps of idle broadcast channels and locks
    pub cleanup_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            missing_kind_policy: MissingKindPolicy::default(),
            bridge_key: None,
            max_message_length: 10_000,
            max_connections: 1024,
            outbound_buffer: 64,
            cleanup_interval_secs: 300,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the optional TOML file and the process
    /// environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("MARKETCHAT_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("[Config] JWT_SECRET not set, using the development secret");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("SERVER_PORT", e.to_string()))?;
            self.bind_addr.set_port(port);
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(policy) = lookup("MISSING_KIND_POLICY") {
            self.missing_kind_policy = policy
                .parse()
                .map_err(|e: String| ConfigError::invalid("MISSING_KIND_POLICY", e))?;
        }
        if let Some(key) = lookup("BRIDGE_KEY").filter(|key| !key.is_empty()) {
            self.bridge_key = Some(key);
        }
        if let Some(value) = lookup("MAX_MESSAGE_LENGTH") {
            self.max_message_length = parse_number("MAX_MESSAGE_LENGTH", &value)?;
        }
        if let Some(value) = lookup("MAX_CONNECTIONS") {
            self.max_connections = parse_number("MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("OUTBOUND_BUFFER") {
            self.outbound_buffer = parse_number("OUTBOUND_BUFFER", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::invalid("jwt_secret", "must not be empty"));
        }
        if self.max_message_length == 0 {
            return Err(ConfigError::invalid("max_message_length", "must be positive"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::invalid("max_connections", "must be positive"));
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::invalid("outbound_buffer", "must be positive"));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::invalid("cleanup_interval_secs", "must be positive"));
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::invalid(key, e.to_string()))
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn missing_kind_policy(mut self, policy: MissingKindPolicy) -> Self {
        self.config.missing_kind_policy = policy;
        self
    }

    pub fn bridge_key(mut self, key: impl Into<String>) -> Self {
        self.config.bridge_key = Some(key.into());
        self
    }

    pub fn max_message_length(mut self, len: usize) -> Self {
        self.config.max_message_length = len;
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn outbound_buffer(mut self, size: usize) -> Self {
        self.config.outbound_buffer = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Connect to PostgreSQL and run migrations
///
/// Returns `None` when no URL is configured or the connection fails; the
/// caller then runs on the in-memory store.
pub async fn load_database(config: &ServerConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("[Config] DATABASE_URL not set, using the in-memory message store");
        return None;
    };

    tracing::info!("[Config] Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Config] Failed to create database connection pool: {:?}", e);
            tracing::warn!("[Config] Falling back to the in-memory message store");
            return None;
        }
    };

    tracing::info!("[Config] Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("[Config] Failed to run database migrations: {}", e);
        tracing::warn!("[Config] Continuing, the schema might not be up to date");
    } else {
        tracing::info!("[Config] Database migrations completed");
    }

    Some(pool)
}
