use std::env;

use auth::Authenticator;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenIssuer;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

/// Settings that deserialize but cannot drive the service.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid password settings: {0}")]
    Password(#[from] PasswordError),

    #[error("jwt.expiration_hours must be a positive number of hours, got {0}")]
    InvalidTokenLifetime(i64),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Relational store settings. Without a `url` the service keeps users in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_password_cost")]
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: default_password_cost(),
        }
    }
}

/// Account created at startup when no user with this username exists yet.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_expiration_hours() -> i64 {
    TokenIssuer::DEFAULT_LIFETIME_HOURS
}

fn default_password_cost() -> u32 {
    PasswordHasher::DEFAULT_COST
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Build the password hasher and token issuer described by this configuration.
    ///
    /// # Errors
    /// * `Password` - `password.cost` is outside the supported range
    /// * `InvalidTokenLifetime` - `jwt.expiration_hours` is not positive or too large
    pub fn authenticator(&self) -> Result<Authenticator, SettingsError> {
        let hasher = PasswordHasher::with_cost(self.password.cost)?;

        let hours = self.jwt.expiration_hours;
        let lifetime = chrono::Duration::try_hours(hours)
            .filter(|_| hours > 0)
            .ok_or(SettingsError::InvalidTokenLifetime(hours))?;
        let issuer = TokenIssuer::new(self.jwt.secret.as_bytes(), lifetime);

        Ok(Authenticator::new(hasher, issuer))
    }
}
