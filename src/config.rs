//! Service configuration.
//!
//! Read once at startup from the process environment, after loading an
//! optional `.env` file from the working directory.
//!
//! ## Environment
//!
//! - `HOST`: Bind address (default: 0.0.0.0)
//! - `PORT`: Listen port (default: 8080)
//! - `DATABASE_URI`: MongoDB connection string (default: mongodb://localhost:27017)
//! - `DATABASE_NAME`: Database name (default: travels)
//! - `TRAVEL_COLLECTION`: Collection name (default: travels)
//! - `JWT_SECRET_KEY`: HS256 secret (required in production)
//! - `JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT`: Token lifetime in minutes, 1 to 525600 (default: 15)
//! - `SERVER_READ_TIMEOUT`: Request timeout in seconds, 0 disables (default: 60)
//! - `APP_ENVIRONMENT`: `production` disables request logging and CORS

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

const DEVELOPMENT_SECRET: &str = "development_only_secret_not_for_production";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 365 * 24 * 60;

/// Configuration errors. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `.env` exists but could not be read or parsed.
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
    /// A variable is set to a value that does not parse.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
    /// No signing secret in production.
    #[error("JWT_SECRET_KEY must be set when APP_ENVIRONMENT is production")]
    MissingSecret,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    /// Anything other than `production`.
    #[default]
    Development,
    /// `APP_ENVIRONMENT=production`.
    Production,
}

impl FromStr for AppEnvironment {
    type Err = Infallible;

    /// Only the exact value `production` selects production.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "production" => Self::Production,
            _ => Self::Development,
        })
    }
}

impl AppEnvironment {
    /// Whether this is production.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// MongoDB connection string.
    pub database_uri: String,
    /// Database name.
    pub database_name: String,
    /// Travel collection name.
    pub travel_collection: String,
    /// HS256 signing secret.
    pub jwt_secret: Vec<u8>,
    /// Token lifetime in minutes.
    pub token_lifetime_minutes: i64,
    /// Per-request timeout. `None` disables it.
    pub read_timeout: Option<Duration>,
    /// Deployment environment.
    pub environment: AppEnvironment,
}

impl ServiceConfig {
    /// Load `.env` (if present) and read configuration from the environment.
    #[cfg(feature = "service")]
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::DotEnv(e.to_string()));
            }
        }
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from an explicit set of variables.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let environment: AppEnvironment = get("APP_ENVIRONMENT")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let jwt_secret = match get("JWT_SECRET_KEY") {
            Some(secret) => secret.into_bytes(),
            None if environment.is_production() => return Err(ConfigError::MissingSecret),
            None => {
                tracing::warn!(
                    "JWT_SECRET_KEY not set, using development secret. \
                     Set this for production!"
                );
                DEVELOPMENT_SECRET.as_bytes().to_vec()
            }
        };

        let read_timeout_secs: u64 = parse_var(&vars, "SERVER_READ_TIMEOUT", 60)?;

        let token_lifetime_minutes: i64 =
            parse_var(&vars, "JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT", 15)?;
        if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&token_lifetime_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT",
                value: token_lifetime_minutes.to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&vars, "PORT", 8080)?,
            database_uri: get("DATABASE_URI")
                .unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
            database_name: get("DATABASE_NAME").unwrap_or_else(|| "travels".to_string()),
            travel_collection: get("TRAVEL_COLLECTION").unwrap_or_else(|| "travels".to_string()),
            jwt_secret,
            token_lifetime_minutes,
            read_timeout: (read_timeout_secs > 0).then(|| Duration::from_secs(read_timeout_secs)),
            environment,
        })
    }

    /// `host:port` listen address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// MongoDB settings for the travel store.
    #[cfg(feature = "mongo")]
    pub fn mongo(&self) -> crate::store::MongoConfig {
        crate::store::MongoConfig::new(
            self.database_uri.clone(),
            self.database_name.clone(),
            self.travel_collection.clone(),
        )
    }
}

fn parse_var<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
        None => Ok(default),
    }
}
