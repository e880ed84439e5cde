//! Server configuration loaded from the environment.
//!
//! | Variable       | Default                                                        |
//! |----------------|----------------------------------------------------------------|
//! | `HOST`         | `127.0.0.1`                                                    |
//! | `PORT`         | `5000`                                                         |
//! | `APP_ENV`      | `development`                                                  |
//! | `CORS_ORIGINS` | `http://localhost:3000,http://localhost:5173,http://127.0.0.1:5173` |

use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("`{raw}` is not a port number"),
            })?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            environment: lookup("APP_ENV").unwrap_or(defaults.environment),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
