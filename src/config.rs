//! Process configuration read from the environment (and `.env`, if present).

use std::net::SocketAddr;

use crate::error::ConfigError;

pub const DEFAULT_SESSION_COOKIE: &str = "better-auth.session_token";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_address: SocketAddr,
    pub cors_origin: String,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

/// Controls how tracing output is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

/// Which identity provider validates request credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Session {
        secret: String,
        cookie_name: String,
    },
    Cognito {
        region: String,
        user_pool_id: String,
        client_id: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let max_connections = get("DATABASE_MAX_CONNECTIONS", "10");
        let database_max_connections = match max_connections.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value: max_connections,
                    reason: "expected a positive integer".into(),
                })
            }
        };

        let bind = get("BIND_ADDRESS", "127.0.0.1:3000");
        let bind_address = bind.parse().map_err(|err| ConfigError::Invalid {
            key: "BIND_ADDRESS",
            value: bind.clone(),
            reason: format!("{err}"),
        })?;

        let format = get("LOG_FORMAT", "console");
        let format = match format.as_str() {
            "console" => LogFormat::Console,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: format,
                    reason: "expected console or json".into(),
                })
            }
        };

        let provider = get("AUTH_PROVIDER", "session");
        let auth = match provider.as_str() {
            "session" => AuthConfig::Session {
                secret: require("AUTH_SECRET")?,
                cookie_name: get("SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE),
            },
            "cognito" => AuthConfig::Cognito {
                region: require("USER_POOL_REGION")?,
                user_pool_id: require("USER_POOL_ID")?,
                client_id: require("CLIENT_ID")?,
            },
            _ => {
                return Err(ConfigError::Invalid {
                    key: "AUTH_PROVIDER",
                    value: provider,
                    reason: "expected session or cognito".into(),
                })
            }
        };

        Ok(Config {
            database_url: get("DATABASE_URL", "sqlite://todo.db"),
            database_max_connections,
            bind_address,
            cors_origin: get("CORS_ORIGIN", "http://localhost:3000"),
            logging: LoggingConfig {
                level: get("LOG_LEVEL", "info"),
                format,
            },
            auth,
        })
    }
}
