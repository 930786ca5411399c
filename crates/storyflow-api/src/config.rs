//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use storyflow_ledger::application::ledger::DEFAULT_COMPLETION_XP;
use storyflow_narrative::application::engine::{AppIdlePolicy, EngineConfig};

use crate::error::AppError;

/// Where the catalog and player profiles live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL for both the catalog and player profiles.
    Postgres { database_url: String },
    /// A YAML catalog file with player profiles held in memory.
    CatalogFile { path: PathBuf },
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    /// XP granted on a story's first completion.
    pub story_completion_xp: i64,
    /// Enables the child-app idle watchdog.
    pub app_idle_timeout: Option<Duration>,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is invalid or neither
    /// `DATABASE_URL` nor `CATALOG_FILE` is set.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let backend = match (lookup("DATABASE_URL"), lookup("CATALOG_FILE")) {
            (Some(database_url), _) => Backend::Postgres { database_url },
            (None, Some(path)) => Backend::CatalogFile { path: path.into() },
            (None, None) => {
                return Err(AppError::Config(
                    "either DATABASE_URL or CATALOG_FILE must be set".into(),
                ));
            }
        };
        let story_completion_xp = match lookup("STORY_COMPLETION_XP") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("STORY_COMPLETION_XP must be an integer: {e}"))
            })?,
            None => DEFAULT_COMPLETION_XP,
        };
        let app_idle_timeout = match lookup("APP_IDLE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e| {
                    AppError::Config(format!("APP_IDLE_TIMEOUT_SECS must be a whole number: {e}"))
                })?;
                if secs == 0 {
                    return Err(AppError::Config(
                        "APP_IDLE_TIMEOUT_SECS must be greater than zero".into(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            host,
            port,
            backend,
            story_completion_xp,
            app_idle_timeout,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }

    /// Address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            app_idle: self
                .app_idle_timeout
                .map_or(AppIdlePolicy::None, AppIdlePolicy::FailAfter),
        }
    }
}
