//! Database configuration.
//!
//! The server backend is used only when every connection parameter is
//! present; otherwise the embedded `SQLite` store at `path` is used.

use std::time::Duration;

/// Default location of the embedded `SQLite` file.
pub const DEFAULT_DB_PATH: &str = "data/bot.db";

/// Path that selects a non-persistent in-memory store.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// How long a caller waits for a pooled connection before giving up.
pub const DEFAULT_POOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw database settings as read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// `PostgreSQL` host
    pub host: Option<String>,
    /// `PostgreSQL` port
    pub port: Option<u16>,
    /// `PostgreSQL` database name
    pub name: Option<String>,
    /// `PostgreSQL` user
    pub user: Option<String>,
    /// `PostgreSQL` password
    pub password: Option<String>,
    /// Embedded store path, or `:memory:`
    pub path: String,
    /// Pool acquire/connect timeout
    pub pool_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            name: None,
            user: None,
            password: None,
            path: DEFAULT_DB_PATH.to_string(),
            pool_timeout: DEFAULT_POOL_TIMEOUT,
        }
    }
}

/// A complete set of server connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseSettings {
    /// Settings for an embedded store only.
    #[must_use]
    pub fn embedded(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Returns the server parameters if all five are configured.
    #[must_use]
    pub fn server_params(&self) -> Option<ServerParams> {
        Some(ServerParams {
            host: self.host.clone()?,
            port: self.port?,
            name: self.name.clone()?,
            user: self.user.clone()?,
            password: self.password.clone()?,
        })
    }
}

impl ServerParams {
    /// `PostgreSQL` connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

// Passwords must never reach the logs.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("path", &self.path)
            .field("pool_timeout", &self.pool_timeout)
            .finish()
    }
}

impl std::fmt::Debug for ServerParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn full() -> DatabaseSettings {
        DatabaseSettings {
            host: Some("db".to_string()),
            port: Some(5432),
            name: Some("habits".to_string()),
            user: Some("bot".to_string()),
            password: Some("hunter2".to_string()),
            ..DatabaseSettings::default()
        }
    }

    #[test]
    fn test_server_params_require_every_field() {
        assert!(full().server_params().is_some());

        let mut partial = full();
        partial.password = None;
        assert!(partial.server_params().is_none());
        assert!(DatabaseSettings::embedded(IN_MEMORY_PATH).server_params().is_none());
    }

    #[test]
    fn test_server_url() {
        let params = full().server_params().unwrap();
        assert_eq!(params.url(), "postgres://bot:hunter2@db:5432/habits");
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = full();
        assert!(!format!("{settings:?}").contains("hunter2"));
        assert!(!format!("{:?}", settings.server_params().unwrap()).contains("hunter2"));
    }
}
