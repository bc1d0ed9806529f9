//! Bot and database settings loaded from environment variables.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Parsing goes through a lookup function so it can be exercised
//! without touching the real environment.

use super::database::{DEFAULT_DB_PATH, DEFAULT_POOL_TIMEOUT, DatabaseSettings};
use crate::errors::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default location of the habit catalog.
pub const DEFAULT_CATALOG_PATH: &str = "habits.toml";

/// Bot access token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    /// Wraps a raw token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for handing to the chat platform client.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BotToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BotToken(<REDACTED>)")
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Chat bot access token
    pub bot_token: BotToken,
    /// External identities allowed to curate the habit catalog
    pub admin_ids: Vec<i64>,
    /// Database backend parameters
    pub database: DatabaseSettings,
    /// Habit catalog used to seed the database
    pub catalog_path: String,
}

impl Settings {
    /// Builds settings from a key lookup.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `BOT_TOKEN` or `ADMIN_IDS` is missing, or if
    /// `ADMIN_IDS`/`DB_PORT` cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| Error::Config {
                message: format!("{key} is not set"),
            })
        };

        let bot_token = BotToken::new(required("BOT_TOKEN")?);
        let admin_ids = parse_admin_ids(&required("ADMIN_IDS")?)?;

        let port = lookup("DB_PORT")
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|e| Error::Config {
                    message: format!("DB_PORT is not a valid port ({raw}): {e}"),
                })
            })
            .transpose()?;

        let pool_timeout = lookup("DB_POOL_TIMEOUT")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| Error::Config {
                        message: format!("DB_POOL_TIMEOUT is not a number of seconds ({raw}): {e}"),
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_POOL_TIMEOUT);

        let database = DatabaseSettings {
            host: lookup("DB_HOST"),
            port,
            name: lookup("DB_NAME"),
            user: lookup("DB_USER"),
            password: lookup("DB_PASSWORD"),
            path: lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            pool_timeout,
        };

        Ok(Self {
            bot_token,
            admin_ids,
            database,
            catalog_path: lookup("HABIT_CATALOG")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string()),
        })
    }

    /// Builds settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Whether the given external identity may administer the catalog.
    #[must_use]
    pub fn is_admin(&self, tg_id: i64) -> bool {
        self.admin_ids.contains(&tg_id)
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|e| Error::Config {
                message: format!("ADMIN_IDS entry {part:?} is not an integer: {e}"),
            })
        })
        .collect()
}

/// Loads the `.env` file (if any) and reads settings from the environment.
///
/// A missing `.env` file is not an error; variables may be set externally.
pub fn load_settings(env_file: Option<&Path>) -> Result<Settings> {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded: {}", e),
    }

    let settings = Settings::from_env()?;
    info!(
        admins = settings.admin_ids.len(),
        server_backend = settings.database.server_params().is_some(),
        "Settings loaded"
    );
    Ok(settings)
}
