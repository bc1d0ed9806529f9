//! Backends and the database manager.
//!
//! A [`DatabaseManager`] owns one lazily-built connection pool for one
//! [`Backend`]. Both backends give the same session/gateway contract; callers
//! should not care which one is active. [`connect_with_fallback`] is the only
//! place that decides.

use crate::config::{
    DatabaseSettings, ServerParams,
    database::{DEFAULT_POOL_TIMEOUT, IN_MEMORY_PATH},
};
use crate::db::{schema::create_tables, session::Session};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

/// Base pool size for the server backend.
pub const SERVER_POOL_SIZE: u32 = 10;
/// Extra connections the server pool may open under load.
pub const SERVER_MAX_OVERFLOW: u32 = 20;
// SQLite allows one writer. A single pooled connection makes concurrent
// sessions queue on acquire instead of failing with SQLITE_BUSY mid-transaction.
const EMBEDDED_POOL_SIZE: u32 = 1;
// The in-memory database lives only as long as its connection does.
// `min_connections(1)` keeps one connection open; these lifetimes stop the
// pool from recycling it, since a replacement would open an empty database.
const IN_MEMORY_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Where an embedded store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedTarget {
    /// A single `SQLite` file
    File(PathBuf),
    /// A non-persistent in-memory database
    InMemory,
}

/// The storage engine behind a [`DatabaseManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Pooled `PostgreSQL` server
    Server(ServerParams),
    /// Embedded `SQLite`
    Embedded(EmbeddedTarget),
}

impl Backend {
    /// Embedded backend for a configured path; `:memory:` selects an in-memory store.
    #[must_use]
    pub fn embedded(path: &str) -> Self {
        if path == IN_MEMORY_PATH {
            Self::Embedded(EmbeddedTarget::InMemory)
        } else {
            Self::Embedded(EmbeddedTarget::File(PathBuf::from(path)))
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Server(_) => "server",
            Self::Embedded(_) => "embedded",
        }
    }

    fn connect_options(&self, pool_timeout: Duration) -> Result<ConnectOptions> {
        let mut options = match self {
            Self::Server(params) => {
                let mut options = ConnectOptions::new(params.url());
                options
                    .max_connections(SERVER_POOL_SIZE + SERVER_MAX_OVERFLOW)
                    .min_connections(1);
                options
            }
            Self::Embedded(EmbeddedTarget::File(path)) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let mut options =
                    ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
                options.max_connections(EMBEDDED_POOL_SIZE);
                options
            }
            Self::Embedded(EmbeddedTarget::InMemory) => {
                let mut options = ConnectOptions::new("sqlite::memory:");
                options
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(IN_MEMORY_LIFETIME)
                    .max_lifetime(IN_MEMORY_LIFETIME);
                options
            }
        };
        options
            .connect_timeout(pool_timeout)
            .acquire_timeout(pool_timeout)
            .sqlx_logging(false);
        Ok(options)
    }
}

// Never includes the password.
impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server(p) => write!(f, "postgres://{}@{}:{}/{}", p.user, p.host, p.port, p.name),
            Self::Embedded(EmbeddedTarget::File(path)) => write!(f, "sqlite://{}", path.display()),
            Self::Embedded(EmbeddedTarget::InMemory) => f.write_str("sqlite::memory:"),
        }
    }
}

/// Owns the connection pool for one backend and hands out sessions.
pub struct DatabaseManager {
    backend: Backend,
    pool_timeout: Duration,
    connection: OnceCell<DatabaseConnection>,
}

impl std::fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("backend", &self.backend)
            .field("pool_timeout", &self.pool_timeout)
            .field("initialized", &self.connection.initialized())
            .finish()
    }
}

impl DatabaseManager {
    /// Creates a manager. Nothing is connected until [`Self::initialize`].
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            pool_timeout: DEFAULT_POOL_TIMEOUT,
            connection: OnceCell::new(),
        }
    }

    /// Overrides how long session acquisition waits for a free connection.
    ///
    /// Only affects a pool that has not been initialized yet.
    #[must_use]
    pub fn with_pool_timeout(mut self, timeout: Duration) -> Self {
        self.pool_timeout = timeout;
        self
    }

    /// The backend this manager talks to.
    #[must_use]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Builds the connection pool on first use; later calls return the same pool.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] if the pool cannot be established.
    /// Failures are not retried here.
    #[instrument(skip(self), fields(backend = %self.backend))]
    pub async fn initialize(&self) -> Result<&DatabaseConnection> {
        self.connection
            .get_or_try_init(|| async {
                let options = self.backend.connect_options(self.pool_timeout)?;
                debug!("Opening connection pool");
                let connection =
                    Database::connect(options)
                        .await
                        .map_err(|e| Error::StorageUnavailable {
                            message: format!("Failed to connect to {}: {e}", self.backend),
                        })?;
                info!("Connection pool ready");
                Ok(connection)
            })
            .await
    }

    /// Round-trips a trivial query to prove the backend answers.
    pub async fn ping(&self) -> Result<()> {
        let connection = self.initialize().await?;
        let backend = connection.get_database_backend();
        connection
            .query_one(Statement::from_string(backend, "SELECT 1"))
            .await
            .map_err(|e| Error::StorageUnavailable {
                message: format!("{} did not answer: {e}", self.backend),
            })?;
        Ok(())
    }

    /// Creates all tables if absent. Safe to call on every startup.
    pub async fn create_schema(&self) -> Result<()> {
        let connection = self.initialize().await?;
        create_tables(connection).await
    }

    /// Begins a unit of work on one pooled connection.
    ///
    /// The returned [`Session`] must be committed explicitly; dropping it
    /// (including when the owning task is cancelled) rolls back and returns
    /// the connection to the pool. Prefer [`Self::with_session`].
    ///
    /// # Errors
    /// Returns [`Error::ResourceExhausted`] if no connection frees up within
    /// the pool timeout.
    pub async fn acquire_session(&self) -> Result<Session> {
        let connection = self.initialize().await?;
        let txn = connection.begin().await?;
        Ok(Session::new(txn))
    }

    /// Runs `work` inside one session.
    ///
    /// Commits when `work` returns `Ok`. On `Err` the error is logged, the
    /// session is rolled back, and the same error is returned unchanged. A
    /// failed rollback is logged but never replaces the original error.
    pub async fn with_session<T, F>(&self, work: F) -> Result<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s Session) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 's>>
            + Send,
    {
        let session = self.acquire_session().await?;
        let outcome = work(&session).await;
        match outcome {
            Ok(value) => {
                session.commit().await.inspect_err(|e| {
                    error!(error = %e, backend = %self.backend, "Commit failed");
                })?;
                Ok(value)
            }
            Err(err) => {
                error!(error = %err, backend = %self.backend, "Database error, rolling back");
                if let Err(rollback_err) = session.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Closes the pool if it was ever opened.
    pub async fn close(self) -> Result<()> {
        if let Some(connection) = self.connection.into_inner() {
            connection.close().await?;
        }
        Ok(())
    }
}

/// Builds a ready manager, preferring the server backend.
///
/// When the settings carry a full set of server parameters the server is
/// tried first and verified with `SELECT 1`. Any failure there is logged as
/// critical and the embedded store at `settings.path` is used instead.
///
/// # Errors
/// Only errors from the embedded path are returned.
#[instrument(skip(settings))]
pub async fn connect_with_fallback(settings: &DatabaseSettings) -> Result<DatabaseManager> {
    if let Some(params) = settings.server_params() {
        let manager =
            DatabaseManager::new(Backend::Server(params)).with_pool_timeout(settings.pool_timeout);
        match manager.ping().await {
            Ok(()) => {
                info!(backend = %manager.backend(), "Using server database");
                return Ok(manager);
            }
            Err(e) => {
                error!(
                    severity = "critical",
                    error = %e,
                    "Server database unavailable, falling back to embedded store"
                );
            }
        }
    } else {
        warn!("Server database parameters incomplete, using embedded store");
    }

    let manager =
        DatabaseManager::new(Backend::embedded(&settings.path)).with_pool_timeout(settings.pool_timeout);
    manager.ping().await?;
    info!(backend = %manager.backend(), "Using embedded database");
    Ok(manager)
}
