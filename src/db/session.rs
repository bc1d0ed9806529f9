//! A unit of work: one transaction on one pooled connection.

use crate::core::{HabitGateway, Instrumented, UserGateway};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use tracing::debug;

/// An open transaction handed out by [`crate::db::DatabaseManager`].
///
/// Gateways borrow the session and never outlive it. Dropping a session
/// that was not committed rolls it back.
pub struct Session {
    txn: DatabaseTransaction,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.txn.get_database_backend())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) const fn new(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// User gateway bound to this session, with call instrumentation.
    #[must_use]
    pub fn users(&self) -> Instrumented<UserGateway<'_, DatabaseTransaction>> {
        Instrumented::new(UserGateway::new(&self.txn))
    }

    /// Habit gateway bound to this session, with call instrumentation.
    #[must_use]
    pub fn habits(&self) -> Instrumented<HabitGateway<'_, DatabaseTransaction>> {
        Instrumented::new(HabitGateway::new(&self.txn))
    }

    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await?;
        debug!("Session committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.txn.rollback().await?;
        debug!("Session rolled back");
        Ok(())
    }
}
