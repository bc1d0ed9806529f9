//! Shared test utilities.
//!
//! This module provides common helper functions for setting up in-memory
//! databases and creating test records with sensible defaults.

use crate::{
    core::{HabitGateway, HabitRepository, UserGateway, UserRepository},
    db::{Backend, DatabaseManager, EmbeddedTarget, create_tables},
    errors::Result,
    models::{Habit, User, UserHabit},
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for gateway tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates a manager over a fresh in-memory store with the schema in place.
/// Use this when a test needs sessions rather than a bare connection.
pub async fn setup_test_manager() -> Result<DatabaseManager> {
    let manager = DatabaseManager::new(Backend::Embedded(EmbeddedTarget::InMemory));
    manager.create_schema().await?;
    Ok(manager)
}

/// A fixed, whole-second instant so stored timestamps compare exactly.
pub fn test_start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a test user.
///
/// # Defaults
/// * `username`: `"user{tg_id}"`
/// * `first_name`: None
/// * `timezone`: `"UTC"`
pub async fn create_test_user(db: &DatabaseConnection, tg_id: i64) -> Result<User> {
    UserGateway::new(db)
        .create_user(tg_id, Some(format!("user{tg_id}")), None, "UTC".to_string())
        .await
}

/// Creates a catalog habit with a cost of 5.0 and no info or hints.
pub async fn create_test_habit(db: &DatabaseConnection, name: &str) -> Result<Habit> {
    HabitGateway::new(db)
        .create_habit(name.to_string(), Some(5.0), Vec::new(), Vec::new())
        .await
}

/// Sets up a complete test environment with one user tracking one habit.
/// Returns (db, user, habit, `user_habit`).
pub async fn setup_with_user_habit() -> Result<(DatabaseConnection, User, Habit, UserHabit)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, 100).await?;
    let habit = create_test_habit(&db, "Test Habit").await?;
    let user_habit = UserGateway::new(&db)
        .create_user_habit(user.id, habit.id, test_start_date())
        .await?;
    Ok((db, user, habit, user_habit))
}
