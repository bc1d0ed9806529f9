//! Gateways - the only code allowed to read and write storage.
//!
//! Callers depend on the [`UserRepository`] and [`HabitRepository`] traits.
//! [`UserGateway`] and [`HabitGateway`] implement them over any SeaORM
//! connection (in practice a [`crate::db::Session`] transaction, on either
//! backend), and [`Instrumented`] wraps any implementation with timing and
//! error logging.
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.

pub mod habit;
pub mod instrument;
pub mod user;

pub use habit::HabitGateway;
pub use instrument::{Instrumented, observe};
pub use user::UserGateway;

use crate::errors::Result;
use crate::models::{
    Habit, Hint, Info, NewHint, NewInfo, RelapseHistory, Reminder, User, UserHabit,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};

/// Users and the habits they adopt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Registers a user, or refreshes the profile of an existing one.
    ///
    /// Upsert keyed on `tg_id`: an existing row gets the new username, first
    /// name and timezone, and keeps its original registration date.
    async fn create_user(
        &self,
        tg_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        timezone: String,
    ) -> Result<User>;

    /// # Errors
    /// [`crate::errors::Error::NotFound`] when no user has this `tg_id`.
    async fn get_user_by_tg_id(&self, tg_id: i64) -> Result<User>;

    /// Adopts a habit for a user, starting with no savings and no relapse.
    ///
    /// # Errors
    /// - [`crate::errors::Error::Conflict`] if the user already has this habit
    /// - [`crate::errors::Error::NotFound`] if the user or habit does not exist
    async fn create_user_habit(
        &self,
        user_id: i64,
        habit_id: i64,
        start_date: DateTime<Utc>,
    ) -> Result<UserHabit>;

    /// All habits adopted by a user, each with its catalog habit loaded.
    /// Empty when the user has none.
    async fn get_user_habit_by_id(&self, user_id: i64) -> Result<Vec<UserHabit>>;

    /// Deletes a user together with their habits, reminders and relapses.
    async fn delete_user(&self, user_id: i64) -> Result<()>;
}

/// The habit catalog and everything hanging off adopted habits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Creates a catalog habit together with its info articles and hints.
    ///
    /// # Errors
    /// - [`crate::errors::Error::Conflict`] if the name is taken
    /// - [`crate::errors::Error::Validation`] for an empty name or a negative cost
    async fn create_habit(
        &self,
        name: String,
        cost_per_unit: Option<f64>,
        info: Vec<NewInfo>,
        hints: Vec<NewHint>,
    ) -> Result<Habit>;

    /// Every catalog habit with info and hints loaded.
    async fn get_all_habits(&self) -> Result<Vec<Habit>>;

    async fn get_habit_by_id(&self, habit_id: i64) -> Result<Habit>;

    /// Deletes a habit with its info, hints and every adoption of it.
    async fn delete_habit(&self, habit_id: i64) -> Result<()>;

    async fn create_info(&self, habit_id: i64, name: String, description: String) -> Result<Info>;

    async fn get_all_infos(&self, habit_id: i64) -> Result<Vec<Info>>;

    async fn create_hint(&self, habit_id: i64, name: String, description: String) -> Result<Hint>;

    async fn get_all_hints(&self, habit_id: i64) -> Result<Vec<Hint>>;

    async fn create_reminder(
        &self,
        user_habit_id: i64,
        reminder_type: String,
        scheduled_time: NaiveTime,
        is_active: bool,
    ) -> Result<Reminder>;

    async fn get_reminder_by_id(&self, reminder_id: i64) -> Result<Reminder>;

    /// Records a relapse and moves the user habit's streak baseline to it.
    ///
    /// `relapse_time` defaults to now.
    async fn create_relapse_history(
        &self,
        user_habit_id: i64,
        relapse_time: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<RelapseHistory>;

    async fn get_relapse_history_by_id(&self, relapse_history_id: i64) -> Result<RelapseHistory>;
}
