//! Reminder entity - a daily nudge configured for a user habit.
//!
//! Stored only; nothing in this crate schedules delivery.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reminder database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Free-form kind of reminder (e.g. `"motivation"`, `"check_in"`)
    pub reminder_type: String,
    /// Local time of day the reminder fires
    pub scheduled_time: Time,
    /// Disabled reminders are kept but skipped
    pub is_active: bool,
    /// Owning user habit
    pub user_habit_id: i64,
}

/// Defines relationships between Reminder and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reminder belongs to one user habit
    #[sea_orm(
        belongs_to = "super::user_habit::Entity",
        from = "Column::UserHabitId",
        to = "super::user_habit::Column::Id",
        on_delete = "Cascade"
    )]
    UserHabit,
}

impl Related<super::user_habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserHabit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
