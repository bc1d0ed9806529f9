//! User habit entity - a habit adopted by one user.
//!
//! The `(user_id, habit_id)` pair is unique (see `ix_user_habit` in the schema
//! module). Reminders and relapse history hang off this row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User habit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_habits")]
pub struct Model {
    /// Unique identifier for the adoption
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Adopted catalog habit
    pub habit_id: i64,
    /// When the user started quitting
    pub start_date: DateTimeUtc,
    /// Most recent relapse, if any
    pub last_relapse: Option<DateTimeUtc>,
    /// Money saved so far, in whole currency units
    pub saved_money: i64,
}

/// Defines relationships between `UserHabit` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user habit belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each user habit points at one catalog habit
    #[sea_orm(
        belongs_to = "super::habit::Entity",
        from = "Column::HabitId",
        to = "super::habit::Column::Id",
        on_delete = "Cascade"
    )]
    Habit,
    /// Reminders configured for this habit
    #[sea_orm(has_many = "super::reminder::Entity")]
    Reminders,
    /// Recorded relapses
    #[sea_orm(has_many = "super::relapse_history::Entity")]
    Relapses,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habit.def()
    }
}

impl Related<super::reminder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminders.def()
    }
}

impl Related<super::relapse_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relapses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
