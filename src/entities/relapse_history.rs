//! Relapse history entity - one recorded relapse of a user habit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Relapse history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relapse_history")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the relapse happened
    pub relapse_time: DateTimeUtc,
    /// Optional note from the user
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    /// Owning user habit
    pub user_habit_id: i64,
}

/// Defines relationships between `RelapseHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each relapse belongs to one user habit
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
