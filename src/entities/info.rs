//! Info entity - an informational article attached to a habit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Info database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "info")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Article title
    pub name: String,
    /// Article body
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Habit this article belongs to
    pub habit_id: i64,
}

/// Defines relationships between Info and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each article belongs to one habit
    #[sea_orm(
        belongs_to = "super::habit::Entity",
        from = "Column::HabitId",
        to = "super::habit::Column::Id",
        on_delete = "Cascade"
    )]
    Habit,
}

impl Related<super::habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
