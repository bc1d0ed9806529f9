//! Hint entity - a short tip for resisting a habit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hint database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hints")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Hint title
    pub name: String,
    /// Hint body
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Habit this hint belongs to
    pub habit_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
