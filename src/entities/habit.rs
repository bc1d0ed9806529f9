//! Habit entity - a catalog entry users can try to quit.
//!
//! Each habit owns its informational articles and hints. Deleting a habit
//! cascades to both, and to every user habit that references it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    /// Unique identifier for the habit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Catalog name (e.g. "Smoking"), unique
    #[sea_orm(unique)]
    pub name: String,
    /// Money spent per unit (day) of the habit
    pub cost_per_unit: Option<f64>,
}

/// Defines relationships between Habit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Informational articles about the habit
    #[sea_orm(has_many = "super::info::Entity")]
    Info,
    /// Short hints for resisting the habit
    #[sea_orm(has_many = "super::hint::Entity")]
    Hints,
    /// Users who adopted this habit
    #[sea_orm(has_many = "super::user_habit::Entity")]
    UserHabits,
}

impl Related<super::info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Info.def()
    }
}

impl Related<super::hint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hints.def()
    }
}

impl Related<super::user_habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserHabits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
