//! User entity - a chat-platform account that adopts habits.
//!
//! `tg_id` is the external identity and is unique; upserts are keyed on it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Storage-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Telegram user ID
    #[sea_orm(unique)]
    pub tg_id: i64,
    /// Platform username, if the user has one
    pub username: Option<String>,
    /// Display first name
    pub first_name: Option<String>,
    /// IANA timezone name or UTC offset as entered by the user
    pub timezone: String,
    /// Set once on insert, never updated
    pub registration_date: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user adopts many habits
    #[sea_orm(has_many = "super::user_habit::Entity")]
    UserHabits,
}

impl Related<super::user_habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserHabits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
