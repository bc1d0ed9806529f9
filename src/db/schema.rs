//! Table and index creation.
//!
//! Tables are generated from the entity definitions with SeaORM's
//! `Schema::create_table_from_entity`, so foreign keys (all `ON DELETE
//! CASCADE`) and single-column unique constraints follow the Rust structs.
//! Composite and secondary indexes are declared here. Every statement is
//! `IF NOT EXISTS`, so this is safe to run on every startup.

use crate::entities::{
    Habit, Hint, Info, RelapseHistory, Reminder, User, UserHabit, relapse_history, reminder,
    user_habit,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, EntityTrait, Schema};
use tracing::{debug, info, instrument};

fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> sea_orm::Statement
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.get_database_backend().build(&stmt)
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("ix_user_habit")
            .table(UserHabit)
            .col(user_habit::Column::UserId)
            .col(user_habit::Column::HabitId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ix_reminder_time")
            .table(Reminder)
            .col(reminder::Column::ScheduledTime)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ix_relapse_date")
            .table(RelapseHistory)
            .col(relapse_history::Column::RelapseTime)
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all tables and indexes that do not exist yet.
///
/// Parents are created before children so the foreign keys resolve on
/// backends that check them at creation time.
#[instrument(skip(db))]
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        create_table(db, &schema, User),
        create_table(db, &schema, Habit),
        create_table(db, &schema, UserHabit),
        create_table(db, &schema, Info),
        create_table(db, &schema, Hint),
        create_table(db, &schema, Reminder),
        create_table(db, &schema, RelapseHistory),
    ];
    for stmt in tables {
        debug!(sql = %stmt.sql, "Ensuring table");
        db.execute(stmt).await?;
    }

    for index in indexes() {
        db.execute(backend.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
