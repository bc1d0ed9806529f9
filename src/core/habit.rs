//! Habit gateway - the habit catalog and the records attached to adopted habits.
//!
//! Covers catalog habits with their info articles and hints, plus reminders
//! and relapse history of user habits. Uniqueness of habit names is enforced
//! by the storage unique constraint; the pre-check before insert only exists
//! to produce a readable conflict message.

use super::HabitRepository;
use crate::{
    entities::{
        Habit as HabitEntity, Hint as HintEntity, Info as InfoEntity,
        RelapseHistory as RelapseEntity, Reminder as ReminderEntity,
        UserHabit as UserHabitEntity, habit, hint, info, relapse_history, reminder, user_habit,
    },
    errors::{Error, Result},
    models::{Habit, Hint, Info, NewHint, NewInfo, RelapseHistory, Reminder},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{LoaderTrait, QueryOrder, Set, prelude::*};

/// Loads info and hints for a batch of habits with two follow-up queries.
///
/// The result keeps the order of `habits`.
pub(crate) async fn load_habits<C>(db: &C, habits: Vec<habit::Model>) -> Result<Vec<Habit>>
where
    C: ConnectionTrait,
{
    let info = habits
        .load_many(InfoEntity::find().order_by_asc(info::Column::Id), db)
        .await?;
    let hints = habits
        .load_many(HintEntity::find().order_by_asc(hint::Column::Id), db)
        .await?;

    Ok(habits
        .into_iter()
        .zip(info)
        .zip(hints)
        .map(|((model, info), hints)| Habit::from_parts(model, info, hints))
        .collect())
}

/// Loads one habit with its info and hints.
pub(crate) async fn load_habit<C>(db: &C, habit_id: i64) -> Result<Habit>
where
    C: ConnectionTrait,
{
    let model = HabitEntity::find_by_id(habit_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("habit", habit_id))?;
    load_habits(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found("habit", habit_id))
}

async fn ensure_habit_exists<C: ConnectionTrait>(db: &C, habit_id: i64) -> Result<()> {
    HabitEntity::find_by_id(habit_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::not_found("habit", habit_id))
}

async fn find_user_habit<C: ConnectionTrait>(
    db: &C,
    user_habit_id: i64,
) -> Result<user_habit::Model> {
    UserHabitEntity::find_by_id(user_habit_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user habit", user_habit_id))
}

fn validate_habit(name: &str, cost_per_unit: Option<f64>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Habit name cannot be empty".to_string(),
        });
    }
    if let Some(cost) = cost_per_unit {
        if !cost.is_finite() || cost < 0.0 {
            return Err(Error::Validation {
                message: format!("Cost per unit must be a non-negative number, got {cost}"),
            });
        }
    }
    Ok(())
}

fn validate_content(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: format!("{kind} name cannot be empty"),
        });
    }
    Ok(())
}

/// [`HabitRepository`] over a SeaORM connection or transaction.
#[derive(Debug, Clone, Copy)]
pub struct HabitGateway<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> HabitGateway<'a, C> {
    /// Binds a gateway to a connection. Use a session transaction in production.
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    async fn insert_info(&self, habit_id: i64, name: String, description: String) -> Result<Info> {
        validate_content("Info", &name)?;
        let model = info::ActiveModel {
            name: Set(name.trim().to_string()),
            description: Set(description),
            habit_id: Set(habit_id),
            ..Default::default()
        };
        Ok(model.insert(self.db).await?.into())
    }

    async fn insert_hint(&self, habit_id: i64, name: String, description: String) -> Result<Hint> {
        validate_content("Hint", &name)?;
        let model = hint::ActiveModel {
            name: Set(name.trim().to_string()),
            description: Set(description),
            habit_id: Set(habit_id),
            ..Default::default()
        };
        Ok(model.insert(self.db).await?.into())
    }
}

#[async_trait]
impl<C: ConnectionTrait> HabitRepository for HabitGateway<'_, C> {
    async fn create_habit(
        &self,
        name: String,
        cost_per_unit: Option<f64>,
        info: Vec<NewInfo>,
        hints: Vec<NewHint>,
    ) -> Result<Habit> {
        validate_habit(&name, cost_per_unit)?;
        let name = name.trim().to_string();

        let existing = HabitEntity::find()
            .filter(habit::Column::Name.eq(name.as_str()))
            .one(self.db)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict {
                message: format!("Habit with name={name} already exists"),
            });
        }

        let model = habit::ActiveModel {
            name: Set(name),
            cost_per_unit: Set(cost_per_unit),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        let mut created_info = Vec::with_capacity(info.len());
        for item in info {
            created_info.push(self.insert_info(model.id, item.name, item.description).await?);
        }
        let mut created_hints = Vec::with_capacity(hints.len());
        for item in hints {
            created_hints.push(self.insert_hint(model.id, item.name, item.description).await?);
        }

        Ok(Habit {
            id: model.id,
            name: model.name,
            cost_per_unit: model.cost_per_unit,
            info: created_info,
            hints: created_hints,
        })
    }

    async fn get_all_habits(&self) -> Result<Vec<Habit>> {
        let habits = HabitEntity::find()
            .order_by_asc(habit::Column::Id)
            .all(self.db)
            .await?;
        load_habits(self.db, habits).await
    }

    async fn get_habit_by_id(&self, habit_id: i64) -> Result<Habit> {
        load_habit(self.db, habit_id).await
    }

    async fn delete_habit(&self, habit_id: i64) -> Result<()> {
        let result = HabitEntity::delete_by_id(habit_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(Error::not_found("habit", habit_id));
        }
        Ok(())
    }

    async fn create_info(&self, habit_id: i64, name: String, description: String) -> Result<Info> {
        ensure_habit_exists(self.db, habit_id).await?;
        self.insert_info(habit_id, name, description).await
    }

    async fn get_all_infos(&self, habit_id: i64) -> Result<Vec<Info>> {
        ensure_habit_exists(self.db, habit_id).await?;
        let rows = InfoEntity::find()
            .filter(info::Column::HabitId.eq(habit_id))
            .order_by_asc(info::Column::Id)
            .all(self.db)
            .await?;
        Ok(rows.into_iter().map(Info::from).collect())
    }

    async fn create_hint(&self, habit_id: i64, name: String, description: String) -> Result<Hint> {
        ensure_habit_exists(self.db, habit_id).await?;
        self.insert_hint(habit_id, name, description).await
    }

    async fn get_all_hints(&self, habit_id: i64) -> Result<Vec<Hint>> {
        ensure_habit_exists(self.db, habit_id).await?;
        let rows = HintEntity::find()
            .filter(hint::Column::HabitId.eq(habit_id))
            .order_by_asc(hint::Column::Id)
            .all(self.db)
            .await?;
        Ok(rows.into_iter().map(Hint::from).collect())
    }

    async fn create_reminder(
        &self,
        user_habit_id: i64,
        reminder_type: String,
        scheduled_time: NaiveTime,
        is_active: bool,
    ) -> Result<Reminder> {
        if reminder_type.trim().is_empty() {
            return Err(Error::Validation {
                message: "Reminder type cannot be empty".to_string(),
            });
        }
        find_user_habit(self.db, user_habit_id).await?;

        let model = reminder::ActiveModel {
            reminder_type: Set(reminder_type.trim().to_string()),
            scheduled_time: Set(scheduled_time),
            is_active: Set(is_active),
            user_habit_id: Set(user_habit_id),
            ..Default::default()
        };
        Ok(model.insert(self.db).await?.into())
    }

    async fn get_reminder_by_id(&self, reminder_id: i64) -> Result<Reminder> {
        ReminderEntity::find_by_id(reminder_id)
            .one(self.db)
            .await?
            .map(Reminder::from)
            .ok_or_else(|| Error::not_found("reminder", reminder_id))
    }

    async fn create_relapse_history(
        &self,
        user_habit_id: i64,
        relapse_time: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<RelapseHistory> {
        let user_habit = find_user_habit(self.db, user_habit_id).await?;
        let relapse_time = relapse_time.unwrap_or_else(Utc::now);

        let model = relapse_history::ActiveModel {
            relapse_time: Set(relapse_time),
            reason: Set(reason),
            user_habit_id: Set(user_habit_id),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        // A back-dated relapse never moves the baseline backwards
        if user_habit.last_relapse.is_none_or(|last| last < relapse_time) {
            let mut active: user_habit::ActiveModel = user_habit.into();
            active.last_relapse = Set(Some(relapse_time));
            active.update(self.db).await?;
        }

        Ok(model.into())
    }

    async fn get_relapse_history_by_id(&self, relapse_history_id: i64) -> Result<RelapseHistory> {
        RelapseEntity::find_by_id(relapse_history_id)
            .one(self.db)
            .await?
            .map(RelapseHistory::from)
            .ok_or_else(|| Error::not_found("relapse", relapse_history_id))
    }
}
