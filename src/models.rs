//! Domain records returned by the gateways.
//!
//! Each record is a snapshot of one storage row taken at read/write time.
//! Changing a record in memory never changes storage; writes go through the
//! gateways in [`crate::core`].

use crate::entities::{habit, hint, info, relapse_history, reminder, user, user_habit};
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A registered chat user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub tg_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub timezone: String,
    pub registration_date: DateTime<Utc>,
}

/// A catalog habit with its info articles and hints fully loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub cost_per_unit: Option<f64>,
    pub info: Vec<Info>,
    pub hints: Vec<Hint>,
}

/// A habit adopted by a user, carrying the catalog habit it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHabit {
    pub id: i64,
    pub user_id: i64,
    pub habit_id: i64,
    pub start_date: DateTime<Utc>,
    pub last_relapse: Option<DateTime<Utc>>,
    pub saved_money: i64,
    pub habit: Habit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub habit_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub habit_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub reminder_type: String,
    pub scheduled_time: NaiveTime,
    pub is_active: bool,
    pub user_habit_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelapseHistory {
    pub id: i64,
    pub relapse_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub user_habit_id: i64,
}

/// Info article content supplied when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInfo {
    pub name: String,
    pub description: String,
}

/// Hint content supplied when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHint {
    pub name: String,
    pub description: String,
}

impl UserHabit {
    /// The point the current streak is measured from.
    #[must_use]
    pub fn streak_baseline(&self) -> DateTime<Utc> {
        self.last_relapse.unwrap_or(self.start_date)
    }

    /// Time elapsed since the last relapse, or since the start if there was none.
    ///
    /// Never negative: a baseline in the future yields zero.
    #[must_use]
    pub fn current_streak(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.streak_baseline()).max(TimeDelta::zero())
    }

    /// Whole days in the current streak.
    #[must_use]
    pub fn streak_days(&self, now: DateTime<Utc>) -> i64 {
        self.current_streak(now).num_days()
    }

    /// Money not spent on the habit during the current streak.
    ///
    /// `None` when the habit has no cost attached.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn projected_savings(&self, now: DateTime<Utc>) -> Option<f64> {
        self.habit
            .cost_per_unit
            .map(|cost| cost * self.streak_days(now) as f64)
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            tg_id: model.tg_id,
            username: model.username,
            first_name: model.first_name,
            timezone: model.timezone,
            registration_date: model.registration_date,
        }
    }
}

impl Habit {
    pub(crate) fn from_parts(
        model: habit::Model,
        info: Vec<info::Model>,
        hints: Vec<hint::Model>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            cost_per_unit: model.cost_per_unit,
            info: info.into_iter().map(Info::from).collect(),
            hints: hints.into_iter().map(Hint::from).collect(),
        }
    }
}

impl UserHabit {
    pub(crate) fn from_parts(model: user_habit::Model, habit: Habit) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            habit_id: model.habit_id,
            start_date: model.start_date,
            last_relapse: model.last_relapse,
            saved_money: model.saved_money,
            habit,
        }
    }
}

impl From<info::Model> for Info {
    fn from(model: info::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            habit_id: model.habit_id,
        }
    }
}

impl From<hint::Model> for Hint {
    fn from(model: hint::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            habit_id: model.habit_id,
        }
    }
}

impl From<reminder::Model> for Reminder {
    fn from(model: reminder::Model) -> Self {
        Self {
            id: model.id,
            reminder_type: model.reminder_type,
            scheduled_time: model.scheduled_time,
            is_active: model.is_active,
            user_habit_id: model.user_habit_id,
        }
    }
}

impl From<relapse_history::Model> for RelapseHistory {
    fn from(model: relapse_history::Model) -> Self {
        Self {
            id: model.id,
            relapse_time: model.relapse_time,
            reason: model.reason,
            user_habit_id: model.user_habit_id,
        }
    }
}
