//! Call instrumentation for gateways.
//!
//! [`Instrumented`] wraps a repository and reports every call through
//! [`observe`]: duration and outcome on success, the error and the call
//! arguments on failure. Results pass through untouched.

use super::{HabitRepository, UserRepository};
use crate::errors::Result;
use crate::models::{
    Habit, Hint, Info, NewHint, NewInfo, RelapseHistory, Reminder, User, UserHabit,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info};

/// Awaits `call` and logs how it went.
///
/// `args` is only included in the failure event. With `timing` off, successful
/// calls are logged at debug level without a duration.
pub async fn observe<T, F>(method: &'static str, args: String, timing: bool, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = call.await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) if timing => info!(method, duration_ms, success = true, "Gateway call finished"),
        Ok(_) => debug!(method, success = true, "Gateway call finished"),
        Err(e) => error!(
            method,
            error = %e,
            args = %args,
            duration_ms,
            success = false,
            "Gateway call failed"
        ),
    }
    result
}

/// Decorator adding [`observe`] around every call of a repository.
#[derive(Debug, Clone)]
pub struct Instrumented<G> {
    inner: G,
    timing: bool,
}

impl<G> Instrumented<G> {
    /// Wraps `inner` with timing enabled.
    pub const fn new(inner: G) -> Self {
        Self {
            inner,
            timing: true,
        }
    }

    /// Turns duration logging for successful calls on or off.
    #[must_use]
    pub const fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }
}

#[async_trait]
impl<G: UserRepository> UserRepository for Instrumented<G> {
    async fn create_user(
        &self,
        tg_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        timezone: String,
    ) -> Result<User> {
        let args = format!(
            "tg_id={tg_id} username={username:?} first_name={first_name:?} timezone={timezone}"
        );
        let call = self.inner.create_user(tg_id, username, first_name, timezone);
        observe("create_user", args, self.timing, call).await
    }

    async fn get_user_by_tg_id(&self, tg_id: i64) -> Result<User> {
        let call = self.inner.get_user_by_tg_id(tg_id);
        observe("get_user_by_tg_id", format!("tg_id={tg_id}"), self.timing, call).await
    }

    async fn create_user_habit(
        &self,
        user_id: i64,
        habit_id: i64,
        start_date: DateTime<Utc>,
    ) -> Result<UserHabit> {
        let args = format!("user_id={user_id} habit_id={habit_id} start_date={start_date}");
        let call = self.inner.create_user_habit(user_id, habit_id, start_date);
        observe("create_user_habit", args, self.timing, call).await
    }

    async fn get_user_habit_by_id(&self, user_id: i64) -> Result<Vec<UserHabit>> {
        let call = self.inner.get_user_habit_by_id(user_id);
        observe("get_user_habit_by_id", format!("user_id={user_id}"), self.timing, call).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        let call = self.inner.delete_user(user_id);
        observe("delete_user", format!("user_id={user_id}"), self.timing, call).await
    }
}

#[async_trait]
impl<G: HabitRepository> HabitRepository for Instrumented<G> {
    async fn create_habit(
        &self,
        name: String,
        cost_per_unit: Option<f64>,
        info: Vec<NewInfo>,
        hints: Vec<NewHint>,
    ) -> Result<Habit> {
        let args = format!(
            "name={name} cost_per_unit={cost_per_unit:?} info={} hints={}",
            info.len(),
            hints.len()
        );
        let call = self.inner.create_habit(name, cost_per_unit, info, hints);
        observe("create_habit", args, self.timing, call).await
    }

    async fn get_all_habits(&self) -> Result<Vec<Habit>> {
        let call = self.inner.get_all_habits();
        observe("get_all_habits", String::new(), self.timing, call).await
    }

    async fn get_habit_by_id(&self, habit_id: i64) -> Result<Habit> {
        let call = self.inner.get_habit_by_id(habit_id);
        observe("get_habit_by_id", format!("habit_id={habit_id}"), self.timing, call).await
    }

    async fn delete_habit(&self, habit_id: i64) -> Result<()> {
        let call = self.inner.delete_habit(habit_id);
        observe("delete_habit", format!("habit_id={habit_id}"), self.timing, call).await
    }

    async fn create_info(&self, habit_id: i64, name: String, description: String) -> Result<Info> {
        let args = format!("habit_id={habit_id} name={name}");
        let call = self.inner.create_info(habit_id, name, description);
        observe("create_info", args, self.timing, call).await
    }

    async fn get_all_infos(&self, habit_id: i64) -> Result<Vec<Info>> {
        let call = self.inner.get_all_infos(habit_id);
        observe("get_all_infos", format!("habit_id={habit_id}"), self.timing, call).await
    }

    async fn create_hint(&self, habit_id: i64, name: String, description: String) -> Result<Hint> {
        let args = format!("habit_id={habit_id} name={name}");
        let call = self.inner.create_hint(habit_id, name, description);
        observe("create_hint", args, self.timing, call).await
    }

    async fn get_all_hints(&self, habit_id: i64) -> Result<Vec<Hint>> {
        let call = self.inner.get_all_hints(habit_id);
        observe("get_all_hints", format!("habit_id={habit_id}"), self.timing, call).await
    }

    async fn create_reminder(
        &self,
        user_habit_id: i64,
        reminder_type: String,
        scheduled_time: NaiveTime,
        is_active: bool,
    ) -> Result<Reminder> {
        let args = format!(
            "user_habit_id={user_habit_id} reminder_type={reminder_type} \
             scheduled_time={scheduled_time} is_active={is_active}"
        );
        let call = self
            .inner
            .create_reminder(user_habit_id, reminder_type, scheduled_time, is_active);
        observe("create_reminder", args, self.timing, call).await
    }

    async fn get_reminder_by_id(&self, reminder_id: i64) -> Result<Reminder> {
        let call = self.inner.get_reminder_by_id(reminder_id);
        observe("get_reminder_by_id", format!("reminder_id={reminder_id}"), self.timing, call).await
    }

    async fn create_relapse_history(
        &self,
        user_habit_id: i64,
        relapse_time: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<RelapseHistory> {
        let args = format!(
            "user_habit_id={user_habit_id} relapse_time={relapse_time:?} reason={reason:?}"
        );
        let call = self
            .inner
            .create_relapse_history(user_habit_id, relapse_time, reason);
        observe("create_relapse_history", args, self.timing, call).await
    }

    async fn get_relapse_history_by_id(&self, relapse_history_id: i64) -> Result<RelapseHistory> {
        let call = self.inner.get_relapse_history_by_id(relapse_history_id);
        let args = format!("relapse_history_id={relapse_history_id}");
        observe("get_relapse_history_by_id", args, self.timing, call).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{MockHabitRepository, MockUserRepository};
    use crate::errors::Error;
    use mockall::predicate::eq;

    fn sample_user() -> User {
        User {
            id: 1,
            tg_id: 42,
            username: None,
            first_name: Some("Ann".to_string()),
            timezone: "UTC".to_string(),
            registration_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_observe_passes_value_through() {
        let result = observe("noop", String::new(), true, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_observe_passes_error_through() {
        let result: Result<()> = observe("noop", "x=1".to_string(), false, async {
            Err(Error::Conflict {
                message: "taken".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(Error::Conflict { message }) if message == "taken"));
    }

    #[tokio::test]
    async fn test_user_calls_are_delegated() {
        let mut mock = MockUserRepository::new();
        let user = sample_user();
        let expected = user.clone();
        mock.expect_get_user_by_tg_id()
            .with(eq(42))
            .times(1)
            .returning(move |_| Ok(user.clone()));

        let wrapped = Instrumented::new(mock);
        assert_eq!(wrapped.get_user_by_tg_id(42).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_user_errors_are_not_rewritten() {
        let mut mock = MockUserRepository::new();
        mock.expect_delete_user()
            .returning(|id| Err(Error::not_found("user", id)));

        let wrapped = Instrumented::new(mock).with_timing(false);
        let result = wrapped.delete_user(9).await;
        assert!(matches!(
            result,
            Err(Error::NotFound { entity: "user", ref key }) if key == "9"
        ));
    }

    #[tokio::test]
    async fn test_habit_calls_are_delegated() {
        let mut mock = MockHabitRepository::new();
        mock.expect_create_habit()
            .withf(|name, cost, info, hints| {
                name == "Sugar" && *cost == Some(2.5) && info.is_empty() && hints.len() == 1
            })
            .times(1)
            .returning(|name, cost_per_unit, _, _| {
                Ok(Habit {
                    id: 3,
                    name,
                    cost_per_unit,
                    info: Vec::new(),
                    hints: Vec::new(),
                })
            });
        mock.expect_get_reminder_by_id()
            .returning(|id| Err(Error::not_found("reminder", id)));

        let wrapped = Instrumented::new(mock);
        let habit = wrapped
            .create_habit(
                "Sugar".to_string(),
                Some(2.5),
                Vec::new(),
                vec![NewHint {
                    name: "Fruit".to_string(),
                    description: "Eat fruit".to_string(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(habit.id, 3);

        assert!(matches!(
            wrapped.get_reminder_by_id(5).await,
            Err(Error::NotFound { entity: "reminder", .. })
        ));
    }
}
