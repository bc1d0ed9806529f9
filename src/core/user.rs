//! User gateway - registration and habit adoption.

use super::{UserRepository, habit::load_habits};
use crate::{
    entities::{
        Habit as HabitEntity, User as UserEntity, UserHabit as UserHabitEntity, user, user_habit,
    },
    errors::{Error, Result},
    models::{User, UserHabit},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{LoaderTrait, QueryOrder, Set, prelude::*, sea_query::OnConflict};
use std::collections::HashMap;
use tracing::debug;

/// [`UserRepository`] over a SeaORM connection or transaction.
#[derive(Debug, Clone, Copy)]
pub struct UserGateway<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserGateway<'a, C> {
    /// Binds a gateway to a connection or session transaction.
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    async fn find_by_tg_id(&self, tg_id: i64) -> Result<Option<user::Model>> {
        UserEntity::find()
            .filter(user::Column::TgId.eq(tg_id))
            .one(self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl<C: ConnectionTrait> UserRepository for UserGateway<'_, C> {
    async fn create_user(
        &self,
        tg_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        timezone: String,
    ) -> Result<User> {
        let model = user::ActiveModel {
            tg_id: Set(tg_id),
            username: Set(username),
            first_name: Set(first_name),
            timezone: Set(timezone),
            registration_date: Set(Utc::now()),
            ..Default::default()
        };

        // registration_date is left out of the update set so it survives re-registration
        UserEntity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::TgId)
                    .update_columns([
                        user::Column::Username,
                        user::Column::FirstName,
                        user::Column::Timezone,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        debug!(tg_id, "User upserted");

        self.find_by_tg_id(tg_id)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::not_found("user", tg_id))
    }

    async fn get_user_by_tg_id(&self, tg_id: i64) -> Result<User> {
        self.find_by_tg_id(tg_id)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::not_found("user", tg_id))
    }

    async fn create_user_habit(
        &self,
        user_id: i64,
        habit_id: i64,
        start_date: DateTime<Utc>,
    ) -> Result<UserHabit> {
        if UserEntity::find_by_id(user_id).one(self.db).await?.is_none() {
            return Err(Error::not_found("user", user_id));
        }
        let habit = HabitEntity::find_by_id(habit_id)
            .one(self.db)
            .await?
            .ok_or_else(|| Error::not_found("habit", habit_id))?;

        let existing = UserHabitEntity::find()
            .filter(user_habit::Column::UserId.eq(user_id))
            .filter(user_habit::Column::HabitId.eq(habit_id))
            .one(self.db)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict {
                message: format!("User {user_id} already tracks habit {habit_id}"),
            });
        }

        let model = user_habit::ActiveModel {
            user_id: Set(user_id),
            habit_id: Set(habit_id),
            start_date: Set(start_date),
            last_relapse: Set(None),
            saved_money: Set(0),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        let habit = load_habits(self.db, vec![habit])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("habit", habit_id))?;
        Ok(UserHabit::from_parts(model, habit))
    }

    async fn get_user_habit_by_id(&self, user_id: i64) -> Result<Vec<UserHabit>> {
        let rows = UserHabitEntity::find()
            .filter(user_habit::Column::UserId.eq(user_id))
            .order_by_asc(user_habit::Column::Id)
            .all(self.db)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let habit_models: Vec<_> = rows
            .load_one(HabitEntity, self.db)
            .await?
            .into_iter()
            .flatten()
            .collect();
        let mut habits: HashMap<i64, _> = load_habits(self.db, habit_models)
            .await?
            .into_iter()
            .map(|h| (h.id, h))
            .collect();

        rows.into_iter()
            .map(|row| {
                let habit = habits
                    .remove(&row.habit_id)
                    .ok_or_else(|| Error::not_found("habit", row.habit_id))?;
                Ok(UserHabit::from_parts(row, habit))
            })
            .collect()
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        let result = UserEntity::delete_by_id(user_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(Error::not_found("user", user_id));
        }
        debug!(user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{HabitGateway, HabitRepository};
    use crate::entities::{RelapseHistory, Reminder};
    use crate::test_utils::*;
    use chrono::{NaiveTime, TimeZone};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_and_get_user() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);

        let created = gateway
            .create_user(
                1001,
                Some("alice".to_string()),
                Some("Alice".to_string()),
                "Europe/Berlin".to_string(),
            )
            .await?;
        assert_eq!(created.tg_id, 1001);
        assert_eq!(created.username.as_deref(), Some("alice"));

        let fetched = gateway.get_user_by_tg_id(1001).await?;
        assert_eq!(fetched, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_upserts_on_tg_id() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);

        let first = gateway
            .create_user(5, Some("old".to_string()), None, "UTC".to_string())
            .await?;
        let second = gateway
            .create_user(
                5,
                Some("new".to_string()),
                Some("Bob".to_string()),
                "Asia/Tokyo".to_string(),
            )
            .await?;

        assert_eq!(second.id, first.id);
        assert_eq!(second.username.as_deref(), Some("new"));
        assert_eq!(second.first_name.as_deref(), Some("Bob"));
        assert_eq!(second.timezone, "Asia/Tokyo");
        assert_eq!(second.registration_date, first.registration_date);
        assert_eq!(UserEntity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);

        assert!(matches!(
            gateway.get_user_by_tg_id(404).await,
            Err(Error::NotFound { entity: "user", .. })
        ));
        assert!(matches!(
            gateway.delete_user(404).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_habit_loads_habit() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);
        let user = create_test_user(&db, 1).await?;
        let habit = create_test_habit(&db, "Smoking").await?;
        HabitGateway::new(&db)
            .create_hint(habit.id, "Breathe".to_string(), "Slowly".to_string())
            .await?;
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        let adopted = gateway.create_user_habit(user.id, habit.id, start).await?;
        assert_eq!(adopted.start_date, start);
        assert_eq!(adopted.saved_money, 0);
        assert!(adopted.last_relapse.is_none());
        assert_eq!(adopted.habit.name, "Smoking");
        assert_eq!(adopted.habit.hints.len(), 1);

        let listed = gateway.get_user_habit_by_id(user.id).await?;
        assert_eq!(listed, vec![adopted]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_habit_twice_conflicts() -> Result<()> {
        let (db, user, habit, _user_habit) = setup_with_user_habit().await?;
        let gateway = UserGateway::new(&db);

        let again = gateway.create_user_habit(user.id, habit.id, Utc::now()).await;
        assert!(matches!(again, Err(Error::Conflict { .. })));
        assert_eq!(gateway.get_user_habit_by_id(user.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_habit_pair_index_rejects_duplicates() -> Result<()> {
        let (db, user, habit, _user_habit) = setup_with_user_habit().await?;

        // Skip the gateway pre-check and hit the unique index directly
        let raw_insert = user_habit::ActiveModel {
            user_id: Set(user.id),
            habit_id: Set(habit.id),
            start_date: Set(test_start_date()),
            last_relapse: Set(None),
            saved_money: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .map_err(Error::from);

        assert!(matches!(raw_insert, Err(Error::Conflict { .. })));
        assert_eq!(UserHabitEntity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_habit_missing_parents() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);
        let user = create_test_user(&db, 1).await?;
        let habit = create_test_habit(&db, "Sugar").await?;

        assert!(matches!(
            gateway.create_user_habit(999, habit.id, Utc::now()).await,
            Err(Error::NotFound { entity: "user", .. })
        ));
        assert!(matches!(
            gateway.create_user_habit(user.id, 999, Utc::now()).await,
            Err(Error::NotFound { entity: "habit", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_without_habits_gets_empty_list() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 1).await?;
        let habits = UserGateway::new(&db).get_user_habit_by_id(user.id).await?;
        assert!(habits.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_user_habits_keep_insertion_order() -> Result<()> {
        let db = setup_test_db().await?;
        let gateway = UserGateway::new(&db);
        let user = create_test_user(&db, 1).await?;
        let sugar = create_test_habit(&db, "Sugar").await?;
        let smoking = create_test_habit(&db, "Smoking").await?;

        gateway.create_user_habit(user.id, smoking.id, Utc::now()).await?;
        gateway.create_user_habit(user.id, sugar.id, Utc::now()).await?;

        let names: Vec<_> = gateway
            .get_user_habit_by_id(user.id)
            .await?
            .into_iter()
            .map(|uh| uh.habit.name)
            .collect();
        assert_eq!(names, ["Smoking", "Sugar"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_cascades() -> Result<()> {
        let (db, user, habit, user_habit) = setup_with_user_habit().await?;
        let habits = HabitGateway::new(&db);
        habits
            .create_reminder(
                user_habit.id,
                "daily".to_string(),
                NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                true,
            )
            .await?;
        habits
            .create_relapse_history(user_habit.id, None, Some("party".to_string()))
            .await?;

        UserGateway::new(&db).delete_user(user.id).await?;

        assert_eq!(UserEntity::find().count(&db).await?, 0);
        assert_eq!(UserHabitEntity::find().count(&db).await?, 0);
        assert_eq!(Reminder::find().count(&db).await?, 0);
        assert_eq!(RelapseHistory::find().count(&db).await?, 0);
        // The catalog habit is not owned by the user
        assert!(habits.get_habit_by_id(habit.id).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_habit_removes_adoptions() -> Result<()> {
        let (db, user, habit, _user_habit) = setup_with_user_habit().await?;

        HabitGateway::new(&db).delete_habit(habit.id).await?;

        let remaining = UserGateway::new(&db).get_user_habit_by_id(user.id).await?;
        assert!(remaining.is_empty());
        Ok(())
    }
}
