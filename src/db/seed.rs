//! Startup seeding of the habit catalog.

use crate::config::CatalogConfig;
use crate::core::HabitRepository;
use crate::db::DatabaseManager;
use crate::errors::Result;
use std::collections::HashSet;
use tracing::{debug, info};

/// Creates every catalog habit whose name is not in storage yet.
///
/// Runs in one session, so either the whole catalog lands or nothing does.
/// Existing habits are never modified. Returns how many habits were created.
pub async fn seed_habit_catalog(manager: &DatabaseManager, catalog: &CatalogConfig) -> Result<usize> {
    if catalog.habits.is_empty() {
        debug!("Habit catalog is empty, nothing to seed");
        return Ok(0);
    }

    let entries = catalog.habits.clone();
    let created = manager
        .with_session(move |session| {
            Box::pin(async move {
                let habits = session.habits();
                let mut existing: HashSet<String> = habits
                    .get_all_habits()
                    .await?
                    .into_iter()
                    .map(|h| h.name)
                    .collect();

                let mut created = 0;
                for entry in entries {
                    let name = entry.name.trim().to_string();
                    if existing.contains(&name) {
                        debug!(habit = %name, "Habit already present, skipping");
                        continue;
                    }
                    habits
                        .create_habit(
                            name.clone(),
                            entry.cost_per_unit,
                            entry.new_info(),
                            entry.new_hints(),
                        )
                        .await?;
                    existing.insert(name);
                    created += 1;
                }
                Ok(created)
            })
        })
        .await?;

    info!(created, total = catalog.habits.len(), "Habit catalog seeded");
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::catalog::{ContentConfig, HabitConfig};
    use crate::errors::Error;
    use crate::test_utils::setup_test_manager;

    fn habit(name: &str) -> HabitConfig {
        HabitConfig {
            name: name.to_string(),
            cost_per_unit: Some(4.0),
            info: vec![ContentConfig {
                name: "About".to_string(),
                description: format!("All about {name}"),
            }],
            hints: Vec::new(),
        }
    }

    async fn all_habit_names(manager: &DatabaseManager) -> Result<Vec<String>> {
        manager
            .with_session(|session| {
                Box::pin(async move {
                    let habits = session.habits().get_all_habits().await?;
                    Ok(habits.into_iter().map(|h| h.name).collect())
                })
            })
            .await
    }

    #[tokio::test]
    async fn test_seed_creates_catalog_once() -> Result<()> {
        let manager = setup_test_manager().await?;
        let catalog = CatalogConfig {
            habits: vec![habit("Smoking"), habit("Sugar")],
        };

        assert_eq!(seed_habit_catalog(&manager, &catalog).await?, 2);
        assert_eq!(seed_habit_catalog(&manager, &catalog).await?, 0);
        assert_eq!(all_habit_names(&manager).await?, ["Smoking", "Sugar"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_skips_duplicates_within_catalog() -> Result<()> {
        let manager = setup_test_manager().await?;
        let catalog = CatalogConfig {
            habits: vec![habit("Smoking"), habit(" Smoking ")],
        };

        assert_eq!(seed_habit_catalog(&manager, &catalog).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_entry_rolls_back_whole_catalog() -> Result<()> {
        let manager = setup_test_manager().await?;
        let mut broken = habit("Gambling");
        broken.cost_per_unit = Some(-3.0);
        let catalog = CatalogConfig {
            habits: vec![habit("Smoking"), broken],
        };

        let result = seed_habit_catalog(&manager, &catalog).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(all_habit_names(&manager).await?.is_empty());
        Ok(())
    }
}
