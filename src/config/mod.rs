/// Database connection parameters (server or embedded)
pub mod database;

/// Habit catalog loading from habits.toml
pub mod catalog;

/// Bot and database settings from environment variables
pub mod settings;

pub use catalog::{CatalogConfig, HabitConfig, load_catalog};
pub use database::{DEFAULT_DB_PATH, DatabaseSettings, ServerParams};
pub use settings::{BotToken, Settings, load_settings};
