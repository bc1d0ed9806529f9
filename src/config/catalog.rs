//! Habit catalog loading from habits.toml
//!
//! The catalog lists the habits (with their info articles and hints) that
//! should exist in a fresh database. It is used to seed storage on startup;
//! habits already present by name are left alone.

use crate::errors::{Error, Result};
use crate::models::{NewHint, NewInfo};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire habits.toml file
#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    /// Habits to seed
    #[serde(default)]
    pub habits: Vec<HabitConfig>,
}

/// Configuration for a single catalog habit
#[derive(Debug, Deserialize, Clone)]
pub struct HabitConfig {
    /// Unique habit name
    pub name: String,
    /// Cost per unit (day), if the habit costs money
    #[serde(default)]
    pub cost_per_unit: Option<f64>,
    /// Informational articles
    #[serde(default)]
    pub info: Vec<ContentConfig>,
    /// Hints
    #[serde(default)]
    pub hints: Vec<ContentConfig>,
}

/// A titled piece of text (info article or hint)
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub name: String,
    pub description: String,
}

impl HabitConfig {
    /// Info articles in the shape the habit gateway accepts.
    #[must_use]
    pub fn new_info(&self) -> Vec<NewInfo> {
        self.info
            .iter()
            .map(|c| NewInfo {
                name: c.name.clone(),
                description: c.description.clone(),
            })
            .collect()
    }

    /// Hints in the shape the habit gateway accepts.
    #[must_use]
    pub fn new_hints(&self) -> Vec<NewHint> {
        self.hints
            .iter()
            .map(|c| NewHint {
                name: c.name.clone(),
                description: c.description.clone(),
            })
            .collect()
    }
}

/// Loads the habit catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read habit catalog {:?}: {e}", path.as_ref()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse habit catalog: {e}"),
    })
}
