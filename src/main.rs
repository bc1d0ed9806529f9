use habit_buddy::config::{self, load_catalog};
use habit_buddy::db::{connect_with_fallback, seed_habit_catalog};
use habit_buddy::errors::Result;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env and read settings
    let settings = config::load_settings(None)
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 3. Pick a backend, falling back to the embedded store if the server is down
    let manager = connect_with_fallback(&settings.database)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    manager
        .create_schema()
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create schema: {}", e))?;

    // 4. Seed the habit catalog if one is configured
    let catalog_path = Path::new(&settings.catalog_path);
    if catalog_path.exists() {
        let catalog = load_catalog(catalog_path)?;
        seed_habit_catalog(&manager, &catalog)
            .await
            .inspect_err(|e| error!("Failed to seed habit catalog: {}", e))?;
    } else {
        warn!(path = %catalog_path.display(), "Habit catalog not found, skipping seeding");
    }

    info!(backend = %manager.backend(), "Storage ready");
    manager.close().await
}
