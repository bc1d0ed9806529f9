//! Storage access: backends, connection pool lifecycle, sessions and schema.

pub mod connection;
pub mod schema;
pub mod seed;
pub mod session;

pub use connection::{Backend, DatabaseManager, EmbeddedTarget, connect_with_fallback};
pub use schema::create_tables;
pub use seed::seed_habit_catalog;
pub use session::Session;
