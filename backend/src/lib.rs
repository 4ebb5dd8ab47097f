pub mod models;
pub mod db;
pub mod services;
pub mod handlers;
pub mod utils;
pub mod constants;
pub mod error;
pub mod routes;
pub mod state;

pub use utils::config::Config;
pub use db::{get_db_pool, MemoryStore, PgStore, Store};
pub use error::{AppError, Result};
pub use routes::create_router;
pub use state::AppState;

// Re-export common types
pub use sqlx::PgPool;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};
