use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use dotenvy::dotenv;

use crate::constants::DEFAULT_DB_MAX_CONNECTIONS;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        })
    }
}

pub async fn get_db_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed store. The store traits are implemented in `db::users`,
/// `db::connection_requests` and `db::sessions`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
