use devmatch::{utils, get_db_pool};
use devmatch::db::DatabaseConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    println!("Running database migrations...");
    devmatch::db::migrations::run_migrations(&pool).await?;
    println!("Migrations completed successfully!");

    Ok(())
}
