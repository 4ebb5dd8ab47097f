use clap::Parser;
use devmatch::{create_router, get_db_pool, utils, AppState, Config, MemoryStore, PgStore, Store};
use devmatch::db::{migrations::run_migrations, DatabaseConfig};
use std::sync::Arc;
use tokio::signal;

#[derive(Debug, Parser)]
#[command(name = "server", about = "DevMatch API server")]
struct Args {
    /// Keep everything in process memory instead of Postgres (data is lost on exit)
    #[arg(long)]
    in_memory: bool,

    /// Skip running migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();
    let args = Args::parse();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Running with the in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let db_config = DatabaseConfig::from_env()?;
        let pool = get_db_pool(&db_config).await?;

        if !args.skip_migrations {
            run_migrations(&pool).await?;
        }

        Arc::new(PgStore::new(pool))
    };

    let port = config.port;
    let app = create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
