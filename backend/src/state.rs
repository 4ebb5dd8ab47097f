use std::sync::Arc;

use crate::db::Store;
use crate::utils::Config;

/// Shared by every handler. The store is a trait object so the same router
/// runs on Postgres or fully in memory.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
