use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<ServerConfig>,
    /// Client for the upstream holiday API.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db: Arc::new(db),
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}
