use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daybook_server::config::ServerConfig;
use daybook_server::db::Database;
use daybook_server::state::AppState;
use daybook_server::{build_app, singleton};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Only one server may own a database file
    let _lock = singleton::acquire_lock(&config.data_file)?;

    let db = Database::open(&config.data_file)?;
    tracing::info!(data_file = %config.data_file.display(), "database opened");

    let addr = format!("{}:{}", config.host, config.port);
    let app = build_app(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("daybook-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
