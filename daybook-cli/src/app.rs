//! Everything a store command needs, loaded once per invocation.

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tokio::sync::broadcast::{self, error::TryRecvError};

use daybook_core::ClientConfig;
use daybook_core::entity::{Calendar, Schedule};
use daybook_core::holiday::{HolidayReconciler, HttpHolidaySource};
use daybook_core::mirror::LocalMirror;
use daybook_core::remote::HttpGateway;
use daybook_core::sync::{Session, Store, SyncContext, SyncOutcome};

use crate::render::Render;
use crate::utils::tui;

/// Name of the calendar created for a user who has none.
pub const DEFAULT_CALENDAR: &str = "Personal";

pub struct App {
    pub config: ClientConfig,
    pub ctx: SyncContext,
    pub store: Store,
    pub reconciler: HolidayReconciler,
    outcomes: broadcast::Receiver<SyncOutcome>,
}

/// The config plus the session stored in its mirror.
pub fn open_session() -> Result<(ClientConfig, Session)> {
    let config = ClientConfig::load()?;
    let mirror = LocalMirror::open(config.data_path()?)?;
    let session = Session::new(mirror, &config.namespace);
    Ok((config, session))
}

impl App {
    pub async fn load() -> Result<Self> {
        let config = ClientConfig::load()?;
        let mirror = LocalMirror::open(config.data_path()?)?;
        let ctx = Session::new(mirror.clone(), &config.namespace).context();

        let http = reqwest::Client::new();
        let mut store = Store::new(
            mirror,
            Arc::new(HttpGateway::<Calendar>::new(http.clone(), &config.api_url)),
            Arc::new(HttpGateway::<Schedule>::new(http.clone(), &config.api_url)),
        );
        let reconciler =
            HolidayReconciler::new(Arc::new(HttpHolidaySource::new(http, &config.api_url)));
        let outcomes = store.subscribe();

        if ctx.is_authenticated() {
            let spinner = tui::create_spinner("Loading".to_string());
            let loaded = store.load(&ctx).await;
            spinner.finish_and_clear();
            loaded.with_context(|| {
                format!("Could not load your calendars from {}", config.api_url)
            })?;
        } else {
            store.load(&ctx).await?;
        }

        if let Some(id) = store.ensure_default_calendar(&ctx, DEFAULT_CALENDAR)? {
            tracing::info!(%id, "created default calendar");
        }

        Ok(App {
            config,
            ctx,
            store,
            reconciler,
            outcomes,
        })
    }

    /// Wait for background writes and report the ones that failed.
    pub async fn finish(mut self) {
        self.store.settle().await;

        let mut failed = 0;
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) if outcome.is_success() => tracing::debug!(%outcome, "synced"),
                Ok(outcome) => {
                    failed += 1;
                    eprintln!("{}", outcome.render());
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "missed sync outcomes");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if failed > 0 {
            eprintln!(
                "{}",
                "Changes were kept locally but not saved to the server.".dimmed()
            );
        }
    }
}
