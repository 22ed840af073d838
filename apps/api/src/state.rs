use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::layout::{MarkupEngine, MarkupOptions};
use crate::pagination::oracle::IntervalFrameClock;
use crate::pagination::session::{SessionRegistry, SessionSettings};
use crate::render::Rasterizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Open preview sessions. Also owns the markup engine and frame clock every
    /// measurement uses, so one-shot pagination measures exactly like a session does.
    pub sessions: SessionRegistry,
    pub rasterizer: Arc<Rasterizer>,
}

impl AppState {
    /// Builds the shared state and starts the idle-session sweep, so it must run inside
    /// a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let engine = Arc::new(MarkupEngine::new(MarkupOptions::preview()));
        let clock = Arc::new(IntervalFrameClock::new(config.frame_interval()));
        let sessions = SessionRegistry::new(engine, clock, SessionSettings::from_config(&config));
        if sessions.spawn_sweeper().is_some() {
            info!(idle_secs = config.session_idle_secs, "idle session sweep started");
        }
        let rasterizer = Rasterizer::from_config(&config).context("failed to set up rasterizer")?;
        Ok(AppState {
            config,
            sessions,
            rasterizer: Arc::new(rasterizer),
        })
    }
}
