//! Preview sessions: the live, debounced pagination of one document.
//!
//! Each `apply` publishes a result immediately (single flow, or a provisional one-page
//! paged view) and, in paged mode, schedules a background run after the idle delay. Runs
//! are identified by the session's `RunGate`; only the run holding the newest ticket may
//! commit, and the ticket is re-checked under the snapshot lock at commit time.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::layout::segment::segment;
use crate::layout::{normalize_line_endings, MarkupEngine, PageGeometry, PageSizePreset};
use crate::pagination::oracle::{FrameClock, ScratchContainer};
use crate::pagination::paginator::{paginate, PageContent, PaginationOutcome};
use crate::pagination::run::{RunGate, RunTicket};

pub const DEFAULT_MARGIN: f32 = 40.0;

// ────────────────────────────────────────────────────────────────────────────
// Input and snapshot types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    /// The whole document as one continuous flow.
    Single,
    #[default]
    Paged,
}

/// Everything that triggers a pagination run when it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page_size: PageSizePreset,
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default)]
    pub mode: PreviewMode,
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}

impl Default for PreviewInput {
    fn default() -> Self {
        PreviewInput {
            text: String::new(),
            page_size: PageSizePreset::default(),
            margin: DEFAULT_MARGIN,
            mode: PreviewMode::default(),
        }
    }
}

impl PreviewInput {
    /// Normalized document text plus the page geometry it is laid out against.
    pub fn prepare(&self, safe_offset: f32) -> (String, PageGeometry) {
        (
            normalize_line_endings(&self.text),
            PageGeometry::new(self.page_size, self.margin, safe_offset),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// The whole document on one page while a run is pending.
    Provisional,
    Paginated,
    SingleFlow,
}

/// What the preview currently shows.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewSnapshot {
    pub run_id: u64,
    pub mode: PreviewMode,
    pub geometry: PageGeometry,
    pub document: String,
    pub pages: Vec<PageContent>,
    pub status: SnapshotStatus,
    pub updated_at: DateTime<Utc>,
}

impl PreviewSnapshot {
    fn blank(safe_offset: f32) -> Self {
        let (document, geometry) = PreviewInput::default().prepare(safe_offset);
        PreviewSnapshot {
            run_id: 0,
            mode: PreviewMode::Paged,
            geometry,
            document,
            pages: Vec::new(),
            status: SnapshotStatus::Paginated,
            updated_at: Utc::now(),
        }
    }

    fn single_flow(run_id: u64, document: String, geometry: PageGeometry) -> Self {
        PreviewSnapshot {
            run_id,
            mode: PreviewMode::Single,
            geometry,
            document,
            pages: Vec::new(),
            status: SnapshotStatus::SingleFlow,
            updated_at: Utc::now(),
        }
    }

    fn provisional(run_id: u64, document: String, geometry: PageGeometry) -> Self {
        let page = PageContent {
            text: document.clone(),
            first_block: 0,
            block_count: segment(&document).len(),
        };
        PreviewSnapshot {
            run_id,
            mode: PreviewMode::Paged,
            geometry,
            document,
            pages: vec![page],
            status: SnapshotStatus::Provisional,
            updated_at: Utc::now(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status != SnapshotStatus::Provisional
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub idle_delay: Duration,
    pub safe_offset: f32,
    /// Zero disables eviction.
    pub idle_timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        SessionSettings {
            idle_delay: config.idle_delay(),
            safe_offset: config.measure_safe_offset,
            idle_timeout: config.session_idle_timeout(),
        }
    }
}

pub struct PreviewSession {
    id: Uuid,
    gate: RunGate,
    snapshot: Arc<watch::Sender<PreviewSnapshot>>,
    container: Arc<Mutex<ScratchContainer>>,
    settings: SessionSettings,
    last_touched: std::sync::Mutex<Instant>,
}

impl PreviewSession {
    pub fn new(container: ScratchContainer, settings: SessionSettings) -> Self {
        let (snapshot, _) = watch::channel(PreviewSnapshot::blank(settings.safe_offset));
        PreviewSession {
            id: Uuid::new_v4(),
            gate: RunGate::new(),
            snapshot: Arc::new(snapshot),
            container: Arc::new(Mutex::new(container)),
            settings,
            last_touched: std::sync::Mutex::new(Instant::now()),
        }
    }

    /// Marks the session as in use, postponing idle eviction.
    pub fn touch(&self) {
        *self.last_touched.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Accepts new input. Supersedes any pending or in-flight run, publishes the immediate
    /// result, and in paged mode schedules the pagination run. Must be called inside a
    /// tokio runtime.
    pub fn apply(&self, input: PreviewInput) -> PreviewSnapshot {
        self.touch();
        let (document, geometry) = input.prepare(self.settings.safe_offset);
        let ticket = self.gate.next();

        let snapshot = match input.mode {
            PreviewMode::Single => PreviewSnapshot::single_flow(ticket.id(), document, geometry),
            PreviewMode::Paged => PreviewSnapshot::provisional(ticket.id(), document, geometry),
        };

        let published = snapshot.clone();
        let guard = ticket.clone();
        self.snapshot.send_if_modified(move |current| {
            if !guard.is_current() {
                return false;
            }
            *current = published;
            true
        });

        if input.mode == PreviewMode::Paged {
            let run = ScheduledRun {
                ticket,
                document: snapshot.document.clone(),
                geometry,
                container: Arc::clone(&self.container),
                snapshot: Arc::clone(&self.snapshot),
                idle_delay: self.settings.idle_delay,
            };
            tokio::spawn(run.execute());
        }

        debug!(session = %self.id, run = snapshot.run_id, mode = ?input.mode, "input applied");
        snapshot
    }

    pub fn snapshot(&self) -> PreviewSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewSnapshot> {
        self.snapshot.subscribe()
    }

    /// Waits up to `timeout` for a settled snapshot, then returns whatever is current.
    pub async fn wait_until_settled(&self, timeout: Duration) -> PreviewSnapshot {
        let mut receiver = self.subscribe();
        let settled = match tokio::time::timeout(timeout, receiver.wait_for(|s| s.is_settled()))
            .await
        {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            _ => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }

    /// Supersedes any run and releases the measuring surface.
    pub async fn close(&self) {
        self.gate.invalidate();
        self.container.lock().await.detach();
        debug!(session = %self.id, last_run = self.gate.current_id(), "session closed");
    }

    async fn attach(&self) {
        self.container.lock().await.attach();
    }
}

/// A pagination pass waiting for its idle delay to elapse.
struct ScheduledRun {
    ticket: RunTicket,
    document: String,
    geometry: PageGeometry,
    container: Arc<Mutex<ScratchContainer>>,
    snapshot: Arc<watch::Sender<PreviewSnapshot>>,
    idle_delay: Duration,
}

impl ScheduledRun {
    async fn execute(self) {
        if self.idle_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.idle_delay).await;
        }
        if !self.ticket.is_current() {
            debug!(run = self.ticket.id(), "run superseded before start");
            return;
        }

        let outcome = {
            let mut container = self.container.lock().await;
            if !self.ticket.is_current() {
                debug!(run = self.ticket.id(), "run superseded while waiting for container");
                return;
            }
            container.clear();
            container.resize(self.geometry.printable_width());
            let blocks = segment(&self.document);
            paginate(
                &blocks,
                self.geometry.printable_height(),
                &mut *container,
                &self.ticket,
            )
            .await
        };

        match outcome {
            PaginationOutcome::Complete(report) => {
                let run = self.ticket.id();
                let pages = report.pages.len();
                let measurements = report.measurements;
                let ticket = self.ticket;
                let committed = self.snapshot.send_if_modified(move |current| {
                    if !ticket.is_current() {
                        return false;
                    }
                    current.pages = report.pages;
                    current.status = SnapshotStatus::Paginated;
                    current.updated_at = Utc::now();
                    true
                });
                if committed {
                    info!(run, pages, measurements, "pagination committed");
                } else {
                    debug!(run, "stale pagination result discarded");
                }
            }
            PaginationOutcome::Cancelled => {
                debug!(run = self.ticket.id(), "pagination run cancelled");
            }
            PaginationOutcome::MeasurementUnavailable => {
                warn!(run = self.ticket.id(), "measurement container unavailable; keeping provisional pages");
            }
        }
    }
}

/// Paginates an input once, outside any session, with its own measuring surface.
pub async fn paginate_once(
    engine: Arc<MarkupEngine>,
    clock: Arc<dyn FrameClock>,
    input: &PreviewInput,
    safe_offset: f32,
) -> PreviewSnapshot {
    let (document, geometry) = input.prepare(safe_offset);
    if input.mode == PreviewMode::Single {
        return PreviewSnapshot::single_flow(0, document, geometry);
    }

    let mut container = ScratchContainer::new(engine, clock);
    container.attach();
    container.resize(geometry.printable_width());

    let ticket = RunTicket::detached();
    let blocks = segment(&document);
    let outcome = paginate(&blocks, geometry.printable_height(), &mut container, &ticket).await;
    container.detach();

    let mut snapshot = PreviewSnapshot::provisional(ticket.id(), document, geometry);
    if let PaginationOutcome::Complete(report) = outcome {
        snapshot.pages = report.pages;
        snapshot.status = SnapshotStatus::Paginated;
    }
    snapshot
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// All open preview sessions, keyed by id.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<PreviewSession>>>>,
    engine: Arc<MarkupEngine>,
    clock: Arc<dyn FrameClock>,
    settings: SessionSettings,
}

impl SessionRegistry {
    pub fn new(engine: Arc<MarkupEngine>, clock: Arc<dyn FrameClock>, settings: SessionSettings) -> Self {
        SessionRegistry {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            engine,
            clock,
            settings,
        }
    }

    pub fn engine(&self) -> Arc<MarkupEngine> {
        Arc::clone(&self.engine)
    }

    pub fn clock(&self) -> Arc<dyn FrameClock> {
        Arc::clone(&self.clock)
    }

    /// Opens a session with an attached measuring surface.
    pub async fn create(&self) -> Arc<PreviewSession> {
        let container = ScratchContainer::new(self.engine(), self.clock());
        let session = Arc::new(PreviewSession::new(container, self.settings));
        session.attach().await;
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        info!(session = %session.id(), "preview session opened");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<PreviewSession>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Closes and forgets a session. Returns false if it did not exist.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.close().await;
                info!(session = %id, "preview session closed");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Closes every session untouched for at least `max_idle`. Returns how many were closed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<Arc<PreviewSession>> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() >= max_idle)
                .map(|(id, _)| *id)
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        for session in &evicted {
            session.close().await;
            info!(session = %session.id(), "idle preview session evicted");
        }
        evicted.len()
    }

    /// Starts the background sweep that evicts idle sessions. Returns `None` when eviction
    /// is disabled. Must be called inside a tokio runtime.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        let max_idle = self.settings.idle_timeout;
        if max_idle.is_zero() {
            return None;
        }
        let period = (max_idle / 2).max(Duration::from_secs(1));
        let registry = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle).await;
                if evicted > 0 {
                    let open = registry.len().await;
                    debug!(evicted, open, "session sweep");
                }
            }
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MarkupOptions;
    use crate::pagination::oracle::IntervalFrameClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingClock {
        frames: AtomicUsize,
    }

    #[async_trait]
    impl FrameClock for CountingClock {
        async fn next_frame(&self) {
            self.frames.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
        }
    }

    fn engine() -> Arc<MarkupEngine> {
        Arc::new(MarkupEngine::new(MarkupOptions::preview()))
    }

    fn settings(idle_ms: u64) -> SessionSettings {
        SessionSettings {
            idle_delay: Duration::from_millis(idle_ms),
            safe_offset: 200.0,
            idle_timeout: Duration::from_secs(60),
        }
    }

    fn paged(text: &str) -> PreviewInput {
        PreviewInput {
            text: text.to_string(),
            ..PreviewInput::default()
        }
    }

    fn long_document(tag: &str, paragraphs: usize) -> String {
        (0..paragraphs)
            .map(|i| format!("{tag} paragraph {i} with a few words of body text."))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[tokio::test]
    async fn test_paged_apply_publishes_whole_document_provisionally() {
        let registry = SessionRegistry::new(engine(), Arc::new(CountingClock::default()), settings(300));
        let session = registry.create().await;
        let snapshot = session.apply(paged("a\r\n\r\nb"));
        assert_eq!(snapshot.status, SnapshotStatus::Provisional);
        assert_eq!(snapshot.document, "a\n\nb");
        assert_eq!(snapshot.pages.len(), 1);
        assert_eq!(snapshot.pages[0].text, "a\n\nb");
        assert_eq!(session.snapshot().run_id, snapshot.run_id);
    }

    #[tokio::test]
    async fn test_single_mode_skips_pagination() {
        let clock = Arc::new(CountingClock::default());
        let registry = SessionRegistry::new(engine(), clock.clone(), settings(0));
        let session = registry.create().await;
        let snapshot = session.apply(PreviewInput {
            mode: PreviewMode::Single,
            ..paged("a\n\nb")
        });
        assert_eq!(snapshot.status, SnapshotStatus::SingleFlow);
        assert!(snapshot.pages.is_empty());
        tokio::task::yield_now().await;
        assert_eq!(clock.frames.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_margin_is_clamped() {
        let registry = SessionRegistry::new(engine(), Arc::new(CountingClock::default()), settings(300));
        let session = registry.create().await;
        let snapshot = session.apply(PreviewInput {
            margin: 500.0,
            ..paged("x")
        });
        assert_eq!(snapshot.geometry.margin, 120.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_commits_pages() {
        let registry = SessionRegistry::new(
            engine(),
            Arc::new(IntervalFrameClock::new(Duration::from_millis(16))),
            settings(300),
        );
        let session = registry.create().await;
        let doc = long_document("body", 80);
        let applied = session.apply(paged(&doc));

        let settled = session.wait_until_settled(Duration::from_secs(600)).await;
        assert_eq!(settled.status, SnapshotStatus::Paginated);
        assert_eq!(settled.run_id, applied.run_id);
        assert!(settled.pages.len() > 1);
        let rebuilt: Vec<&str> = settled.pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(rebuilt.join("\n\n"), doc);
    }

    #[tokio::test]
    async fn test_rapid_changes_measure_only_the_last() {
        let clock = Arc::new(CountingClock::default());
        let registry = SessionRegistry::new(engine(), clock.clone(), settings(0));
        let session = registry.create().await;

        session.apply(paged("first\n\nversion"));
        session.apply(paged("second\n\nversion\n\nhere"));
        let last = session.apply(paged("a\n\nb\n\nc"));

        let settled = session.wait_until_settled(Duration::from_secs(5)).await;
        assert_eq!(settled.run_id, last.run_id);
        assert_eq!(settled.document, "a\n\nb\n\nc");
        // Two frames per measured block of the final document only.
        assert_eq!(clock.frames.load(Ordering::SeqCst), 3 * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_run_never_commits() {
        let registry = SessionRegistry::new(
            engine(),
            Arc::new(IntervalFrameClock::new(Duration::from_millis(16))),
            settings(300),
        );
        let session = registry.create().await;
        let mut receiver = session.subscribe();

        let recorded = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&recorded);
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let snapshot = receiver.borrow_and_update().clone();
                sink.lock().unwrap().push((snapshot.run_id, snapshot.status));
            }
        });

        let first = session.apply(paged(&long_document("first", 40)));
        // Let the first run get into its measurements, then change the input.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let second = session.apply(paged(&long_document("second", 3)));

        let settled = session.wait_until_settled(Duration::from_secs(600)).await;
        assert_eq!(settled.run_id, second.run_id);
        assert!(settled.document.starts_with("second"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let recorded = recorded.lock().unwrap();
        assert!(!recorded.contains(&(first.run_id, SnapshotStatus::Paginated)));
        assert_eq!(session.snapshot().run_id, second.run_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_to_single_mode_discards_in_flight_run() {
        let registry = SessionRegistry::new(
            engine(),
            Arc::new(IntervalFrameClock::new(Duration::from_millis(16))),
            settings(300),
        );
        let session = registry.create().await;
        let doc = long_document("body", 60);
        session.apply(paged(&doc));
        tokio::time::sleep(Duration::from_millis(400)).await;

        let single = session.apply(PreviewInput {
            mode: PreviewMode::Single,
            ..paged(&doc)
        });
        // Long enough for the abandoned run to have finished had it not been superseded.
        tokio::time::sleep(Duration::from_secs(30)).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.run_id, single.run_id);
        assert_eq!(snapshot.status, SnapshotStatus::SingleFlow);
        assert!(snapshot.pages.is_empty());
        assert_eq!(snapshot.document, doc);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_container_keeps_provisional_result() {
        let container = ScratchContainer::new(engine(), Arc::new(CountingClock::default()));
        let session = PreviewSession::new(container, settings(0));
        let applied = session.apply(paged("a\n\nb"));

        let snapshot = session.wait_until_settled(Duration::from_secs(1)).await;
        assert_eq!(snapshot.status, SnapshotStatus::Provisional);
        assert_eq!(snapshot.run_id, applied.run_id);
        assert_eq!(snapshot.pages[0].text, "a\n\nb");
    }

    #[tokio::test]
    async fn test_registry_close_forgets_session() {
        let registry = SessionRegistry::new(engine(), Arc::new(CountingClock::default()), settings(0));
        let session = registry.create().await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.close(session.id()).await);
        assert!(registry.get(session.id()).await.is_none());
        assert!(!registry.close(session.id()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::new(engine(), Arc::new(CountingClock::default()), settings(0));
        let idle = registry.create().await;
        let active = registry.create().await;

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert!(registry.get(active.id()).await.is_some());
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)).await, 1);
        assert!(registry.get(idle.id()).await.is_none());
        assert!(registry.get(active.id()).await.is_some());
        // The evicted session can no longer measure.
        let applied = idle.apply(paged("a\n\nb"));
        let snapshot = idle.wait_until_settled(Duration::from_secs(1)).await;
        assert_eq!(snapshot.run_id, applied.run_id);
        assert_eq!(snapshot.status, SnapshotStatus::Provisional);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_closes_abandoned_sessions() {
        let registry = SessionRegistry::new(engine(), Arc::new(CountingClock::default()), settings(0));
        let sweeper = registry.spawn_sweeper().unwrap();
        let session = registry.create().await;

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(registry.len().await, 1);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(registry.len().await, 0);
        assert!(registry.get(session.id()).await.is_none());
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_sweeper_disabled_with_zero_timeout() {
        let registry = SessionRegistry::new(
            engine(),
            Arc::new(CountingClock::default()),
            SessionSettings {
                idle_timeout: Duration::ZERO,
                ..settings(0)
            },
        );
        assert!(registry.spawn_sweeper().is_none());
    }

    #[tokio::test]
    async fn test_paginate_once_returns_pages() {
        let input = paged("# Title\n\nBody text.\n\n- one\n- two");
        let snapshot =
            paginate_once(engine(), Arc::new(CountingClock::default()), &input, 200.0).await;
        assert_eq!(snapshot.status, SnapshotStatus::Paginated);
        assert_eq!(snapshot.pages.len(), 1);
        assert_eq!(snapshot.pages[0].block_count, 3);
    }
}
