//! Height Oracle: measures the settled rendered height of a candidate fragment.
//!
//! Measurement happens in a `ScratchContainer`: an off-screen surface sized to the page's
//! printable width. Rendering into it is deferred the way a real layout engine defers
//! work: `render` only marks the container dirty, and each frame of the `FrameClock`
//! advances layout by one phase (`Dirty → Flowed → Settled`). Sampling after a single
//! frame under-measures anything with a table or an image, so the oracle always waits
//! `SETTLE_FRAMES` frames before reading `scroll_height`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::layout::markup::{BlockNode, LayoutPass, MarkupEngine, VisualTree};

/// Frames that must elapse after a render before its height can be trusted.
pub const SETTLE_FRAMES: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// Frame clock
// ────────────────────────────────────────────────────────────────────────────

/// One call is one layout/paint cycle of the measuring surface.
#[async_trait]
pub trait FrameClock: Send + Sync {
    async fn next_frame(&self);
}

/// Production clock: sleeps one frame interval. A zero interval degrades to a single
/// cooperative yield.
#[derive(Debug, Clone)]
pub struct IntervalFrameClock {
    interval: Duration,
}

impl IntervalFrameClock {
    pub fn new(interval: Duration) -> Self {
        IntervalFrameClock { interval }
    }
}

#[async_trait]
impl FrameClock for IntervalFrameClock {
    async fn next_frame(&self) {
        if self.interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.interval).await;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Oracle trait
// ────────────────────────────────────────────────────────────────────────────

/// Measures fragments one at a time. `&mut self` makes the measuring surface exclusive
/// to whoever holds the oracle.
#[async_trait]
pub trait HeightOracle: Send {
    /// Settled height of `fragment`, or `None` when measurement is unavailable.
    async fn measure(&mut self, fragment: &str) -> Option<f32>;
}

// ────────────────────────────────────────────────────────────────────────────
// Scratch container
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStage {
    Empty,
    Dirty,
    Flowed,
    Settled,
}

/// The single off-screen measuring surface of a preview session.
pub struct ScratchContainer {
    engine: Arc<MarkupEngine>,
    clock: Arc<dyn FrameClock>,
    attached: bool,
    width: f32,
    nodes: Vec<BlockNode>,
    stage: LayoutStage,
    tree: VisualTree,
}

impl ScratchContainer {
    /// Creates a detached, empty container.
    pub fn new(engine: Arc<MarkupEngine>, clock: Arc<dyn FrameClock>) -> Self {
        ScratchContainer {
            engine,
            clock,
            attached: false,
            width: 0.0,
            nodes: Vec::new(),
            stage: LayoutStage::Empty,
            tree: VisualTree::default(),
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Detaches the container and drops its content. Later measurements return `None`.
    pub fn detach(&mut self) {
        self.attached = false;
        self.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Sets the container width. Content is laid out again on the next frame.
    pub fn resize(&mut self, width: f32) {
        if (self.width - width).abs() > f32::EPSILON {
            self.width = width.max(0.0);
            if self.stage != LayoutStage::Empty {
                self.stage = LayoutStage::Dirty;
            }
        }
    }

    /// Tears down whatever a previous run rendered.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.tree = VisualTree::default();
        self.stage = LayoutStage::Empty;
    }

    /// Replaces the container's content. Layout is deferred to the following frames.
    pub fn render(&mut self, fragment: &str) {
        self.nodes = self.engine.parse(fragment);
        self.tree = VisualTree::default();
        self.stage = LayoutStage::Dirty;
    }

    /// Runs the layout phase owed for the current frame.
    pub fn on_frame(&mut self) {
        self.stage = match self.stage {
            LayoutStage::Empty => LayoutStage::Empty,
            LayoutStage::Dirty => {
                self.tree = self.engine.layout(&self.nodes, self.width, LayoutPass::Flow);
                LayoutStage::Flowed
            }
            LayoutStage::Flowed | LayoutStage::Settled => {
                self.tree = self.engine.layout(&self.nodes, self.width, LayoutPass::Settle);
                LayoutStage::Settled
            }
        };
    }

    pub fn stage(&self) -> LayoutStage {
        self.stage
    }

    /// Height of whatever has been laid out so far.
    pub fn scroll_height(&self) -> f32 {
        match self.stage {
            LayoutStage::Empty | LayoutStage::Dirty => 0.0,
            LayoutStage::Flowed | LayoutStage::Settled => self.tree.height,
        }
    }

    /// Waits for `frames` layout/paint cycles, running one layout phase after each.
    pub async fn wait_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.clock.next_frame().await;
            self.on_frame();
        }
    }
}

#[async_trait]
impl HeightOracle for ScratchContainer {
    async fn measure(&mut self, fragment: &str) -> Option<f32> {
        if !self.is_attached() {
            return None;
        }
        self.render(fragment);
        self.wait_frames(SETTLE_FRAMES).await;
        let height = self.scroll_height();
        trace!(stage = ?self.stage(), width = self.width, height, "fragment measured");
        Some(height)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::markup::MarkupOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts frames and yields once per frame.
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

    fn container(clock: Arc<dyn FrameClock>) -> ScratchContainer {
        let mut container =
            ScratchContainer::new(Arc::new(MarkupEngine::new(MarkupOptions::preview())), clock);
        container.attach();
        container.resize(300.0);
        container
    }

    const TABLE_AND_IMAGE: &str =
        "![figure](f.png)\n\n| h | h |\n|---|---|\n| a cell with enough words to wrap | b |";

    #[tokio::test]
    async fn test_measure_waits_two_frames() {
        let clock = Arc::new(CountingClock::default());
        let mut container = container(clock.clone());
        container.measure("hello").await;
        assert_eq!(clock.frames.load(Ordering::SeqCst), SETTLE_FRAMES);
        assert_eq!(container.stage(), LayoutStage::Settled);
    }

    #[tokio::test]
    async fn test_single_frame_under_measures() {
        let engine = MarkupEngine::new(MarkupOptions::preview());
        let settled = engine.render(TABLE_AND_IMAGE, 300.0).height;

        let mut container = container(Arc::new(CountingClock::default()));
        container.render(TABLE_AND_IMAGE);
        assert_eq!(container.scroll_height(), 0.0);
        container.wait_frames(1).await;
        assert!(container.scroll_height() < settled);
        container.wait_frames(1).await;
        assert_eq!(container.scroll_height(), settled);
    }

    #[tokio::test]
    async fn test_measure_matches_final_render() {
        let engine = MarkupEngine::new(MarkupOptions::preview());
        let mut container = container(Arc::new(IntervalFrameClock::new(Duration::ZERO)));
        let measured = container.measure(TABLE_AND_IMAGE).await;
        assert_eq!(measured, Some(engine.render(TABLE_AND_IMAGE, 300.0).height));
    }

    #[tokio::test]
    async fn test_each_measure_replaces_previous_content() {
        let mut container = container(Arc::new(CountingClock::default()));
        let long = container.measure("a\n\nb\n\nc\n\nd").await.unwrap();
        let short = container.measure("a").await.unwrap();
        assert!(short < long);
        assert_eq!(short, 24.0);
    }

    #[tokio::test]
    async fn test_detached_container_is_unavailable() {
        let mut container = container(Arc::new(CountingClock::default()));
        container.detach();
        assert_eq!(container.measure("hello").await, None);
        assert_eq!(container.stage(), LayoutStage::Empty);
    }

    #[tokio::test]
    async fn test_clear_drops_rendered_content() {
        let mut container = container(Arc::new(CountingClock::default()));
        container.measure("hello").await;
        container.clear();
        assert_eq!(container.scroll_height(), 0.0);
        container.wait_frames(2).await;
        assert_eq!(container.scroll_height(), 0.0);
    }
}
