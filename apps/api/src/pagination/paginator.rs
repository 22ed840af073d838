//! Paginator: greedy forward fill of blocks into pages.
//!
//! # Algorithm
//! For each block in order, measure the page accumulated so far plus that block:
//! - height ≤ budget → the block joins the current page;
//! - height > budget → the accumulated page is finished and the block starts the next one.
//!
//! One oracle call per block. A block taller than the budget on its own is never split;
//! it sits alone on a page that overflows. Ties (height == budget) stay on the page.
//!
//! Pages are tracked as block index ranges, so every page's text is an exact slice of the
//! document and concatenating pages with the block separator rebuilds it. Whitespace-only
//! accumulations never become pages of their own: a blank accumulation displaced by an
//! overflowing block is carried into the next page, and a blank tail is appended to the
//! last page.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::layout::segment::{is_blank, join_blocks};
use crate::pagination::oracle::HeightOracle;
use crate::pagination::run::RunTicket;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// The content of one page: a contiguous run of blocks re-joined with the separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub text: String,
    pub first_block: usize,
    pub block_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationReport {
    pub pages: Vec<PageContent>,
    /// Oracle calls made by the run.
    pub measurements: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaginationOutcome {
    Complete(PaginationReport),
    /// A newer run superseded this one; nothing may be committed.
    Cancelled,
    /// The measuring surface was not available; the attempt is abandoned.
    MeasurementUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Measuring,
    Accepted,
    Overflowed,
    Done,
    Cancelled,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Paginates `blocks` against `printable_height`, measuring through `oracle`.
pub async fn paginate<O>(
    blocks: &[&str],
    printable_height: f32,
    oracle: &mut O,
    ticket: &RunTicket,
) -> PaginationOutcome
where
    O: HeightOracle + ?Sized,
{
    PaginationRun::new(blocks, printable_height, ticket)
        .run(oracle)
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Run state
// ────────────────────────────────────────────────────────────────────────────

/// Transient state of one pagination pass.
pub struct PaginationRun<'a> {
    blocks: &'a [&'a str],
    printable_height: f32,
    ticket: &'a RunTicket,
    state: RunState,
    current: Option<Range<usize>>,
    pages: Vec<PageContent>,
    measurements: usize,
}

impl<'a> PaginationRun<'a> {
    pub fn new(blocks: &'a [&'a str], printable_height: f32, ticket: &'a RunTicket) -> Self {
        PaginationRun {
            blocks,
            printable_height,
            ticket,
            state: RunState::Idle,
            current: None,
            pages: Vec::new(),
            measurements: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        trace!(run = self.ticket.id(), from = ?self.state, to = ?next, "pagination state");
        self.state = next;
    }

    fn is_blank(&self, range: &Range<usize>) -> bool {
        self.blocks[range.clone()].iter().all(|b| is_blank(b))
    }

    fn page(&self, range: Range<usize>) -> PageContent {
        PageContent {
            text: join_blocks(&self.blocks[range.clone()]),
            first_block: range.start,
            block_count: range.len(),
        }
    }

    pub async fn run<O>(mut self, oracle: &mut O) -> PaginationOutcome
    where
        O: HeightOracle + ?Sized,
    {
        if !self.ticket.is_current() {
            self.transition(RunState::Cancelled);
            return PaginationOutcome::Cancelled;
        }

        for index in 0..self.blocks.len() {
            let start = self.current.as_ref().map_or(index, |r| r.start);
            let candidate = join_blocks(&self.blocks[start..=index]);

            self.transition(RunState::Measuring);
            let Some(height) = oracle.measure(&candidate).await else {
                debug!(run = self.ticket.id(), block = index, "measurement unavailable");
                return PaginationOutcome::MeasurementUnavailable;
            };
            self.measurements += 1;

            // Stale runs stop here, before anything is recorded.
            if !self.ticket.is_current() {
                self.transition(RunState::Cancelled);
                debug!(run = self.ticket.id(), block = index, "pagination run superseded");
                return PaginationOutcome::Cancelled;
            }

            match self.current.take() {
                Some(previous) if height > self.printable_height => {
                    self.transition(RunState::Overflowed);
                    if self.is_blank(&previous) {
                        self.current = Some(previous.start..index + 1);
                    } else {
                        let page = self.page(previous);
                        self.pages.push(page);
                        self.current = Some(index..index + 1);
                    }
                }
                _ => {
                    self.transition(RunState::Accepted);
                    self.current = Some(start..index + 1);
                }
            }
        }

        if let Some(tail) = self.current.take() {
            if !self.is_blank(&tail) {
                let page = self.page(tail);
                self.pages.push(page);
            } else if let Some(last) = self.pages.pop() {
                let merged = self.page(last.first_block..tail.end);
                self.pages.push(merged);
            }
        }

        self.transition(RunState::Done);
        debug!(
            run = self.ticket.id(),
            blocks = self.blocks.len(),
            pages = self.pages.len(),
            measurements = self.measurements,
            "pagination complete"
        );

        PaginationOutcome::Complete(PaginationReport {
            pages: self.pages,
            measurements: self.measurements,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
