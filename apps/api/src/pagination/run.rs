//! Run identity: decides whether a pagination run may still commit its result.
//!
//! Every trigger allocates a new, strictly larger run id. A run keeps the ticket it was
//! started with and checks it before touching shared state; once a newer run exists, the
//! old ticket is stale and its results are discarded. Nothing is ever forcibly aborted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic source of run ids, shared by a session and all of its runs.
#[derive(Debug, Default, Clone)]
pub struct RunGate {
    current: Arc<AtomicU64>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every outstanding ticket and returns the ticket for the new run.
    pub fn next(&self) -> RunTicket {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        RunTicket {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Supersedes every outstanding ticket without starting a new run.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_id(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Proof that a run was started; valid until the gate moves past it.
#[derive(Debug, Clone)]
pub struct RunTicket {
    id: u64,
    current: Arc<AtomicU64>,
}

impl RunTicket {
    /// A ticket that is always current, for one-shot runs with no competing triggers.
    pub fn detached() -> Self {
        RunGate::new().next()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }
}
