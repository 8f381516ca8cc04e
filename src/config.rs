use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Limits on a [`Solver`](crate::Solver) run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Give up after exploring this many search nodes. `None` searches until done.
    pub node_budget: Option<u64>,
    /// How many nodes to explore between checks of the [`CancelToken`].
    pub cancel_check_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_budget: None,
            cancel_check_interval: 1024,
        }
    }
}

impl SolverConfig {
    /// Stop after `budget` nodes.
    pub fn with_node_budget(mut self, budget: u64) -> Self {
        self.node_budget = Some(budget);
        self
    }

    /// Check for cancellation every `interval` nodes.
    pub fn with_cancel_check_interval(mut self, interval: u64) -> Self {
        // zero would mean never checking
        self.cancel_check_interval = interval.max(1);
        self
    }
}

/// A cooperative cancellation flag shared between a running search and whoever may want to stop it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, unraised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding a clone of this token to stop. A search only notices at its next check.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) has been called on this token or any clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
