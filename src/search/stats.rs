//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Counters collected during a depth-first search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes popped from the stack.
    pub visited: usize,

    /// Nodes whose legal actions were enumerated.
    pub expanded: usize,

    /// Wins counted.
    pub wins: usize,

    /// Wins refused by a rejection hook.
    pub rejected: usize,

    /// Nodes dropped as already seen at the same or a shallower depth.
    pub pruned: usize,

    /// Deepest node popped.
    pub max_depth: u32,

    /// `step` calls made.
    pub batches: usize,

    /// Wall time spent inside `run` (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Nodes visited per second of `run` time.
    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.visited as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Share of visited nodes that were expanded.
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.visited == 0 {
            0.0
        } else {
            self.expanded as f64 / self.visited as f64
        }
    }
}
