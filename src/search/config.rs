//! Search budgets and switches.

use serde::{Deserialize, Serialize};

/// Depth-first search configuration.
///
/// Counting budgets use `0` for "unlimited". `max_depth` is an `Option`
/// because a depth of zero is meaningful (only the root is examined).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Nodes popped before reporting `budget` (0 = unlimited).
    pub max_nodes: usize,

    /// Distinct states recorded before reporting `budget` (0 = unlimited).
    pub max_seen: usize,

    /// Wins counted before reporting `max_wins` (0 = unlimited).
    pub max_wins: usize,

    /// Nodes at this depth are not expanded.
    pub max_depth: Option<u32>,

    /// Keep the action path of every node so wins can be replayed.
    /// Costs one vector per stack entry.
    pub record_paths: bool,

    /// Loop iterations per `step` call.
    pub iteration_limit: usize,

    /// Never try `End` on the last permitted round.
    pub skip_end_on_final_round: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nodes: 0,
            max_seen: 0,
            max_wins: 0,
            max_depth: None,
            record_paths: false,
            iteration_limit: 250,
            skip_end_on_final_round: true,
        }
    }
}

impl SearchConfig {
    /// Player-facing solver preset: records paths, stops at two wins.
    #[must_use]
    pub fn solver() -> Self {
        Self::default().with_record_paths(true).with_max_wins(2)
    }

    /// Set the node budget.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set the seen-state budget.
    #[must_use]
    pub fn with_max_seen(mut self, max_seen: usize) -> Self {
        self.max_seen = max_seen;
        self
    }

    /// Set the win cap.
    #[must_use]
    pub fn with_max_wins(mut self, max_wins: usize) -> Self {
        self.max_wins = max_wins;
        self
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[must_use]
    pub fn with_record_paths(mut self, record: bool) -> Self {
        self.record_paths = record;
        self
    }

    /// Set the batch size. Values below one are raised to one.
    #[must_use]
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_skip_end_on_final_round(mut self, skip: bool) -> Self {
        self.skip_end_on_final_round = skip;
        self
    }

    pub(crate) fn node_limit(&self) -> Option<usize> {
        (self.max_nodes > 0).then_some(self.max_nodes)
    }

    pub(crate) fn seen_limit(&self) -> Option<usize> {
        (self.max_seen > 0).then_some(self.max_seen)
    }

    pub(crate) fn win_limit(&self) -> Option<usize> {
        (self.max_wins > 0).then_some(self.max_wins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.max_nodes, 0);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.iteration_limit, 250);
        assert!(config.skip_end_on_final_round);
        assert!(!config.record_paths);
        assert_eq!(config.node_limit(), None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_max_nodes(500)
            .with_max_depth(0)
            .with_iteration_limit(0)
            .with_max_wins(3);

        assert_eq!(config.node_limit(), Some(500));
        assert_eq!(config.max_depth, Some(0));
        assert_eq!(config.iteration_limit, 1);
        assert_eq!(config.win_limit(), Some(3));
        assert_eq!(config.seen_limit(), None);
    }

    #[test]
    fn test_solver_preset() {
        let config = SearchConfig::solver();
        assert!(config.record_paths);
        assert_eq!(config.max_wins, 2);
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_max_seen(10);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
