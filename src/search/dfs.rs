//! Budgeted, batched depth-first search.
//!
//! The search owns an explicit stack and a seen map from canonical state
//! key to the shallowest depth the state was reached at. Callers drive it
//! in batches of `iteration_limit` loop passes via [`DfsSearch::step`]; the
//! whole search value is serializable between batches, so a long search can
//! be checkpointed and resumed.
//!
//! ## Usage
//!
//! ```
//! use puzzle_forge::cards::{CardDefinition, CardLibrary, CardType, Effect};
//! use puzzle_forge::core::{Action, GameState};
//! use puzzle_forge::rules::PuzzleRules;
//! use puzzle_forge::search::{DfsSearch, SearchConfig, SearchStatus};
//!
//! let library = CardLibrary::from_definitions([CardDefinition::new(
//!     "fireball", "Fireball", CardType::Spell, 3,
//! )
//! .with_effect(Effect::Damage { amount: 5, chain_amount: None })]);
//!
//! let mut state = GameState::default();
//! state.player.mana = 3;
//! state.player.hand.push_back("fireball".into());
//! state.opponent.health = 5;
//! state.target_rounds = Some(1);
//!
//! let config = SearchConfig::default().with_record_paths(true);
//! let mut search = DfsSearch::new(state.normalize(), config);
//! let status = loop {
//!     let status = search.step(&PuzzleRules, &library).unwrap();
//!     if status.is_finished() {
//!         break status;
//!     }
//! };
//! assert_eq!(status, SearchStatus::Done);
//! assert_eq!(search.win_paths()[0], vec![Action::play_at("fireball", "opponent")]);
//! ```

use std::fmt;
use std::time::Instant;

use im::Vector;
use log::trace;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::CardLibrary;
use crate::core::{Action, GameState, StateKey};
use crate::error::EngineResult;
use crate::rules::{PuzzleRules, RulesEngine};

use super::config::SearchConfig;
use super::rounds::{is_final_round, is_past_round_limit};
use super::stats::SearchStats;

/// Outcome of a search batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SearchStatus {
    /// Work remains; call `step` again.
    Continue,
    /// The stack emptied.
    Done,
    /// A node or seen-state budget ran out.
    Budget,
    /// The win cap was reached.
    MaxWins,
    /// A win was refused by the rejection hook.
    Reject(String),
}

impl SearchStatus {
    /// Anything but `Continue`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self, SearchStatus::Continue)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Continue => "continue",
            SearchStatus::Done => "done",
            SearchStatus::Budget => "budget",
            SearchStatus::MaxWins => "max_wins",
            SearchStatus::Reject(_) => "reject",
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Reject(reason) => write!(f, "reject ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A pending stack entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SearchNode {
    state: GameState,
    depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Vector<Action>>,
}

/// Resumable depth-first search over puzzle states.
///
/// Terminal statuses are sticky: once a batch reports anything other than
/// `Continue`, further calls return that status without doing work.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DfsSearch {
    /// Budgets and switches.
    config: SearchConfig,

    /// Nodes still to visit; the top is popped next.
    stack: Vec<SearchNode>,

    /// Shallowest depth each state was expanded at.
    seen: FxHashMap<StateKey, u32>,

    /// Action paths of counted wins (only with `record_paths`).
    win_paths: Vec<Vec<Action>>,

    /// Search statistics.
    stats: SearchStats,

    /// Terminal status, once reached.
    outcome: Option<SearchStatus>,
}

impl DfsSearch {
    /// Start a search rooted at `root` (depth 0, empty path).
    ///
    /// The root is used as given; normalize it first if its units may lack
    /// uids.
    pub fn new(root: GameState, config: SearchConfig) -> Self {
        let path = config.record_paths.then(Vector::new);
        Self {
            config,
            stack: vec![SearchNode {
                state: root,
                depth: 0,
                path,
            }],
            seen: FxHashMap::default(),
            win_paths: Vec::new(),
            stats: SearchStats::default(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Wins counted so far.
    #[must_use]
    pub fn wins(&self) -> usize {
        self.stats.wins
    }

    #[must_use]
    pub fn win_paths(&self) -> &[Vec<Action>] {
        &self.win_paths
    }

    pub fn into_win_paths(self) -> Vec<Vec<Action>> {
        self.win_paths
    }

    /// Nodes waiting on the stack.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    /// Distinct states recorded.
    #[must_use]
    pub fn seen_states(&self) -> usize {
        self.seen.len()
    }

    /// Terminal status, if one was reported.
    #[must_use]
    pub fn outcome(&self) -> Option<&SearchStatus> {
        self.outcome.as_ref()
    }

    /// Run one batch with no win rejection.
    pub fn step<E: RulesEngine + ?Sized>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
    ) -> EngineResult<SearchStatus> {
        self.step_with(engine, library, |_| None)
    }

    /// Run one batch. `reject` is consulted for every winning state; a
    /// `Some(reason)` ends the search with [`SearchStatus::Reject`].
    ///
    /// Errors only when a state cannot be encoded; actions that fail to
    /// apply are dropped silently.
    pub fn step_with<E, F>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
        mut reject: F,
    ) -> EngineResult<SearchStatus>
    where
        E: RulesEngine + ?Sized,
        F: FnMut(&GameState) -> Option<String>,
    {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }
        self.stats.batches += 1;

        let limit = self.config.iteration_limit.max(1);
        let mut iterations = 0;
        while iterations < limit {
            let Some(node) = self.stack.pop() else {
                break;
            };
            iterations += 1;
            self.stats.visited += 1;
            self.stats.max_depth = self.stats.max_depth.max(node.depth);
            if self
                .config
                .node_limit()
                .is_some_and(|max| self.stats.visited >= max)
            {
                return Ok(self.finish(SearchStatus::Budget));
            }

            if engine.is_win(&node.state) {
                if let Some(reason) = reject(&node.state) {
                    self.stats.rejected += 1;
                    return Ok(self.finish(SearchStatus::Reject(reason)));
                }
                self.stats.wins += 1;
                if let Some(path) = node.path {
                    self.win_paths.push(path.into_iter().collect());
                }
                if self
                    .config
                    .win_limit()
                    .is_some_and(|max| self.stats.wins >= max)
                {
                    return Ok(self.finish(SearchStatus::MaxWins));
                }
                continue;
            }

            if is_past_round_limit(&node.state)
                || self.config.max_depth.is_some_and(|max| node.depth >= max)
            {
                continue;
            }

            let key = node.state.key()?;
            if self.seen.get(&key).is_some_and(|&prev| prev <= node.depth) {
                self.stats.pruned += 1;
                continue;
            }
            self.seen.insert(key, node.depth);
            if self
                .config
                .seen_limit()
                .is_some_and(|max| self.seen.len() >= max)
            {
                return Ok(self.finish(SearchStatus::Budget));
            }

            self.expand(engine, library, node);
        }

        if self.stack.is_empty() {
            Ok(self.finish(SearchStatus::Done))
        } else {
            Ok(SearchStatus::Continue)
        }
    }

    /// Step until a terminal status.
    pub fn run<E: RulesEngine + ?Sized>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
    ) -> EngineResult<SearchStatus> {
        self.run_with(engine, library, |_| None)
    }

    /// Step with a rejection hook until a terminal status.
    pub fn run_with<E, F>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
        mut reject: F,
    ) -> EngineResult<SearchStatus>
    where
        E: RulesEngine + ?Sized,
        F: FnMut(&GameState) -> Option<String>,
    {
        let start = Instant::now();
        let status = loop {
            let status = self.step_with(engine, library, &mut reject)?;
            trace!(
                "search batch {}: visited={} pending={} wins={} -> {}",
                self.stats.batches,
                self.stats.visited,
                self.stack.len(),
                self.stats.wins,
                status
            );
            if status.is_finished() {
                break status;
            }
        };
        self.stats.time_us += start.elapsed().as_micros() as u64;
        Ok(status)
    }

    fn expand<E: RulesEngine + ?Sized>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
        node: SearchNode,
    ) {
        self.stats.expanded += 1;
        let skip_end = self.config.skip_end_on_final_round && is_final_round(&node.state);
        let actions = engine.legal_actions(&node.state, library);

        // Reversed so the first legal action is popped first.
        for action in actions.into_iter().rev() {
            if skip_end && action.is_end() {
                continue;
            }
            let Ok(next) = engine.apply_action(&node.state, &action, library) else {
                continue;
            };
            let path = node.path.as_ref().map(|path| {
                let mut path = path.clone();
                path.push_back(action);
                path
            });
            self.stack.push(SearchNode {
                state: next,
                depth: node.depth + 1,
                path,
            });
        }
    }

    fn finish(&mut self, status: SearchStatus) -> SearchStatus {
        self.outcome = Some(status.clone());
        status
    }
}

/// Result of [`solve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SearchStatus,

    /// Every counted winning line, in discovery order.
    pub wins: Vec<Vec<Action>>,

    pub stats: SearchStats,
}

impl SolveResult {
    #[must_use]
    pub fn is_solvable(&self) -> bool {
        !self.wins.is_empty()
    }

    /// Exactly one winning line, proven by an exhausted search.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.status == SearchStatus::Done && self.wins.len() == 1
    }
}

/// Solve `state` with the puzzle rules, recording winning lines.
///
/// The state is normalized first; recorded paths replay from the
/// normalized state.
pub fn solve(
    state: &GameState,
    library: &CardLibrary,
    config: SearchConfig,
) -> EngineResult<SolveResult> {
    solve_with(&PuzzleRules, state, library, config)
}

/// [`solve`] over any rules engine.
pub fn solve_with<E: RulesEngine + ?Sized>(
    engine: &E,
    state: &GameState,
    library: &CardLibrary,
    config: SearchConfig,
) -> EngineResult<SolveResult> {
    let mut search = DfsSearch::new(state.clone().normalize(), config.with_record_paths(true));
    let status = search.run(engine, library)?;
    Ok(SolveResult {
        status,
        stats: search.stats.clone(),
        wins: search.into_win_paths(),
    })
}
