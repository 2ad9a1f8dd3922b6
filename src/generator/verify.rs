//! Solver-backed verification of generated puzzles.
//!
//! [`SolveCheck`] drives the shared depth-first search without recording
//! paths. It proves "at least one solution" and, with a cap, "no more than
//! N", and refuses wins that come before the puzzle's last round.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::CardLibrary;
use crate::error::EngineResult;
use crate::rules::RulesEngine;
use crate::search::{is_early_win, DfsSearch, SearchConfig, SearchStatus};

use super::attempt::Rejection;
use super::puzzle::Puzzle;

/// Outcome of a verification batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VerifyStatus {
    Continue,
    /// Exhausted with between one and `max_solutions` wins.
    Success,
    /// Exhausted without a win.
    Exhausted,
    /// `EarlyWin` or `SolutionCap`.
    Reject(Rejection),
    /// Node budget ran out first.
    Budget,
}

impl VerifyStatus {
    #[must_use]
    pub fn is_finished(self) -> bool {
        self != VerifyStatus::Continue
    }

    /// Generators accept on success, and on budget since no rule was
    /// broken before the search gave up.
    #[must_use]
    pub fn is_acceptable(self) -> bool {
        matches!(self, VerifyStatus::Success | VerifyStatus::Budget)
    }
}

impl fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyStatus::Continue => f.write_str("continue"),
            VerifyStatus::Success => f.write_str("success"),
            VerifyStatus::Exhausted => f.write_str("exhausted"),
            VerifyStatus::Reject(reason) => write!(f, "reject ({reason})"),
            VerifyStatus::Budget => f.write_str("budget"),
        }
    }
}

/// Verification rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Loop iterations per `step` call.
    pub iteration_limit: usize,

    /// Nodes visited before reporting `Budget` (0 = unlimited).
    pub max_nodes: usize,

    /// Refuse wins before round `target_rounds`.
    pub enforce_early_win: bool,

    pub target_rounds: u32,

    /// Reject once more than this many wins are found.
    pub max_solutions: Option<usize>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            iteration_limit: 2000,
            max_nodes: 0,
            enforce_early_win: false,
            target_rounds: 1,
            max_solutions: Some(1),
        }
    }
}

/// Resumable verification of one puzzle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolveCheck {
    search: DfsSearch,
    options: VerifyOptions,
}

impl SolveCheck {
    /// Start from the puzzle's normalized initial state.
    #[must_use]
    pub fn new(puzzle: &Puzzle, options: VerifyOptions) -> Self {
        let config = SearchConfig::default()
            .with_max_nodes(options.max_nodes)
            .with_iteration_limit(options.iteration_limit)
            .with_max_wins(options.max_solutions.map_or(0, |cap| cap + 1));
        Self {
            search: DfsSearch::new(puzzle.initial_state(), config),
            options,
        }
    }

    /// Wins found so far.
    #[must_use]
    pub fn wins(&self) -> usize {
        self.search.wins()
    }

    /// Nodes visited so far.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.search.stats().visited
    }

    /// Run one batch.
    pub fn step<E: RulesEngine + ?Sized>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
    ) -> EngineResult<VerifyStatus> {
        let enforce = self.options.enforce_early_win;
        let rounds = self.options.target_rounds;
        let status = self.search.step_with(engine, library, |state| {
            (enforce && is_early_win(state, rounds)).then(|| Rejection::EarlyWin.code().to_string())
        })?;

        Ok(match status {
            SearchStatus::Continue => VerifyStatus::Continue,
            SearchStatus::Budget => VerifyStatus::Budget,
            SearchStatus::MaxWins => VerifyStatus::Reject(Rejection::SolutionCap),
            SearchStatus::Reject(_) => VerifyStatus::Reject(Rejection::EarlyWin),
            SearchStatus::Done if self.search.wins() > 0 => VerifyStatus::Success,
            SearchStatus::Done => VerifyStatus::Exhausted,
        })
    }

    /// Step until finished.
    pub fn run<E: RulesEngine + ?Sized>(
        &mut self,
        engine: &E,
        library: &CardLibrary,
    ) -> EngineResult<VerifyStatus> {
        loop {
            let status = self.step(engine, library)?;
            if status.is_finished() {
                return Ok(status);
            }
        }
    }
}
