//! Ghost walk: one randomized self-play rollout.
//!
//! The walk discovers a feasible line, it does not search. Each step
//! prefers non-`End` actions, never revisits a state, and falls back to
//! `End` only while further rounds are still open.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::CardLibrary;
use crate::core::{Action, GameRng, GameState, StateKey};
use crate::error::EngineResult;
use crate::rules::RulesEngine;

/// Ghost walk switches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostOptions {
    /// Never choose `End`.
    pub exclude_end: bool,

    /// Stop as soon as the boss is dead.
    pub stop_on_win: bool,

    /// Round budget; falls back to the state's own ceiling, then 1.
    pub target_rounds: Option<u32>,

    /// Trace length that aborts the walk (0 = unlimited).
    pub max_actions: usize,
}

impl Default for GhostOptions {
    fn default() -> Self {
        Self {
            exclude_end: false,
            stop_on_win: false,
            target_rounds: None,
            max_actions: 200,
        }
    }
}

impl GhostOptions {
    #[must_use]
    pub fn with_target_rounds(mut self, rounds: u32) -> Self {
        self.target_rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    #[must_use]
    pub fn with_stop_on_win(mut self, stop: bool) -> Self {
        self.stop_on_win = stop;
        self
    }

    #[must_use]
    pub fn with_exclude_end(mut self, exclude: bool) -> Self {
        self.exclude_end = exclude;
        self
    }
}

/// Result of a walk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GhostResult {
    pub trace: Vec<Action>,
    pub start_state: GameState,
    pub end_state: GameState,
    /// The trace hit `max_actions`.
    pub aborted: bool,
}

/// Walk from `state`, choosing uniformly among viable actions with `rng`.
///
/// Errors only when a state cannot be encoded.
pub fn ghost_walk<E: RulesEngine + ?Sized>(
    engine: &E,
    state: &GameState,
    library: &CardLibrary,
    rng: &mut GameRng,
    options: &GhostOptions,
) -> EngineResult<GhostResult> {
    let rounds = options.target_rounds.or(state.target_rounds).unwrap_or(1);
    let mut current = state.clone();
    let mut trace = Vec::new();
    let mut seen = FxHashSet::default();

    loop {
        let key = current.key()?;
        if !seen.insert(key) {
            break;
        }

        let mut actions = engine.legal_actions(&current, library);
        if options.exclude_end {
            actions.retain(|a| !a.is_end());
        }
        let (ends, non_end): (Vec<Action>, Vec<Action>) =
            actions.into_iter().partition(Action::is_end);
        let rounds_open = rounds > 1 && current.turn < rounds;

        let choices = if options.exclude_end || !rounds_open || !non_end.is_empty() {
            non_end
        } else {
            ends.clone()
        };
        if choices.is_empty() {
            break;
        }

        let mut viable = viable_moves(engine, &current, choices, library, &seen)?;
        if viable.is_empty() && !options.exclude_end && rounds_open {
            viable = viable_moves(engine, &current, ends, library, &seen)?;
        }

        if viable.is_empty() {
            break;
        }
        let (action, next) = viable.swap_remove(rng.int(viable.len()));
        current = next;
        trace.push(action);

        if options.max_actions > 0 && trace.len() >= options.max_actions {
            return Ok(GhostResult {
                trace,
                start_state: state.clone(),
                end_state: current,
                aborted: true,
            });
        }
        if options.stop_on_win && engine.is_win(&current) {
            break;
        }
    }

    Ok(GhostResult {
        trace,
        start_state: state.clone(),
        end_state: current,
        aborted: false,
    })
}

/// Actions that apply and lead somewhere new.
fn viable_moves<E: RulesEngine + ?Sized>(
    engine: &E,
    current: &GameState,
    choices: Vec<Action>,
    library: &CardLibrary,
    seen: &FxHashSet<StateKey>,
) -> EngineResult<Vec<(Action, GameState)>> {
    let mut viable = Vec::with_capacity(choices.len());
    for action in choices {
        let Ok(next) = engine.apply_action(current, &action, library) else {
            continue;
        };
        if seen.contains(&next.key()?) {
            continue;
        }
        viable.push((action, next));
    }
    Ok(viable)
}
