//! Mana-plan back-solving.
//!
//! A walk runs with enough mana for the whole hand. Replaying it with a
//! huge seed records, for every play, the round it happened in and the
//! cumulative net spend it needed. The plan is then the tightest
//! `(start_mana, mana_per_round)` that keeps every play affordable when
//! it happened, so multi-round puzzles force the discovered timing.

use serde::{Deserialize, Serialize};

use crate::cards::{CardDefinition, CardLibrary};
use crate::core::{Action, GameRng};
use crate::error::EngineResult;
use crate::rules::play::repeat_surcharge;
use crate::rules::RulesEngine;

use super::ghost::GhostResult;

const MANA_SEED: i32 = 1_000_000;

/// Starting mana and per-round income of a puzzle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPlan {
    pub start_mana: i32,
    pub mana_per_round: i32,
}

/// One play's need: by `round`, net spend reached `required`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaConstraint {
    pub round: u32,
    pub required: i32,
}

impl ManaConstraint {
    /// Whether a plan covers this constraint.
    #[must_use]
    pub fn is_met_by(&self, plan: ManaPlan) -> bool {
        let income = i64::from(self.round.saturating_sub(1)) * i64::from(plan.mana_per_round);
        i64::from(plan.start_mana) + income >= i64::from(self.required)
    }
}

/// Full mana cost of playing a card, repeat surcharge included.
#[must_use]
pub fn play_cost(def: &CardDefinition) -> i32 {
    def.cost + repeat_surcharge(def).unwrap_or(0)
}

/// Replay the walk and collect one constraint per play.
pub fn mana_constraints<E: RulesEngine + ?Sized>(
    engine: &E,
    ghost: &GhostResult,
    library: &CardLibrary,
) -> EngineResult<Vec<ManaConstraint>> {
    let mut current = ghost.start_state.clone();
    current.player.mana = MANA_SEED;
    current.mana_per_round = 0;

    let mut constraints = Vec::new();
    for action in &ghost.trace {
        if let Action::Play { card, .. } = action {
            let cost = library.get(card.as_str()).map_or(0, play_cost);
            let spent = MANA_SEED - current.player.mana;
            constraints.push(ManaConstraint {
                round: current.turn,
                required: cost + spent,
            });
        }
        current = engine.apply_action(&current, action, library)?;
    }
    Ok(constraints)
}

/// Solve constraints into a plan. The income is drawn from `rng` between
/// zero and the largest value any later-round constraint can use; the
/// start mana is then the least that satisfies everything.
#[must_use]
pub fn solve_mana_plan(constraints: &[ManaConstraint], rng: &mut GameRng) -> ManaPlan {
    if constraints.is_empty() {
        return ManaPlan::default();
    }

    let min_start = constraints
        .iter()
        .filter(|c| c.round == 1)
        .map(|c| c.required)
        .max()
        .unwrap_or(0)
        .max(0);

    let max_income = constraints
        .iter()
        .filter(|c| c.round > 1)
        .filter_map(|c| {
            let needed = c.required - min_start;
            let rounds = i32::try_from(c.round - 1).ok()?;
            (needed > 0).then(|| (needed + rounds - 1) / rounds)
        })
        .max()
        .unwrap_or(0);

    let mana_per_round = rng.int(max_income as usize + 1) as i32;

    let start_mana = constraints
        .iter()
        .map(|c| {
            let rounds = i32::try_from(c.round.saturating_sub(1)).unwrap_or(i32::MAX);
            c.required.saturating_sub(rounds.saturating_mul(mana_per_round))
        })
        .max()
        .unwrap_or(0)
        .max(0);

    ManaPlan {
        start_mana,
        mana_per_round,
    }
}

/// Back-solve the tightest mana plan for a walk.
pub fn derive_mana_plan<E: RulesEngine + ?Sized>(
    engine: &E,
    ghost: &GhostResult,
    library: &CardLibrary,
    rng: &mut GameRng,
) -> EngineResult<ManaPlan> {
    let constraints = mana_constraints(engine, ghost, library)?;
    Ok(solve_mana_plan(&constraints, rng))
}
