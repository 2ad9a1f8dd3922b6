//! Relaxation stages tried, in order, for each level.
//!
//! A level starts strict: every card it should introduce is required.
//! When a stage runs out of attempts the next one loosens a single knob.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a stage loosened relative to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRelaxation {
    StrictStart,
    LowerRequiredCards,
    LowerMinUsedCards,
    RaiseTargetRounds,
}

impl StageRelaxation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StageRelaxation::StrictStart => "strict_start",
            StageRelaxation::LowerRequiredCards => "lower_required_cards",
            StageRelaxation::LowerMinUsedCards => "lower_min_used_cards",
            StageRelaxation::RaiseTargetRounds => "raise_target_rounds",
        }
    }
}

impl fmt::Display for StageRelaxation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a level's stage plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Position in the plan, from zero.
    pub index: usize,
    pub relaxation: StageRelaxation,
    /// Uncovered cards required, and the new coverage demanded.
    pub required_count: usize,
    /// Stage floor for cards played; requests never go below the
    /// required count.
    pub min_used_cards: usize,
    /// Rounds added to each attempt's round choice.
    pub round_bump: u32,
}

impl Stage {
    /// Round budget for an attempt whose cycled choice is `choice`.
    /// Raising never lowers a choice already above `max_rounds`.
    #[must_use]
    pub fn target_rounds(&self, choice: u32, max_rounds: u32) -> u32 {
        choice.max(choice.saturating_add(self.round_bump).min(max_rounds.max(1)))
    }

    /// Largest round budget any attempt of this stage can request.
    #[must_use]
    pub fn target_rounds_cap(&self, choices: &[u32], max_rounds: u32) -> u32 {
        let widest = choices.iter().copied().max().unwrap_or(1);
        self.target_rounds(widest, max_rounds)
    }
}

/// Inputs of [`plan_stages`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagePlanInput {
    /// Required count of the strict stage.
    pub required: usize,
    pub min_used_cards: usize,
    pub max_target_rounds: u32,
    pub relax_until_success: bool,
    pub max_stages: usize,
}

/// Stages for one level.
///
/// Required cards drop one at a time down to one. With
/// `relax_until_success`, the minimum card count then drops to zero,
/// rounds rise to the ceiling, and the final stage repeats until
/// `max_stages` is reached. The plan never exceeds `max_stages` and
/// always holds at least the strict stage.
#[must_use]
pub fn plan_stages(input: StagePlanInput) -> Vec<Stage> {
    let cap = input.max_stages.max(1);
    let mut stages = vec![Stage {
        index: 0,
        relaxation: StageRelaxation::StrictStart,
        required_count: input.required,
        min_used_cards: input.min_used_cards,
        round_bump: 0,
    }];
    for _ in 1..input.required {
        if !push_stage(&mut stages, cap, StageRelaxation::LowerRequiredCards, |s| s.required_count -= 1) {
            return stages;
        }
    }
    if !input.relax_until_success {
        return stages;
    }
    for _ in 0..input.min_used_cards {
        if !push_stage(&mut stages, cap, StageRelaxation::LowerMinUsedCards, |s| s.min_used_cards -= 1) {
            return stages;
        }
    }
    for _ in 1..input.max_target_rounds {
        if !push_stage(&mut stages, cap, StageRelaxation::RaiseTargetRounds, |s| s.round_bump += 1) {
            return stages;
        }
    }
    while let Some(last) = stages.last().copied() {
        if !push_stage(&mut stages, cap, last.relaxation, |_| {}) {
            break;
        }
    }
    stages
}

/// Append a copy of the last stage, edited. False once the plan is full.
fn push_stage(stages: &mut Vec<Stage>, cap: usize, relaxation: StageRelaxation, edit: impl Fn(&mut Stage)) -> bool {
    if stages.len() >= cap {
        return false;
    }
    let Some(last) = stages.last().copied() else {
        return false;
    };
    let mut next = Stage {
        index: stages.len(),
        relaxation,
        ..last
    };
    edit(&mut next);
    stages.push(next);
    true
}
