//! One generation attempt: draw, walk, back-solve, materialize.
//!
//! Infeasible attempts are not errors. They come back with a
//! [`Rejection`] whose code is stable, so callers can count them.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardLibrary, CardType};
use crate::core::{GameRng, GameState, Opponent, Side};
use crate::error::GenerateError;
use crate::rules::RulesEngine;

use super::boss::{build_boss_board, BossBoardSpec, GeneratorPools};
use super::generate::GenerateConfig;
use super::ghost::{ghost_walk, GhostOptions, GhostResult};
use super::mana::{derive_mana_plan, play_cost};
use super::materialize::{add_decoys, materialize, MaterializeOptions};
use super::puzzle::Puzzle;

/// Opponent health used while walking; the puzzle gets the damage dealt.
const WALK_BOSS_HEALTH: i32 = 30;

/// Why an attempt, or its verification, was thrown away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    HandTypes,
    BossBoard,
    ActionBudget,
    NoActions,
    Materialize,
    MinHand,
    RequiredCards,
    EarlyMana,
    EarlyWin,
    SolutionCap,
    NoSolutions,
}

impl Rejection {
    /// Stable reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Rejection::HandTypes => "hand_types",
            Rejection::BossBoard => "boss_board",
            Rejection::ActionBudget => "action_budget",
            Rejection::NoActions => "no_actions",
            Rejection::Materialize => "materialize",
            Rejection::MinHand => "min_hand",
            Rejection::RequiredCards => "required_cards",
            Rejection::EarlyMana => "early_mana",
            Rejection::EarlyWin => "early_win",
            Rejection::SolutionCap => "solution_cap",
            Rejection::NoSolutions => "no_solutions",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rejection::HandTypes => "hand had a single card type",
            Rejection::BossBoard => "boss board generation failed",
            Rejection::ActionBudget => "action budget exceeded",
            Rejection::NoActions => "no legal actions",
            Rejection::Materialize => "materialize failed",
            Rejection::MinHand => "used hand smaller than minimum",
            Rejection::RequiredCards => "required cards not used",
            Rejection::EarlyMana => "hand is affordable too early",
            Rejection::EarlyWin => "early win",
            Rejection::SolutionCap => "too many solutions",
            Rejection::NoSolutions => "no solutions",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What one attempt produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptResult {
    /// The drawn hand.
    pub hand: Vec<CardId>,
    /// Card names of the drawn hand, comma separated.
    pub hand_label: String,
    /// Length of the walk.
    pub action_count: usize,
    /// The walk hit the action budget.
    pub aborted: bool,
    pub outcome: Result<Puzzle, Rejection>,
}

impl AttemptResult {
    #[must_use]
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.outcome.as_ref().ok()
    }

    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        self.outcome.as_ref().err().copied()
    }
}

/// Draw `hand_size` cards. Required cards present in the playable pool
/// are placed first; the rest are uniform picks.
fn pick_hand(rng: &mut GameRng, pools: &GeneratorPools, config: &GenerateConfig) -> Vec<CardId> {
    let mut hand: Vec<CardId> = seeded_required(pools, config)
        .into_iter()
        .take(config.hand_size)
        .collect();
    while hand.len() < config.hand_size {
        let Some(pick) = rng.pick(&pools.playable) else {
            break;
        };
        hand.push(pick.id.clone());
    }
    hand
}

fn seeded_required(pools: &GeneratorPools, config: &GenerateConfig) -> Vec<CardId> {
    let mut seen = FxHashSet::default();
    config
        .required_cards
        .iter()
        .filter(|card| pools.playable.iter().any(|def| &def.id == *card))
        .filter(|card| seen.insert(*card))
        .cloned()
        .collect()
}

fn distinct_types<'a>(cards: impl IntoIterator<Item = &'a CardId>, library: &CardLibrary) -> usize {
    cards
        .into_iter()
        .filter_map(|card| library.card_type(card.as_str()))
        .collect::<FxHashSet<CardType>>()
        .len()
}

fn hand_cost<'a>(cards: impl IntoIterator<Item = &'a CardId>, library: &CardLibrary) -> i32 {
    cards
        .into_iter()
        .filter_map(|card| library.get(card.as_str()))
        .map(play_cost)
        .sum()
}

/// Run one attempt with the shared generator `rng`.
///
/// Errors only when a state cannot be encoded during the walk.
pub fn build_puzzle_attempt<E: RulesEngine + ?Sized>(
    engine: &E,
    config: &GenerateConfig,
    pools: &GeneratorPools,
    library: &CardLibrary,
    rng: &mut GameRng,
) -> Result<AttemptResult, GenerateError> {
    let hand = pick_hand(rng, pools, config);
    let hand_label = hand
        .iter()
        .map(|card| library.get(card.as_str()).map_or(card.as_str(), |def| def.name.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut result = AttemptResult {
        hand,
        hand_label,
        action_count: 0,
        aborted: false,
        outcome: Err(Rejection::HandTypes),
    };
    if distinct_types(&result.hand, library) <= 1 {
        return Ok(result);
    }

    let spec = BossBoardSpec {
        min: config.boss_min,
        max: config.boss_max,
        mods_max: config.boss_mods_max,
    };
    let Some(boss_board) = build_boss_board(rng, pools, spec, library) else {
        result.outcome = Err(Rejection::BossBoard);
        return Ok(result);
    };

    let start = GameState {
        player: Side {
            mana: hand_cost(&result.hand, library),
            hand: result.hand.iter().cloned().collect(),
            ..Side::default()
        },
        opponent: Opponent {
            name: Some(config.boss_name.clone()),
            health: WALK_BOSS_HEALTH,
            board: boss_board,
            ..Opponent::default()
        },
        mana_per_round: 0,
        target_rounds: Some(config.target_rounds),
        ..GameState::default()
    }
    .normalize();

    let options = GhostOptions::default()
        .with_target_rounds(config.target_rounds)
        .with_max_actions(config.action_budget);
    let ghost = ghost_walk(engine, &start, library, rng, &options)?;
    result.action_count = ghost.trace.len();
    if ghost.aborted {
        result.aborted = true;
        result.outcome = Err(Rejection::ActionBudget);
        return Ok(result);
    }
    if ghost.trace.is_empty() {
        result.outcome = Err(Rejection::NoActions);
        return Ok(result);
    }

    result.outcome = finish_attempt(engine, config, pools, library, rng, ghost);
    Ok(result)
}

fn finish_attempt<E: RulesEngine + ?Sized>(
    engine: &E,
    config: &GenerateConfig,
    pools: &GeneratorPools,
    library: &CardLibrary,
    rng: &mut GameRng,
    mut ghost: GhostResult,
) -> Result<Puzzle, Rejection> {
    let plan =
        derive_mana_plan(engine, &ghost, library, rng).map_err(|_| Rejection::Materialize)?;
    ghost.start_state.player.mana = plan.start_mana;
    ghost.start_state.mana_per_round = plan.mana_per_round;

    let options = MaterializeOptions {
        seed: Some(config.seed),
        target_rounds: Some(config.target_rounds),
        mana_per_round: Some(plan.mana_per_round),
        ..MaterializeOptions::default()
    };
    let base = materialize(&ghost, library, &options).map_err(|_| Rejection::Materialize)?;

    if config.min_hand_size > 0 && base.player.hand.len() < config.min_hand_size {
        return Err(Rejection::MinHand);
    }
    let played = base.played_cards();
    if seeded_required(pools, config)
        .iter()
        .any(|card| !played.contains(card))
    {
        return Err(Rejection::RequiredCards);
    }
    if config.target_rounds > 1 && hand_cost(&base.player.hand, library) <= base.player.mana {
        return Err(Rejection::EarlyMana);
    }

    let puzzle = if config.decoys > 0 {
        add_decoys(&base, rng, &pools.playable, config.decoys)
    } else {
        base
    };
    if distinct_types(&puzzle.player.hand, library) <= 1 {
        return Err(Rejection::HandTypes);
    }
    Ok(puzzle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, Effect};
    use crate::rules::{apply, is_win, PuzzleRules};

    fn library() -> CardLibrary {
        CardLibrary::from_definitions([
            CardDefinition::new("spark", "Spark", CardType::Spell, 1).with_effect(Effect::Damage {
                amount: 2,
                chain_amount: None,
            }),
            CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
        ])
    }

    #[test]
    fn test_rejection_codes() {
        assert_eq!(Rejection::EarlyMana.code(), "early_mana");
        assert_eq!(Rejection::NoSolutions.to_string(), "no_solutions");
        assert_eq!(
            serde_json::to_string(&Rejection::SolutionCap).unwrap(),
            "\"solution_cap\""
        );
    }

    #[test]
    fn test_single_type_pool_is_rejected() {
        let lib = CardLibrary::from_definitions([
            CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
        ]);
        let pools = GeneratorPools::from_library(&lib);
        let config = GenerateConfig::default();
        let result = build_puzzle_attempt(&PuzzleRules, &config, &pools, &lib, &mut GameRng::new(1)).unwrap();
        assert_eq!(result.rejection(), Some(Rejection::HandTypes));
        assert_eq!(result.hand.len(), 4);
        assert_eq!(result.hand_label, "Grunt, Grunt, Grunt, Grunt");
    }

    #[test]
    fn test_required_cards_lead_the_hand() {
        let lib = library();
        let pools = GeneratorPools::from_library(&lib);
        let config = GenerateConfig::default()
            .with_hand_size(2)
            .with_required_cards(vec![CardId::new("grunt"), CardId::new("missing"), CardId::new("grunt")]);
        let hand = pick_hand(&mut GameRng::new(2), &pools, &config);
        assert_eq!(hand[0], CardId::new("grunt"));
        assert_eq!(hand.len(), 2);
    }

    #[test]
    fn test_accepted_attempts_replay_to_a_win() {
        let lib = library();
        let pools = GeneratorPools::from_library(&lib);
        let mut accepted = 0;
        for seed in 0..40 {
            let config = GenerateConfig::default().with_seed(seed);
            let mut rng = GameRng::new(seed);
            let result = build_puzzle_attempt(&PuzzleRules, &config, &pools, &lib, &mut rng).unwrap();
            let Some(puzzle) = result.puzzle() else {
                continue;
            };
            accepted += 1;
            let mut state = puzzle.initial_state();
            for action in &puzzle.solution {
                state = apply(&state, action, &lib).unwrap();
            }
            assert!(is_win(&state));
            assert_eq!(puzzle.id, format!("puzzle_{seed}"));
        }
        assert!(accepted > 0);
    }
}
