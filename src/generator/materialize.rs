//! Turning a walk into a puzzle, and padding hands with decoys.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardDefinition, CardId, CardLibrary};
use crate::core::{GameRng, Opponent, Side};
use crate::error::GenerateError;

use super::ghost::GhostResult;
use super::puzzle::{Difficulty, Puzzle};

const DEFAULT_BOSS_NAME: &str = "Boss";

/// Overrides for [`materialize`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeOptions {
    /// Fixed label instead of one inferred from the trace length.
    pub difficulty: Option<Difficulty>,
    pub seed: Option<u32>,
    pub target_rounds: Option<u32>,
    pub mana_per_round: Option<i32>,
}

/// Build a puzzle whose hand is every card the walk played (in play
/// order) and whose boss health is exactly the damage the walk dealt.
///
/// Fails when the walk dealt no damage.
pub fn materialize(
    ghost: &GhostResult,
    library: &CardLibrary,
    options: &MaterializeOptions,
) -> Result<Puzzle, GenerateError> {
    let start = &ghost.start_state;
    let damage = start.opponent.health - ghost.end_state.opponent.health;
    if damage <= 0 {
        return Err(GenerateError::Materialize(
            "Ghost walk did not deal damage; cannot materialize puzzle.".to_string(),
        ));
    }

    let hand: im::Vector<CardId> = ghost
        .trace
        .iter()
        .filter_map(|action| action.played_card())
        .cloned()
        .collect();

    let mut seen = FxHashSet::default();
    let tags = hand
        .iter()
        .filter_map(|card| library.get(card.as_str()))
        .flat_map(|def| def.keywords.iter())
        .filter(|keyword| seen.insert(**keyword))
        .map(|keyword| keyword.as_str().to_string())
        .collect();

    let id = match options.seed {
        Some(seed) => format!("puzzle_{seed}"),
        None => "puzzle".to_string(),
    };

    Ok(Puzzle {
        id,
        difficulty: options
            .difficulty
            .unwrap_or_else(|| Difficulty::from_action_count(ghost.trace.len())),
        seed: options.seed,
        tags,
        target_rounds: Some(options.target_rounds.unwrap_or(1)),
        mana_per_round: Some(options.mana_per_round.unwrap_or(0)),
        player: Side {
            mana: start.player.mana,
            hand,
            board: im::Vector::new(),
            deck: None,
            graveyard: None,
        },
        opponent: Opponent {
            health: damage.max(1),
            name: Some(
                start
                    .opponent
                    .name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BOSS_NAME.to_string()),
            ),
            board: start.opponent.board.clone(),
            deck: None,
            graveyard: None,
            poison: 0,
        },
        solution: ghost.trace.clone(),
        metadata: None,
    })
}

/// Append `extra` random picks from `pool` to the hand. The solution is
/// untouched.
#[must_use]
pub fn add_decoys(puzzle: &Puzzle, rng: &mut GameRng, pool: &[CardDefinition], extra: usize) -> Puzzle {
    let mut puzzle = puzzle.clone();
    for _ in 0..extra {
        let Some(pick) = rng.pick(pool) else {
            break;
        };
        puzzle.player.hand.push_back(pick.id.clone());
    }
    puzzle
}

/// Pad the hand from the whole library, up to five cards by default.
#[must_use]
pub fn obfuscate(
    puzzle: &Puzzle,
    library: &CardLibrary,
    rng: &mut GameRng,
    extra_cards: Option<usize>,
) -> Puzzle {
    let pool: Vec<CardDefinition> = library.iter().cloned().collect();
    let extra = extra_cards.unwrap_or_else(|| 5usize.saturating_sub(puzzle.player.hand.len()));
    add_decoys(puzzle, rng, &pool, extra)
}
