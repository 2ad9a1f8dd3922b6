//! Rules engine trait and the puzzle ruleset.
//!
//! `RulesEngine` is the seam search and generation are written against:
//! - What actions are legal
//! - How an action transforms a state
//! - When the puzzle is won
//!
//! Applying an action never touches its input. The state is cloned first
//! (O(1) thanks to the persistent boards), the clone is mutated, and on a
//! rule violation the clone is simply dropped.

use crate::cards::CardLibrary;
use crate::core::{Action, GameState};
use crate::error::EngineResult;

use super::{combat, legal, play, round};

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions` must list exactly what `apply_action` accepts
/// - `apply_action` must be deterministic; search and memoization rely on it
pub trait RulesEngine {
    /// Every action `apply_action` would accept from `state`.
    fn legal_actions(&self, state: &GameState, library: &CardLibrary) -> Vec<Action>;

    /// Produce the successor of `state`, or the rule it violates.
    fn apply_action(
        &self,
        state: &GameState,
        action: &Action,
        library: &CardLibrary,
    ) -> EngineResult<GameState>;

    /// The boss is down.
    fn is_win(&self, state: &GameState) -> bool {
        state.opponent.health <= 0
    }
}

/// The single-player boss-puzzle ruleset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PuzzleRules;

impl RulesEngine for PuzzleRules {
    fn legal_actions(&self, state: &GameState, library: &CardLibrary) -> Vec<Action> {
        legal::legal_actions(state, library)
    }

    fn apply_action(
        &self,
        state: &GameState,
        action: &Action,
        library: &CardLibrary,
    ) -> EngineResult<GameState> {
        apply(state, action, library)
    }
}

/// Apply one action to a copy of `state`.
///
/// ## Example
///
/// ```
/// use puzzle_forge::cards::{CardDefinition, CardLibrary, CardType, Effect};
/// use puzzle_forge::core::{Action, GameState};
/// use puzzle_forge::rules;
///
/// let library = CardLibrary::from_definitions([
///     CardDefinition::new("fireball", "Fireball", CardType::Spell, 3)
///         .with_effect(Effect::Damage { amount: 5, chain_amount: None }),
/// ]);
/// let mut state = GameState::default();
/// state.player.mana = 3;
/// state.player.hand.push_back("fireball".into());
/// state.opponent.health = 5;
///
/// let next = rules::apply(&state, &Action::play_at("fireball", "opponent"), &library).unwrap();
/// assert!(rules::is_win(&next));
/// assert_eq!(state.opponent.health, 5);
/// ```
pub fn apply(state: &GameState, action: &Action, library: &CardLibrary) -> EngineResult<GameState> {
    let mut next = state.clone();
    match action {
        Action::Play { card, target } => {
            play::apply_play(&mut next, card, target.as_deref(), library)?;
        }
        Action::Attack { source, target } => {
            combat::apply_attack(&mut next, source, target, library)?;
        }
        Action::Activate { source, target } => {
            combat::apply_activate(&mut next, source, target.as_deref(), library)?;
        }
        Action::End => round::apply_end(&mut next, library),
    }
    Ok(next)
}

/// Free-function form of [`RulesEngine::legal_actions`].
#[must_use]
pub fn legal_actions(state: &GameState, library: &CardLibrary) -> Vec<Action> {
    legal::legal_actions(state, library)
}

/// Whether the boss is down.
#[must_use]
pub fn is_win(state: &GameState) -> bool {
    state.opponent.health <= 0
}
