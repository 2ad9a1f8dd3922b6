//! Action engine integration tests.

mod common;

use proptest::prelude::*;

use common::{busy_state, hand, library, lethal_state, tactics_state, uid, unit};
use puzzle_forge::core::action::{pair, slot};
use puzzle_forge::effects::resolve_deaths;
use puzzle_forge::{
    apply, is_win, legal_actions, Action, BoardSide, CardId, CardInstance, CardLibrary, CardType, EngineError,
    GameState, OPPONENT,
};

// =============================================================================
// Scripted Lines
// =============================================================================

#[test]
fn test_sacrifice_pierce_lethal() {
    let lib = library();
    let start = lethal_state(&lib);
    let golem = uid(&start, BoardSide::Opponent, 0);

    let legal = legal_actions(&start, &lib);
    assert!(legal.contains(&Action::play("cultist")));
    assert!(legal.contains(&Action::play("lancer")));
    assert_eq!(legal.last(), Some(&Action::End));

    let state = apply(&start, &Action::play("cultist"), &lib).unwrap();
    let cultist = uid(&state, BoardSide::Player, 0);
    let state = apply(&state, &Action::play("lancer"), &lib).unwrap();
    let lancer = uid(&state, BoardSide::Player, 1);
    assert_eq!(state.player.mana, 1);
    assert_eq!(state.chain_count, 2);

    // Guard blocks the face.
    assert!(apply(&state, &Action::attack(lancer.clone(), OPPONENT), &lib).is_err());

    let state = apply(&state, &Action::activate(cultist, Some(lancer.clone())), &lib).unwrap();
    assert_eq!(state.player.board.len(), 1);
    assert_eq!(state.player.board[0].power, 9);

    let state = apply(&state, &Action::attack(lancer, golem), &lib).unwrap();
    assert!(state.opponent.board.is_empty());
    assert_eq!(state.opponent.health, 0);
    assert!(is_win(&state));

    // The start state is untouched by the whole line.
    assert_eq!(start, lethal_state(&lib));
}

#[test]
fn test_death_cascade_feeds_scavenger() {
    let lib = library();
    let mut state = GameState::default();
    state.opponent.health = 10;
    state.player.board.push_back(unit(&lib, "vulture"));
    state.player.board.push_back(CardInstance::unassigned("bomber", 2));
    state.opponent.board.push_back(CardInstance::unassigned("grunt", 2));
    state.opponent.board.push_back(CardInstance::unassigned("grunt", 1));
    state.opponent.board.push_back(CardInstance::unassigned("grunt", 3));
    let state = state.normalize();

    let bomber = uid(&state, BoardSide::Player, 1);
    let target = uid(&state, BoardSide::Opponent, 0);
    let next = apply(&state, &Action::attack(bomber, target), &lib).unwrap();

    // Bomber trades with its target, then its splash kills the one-power grunt.
    assert_eq!(next.player.board.len(), 1);
    assert_eq!(next.player.board[0].card, "vulture");
    assert_eq!(next.player.board[0].power, 1 + 3);
    assert_eq!(next.opponent.board.len(), 1);
    assert_eq!(next.opponent.board[0].power, 1);
    assert_eq!(next.round_deaths, 3);
    assert_eq!(next.opponent.health, 10);
}

#[test]
fn test_duplicate_hand_cards_list_once() {
    let lib = library();
    let mut state = GameState::default();
    state.player.mana = 2;
    state.player.hand = hand(&["spark", "spark"]);
    state.opponent.health = 4;
    let state = state.normalize();

    assert_eq!(
        legal_actions(&state, &lib),
        vec![Action::play_at("spark", OPPONENT), Action::End]
    );

    let once = apply(&state, &Action::play_at("spark", OPPONENT), &lib).unwrap();
    assert_eq!(once.player.hand.len(), 1);
    assert_eq!(once.opponent.health, 2);
    // Second spark rides the chain.
    let twice = apply(&once, &Action::play_at("spark", OPPONENT), &lib).unwrap();
    assert!(is_win(&twice));
}

#[test]
fn test_unaffordable_play_is_rejected() {
    let lib = library();
    let mut state = GameState::default();
    state.player.hand = hand(&["fireball"]);
    state.opponent.health = 5;
    let state = state.normalize();

    assert!(apply(&state, &Action::play_at("fireball", OPPONENT), &lib).is_err());
    assert_eq!(legal_actions(&state, &lib), vec![Action::End]);
}

#[test]
fn test_end_round_pays_income_and_readies_units() {
    let lib = library();
    let mut state = GameState::default();
    state.player.mana = 1;
    state.mana_per_round = 2;
    state.opponent.health = 9;
    state
        .player
        .board
        .push_back(CardInstance::unassigned("grunt", 2).with_tired(true));
    let state = state.normalize();

    let next = apply(&state, &Action::End, &lib).unwrap();
    assert_eq!(next.turn, 2);
    assert_eq!(next.player.mana, 3);
    assert_eq!(next.chain_count, 0);
    assert!(!next.player.board[0].tired);
}

#[test]
fn test_doomed_attacker_dies_after_hitting_face() {
    let lib = library();
    let mut state = GameState::default();
    state.player.mana = 1;
    state.player.hand = hand(&["doom"]);
    state.player.board.push_back(CardInstance::unassigned("grunt", 2));
    state.player.board.push_back(unit(&lib, "vulture"));
    state.opponent.health = 10;
    let state = state.normalize();

    let grunt = uid(&state, BoardSide::Player, 0);
    let state = apply(&state, &Action::play_at("doom", "player:slot0"), &lib).unwrap();
    let state = apply(&state, &Action::attack(grunt.clone(), OPPONENT), &lib).unwrap();

    assert_eq!(state.opponent.health, 8);
    assert_eq!(state.player.board.len(), 1);
    assert_eq!(state.player.board[0].card, "vulture");
    assert_eq!(state.player.board[0].power, 2);
    assert_eq!(state.round_deaths, 1);

    // Gone for good: next round it cannot swing again.
    let next = apply(&state, &Action::End, &lib).unwrap();
    assert!(apply(&next, &Action::attack(grunt, OPPONENT), &lib).is_err());
}

#[test]
fn test_doomed_attacker_dies_in_the_combat_cascade() {
    let lib = library();
    let mut state = GameState::default();
    state.opponent.health = 10;
    state.player.board.push_back(unit(&lib, "vulture"));
    let mut lancer = unit(&lib, "lancer");
    lancer.mods.push(CardId::new("doom"));
    state.player.board.push_back(lancer);
    state.opponent.board.push_back(CardInstance::unassigned("grunt", 2));
    let state = state.normalize();

    let lancer = uid(&state, BoardSide::Player, 1);
    let target = uid(&state, BoardSide::Opponent, 0);
    let next = apply(&state, &Action::attack(lancer, target), &lib).unwrap();

    assert_eq!(next.opponent.health, 7);
    assert!(next.opponent.board.is_empty());
    assert_eq!(next.player.board.len(), 1);
    assert_eq!(next.player.board[0].power, 1 + 2);
    assert_eq!(next.round_deaths, 2);
}

#[test]
fn test_swap_only_accepts_listed_pairs() {
    let lib = library();
    let mut state = GameState::default();
    state.player.mana = 2;
    state.player.hand = hand(&["swap"]);
    state.player.board.push_back(CardInstance::unassigned("grunt", 2).with_tired(true));
    state.player.board.push_back(CardInstance::unassigned("lancer", 5).with_tired(true));
    state.opponent.board.push_back(CardInstance::unassigned("grunt", 3));
    state.opponent.health = 10;
    let state = state.normalize();

    let swaps: Vec<Action> = legal_actions(&state, &lib)
        .into_iter()
        .filter(|action| matches!(action, Action::Play { card, .. } if card == "swap"))
        .collect();
    assert_eq!(swaps, vec![Action::play_at("swap", "player:slot0|player:slot1")]);

    let rejected = |target: &str| apply(&state, &Action::play_at("swap", target), &lib).unwrap_err();
    assert_eq!(rejected("player:slot0|player:slot0"), EngineError::SwapSameTarget);
    assert_eq!(rejected("opponent:slot0|opponent:slot0"), EngineError::SwapSameTarget);
    assert_eq!(rejected("player:slot1|opponent:slot0"), EngineError::SwapDifferentBoards);

    let swapped = apply(&state, &swaps[0], &lib).unwrap();
    assert_eq!(swapped.player.board[0].card, "lancer");
    assert_eq!(swapped.player.board[1].card, "grunt");
    assert_eq!(swapped.chain_count, 1);
}

#[test]
fn test_state_key_is_deterministic() {
    let lib = library();
    let state = busy_state(&lib);
    let same = busy_state(&lib);
    assert_eq!(state.key().unwrap(), same.key().unwrap());

    let next = apply(&state, &Action::End, &lib).unwrap();
    assert_ne!(state.key().unwrap(), next.key().unwrap());
}

// =============================================================================
// Property Tests
// =============================================================================

/// Every uid-form attack between the current boards.
fn attack_candidates(state: &GameState) -> Vec<Action> {
    let mut targets: Vec<String> = state.opponent.board.iter().map(|u| u.uid.clone()).collect();
    targets.push(OPPONENT.to_string());
    state
        .player
        .board
        .iter()
        .flat_map(|source| {
            targets
                .iter()
                .map(move |target| Action::attack(source.uid.clone(), target.clone()))
        })
        .collect()
}

/// Every action in canonical reference form that could plausibly apply:
/// hand plays against each slot and ordered same-board pair, uid attacks,
/// and sacrifices onto each friendly uid.
fn canonical_candidates(state: &GameState, library: &CardLibrary) -> Vec<Action> {
    let mut slots = Vec::new();
    let mut pairs = Vec::new();
    for side in [BoardSide::Player, BoardSide::Opponent] {
        let len = state.board(side).len();
        for first in 0..len {
            slots.push(slot(side, first));
            for second in first..len {
                pairs.push(pair(&slot(side, first), &slot(side, second)));
            }
        }
    }

    let mut candidates = attack_candidates(state);
    let mut cards: Vec<&CardId> = state.player.hand.iter().collect();
    cards.sort();
    cards.dedup();
    for card in cards {
        let Some(def) = library.get(card.as_str()) else {
            continue;
        };
        match def.card_type {
            CardType::Creature | CardType::Effect => candidates.push(Action::play(card.clone())),
            CardType::Mod => {
                candidates.extend(slots.iter().map(|target| Action::play_at(card.clone(), target.clone())));
            }
            CardType::Spell => {
                candidates.push(Action::play_at(card.clone(), OPPONENT));
                candidates.extend(
                    slots
                        .iter()
                        .chain(pairs.iter())
                        .map(|target| Action::play_at(card.clone(), target.clone())),
                );
            }
        }
    }

    let friends: Vec<String> = state.player.board.iter().map(|u| u.uid.clone()).collect();
    for source in &friends {
        for target in &friends {
            candidates.push(Action::activate(source.clone(), Some(target.clone())));
        }
    }
    candidates
}

fn uids_are_unique(state: &GameState) -> bool {
    let mut seen = std::collections::HashSet::new();
    state
        .player
        .board
        .iter()
        .chain(state.opponent.board.iter())
        .all(|unit| !unit.uid.is_empty() && seen.insert(unit.uid.clone()))
}

/// Walk legal moves picked by `choices`, checking at every step that the
/// engine accepts exactly what it lists and never mutates its input.
fn check_walk(mut state: GameState, library: &CardLibrary, choices: Vec<usize>) -> Result<(), TestCaseError> {
    for choice in choices {
        let legal = legal_actions(&state, library);
        prop_assert_eq!(legal.last(), Some(&Action::End));

        for candidate in canonical_candidates(&state, library) {
            if apply(&state, &candidate, library).is_ok() {
                prop_assert!(legal.contains(&candidate), "{:?} accepted but not listed", candidate);
            }
        }

        let action = legal[choice % legal.len()].clone();
        let before = state.clone();
        let next = apply(&state, &action, library);
        prop_assert_eq!(&state, &before);
        let next = match next {
            Ok(next) => next,
            Err(err) => return Err(TestCaseError::fail(format!("{action:?} listed but rejected: {err}"))),
        };

        let mut settled = next.clone();
        resolve_deaths(&mut settled, library);
        prop_assert_eq!(&settled, &next);
        prop_assert!(uids_are_unique(&next));
        prop_assert!(next.key().is_ok());

        state = next;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_walks_respect_engine_contracts(choices in prop::collection::vec(0usize..64, 1..12)) {
        let lib = library();
        check_walk(busy_state(&lib), &lib, choices)?;
    }

    #[test]
    fn prop_tactical_walks_respect_engine_contracts(choices in prop::collection::vec(0usize..64, 1..12)) {
        let lib = library();
        check_walk(tactics_state(&lib), &lib, choices)?;
    }
}
