//! Board queries and reference resolution.
//!
//! Only creatures take part in combat, adjacency and death resolution.
//! Effect permanents share the board (and its slot numbering) but are
//! skipped by every creature query here.

use smallvec::SmallVec;

use crate::cards::{CardInstance, CardLibrary, Keyword};
use crate::core::action::{self, BoardSide};
use crate::core::{Board, GameState};

/// Whether a unit's definition is a creature.
#[must_use]
pub fn is_creature(unit: &CardInstance, library: &CardLibrary) -> bool {
    library.is_creature(unit.card.as_str())
}

/// Whether the slot holds a creature.
#[must_use]
pub fn is_creature_at(board: &Board, index: usize, library: &CardLibrary) -> bool {
    board.get(index).is_some_and(|u| is_creature(u, library))
}

/// Board indexes holding creatures, in order.
#[must_use]
pub fn creature_indexes(board: &Board, library: &CardLibrary) -> Vec<usize> {
    board
        .iter()
        .enumerate()
        .filter(|(_, u)| is_creature(u, library))
        .map(|(i, _)| i)
        .collect()
}

#[must_use]
pub fn has_creatures(board: &Board, library: &CardLibrary) -> bool {
    board.iter().any(|u| is_creature(u, library))
}

/// Creature indexes carrying `guard`.
#[must_use]
pub fn guard_indexes(board: &Board, library: &CardLibrary) -> Vec<usize> {
    board
        .iter()
        .enumerate()
        .filter(|(_, u)| is_creature(u, library) && u.has_keyword(Keyword::Guard))
        .map(|(i, _)| i)
        .collect()
}

/// Previous and next creature around `index`, skipping non-creatures.
#[must_use]
pub fn adjacent_creatures(board: &Board, index: usize, library: &CardLibrary) -> SmallVec<[usize; 2]> {
    let creatures = creature_indexes(board, library);
    let mut neighbours = SmallVec::new();
    let Some(position) = creatures.iter().position(|&i| i == index) else {
        return neighbours;
    };
    if position > 0 {
        neighbours.push(creatures[position - 1]);
    }
    if let Some(&next) = creatures.get(position + 1) {
        neighbours.push(next);
    }
    neighbours
}

/// Directly neighbouring slots (`index ± 1`) that hold creatures.
#[must_use]
pub fn slot_neighbours(board: &Board, index: usize, library: &CardLibrary) -> SmallVec<[usize; 2]> {
    let mut neighbours = SmallVec::new();
    if index > 0 && is_creature_at(board, index - 1, library) {
        neighbours.push(index - 1);
    }
    if is_creature_at(board, index + 1, library) {
        neighbours.push(index + 1);
    }
    neighbours
}

/// A `testudo` creature with other creatures on both sides is covered.
#[must_use]
pub fn has_testudo_cover(board: &Board, index: usize, library: &CardLibrary) -> bool {
    let Some(unit) = board.get(index) else {
        return false;
    };
    if !is_creature(unit, library) || !unit.has_keyword(Keyword::Testudo) {
        return false;
    }
    let creatures = creature_indexes(board, library);
    match creatures.iter().position(|&i| i == index) {
        Some(position) => position > 0 && position + 1 < creatures.len(),
        None => false,
    }
}

/// First creature slot after `index`, or the board length.
#[must_use]
pub fn next_creature_index(board: &Board, index: usize, library: &CardLibrary) -> usize {
    (index + 1..board.len())
        .find(|&i| is_creature_at(board, i, library))
        .unwrap_or(board.len())
}

/// Resolve a reference against one side's board.
///
/// Slot tokens for `side` resolve positionally; anything else is matched
/// against uids, then card ids. Slot tokens for the other side never match.
#[must_use]
pub fn find_index(state: &GameState, side: BoardSide, reference: &str) -> Option<usize> {
    let board = state.board(side);
    match action::parse_slot(reference) {
        Some((slot_side, index)) if slot_side == side => index.filter(|&i| i < board.len()),
        _ => board
            .iter()
            .position(|u| u.uid == reference)
            .or_else(|| board.iter().position(|u| u.card == reference)),
    }
}

/// Resolve a reference to a creature on either board.
///
/// Slot tokens pick their side; bare uids are looked up on the player
/// board first.
#[must_use]
pub fn resolve_creature(
    state: &GameState,
    reference: &str,
    library: &CardLibrary,
) -> Option<(BoardSide, usize)> {
    let found = match action::parse_slot(reference) {
        Some((side, index)) => index
            .filter(|&i| i < state.board(side).len())
            .map(|i| (side, i)),
        None => [BoardSide::Player, BoardSide::Opponent]
            .into_iter()
            .find_map(|side| {
                let board = state.board(side);
                board
                    .iter()
                    .position(|u| u.uid == reference && is_creature(u, library))
                    .map(|i| (side, i))
            }),
    };
    found.filter(|&(side, i)| is_creature_at(state.board(side), i, library))
}

/// Index of the creature with this uid.
#[must_use]
pub fn find_creature_by_uid(board: &Board, uid: &str, library: &CardLibrary) -> Option<usize> {
    board
        .iter()
        .position(|u| u.uid == uid && is_creature(u, library))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType};

    fn library() -> CardLibrary {
        CardLibrary::from_definitions([
            CardDefinition::new("wall", "Wall", CardType::Creature, 1)
                .with_power(2)
                .with_keyword(Keyword::Testudo),
            CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(1),
            CardDefinition::new("banner", "Banner", CardType::Effect, 1),
        ])
    }

    fn unit(card: &str, uid: &str) -> CardInstance {
        let mut u = CardInstance::unassigned(card, 1);
        u.uid = uid.to_string();
        if card == "wall" {
            u.keywords.push(Keyword::Testudo);
        }
        u
    }

    fn board(cards: &[&str]) -> Board {
        cards
            .iter()
            .enumerate()
            .map(|(i, c)| unit(c, &format!("p{}", i + 1)))
            .collect()
    }

    #[test]
    fn test_adjacency_skips_effects() {
        let lib = library();
        let b = board(&["grunt", "banner", "wall", "grunt"]);
        assert_eq!(adjacent_creatures(&b, 2, &lib).as_slice(), &[0, 3]);
        assert_eq!(slot_neighbours(&b, 2, &lib).as_slice(), &[3]);
        assert!(adjacent_creatures(&b, 1, &lib).is_empty());
    }

    #[test]
    fn test_testudo_cover() {
        let lib = library();
        assert!(has_testudo_cover(&board(&["grunt", "wall", "grunt"]), 1, &lib));
        assert!(has_testudo_cover(&board(&["grunt", "banner", "wall", "grunt"]), 2, &lib));
        assert!(!has_testudo_cover(&board(&["wall", "grunt"]), 0, &lib));
        assert!(!has_testudo_cover(&board(&["banner", "wall", "banner"]), 1, &lib));
    }

    #[test]
    fn test_next_creature_index() {
        let lib = library();
        let b = board(&["grunt", "banner", "grunt"]);
        assert_eq!(next_creature_index(&b, 0, &lib), 2);
        assert_eq!(next_creature_index(&b, 2, &lib), 3);
    }

    #[test]
    fn test_find_index_by_slot_uid_and_card() {
        let lib = library();
        let mut state = GameState::default();
        state.player.board = board(&["grunt", "wall"]);
        state.opponent.board = vec![unit("grunt", "o9")].into_iter().collect();

        assert_eq!(find_index(&state, BoardSide::Player, "player:slot1"), Some(1));
        assert_eq!(find_index(&state, BoardSide::Player, "player:slot5"), None);
        assert_eq!(find_index(&state, BoardSide::Player, "p2"), Some(1));
        assert_eq!(find_index(&state, BoardSide::Player, "wall"), Some(1));
        assert_eq!(find_index(&state, BoardSide::Player, "opponent:slot0"), None);
        assert_eq!(find_index(&state, BoardSide::Opponent, "o9"), Some(0));

        assert_eq!(
            resolve_creature(&state, "o9", &lib),
            Some((BoardSide::Opponent, 0))
        );
        assert_eq!(
            resolve_creature(&state, "player:slot0", &lib),
            Some((BoardSide::Player, 0))
        );
    }
}
