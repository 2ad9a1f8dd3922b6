//! Damage primitives for board units.
//!
//! Damage never removes a unit by itself; callers run death resolution
//! afterwards.

use crate::cards::{CardInstance, CardLibrary, Keyword, BROODLING_ID, WOODEN_SHIELD_ID};
use crate::core::{BoardSide, GameState};

use super::targeting::{is_creature, next_creature_index};

/// Outcome of a single damage instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Not a creature, or a non-positive amount.
    Ignored,
    /// A shield charge absorbed it.
    Absorbed,
    /// Power was reduced.
    Dealt,
}

/// Deal `amount` to the creature at `index` on `side`.
///
/// A shield charge absorbs the whole hit and consumes one wooden-shield mod
/// tag. A `brood` creature that survives a hit spawns a Broodling right
/// after itself.
pub fn damage_unit(
    state: &mut GameState,
    side: BoardSide,
    index: usize,
    amount: i32,
    library: &CardLibrary,
) -> Hit {
    if amount <= 0 {
        return Hit::Ignored;
    }
    let spawn = {
        let Some(unit) = state.board_mut(side).get_mut(index) else {
            return Hit::Ignored;
        };
        if !is_creature(unit, library) {
            return Hit::Ignored;
        }
        if unit.shield > 0 {
            unit.shield -= 1;
            if let Some(pos) = unit.mods.iter().position(|m| m == WOODEN_SHIELD_ID) {
                unit.mods.remove(pos);
            }
            return Hit::Absorbed;
        }
        let before = unit.power;
        unit.power -= amount;
        unit.power < before && unit.power > 0 && unit.has_keyword(Keyword::Brood)
    };
    if spawn {
        spawn_broodling_after(state, side, index, library);
    }
    Hit::Dealt
}

/// Fresh Broodling instance, if the library defines one as a creature.
fn broodling(state: &mut GameState, side: BoardSide, library: &CardLibrary) -> Option<CardInstance> {
    let def = library.get(BROODLING_ID).filter(|d| d.is_creature())?;
    let uid = state.allocate_uid(side);
    let mut unit = CardInstance::from_definition(def, uid);
    unit.power = def.base_power().unwrap_or(1);
    Some(unit)
}

/// Insert a Broodling at the next creature slot after `index`.
pub fn spawn_broodling_after(
    state: &mut GameState,
    side: BoardSide,
    index: usize,
    library: &CardLibrary,
) {
    let insert_at = next_creature_index(state.board(side), index, library);
    if let Some(unit) = broodling(state, side, library) {
        state.board_mut(side).insert(insert_at, unit);
    }
}

/// Push a Broodling at the end of a board.
pub fn spawn_broodling_at_end(state: &mut GameState, side: BoardSide, library: &CardLibrary) {
    if let Some(unit) = broodling(state, side, library) {
        state.board_mut(side).push_back(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType};

    fn library() -> CardLibrary {
        CardLibrary::from_definitions([
            CardDefinition::new("broodmother", "Broodmother", CardType::Creature, 3)
                .with_power(3)
                .with_keyword(Keyword::Brood),
            CardDefinition::new("broodling", "Broodling", CardType::Creature, 0).with_power(1),
            CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
            CardDefinition::new("banner", "Banner", CardType::Effect, 1),
        ])
    }

    fn state_with(cards: &[(&str, i32)]) -> GameState {
        let lib = library();
        let mut state = GameState::default();
        for (card, power) in cards {
            let mut unit = CardInstance::from_definition(lib.get(card).unwrap(), "");
            unit.power = *power;
            state.player.board.push_back(unit);
        }
        state.normalize()
    }

    #[test]
    fn test_shield_absorbs_and_drops_tag() {
        let lib = library();
        let mut state = state_with(&[("grunt", 2)]);
        state.player.board[0].shield = 1;
        state.player.board[0].mods.push(WOODEN_SHIELD_ID.into());

        assert_eq!(damage_unit(&mut state, BoardSide::Player, 0, 5, &lib), Hit::Absorbed);
        assert_eq!(state.player.board[0].power, 2);
        assert_eq!(state.player.board[0].shield, 0);
        assert!(state.player.board[0].mods.is_empty());

        assert_eq!(damage_unit(&mut state, BoardSide::Player, 0, 1, &lib), Hit::Dealt);
        assert_eq!(state.player.board[0].power, 1);
    }

    #[test]
    fn test_non_creatures_and_zero_amounts_are_ignored() {
        let lib = library();
        let mut state = state_with(&[("banner", 0), ("grunt", 2)]);
        assert_eq!(damage_unit(&mut state, BoardSide::Player, 0, 3, &lib), Hit::Ignored);
        assert_eq!(damage_unit(&mut state, BoardSide::Player, 1, 0, &lib), Hit::Ignored);
        assert_eq!(damage_unit(&mut state, BoardSide::Player, 9, 1, &lib), Hit::Ignored);
    }

    #[test]
    fn test_brood_spawns_after_self_when_surviving() {
        let lib = library();
        let mut state = state_with(&[("broodmother", 3), ("banner", 0), ("grunt", 2)]);
        damage_unit(&mut state, BoardSide::Player, 0, 2, &lib);

        let cards: Vec<_> = state.player.board.iter().map(|u| u.card.to_string()).collect();
        assert_eq!(cards, vec!["broodmother", "banner", "broodling", "grunt"]);
        assert_eq!(state.player.board[2].uid, "p4");
    }

    #[test]
    fn test_brood_does_not_spawn_on_death() {
        let lib = library();
        let mut state = state_with(&[("broodmother", 3)]);
        damage_unit(&mut state, BoardSide::Player, 0, 3, &lib);
        assert_eq!(state.player.board.len(), 1);
    }
}
