//! Generator card pools and boss-board synthesis.

use crate::cards::{CardDefinition, CardId, CardInstance, CardLibrary, CardType};
use crate::core::{Board, GameRng};
use crate::rules::play::attach_mod;

/// Whether a mod may be attached to a boss creature: it must be a mod and
/// carry no effect that would be unfair on the boss's side.
#[must_use]
pub fn is_boss_mod_allowed(def: &CardDefinition) -> bool {
    def.card_type == CardType::Mod && !def.effects.iter().any(|e| e.is_unfair_on_boss())
}

/// Card pools drawn from during generation, in library order.
#[derive(Clone, Debug, Default)]
pub struct GeneratorPools {
    /// Cards a hand may be drawn from.
    pub playable: Vec<CardDefinition>,
    /// Creatures a boss board may be drawn from.
    pub creatures: Vec<CardDefinition>,
    /// Mod ids a boss creature may carry.
    pub boss_mods: Vec<CardId>,
}

impl GeneratorPools {
    /// Every card is playable; boss mods pass [`is_boss_mod_allowed`].
    #[must_use]
    pub fn from_library(library: &CardLibrary) -> Self {
        Self::with_filters(library, |_| true, is_boss_mod_allowed)
    }

    /// Pools with custom playable and boss-mod predicates.
    pub fn with_filters<P, M>(library: &CardLibrary, playable: P, boss_mod: M) -> Self
    where
        P: Fn(&CardDefinition) -> bool,
        M: Fn(&CardDefinition) -> bool,
    {
        Self {
            playable: library.find(playable).cloned().collect(),
            creatures: library.find(CardDefinition::is_creature).cloned().collect(),
            boss_mods: library
                .find(|def| def.card_type == CardType::Mod && boss_mod(def))
                .map(|def| def.id.clone())
                .collect(),
        }
    }
}

/// Boss-board size and mod settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BossBoardSpec {
    pub min: usize,
    pub max: usize,
    pub mods_max: usize,
}

/// Draw a boss board of `min..=max` creatures, each carrying up to
/// `mods_max` distinct mods from the pool.
///
/// Returns `None` when creatures are required but none can be drawn.
/// Picks without stats are skipped, so the board may come out smaller
/// than the drawn count. Units are left without uids.
pub fn build_boss_board(
    rng: &mut GameRng,
    pools: &GeneratorPools,
    spec: BossBoardSpec,
    library: &CardLibrary,
) -> Option<Board> {
    let min = spec.min;
    let max = spec.max.max(min);
    if pools.creatures.is_empty() || max == 0 {
        return (min == 0).then(Board::new);
    }

    let count = min + rng.int(max - min + 1);
    let mut board = Board::new();
    for _ in 0..count {
        let Some(pick) = rng.pick(&pools.creatures) else {
            break;
        };
        if pick.stats.is_none() {
            continue;
        }
        let mut unit = CardInstance::from_definition(pick, String::new());
        apply_boss_mods(&mut unit, rng, &pools.boss_mods, spec.mods_max, library);
        board.push_back(unit);
    }
    Some(board)
}

fn apply_boss_mods(
    unit: &mut CardInstance,
    rng: &mut GameRng,
    pool: &[CardId],
    mods_max: usize,
    library: &CardLibrary,
) {
    if pool.is_empty() || mods_max == 0 {
        return;
    }
    let count = rng.int(mods_max.min(pool.len()) + 1);
    let mut available = pool.to_vec();
    for _ in 0..count {
        if available.is_empty() {
            break;
        }
        let pick = available.remove(rng.int(available.len()));
        if let Some(def) = library.get(pick.as_str()).filter(|d| d.card_type == CardType::Mod) {
            attach_mod(unit, def);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Effect, Keyword};

    fn library() -> CardLibrary {
        CardLibrary::from_definitions([
            CardDefinition::new("ox", "Ox", CardType::Creature, 3)
                .with_power(5)
                .with_keyword(Keyword::Guard),
            CardDefinition::new("spark", "Spark", CardType::Spell, 1),
            CardDefinition::new("shield", "Shield", CardType::Mod, 1)
                .with_effect(Effect::Buff {
                    amount: -1,
                    requires: None,
                })
                .with_effect(Effect::Shield { amount: 1 }),
            CardDefinition::new("rune", "Rune", CardType::Mod, 2).with_effect(Effect::GrantKeyword {
                keyword: Keyword::Pierce,
            }),
            CardDefinition::new("requiem", "Requiem", CardType::Mod, 1)
                .with_effect(Effect::DeathDamageBoss { amount: 2 }),
        ])
    }

    #[test]
    fn test_boss_mod_filter() {
        let lib = library();
        assert!(is_boss_mod_allowed(lib.get("shield").unwrap()));
        assert!(!is_boss_mod_allowed(lib.get("rune").unwrap()));
        assert!(!is_boss_mod_allowed(lib.get("requiem").unwrap()));
        assert!(!is_boss_mod_allowed(lib.get("ox").unwrap()));
    }

    #[test]
    fn test_pools() {
        let pools = GeneratorPools::from_library(&library());
        assert_eq!(pools.playable.len(), 5);
        assert_eq!(pools.creatures.len(), 1);
        assert_eq!(pools.boss_mods, vec![CardId::new("shield")]);

        let spells = GeneratorPools::with_filters(&library(), |d| d.card_type == CardType::Spell, |_| true);
        assert_eq!(spells.playable.len(), 1);
        assert_eq!(spells.boss_mods.len(), 3);
    }

    #[test]
    fn test_board_size_and_mods() {
        let lib = library();
        let pools = GeneratorPools::from_library(&lib);
        let spec = BossBoardSpec { min: 1, max: 3, mods_max: 1 };
        for seed in 0..30 {
            let board = build_boss_board(&mut GameRng::new(seed), &pools, spec, &lib).unwrap();
            assert!((1..=3).contains(&board.len()));
            for unit in &board {
                assert!(unit.uid.is_empty());
                assert!(unit.has_keyword(Keyword::Guard));
                match unit.mods.len() {
                    0 => assert_eq!(unit.power, 5),
                    1 => {
                        assert_eq!(unit.power, 4);
                        assert_eq!(unit.shield, 1);
                    }
                    n => panic!("too many mods: {n}"),
                }
            }
        }
    }

    #[test]
    fn test_impossible_board() {
        let lib = CardLibrary::from_definitions([CardDefinition::new("spark", "Spark", CardType::Spell, 1)]);
        let pools = GeneratorPools::from_library(&lib);
        let mut rng = GameRng::new(1);
        let need_one = BossBoardSpec { min: 1, max: 2, mods_max: 0 };
        assert!(build_boss_board(&mut rng, &pools, need_one, &lib).is_none());
        let none = BossBoardSpec::default();
        assert_eq!(build_boss_board(&mut rng, &pools, none, &lib), Some(Board::new()));
    }
}
