//! Passive effects read off permanents and mods.
//!
//! Effect permanents on the player board are never "applied" at play time;
//! the functions here read their effect lists when the relevant moment
//! comes (attack, cast, end of round).

use crate::cards::{CardInstance, CardLibrary, CardType, Effect};
use crate::core::{BoardSide, GameState};

use super::targeting::{is_creature, slot_neighbours};

/// Sum `extract` over effect permanents on the player board.
pub fn player_permanent_sum<F>(state: &GameState, library: &CardLibrary, extract: F) -> i32
where
    F: Fn(&Effect) -> Option<i32>,
{
    state
        .player
        .board
        .iter()
        .filter_map(|u| library.get(u.card.as_str()))
        .filter(|def| def.card_type == CardType::Effect)
        .map(|def| def.sum_effects(&extract))
        .sum()
}

/// Sum `extract` over the mod definitions attached to a unit.
pub fn mod_sum<F>(unit: &CardInstance, library: &CardLibrary, extract: F) -> i32
where
    F: Fn(&Effect) -> Option<i32>,
{
    unit.mods
        .iter()
        .filter_map(|m| library.get(m.as_str()))
        .filter(|def| def.card_type == CardType::Mod)
        .map(|def| def.sum_effects(&extract))
        .sum()
}

/// Whether any attached mod carries an effect matching `predicate`.
pub fn has_mod_effect<F>(unit: &CardInstance, library: &CardLibrary, predicate: F) -> bool
where
    F: Fn(&Effect) -> bool,
{
    unit.mods
        .iter()
        .filter_map(|m| library.get(m.as_str()))
        .filter(|def| def.card_type == CardType::Mod)
        .any(|def| def.has_effect(&predicate))
}

/// Bonus attack power granted by player auras.
#[must_use]
pub fn attack_aura(state: &GameState, library: &CardLibrary) -> i32 {
    player_permanent_sum(state, library, |e| match e {
        Effect::Aura { amount } => Some(*amount),
        _ => None,
    })
}

/// Add `count × cast_counter` to each player permanent's counter.
pub fn apply_cast_counters(state: &mut GameState, library: &CardLibrary, count: i32) {
    bump_counters(state, library, count, |e| match e {
        Effect::CastCounter { amount } => Some(*amount),
        _ => None,
    });
}

/// Add `count × death_counter` to each player permanent's counter.
pub fn apply_death_counters(state: &mut GameState, library: &CardLibrary, count: i32) {
    bump_counters(state, library, count, |e| match e {
        Effect::DeathCounter { amount } => Some(*amount),
        _ => None,
    });
}

fn bump_counters<F>(state: &mut GameState, library: &CardLibrary, count: i32, extract: F)
where
    F: Fn(&Effect) -> Option<i32>,
{
    if count <= 0 {
        return;
    }
    for unit in state.player.board.iter_mut() {
        let Some(def) = library.get(unit.card.as_str()) else {
            continue;
        };
        if def.card_type != CardType::Effect {
            continue;
        }
        let amount = def.sum_effects(&extract);
        if amount != 0 {
            unit.counter += amount * count;
        }
    }
}

/// Mana refund after a mod is played.
pub fn apply_mana_on_mod(state: &mut GameState, library: &CardLibrary) {
    let total = player_permanent_sum(state, library, |e| match e {
        Effect::ManaOnMod { amount } => Some(*amount),
        _ => None,
    });
    if total > 0 {
        state.player.mana += total;
    }
}

/// Untired player creatures gain the summed `end_buff`.
pub fn apply_end_buffs(state: &mut GameState, library: &CardLibrary) {
    let bonus = player_permanent_sum(state, library, |e| match e {
        Effect::EndBuff { amount } => Some(*amount),
        _ => None,
    });
    if bonus == 0 {
        return;
    }
    for unit in state.player.board.iter_mut() {
        if is_creature(unit, library) && !unit.tired {
            unit.power += bonus;
        }
    }
}

/// Flank: creatures carrying an `end_adjacent_buff` mod buff the creatures
/// in the slots directly beside them.
pub fn apply_flank_buffs(state: &mut GameState, side: BoardSide, library: &CardLibrary) {
    let board = state.board(side);
    let mut buffs = vec![0; board.len()];
    for (index, unit) in board.iter().enumerate() {
        if !is_creature(unit, library) {
            continue;
        }
        let amount = mod_sum(unit, library, |e| match e {
            Effect::EndAdjacentBuff { amount } => Some(*amount),
            _ => None,
        });
        if amount == 0 {
            continue;
        }
        for neighbour in slot_neighbours(board, index, library) {
            buffs[neighbour] += amount;
        }
    }
    for (unit, buff) in state.board_mut(side).iter_mut().zip(buffs) {
        unit.power += buff;
    }
}

/// Creatures on both boards apply their own `end_self_buff`.
///
/// Returns whether any power changed.
pub fn apply_end_self_buffs(state: &mut GameState, library: &CardLibrary) -> bool {
    let mut changed = false;
    for side in [BoardSide::Player, BoardSide::Opponent] {
        for unit in state.board_mut(side).iter_mut() {
            let Some(def) = library.get(unit.card.as_str()) else {
                continue;
            };
            if !def.is_creature() {
                continue;
            }
            for effect in &def.effects {
                if let Effect::EndSelfBuff { amount } = effect {
                    if *amount != 0 {
                        unit.power += amount;
                        changed = true;
                    }
                }
            }
        }
    }
    changed
}

/// Flat end-of-round boss damage.
pub fn apply_end_boss_damage(state: &mut GameState, library: &CardLibrary) {
    let total = player_permanent_sum(state, library, |e| match e {
        Effect::EndDamageBoss { amount } => Some(*amount),
        _ => None,
    });
    state.damage_opponent(total);
}

/// End-of-round mana delta; mana never goes negative.
pub fn apply_end_mana(state: &mut GameState, library: &CardLibrary) {
    let total = player_permanent_sum(state, library, |e| match e {
        Effect::EndMana { amount } => Some(*amount),
        _ => None,
    });
    if total != 0 {
        state.player.mana = (state.player.mana + total).max(0);
    }
}

/// Each player permanent whose mass-death threshold was met this round
/// clones the strongest boss creature onto the player board.
pub fn apply_mass_death_clones(state: &mut GameState, library: &CardLibrary) {
    let deaths = i64::from(state.round_deaths);
    if deaths == 0 {
        return;
    }
    let clones = state
        .player
        .board
        .iter()
        .filter_map(|u| library.get(u.card.as_str()))
        .filter(|def| def.card_type == CardType::Effect)
        .filter(|def| {
            def.has_effect(|e| {
                matches!(e, Effect::EndCloneBossOnMassDeath { amount } if deaths >= i64::from(*amount))
            })
        })
        .count();
    if clones == 0 {
        return;
    }
    let mut strongest: Option<&CardInstance> = None;
    for unit in state.opponent.board.iter().filter(|u| is_creature(u, library)) {
        if strongest.map_or(true, |s| unit.power > s.power) {
            strongest = Some(unit);
        }
    }
    let Some(template) = strongest.cloned() else {
        return;
    };
    for _ in 0..clones {
        let uid = state.allocate_uid(BoardSide::Player);
        state.player.board.push_back(CardInstance {
            uid,
            counter: 0,
            borrowed: false,
            borrowed_multiplier: 0,
            anchored_bonus: 0,
            ..template.clone()
        });
    }
}

/// Send borrowed creatures home, multiplying their power.
pub fn return_borrowed(state: &mut GameState) {
    let (returning, staying): (Vec<_>, Vec<_>) =
        state.player.board.iter().cloned().partition(|u| u.borrowed);
    if returning.is_empty() {
        return;
    }
    state.player.board = staying.into_iter().collect();
    for mut unit in returning {
        let multiplier = if unit.borrowed_multiplier > 0 {
            unit.borrowed_multiplier
        } else {
            2
        };
        unit.power *= multiplier;
        unit.borrowed = false;
        unit.borrowed_multiplier = 0;
        unit.tired = false;
        state.opponent.board.push_back(unit);
    }
}
