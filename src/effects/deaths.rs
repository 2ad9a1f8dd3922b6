//! Death resolution and anchored-aura settlement.
//!
//! A death pass removes every creature at or below zero power from both
//! boards (player first), replaces `rebirth` creatures in place, applies
//! death damage/heal from the dead units' mods and queues their splash.
//! Splash damage can kill more units, which needs another pass before the
//! first pass's counters and scavenger buffs are applied; the pending
//! stack below keeps that nesting order without recursion.

use crate::cards::{CardInstance, CardLibrary, Effect, Keyword};
use crate::core::{Board, BoardSide, GameState};

use super::damage::damage_unit;
use super::passive::{apply_death_counters, has_mod_effect, mod_sum};
use super::targeting::{find_creature_by_uid, is_creature, slot_neighbours};

/// What one board lost in a pass.
#[derive(Debug, Default)]
struct BoardDeaths {
    deaths: u32,
    boss_damage: i32,
    boss_heal: i32,
    splash: Vec<i32>,
}

/// Run death passes until nothing is at or below zero power.
///
/// Idempotent: on a resolved state this changes nothing.
pub fn resolve_deaths(state: &mut GameState, library: &CardLibrary) {
    let mut pending: Vec<u32> = Vec::new();
    let mut needs_pass = true;
    while needs_pass {
        needs_pass = false;
        if let Some((deaths, splashed)) = death_pass(state, library) {
            pending.push(deaths);
            if splashed {
                needs_pass = true;
                continue;
            }
        }
        while let Some(deaths) = pending.pop() {
            let count = i32::try_from(deaths).unwrap_or(i32::MAX);
            apply_death_counters(state, library, count);
            apply_scavenger_buffs(state, library, count);
            if settle_anchored(state, library) {
                needs_pass = true;
                break;
            }
        }
    }
}

/// One rebuild of both boards. Returns the death count and whether splash
/// damage landed on anything, or `None` when nobody died.
fn death_pass(state: &mut GameState, library: &CardLibrary) -> Option<(u32, bool)> {
    let player = rebuild_board(state, BoardSide::Player, library);
    let opponent = rebuild_board(state, BoardSide::Opponent, library);
    let deaths = player.deaths + opponent.deaths;
    if deaths == 0 {
        return None;
    }
    state.round_deaths += deaths;
    state.damage_opponent(player.boss_damage + opponent.boss_damage);
    state.heal_opponent(player.boss_heal + opponent.boss_heal);

    let hit_opponent = splash_board(state, BoardSide::Opponent, &player.splash, library);
    let hit_player = splash_board(state, BoardSide::Player, &opponent.splash, library);
    Some((deaths, hit_opponent || hit_player))
}

fn rebuild_board(state: &mut GameState, side: BoardSide, library: &CardLibrary) -> BoardDeaths {
    let mut result = BoardDeaths::default();
    let old = std::mem::take(state.board_mut(side));
    let mut next = Board::new();
    for unit in old {
        if !is_creature(&unit, library) || unit.power > 0 {
            next.push_back(unit);
            continue;
        }
        result.deaths += 1;
        result.boss_damage += mod_sum(&unit, library, |e| match e {
            Effect::DeathDamageBoss { amount } => Some(*amount),
            _ => None,
        });
        result.boss_heal += mod_sum(&unit, library, |e| match e {
            Effect::DeathHealBoss { amount } => Some(*amount),
            _ => None,
        });
        let Some(def) = library.get(unit.card.as_str()) else {
            continue;
        };
        let splash = def.sum_effects(|e| match e {
            Effect::DeathDamageAllEnemies { amount } => Some(*amount),
            _ => None,
        });
        if splash > 0 {
            result.splash.push(splash);
        }
        if unit.has_keyword(Keyword::Rebirth) {
            let rebirths = unit.rebirths + 1;
            let uid = state.allocate_uid(side);
            let mut reborn = CardInstance::from_definition(def, uid);
            reborn.power = def.base_power().unwrap_or(1) + rebirths;
            reborn.rebirths = rebirths;
            reborn.tired = unit.tired;
            reborn.borrowed = unit.borrowed;
            reborn.borrowed_multiplier = unit.borrowed_multiplier;
            next.push_back(reborn);
        }
    }
    *state.board_mut(side) = next;
    result
}

/// Apply each splash amount to every creature on `side`, snapshotting uids
/// first since hits can spawn units.
fn splash_board(state: &mut GameState, side: BoardSide, splash: &[i32], library: &CardLibrary) -> bool {
    let mut applied = false;
    for &amount in splash.iter().filter(|&&a| a > 0) {
        let targets: Vec<String> = state
            .board(side)
            .iter()
            .filter(|u| is_creature(u, library))
            .map(|u| u.uid.clone())
            .collect();
        if targets.is_empty() {
            continue;
        }
        applied = true;
        for uid in targets {
            if let Some(index) = find_creature_by_uid(state.board(side), &uid, library) {
                damage_unit(state, side, index, amount, library);
            }
        }
    }
    applied
}

/// Every scavenger on both boards gains power per death.
fn apply_scavenger_buffs(state: &mut GameState, library: &CardLibrary, count: i32) {
    if count <= 0 {
        return;
    }
    for side in [BoardSide::Player, BoardSide::Opponent] {
        for unit in state.board_mut(side).iter_mut() {
            if is_creature(unit, library) && unit.has_keyword(Keyword::Scavenger) {
                unit.power += count;
            }
        }
    }
}

/// Re-apply anchored-aura adjacency bonuses as deltas against each
/// creature's last applied bonus.
///
/// Returns true if a creature ended at or below zero power.
pub fn settle_anchored(state: &mut GameState, library: &CardLibrary) -> bool {
    let mut death = false;
    for side in [BoardSide::Player, BoardSide::Opponent] {
        let board = state.board(side);
        let mut desired = vec![0; board.len()];
        for (index, unit) in board.iter().enumerate() {
            if !is_creature(unit, library)
                || !has_mod_effect(unit, library, |e| matches!(e, Effect::AnchoredAura { .. }))
            {
                continue;
            }
            let sum = mod_sum(unit, library, |e| match e {
                Effect::AnchoredAura { amount } => Some(*amount),
                _ => None,
            });
            let amount = if sum == 0 { 1 } else { sum };
            for neighbour in slot_neighbours(board, index, library) {
                desired[neighbour] += amount;
            }
        }
        for (unit, bonus) in state.board_mut(side).iter_mut().zip(desired) {
            if !is_creature(unit, library) || unit.anchored_bonus == bonus {
                continue;
            }
            unit.power += bonus - unit.anchored_bonus;
            unit.anchored_bonus = bonus;
            if unit.power <= 0 {
                death = true;
            }
        }
    }
    death
}

/// Settle anchored bonuses and resolve any deaths that causes.
pub fn settle_anchored_and_resolve(state: &mut GameState, library: &CardLibrary) {
    if settle_anchored(state, library) {
        resolve_deaths(state, library);
    }
}
