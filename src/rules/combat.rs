//! Attacks and activated abilities.

use crate::cards::{BuffRequirement, CardLibrary, CardType, Effect, Keyword};
use crate::core::action::{self, BoardSide, OPPONENT};
use crate::core::GameState;
use crate::effects::passive::{attack_aura, has_mod_effect};
use crate::effects::targeting::{
    adjacent_creatures, find_index, guard_indexes, has_creatures, has_testudo_cover, is_creature,
    is_creature_at,
};
use crate::effects::{damage_unit, resolve_deaths};
use crate::error::{EngineError, EngineResult};

/// Resolve an attack from a ready player creature.
///
/// The hero can only be attacked when the enemy board holds no creatures;
/// otherwise a guard, if any, must be the target. Both sides trade damage
/// unless covered by testudo.
pub(crate) fn apply_attack(
    state: &mut GameState,
    source: &str,
    target: &str,
    library: &CardLibrary,
) -> EngineResult<()> {
    let source_index = find_index(state, BoardSide::Player, source)
        .ok_or_else(|| EngineError::InvalidSource(source.to_string()))?;
    let attacker = &state.player.board[source_index];
    if !is_creature(attacker, library) {
        return Err(EngineError::SourceNotCreature);
    }
    if attacker.tired {
        return Err(EngineError::SourceTired);
    }
    if has_mod_effect(attacker, library, |e| matches!(e, Effect::NoAttack)) {
        return Err(EngineError::SourceCannotAttack);
    }

    let attack_power = attacker.power + attack_aura(state, library);
    let venom = attacker.has_keyword(Keyword::Venom);
    let pierce = attacker.has_keyword(Keyword::Pierce);
    let relay = attacker.has_keyword(Keyword::Relay);
    let dies_after = has_mod_effect(attacker, library, |e| matches!(e, Effect::DeathAfterAttack));

    if target == OPPONENT {
        if has_creatures(&state.opponent.board, library) {
            return Err(EngineError::EnemyMinionsPresent);
        }
        state.damage_opponent(attack_power);
        if venom {
            state.opponent.poison += 1;
        }
        finish_attack(state, source_index, dies_after, library);
        return Ok(());
    }

    let target_index = find_index(state, BoardSide::Opponent, target)
        .ok_or_else(|| EngineError::InvalidTarget(target.to_string()))?;
    let guards = guard_indexes(&state.opponent.board, library);
    if !guards.is_empty() && !guards.contains(&target_index) {
        return Err(EngineError::GuardPresent);
    }
    if !is_creature_at(&state.opponent.board, target_index, library) {
        return Err(EngineError::TargetNotCreature);
    }

    let attacker_covered = has_testudo_cover(&state.player.board, source_index, library);
    let defender_covered = has_testudo_cover(&state.opponent.board, target_index, library);
    let defender = &state.opponent.board[target_index];
    let defender_power = defender.power;
    let dealt = if defender_covered || defender.shield > 0 {
        0
    } else {
        attack_power.max(0)
    };

    if !defender_covered {
        damage_unit(state, BoardSide::Opponent, target_index, attack_power, library);
    }
    if !attacker_covered {
        damage_unit(state, BoardSide::Player, source_index, defender_power, library);
    }
    if venom {
        if let Some(defender) = state.opponent.board.get_mut(target_index) {
            defender.poison += 1;
        }
    }
    if pierce && attack_power > defender_power {
        state.damage_opponent(attack_power - defender_power);
    }
    if relay && dealt > 0 {
        for index in adjacent_creatures(&state.player.board, source_index, library) {
            if let Some(ally) = state.player.board.get_mut(index) {
                ally.power += dealt;
            }
        }
    }
    finish_attack(state, source_index, dies_after, library);
    Ok(())
}

/// Tire the attacker, kill it if it is doomed, then run one death pass.
fn finish_attack(state: &mut GameState, source_index: usize, dies_after: bool, library: &CardLibrary) {
    if let Some(unit) = state.player.board.get_mut(source_index) {
        unit.tired = true;
        if dies_after {
            unit.power = 0;
        }
    }
    resolve_deaths(state, library);
}

/// Resolve an activated ability.
///
/// Effect permanents with `activate_damage` or `activate_mana` use those;
/// anything else must be a ready `sacrifice` creature buffing another
/// friendly unit.
pub(crate) fn apply_activate(
    state: &mut GameState,
    source: &str,
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    let source_index = find_index(state, BoardSide::Player, source)
        .ok_or_else(|| EngineError::InvalidSource(source.to_string()))?;
    let unit = &state.player.board[source_index];
    let def = library.get(unit.card.as_str());

    if let Some(def) = def.filter(|d| d.card_type == CardType::Effect) {
        let damage = def.effects.iter().find_map(|e| match e {
            Effect::ActivateDamage { amount, threshold } => Some((*amount, *threshold)),
            _ => None,
        });
        if let Some((amount, threshold)) = damage {
            let target = target.ok_or(EngineError::ActivateRequiresTarget)?;
            return activate_damage(state, source_index, amount, threshold, target, library);
        }
        if def.has_effect(|e| matches!(e, Effect::ActivateMana)) {
            return activate_mana(state, source_index);
        }
    }

    let def = def
        .filter(|d| d.is_creature() && unit.has_keyword(Keyword::Sacrifice))
        .ok_or(EngineError::NotSacrificial)?;
    if unit.tired {
        return Err(EngineError::SourceTired);
    }
    if has_mod_effect(unit, library, |e| matches!(e, Effect::NoAttack)) {
        return Err(EngineError::SourceCannotAttack);
    }
    let target = target.ok_or(EngineError::ActivateRequiresTarget)?;
    let target_index = find_index(state, BoardSide::Player, target)
        .ok_or_else(|| EngineError::InvalidTarget(target.to_string()))?;
    if target_index == source_index {
        return Err(EngineError::CannotTargetSelf);
    }
    let amount = def
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Buff {
                amount,
                requires: Some(BuffRequirement::SacrificeSelf),
            } => Some(*amount),
            _ => None,
        })
        .ok_or(EngineError::NoSacrificeBuff)?;

    let target_uid = state.player.board[target_index].uid.clone();
    if let Some(source) = state.player.board.get_mut(source_index) {
        source.power = 0;
    }
    resolve_deaths(state, library);
    if let Some(ally) = state.player.board.iter_mut().find(|u| u.uid == target_uid) {
        ally.power += amount;
    }
    Ok(())
}

fn activate_damage(
    state: &mut GameState,
    source_index: usize,
    amount: i32,
    threshold: i32,
    target: &str,
    library: &CardLibrary,
) -> EngineResult<()> {
    let source = &state.player.board[source_index];
    if source.counter < threshold {
        return Err(EngineError::NotEnoughCounters);
    }
    let source_uid = source.uid.clone();

    if target == OPPONENT {
        state.damage_opponent(amount);
    } else {
        let side = match action::parse_slot(target) {
            Some((side, _)) => side,
            None => return Err(EngineError::InvalidTarget(target.to_string())),
        };
        let index = find_index(state, side, target)
            .filter(|&i| is_creature_at(state.board(side), i, library))
            .ok_or_else(|| EngineError::InvalidTarget(target.to_string()))?;
        damage_unit(state, side, index, amount, library);
        resolve_deaths(state, library);
    }

    // Permanents never die, but the board may have shifted around it.
    if let Some(source) = state.player.board.iter_mut().find(|u| u.uid == source_uid) {
        source.counter -= threshold;
    }
    Ok(())
}

fn activate_mana(state: &mut GameState, source_index: usize) -> EngineResult<()> {
    let counter = state.player.board[source_index].counter;
    if counter <= 0 {
        return Err(EngineError::NoCounters);
    }
    state.player.mana += counter;
    state.player.board.remove(source_index);
    Ok(())
}
