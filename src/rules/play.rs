//! Playing cards from hand.
//!
//! Validation happens before anything is paid: the card must exist and be
//! in hand, the mana (plus any repeat surcharge) must be there, and a
//! creature that needs a ready ally must have one. After that the card
//! leaves the hand, its cost is paid and it resolves by type. Every play
//! bumps `chain_count`.

use crate::cards::{CardDefinition, CardId, CardInstance, CardLibrary, CardType, Effect};
use crate::core::action::{self, BoardSide, OPPONENT};
use crate::core::{GameState, LastSpell};
use crate::effects::passive::{apply_cast_counters, apply_mana_on_mod};
use crate::effects::targeting::{find_index, is_creature, is_creature_at, resolve_creature};
use crate::effects::{damage, damage_unit, resolve_deaths, settle_anchored_and_resolve};
use crate::error::{EngineError, EngineResult};

pub(crate) fn apply_play(
    state: &mut GameState,
    card: &CardId,
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    let def = library
        .get(card.as_str())
        .ok_or_else(|| EngineError::UnknownCard(card.clone()))?;
    let hand_index = state
        .player
        .hand
        .index_of(card)
        .ok_or_else(|| EngineError::CardNotInHand(card.clone()))?;

    let surcharge = repeat_surcharge(def);
    if state.player.mana < def.cost {
        return Err(EngineError::NotEnoughMana(card.clone()));
    }
    if let Some(extra) = surcharge {
        if state.player.mana < def.cost + extra {
            return Err(EngineError::NotEnoughManaToRepeat);
        }
    }
    if def.is_creature() && requires_ready_ally(def) && !has_ready_ally(state, library) {
        return Err(EngineError::RequiresReadyAlly);
    }

    state.player.hand.remove(hand_index);
    state.player.mana -= def.cost;

    match def.card_type {
        CardType::Creature => play_creature(state, def, target, library)?,
        CardType::Spell => play_spell(state, def, target, surcharge, library)?,
        CardType::Effect => play_effect(state, def),
        CardType::Mod => play_mod(state, def, target, library)?,
    }
    state.chain_count += 1;
    Ok(())
}

/// Surcharge for a spell that repeats the last one. Only spells repeat.
pub(crate) fn repeat_surcharge(def: &CardDefinition) -> Option<i32> {
    if def.card_type == CardType::Spell {
        def.repeat_surcharge()
    } else {
        None
    }
}

pub(crate) fn requires_ready_ally(def: &CardDefinition) -> bool {
    def.has_effect(|e| matches!(e, Effect::RequiresReadyAlly))
}

pub(crate) fn has_ready_ally(state: &GameState, library: &CardLibrary) -> bool {
    state
        .player
        .board
        .iter()
        .any(|u| is_creature(u, library) && !u.tired)
}

fn play_creature(
    state: &mut GameState,
    def: &CardDefinition,
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    let base = def
        .base_power()
        .ok_or_else(|| EngineError::MissingStats(def.id.clone()))?;

    let devour = if def.has_effect(|e| matches!(e, Effect::DevourAlly)) {
        let target = target.ok_or(EngineError::DevourRequiresTarget)?;
        let index = find_index(state, BoardSide::Player, target)
            .filter(|&i| is_creature_at(&state.player.board, i, library))
            .ok_or_else(|| EngineError::InvalidDevourTarget(target.to_string()))?;
        Some((index, state.player.board[index].power))
    } else {
        None
    };

    let uid = state.allocate_uid(BoardSide::Player);
    let mut unit = CardInstance::from_definition(def, uid);
    unit.power = base + devour.map_or(0, |(_, power)| power);
    unit.tired = def.has_effect(|e| matches!(e, Effect::EnterTired));

    match devour {
        Some((index, _)) => {
            state.player.board.insert(index, unit);
            if let Some(eaten) = state.player.board.get_mut(index + 1) {
                eaten.power = 0;
            }
            resolve_deaths(state, library);
        }
        None => state.player.board.push_back(unit),
    }
    settle_anchored_and_resolve(state, library);

    if def.has_effect(|e| matches!(e, Effect::PlayTireAllies)) {
        for ally in state.player.board.iter_mut() {
            if is_creature(ally, library) {
                ally.tired = true;
            }
        }
    }

    let summons = def.effects.iter().find_map(|e| match e {
        Effect::SummonEnemyBroodling { amount } => Some((*amount).max(1)),
        _ => None,
    });
    for _ in 0..summons.unwrap_or(0) {
        damage::spawn_broodling_at_end(state, BoardSide::Opponent, library);
    }
    Ok(())
}

fn play_spell(
    state: &mut GameState,
    def: &CardDefinition,
    target: Option<&str>,
    surcharge: Option<i32>,
    library: &CardLibrary,
) -> EngineResult<()> {
    apply_spell_effects(state, &def.effects, target, library)?;
    state.last_spell = match surcharge {
        Some(extra) => {
            state.player.mana -= extra;
            Some(repeat_last_spell(state, library)?)
        }
        None => Some(LastSpell {
            card_id: def.id.clone(),
            target: target.map(str::to_string),
        }),
    };
    apply_cast_counters(state, library, 1);
    Ok(())
}

fn play_effect(state: &mut GameState, def: &CardDefinition) {
    let uid = state.allocate_uid(BoardSide::Player);
    state
        .player
        .board
        .push_back(CardInstance::from_definition(def, uid));
}

fn play_mod(
    state: &mut GameState,
    def: &CardDefinition,
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    let target = target.ok_or(EngineError::ModRequiresTarget)?;
    let invalid = || EngineError::InvalidModTarget(target.to_string());
    let (side, index) = find_index(state, BoardSide::Player, target)
        .map(|i| (BoardSide::Player, i))
        .or_else(|| find_index(state, BoardSide::Opponent, target).map(|i| (BoardSide::Opponent, i)))
        .ok_or_else(invalid)?;
    if !is_creature_at(state.board(side), index, library) {
        return Err(invalid());
    }
    let needs_power = def.has_effect(|e| matches!(e, Effect::Shield { .. }));
    if needs_power && state.board(side)[index].power <= 0 {
        return Err(EngineError::ShieldOnZeroPower(def.id.clone()));
    }

    if let Some(unit) = state.board_mut(side).get_mut(index) {
        attach_mod(unit, def);
    }
    resolve_deaths(state, library);
    settle_anchored_and_resolve(state, library);
    apply_mana_on_mod(state, library);
    apply_cast_counters(state, library, 1);
    Ok(())
}

/// Apply a mod's immediate effects and record it on the unit.
pub(crate) fn attach_mod(unit: &mut CardInstance, def: &CardDefinition) {
    for effect in &def.effects {
        match effect {
            Effect::Buff { amount, .. } => unit.power += amount,
            Effect::Shield { amount } => unit.shield += amount,
            Effect::GrantKeyword { keyword } => unit.grant_keyword(*keyword),
            _ => {}
        }
    }
    unit.mods.push(def.id.clone());
}

/// Resolve a spell's effects in list order.
fn apply_spell_effects(
    state: &mut GameState,
    effects: &[Effect],
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    for effect in effects {
        match effect {
            Effect::Damage {
                amount,
                chain_amount,
            } => {
                let amount = match chain_amount {
                    Some(chained) if state.chain_count > 0 && *chained != 0 => *chained,
                    _ => *amount,
                };
                spell_damage(state, amount, target, library)?;
            }
            Effect::DamageAll { amount } => damage_all(state, *amount, library),
            Effect::PoisonAllies { amount } => {
                if *amount > 0 {
                    for ally in state.player.board.iter_mut() {
                        if is_creature(ally, library) {
                            ally.poison += amount;
                        }
                    }
                }
            }
            Effect::PurgeMods => purge_mods(state, target, library)?,
            Effect::GrantKeywordAllies { keyword } => {
                for ally in state.player.board.iter_mut() {
                    if is_creature(ally, library) {
                        ally.grant_keyword(*keyword);
                    }
                }
            }
            Effect::BorrowEnemy { return_multiplier } => {
                borrow_enemy(state, target, *return_multiplier, library)?;
            }
            Effect::SwapPositions => swap_positions(state, target, library)?,
            Effect::ExecuteThreshold {
                threshold,
                mana_gain,
            } => execute_threshold(state, *threshold, *mana_gain, library),
            Effect::RepeatLastSpell { .. }
            | Effect::Buff { .. }
            | Effect::Shield { .. }
            | Effect::GrantKeyword { .. }
            | Effect::NoAttack
            | Effect::AnchoredAura { .. }
            | Effect::DeathAfterAttack
            | Effect::Aura { .. }
            | Effect::EndBuff { .. }
            | Effect::EndSelfBuff { .. }
            | Effect::EndAdjacentBuff { .. }
            | Effect::EndMana { .. }
            | Effect::EndDamageBoss { .. }
            | Effect::EndCloneBossOnMassDeath { .. }
            | Effect::DeathDamageBoss { .. }
            | Effect::DeathHealBoss { .. }
            | Effect::DeathDamageAllEnemies { .. }
            | Effect::DeathCounter { .. }
            | Effect::CastCounter { .. }
            | Effect::ActivateDamage { .. }
            | Effect::ActivateMana
            | Effect::ManaOnMod { .. }
            | Effect::DevourAlly
            | Effect::EnterTired
            | Effect::RequiresReadyAlly
            | Effect::PlayTireAllies
            | Effect::SummonEnemyBroodling { .. } => {}
        }
    }
    Ok(())
}

/// Re-cast the recorded spell against its recorded target.
fn repeat_last_spell(state: &mut GameState, library: &CardLibrary) -> EngineResult<LastSpell> {
    let last = state
        .last_spell
        .clone()
        .ok_or(EngineError::NoSpellToRepeat)?;
    let def = library
        .get(last.card_id.as_str())
        .filter(|d| d.card_type == CardType::Spell)
        .ok_or_else(|| EngineError::InvalidLastSpell(last.card_id.clone()))?;
    if def.repeat_surcharge().is_some() {
        return Err(EngineError::CannotRepeatRepeat(last.card_id.clone()));
    }
    apply_spell_effects(state, &def.effects, last.target.as_deref(), library)?;
    Ok(last)
}

fn spell_damage(
    state: &mut GameState,
    amount: i32,
    target: Option<&str>,
    library: &CardLibrary,
) -> EngineResult<()> {
    let target = match target {
        None | Some(OPPONENT) => {
            state.damage_opponent(amount);
            return Ok(());
        }
        Some(target) => target,
    };
    match action::parse_slot(target) {
        Some((BoardSide::Opponent, _)) => {
            let index = find_index(state, BoardSide::Opponent, target)
                .filter(|&i| is_creature_at(&state.opponent.board, i, library))
                .ok_or_else(|| EngineError::InvalidSpellTarget(target.to_string()))?;
            damage_unit(state, BoardSide::Opponent, index, amount, library);
            resolve_deaths(state, library);
            Ok(())
        }
        _ => Err(EngineError::UnsupportedSpellTarget(target.to_string())),
    }
}

/// Hit every unit on both boards. Broodlings spawned mid-sweep are inside
/// the live length and get hit too.
fn damage_all(state: &mut GameState, amount: i32, library: &CardLibrary) {
    if amount <= 0 {
        return;
    }
    for side in [BoardSide::Player, BoardSide::Opponent] {
        let mut index = 0;
        while index < state.board(side).len() {
            damage_unit(state, side, index, amount, library);
            index += 1;
        }
    }
    resolve_deaths(state, library);
}

/// Strip every mod from a creature and undo their buffs and shields.
fn purge_mods(state: &mut GameState, target: Option<&str>, library: &CardLibrary) -> EngineResult<()> {
    let target = target.ok_or(EngineError::SpellRequiresTarget)?;
    let (side, index) = resolve_creature(state, target, library)
        .ok_or_else(|| EngineError::InvalidSpellTarget(target.to_string()))?;
    let Some(unit) = state.board_mut(side).get_mut(index) else {
        return Ok(());
    };
    if unit.mods.is_empty() {
        return Ok(());
    }

    let mut power_delta = 0;
    let mut shield_delta = 0;
    for def in unit.mods.iter().filter_map(|m| library.get(m.as_str())) {
        power_delta += def.sum_effects(|e| match e {
            Effect::Buff { amount, .. } => Some(*amount),
            _ => None,
        });
        shield_delta += def.sum_effects(|e| match e {
            Effect::Shield { amount } => Some(*amount),
            _ => None,
        });
    }
    if let Some(def) = library.get(unit.card.as_str()).filter(|d| d.is_creature()) {
        unit.keywords = def.keywords.iter().copied().collect();
    }
    unit.mods.clear();
    unit.power -= power_delta;
    unit.shield = (unit.shield - shield_delta).max(0);

    settle_anchored_and_resolve(state, library);
    // Losing a buff can leave the creature at zero power.
    resolve_deaths(state, library);
    Ok(())
}

fn borrow_enemy(
    state: &mut GameState,
    target: Option<&str>,
    multiplier: i32,
    library: &CardLibrary,
) -> EngineResult<()> {
    let target = match target {
        Some(t) if matches!(action::parse_slot(t), Some((BoardSide::Opponent, _))) => t,
        _ => return Err(EngineError::BorrowRequiresEnemy),
    };
    let index = find_index(state, BoardSide::Opponent, target)
        .filter(|&i| is_creature_at(&state.opponent.board, i, library))
        .ok_or_else(|| EngineError::InvalidSpellTarget(target.to_string()))?;
    let mut unit = state.opponent.board.remove(index);
    unit.borrowed = true;
    unit.borrowed_multiplier = multiplier;
    state.player.board.push_back(unit);
    settle_anchored_and_resolve(state, library);
    Ok(())
}

/// Swap two creatures on the same board; both end up tired.
fn swap_positions(state: &mut GameState, target: Option<&str>, library: &CardLibrary) -> EngineResult<()> {
    let (first, second) = target
        .and_then(action::split_pair)
        .ok_or(EngineError::SwapRequiresTwoTargets)?;

    let side = [BoardSide::Player, BoardSide::Opponent]
        .into_iter()
        .find_map(|side| {
            let a = find_index(state, side, first)?;
            let b = find_index(state, side, second)?;
            Some((side, a, b))
        });
    let Some((side, a, b)) = side else {
        return Err(EngineError::SwapDifferentBoards);
    };
    if a == b {
        return Err(EngineError::SwapSameTarget);
    }

    let board = state.board(side);
    let (Some(left), Some(right)) = (board.get(a), board.get(b)) else {
        return Err(EngineError::SwapTargetsNotFound);
    };
    if !is_creature(left, library) || !is_creature(right, library) {
        return Err(EngineError::SwapTargetsNotCreatures);
    }
    let board = state.board_mut(side);
    board.swap(a, b);
    for index in [a, b] {
        if let Some(unit) = board.get_mut(index) {
            unit.tired = true;
        }
    }
    settle_anchored_and_resolve(state, library);
    Ok(())
}

/// Kill every creature at or above `threshold`, refunding mana per kill.
fn execute_threshold(state: &mut GameState, threshold: i32, mana_gain: i32, library: &CardLibrary) {
    let mut killed = 0;
    for side in [BoardSide::Player, BoardSide::Opponent] {
        for unit in state.board_mut(side).iter_mut() {
            if is_creature(unit, library) && unit.power >= threshold {
                unit.power = 0;
                killed += 1;
            }
        }
    }
    resolve_deaths(state, library);
    if mana_gain > 0 && killed > 0 {
        state.player.mana += mana_gain * killed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Keyword, WOODEN_SHIELD_ID};

    fn library() -> CardLibrary {
        CardLibrary::from_definitions([
            CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
            CardDefinition::new("spark", "Spark", CardType::Spell, 1).with_effect(Effect::Damage {
                amount: 2,
                chain_amount: Some(4),
            }),
            CardDefinition::new("echo", "Echo", CardType::Spell, 1)
                .with_effect(Effect::RepeatLastSpell { surcharge: 1 }),
            CardDefinition::new(WOODEN_SHIELD_ID, "Wooden Shield", CardType::Mod, 1)
                .with_effect(Effect::Buff {
                    amount: -1,
                    requires: None,
                })
                .with_effect(Effect::Shield { amount: 1 }),
            CardDefinition::new("rune", "Rune", CardType::Mod, 1).with_effect(Effect::GrantKeyword {
                keyword: Keyword::Pierce,
            }),
            CardDefinition::new("cleanse", "Cleanse", CardType::Spell, 1).with_effect(Effect::PurgeMods),
            CardDefinition::new("swap", "Swap", CardType::Spell, 1).with_effect(Effect::SwapPositions),
            CardDefinition::new("totem", "Totem", CardType::Effect, 1).with_effect(Effect::ActivateMana),
        ])
    }

    fn state(hand: &[&str], mana: i32) -> GameState {
        let mut state = GameState::default();
        state.player.mana = mana;
        state.opponent.health = 20;
        for card in hand {
            state.player.hand.push_back(CardId::new(*card));
        }
        state
    }

    #[test]
    fn test_unknown_and_missing_cards() {
        let lib = library();
        let mut s = state(&["grunt"], 5);
        assert_eq!(
            apply_play(&mut s, &CardId::new("ghost"), None, &lib),
            Err(EngineError::UnknownCard(CardId::new("ghost")))
        );
        assert_eq!(
            apply_play(&mut s, &CardId::new("spark"), None, &lib),
            Err(EngineError::CardNotInHand(CardId::new("spark")))
        );
    }

    #[test]
    fn test_chain_amount_after_first_play() {
        let lib = library();
        let mut s = state(&["spark", "spark"], 2);
        apply_play(&mut s, &CardId::new("spark"), Some(OPPONENT), &lib).unwrap();
        assert_eq!(s.opponent.health, 18);
        apply_play(&mut s, &CardId::new("spark"), Some(OPPONENT), &lib).unwrap();
        assert_eq!(s.opponent.health, 14);
        assert_eq!(s.chain_count, 2);
        assert_eq!(s.player.mana, 0);
    }

    #[test]
    fn test_repeat_needs_surcharge_and_history() {
        let lib = library();
        let mut s = state(&["echo"], 2);
        assert_eq!(
            apply_play(&mut s, &CardId::new("echo"), None, &lib),
            Err(EngineError::NoSpellToRepeat)
        );

        let mut s = state(&["spark", "echo"], 2);
        apply_play(&mut s, &CardId::new("spark"), Some(OPPONENT), &lib).unwrap();
        assert_eq!(
            apply_play(&mut s, &CardId::new("echo"), None, &lib),
            Err(EngineError::NotEnoughManaToRepeat)
        );
    }

    #[test]
    fn test_purge_restores_printed_state() {
        let lib = library();
        let mut s = state(&[WOODEN_SHIELD_ID, "rune", "cleanse"], 3);
        s.player.board.push_back(CardInstance::unassigned("grunt", 2));
        let mut s = s.normalize();

        apply_play(&mut s, &CardId::new(WOODEN_SHIELD_ID), Some("p1"), &lib).unwrap();
        apply_play(&mut s, &CardId::new("rune"), Some("player:slot0"), &lib).unwrap();
        let unit = &s.player.board[0];
        assert_eq!((unit.power, unit.shield), (1, 1));
        assert!(unit.has_keyword(Keyword::Pierce));

        apply_play(&mut s, &CardId::new("cleanse"), Some("player:slot0"), &lib).unwrap();
        let unit = &s.player.board[0];
        assert_eq!((unit.power, unit.shield), (2, 0));
        assert!(unit.mods.is_empty());
        assert!(!unit.has_keyword(Keyword::Pierce));
    }

    #[test]
    fn test_shield_refused_on_zero_power() {
        let lib = library();
        let mut s = state(&[WOODEN_SHIELD_ID], 1);
        s.player.board.push_back(CardInstance::unassigned("grunt", 0));
        let mut s = s.normalize();
        assert_eq!(
            apply_play(&mut s, &CardId::new(WOODEN_SHIELD_ID), Some("p1"), &lib),
            Err(EngineError::ShieldOnZeroPower(CardId::new(WOODEN_SHIELD_ID)))
        );
    }

    #[test]
    fn test_shield_buff_can_kill() {
        let lib = library();
        let mut s = state(&[WOODEN_SHIELD_ID], 1);
        s.player.board.push_back(CardInstance::unassigned("grunt", 1));
        let mut s = s.normalize();
        apply_play(&mut s, &CardId::new(WOODEN_SHIELD_ID), Some("p1"), &lib).unwrap();
        assert!(s.player.board.is_empty());
        assert_eq!(s.round_deaths, 1);
    }

    fn swap_board() -> GameState {
        let mut s = state(&["swap"], 1);
        s.player.board.push_back(CardInstance::unassigned("grunt", 2));
        s.player.board.push_back(CardInstance::unassigned("totem", 0));
        s.player.board.push_back(CardInstance::unassigned("grunt", 4));
        s.opponent.board.push_back(CardInstance::unassigned("grunt", 3));
        s.normalize()
    }

    #[test]
    fn test_swap_rejections() {
        let lib = library();
        let swap = |target: &str| apply_play(&mut swap_board(), &CardId::new("swap"), Some(target), &lib);

        assert_eq!(swap("player:slot0"), Err(EngineError::SwapRequiresTwoTargets));
        assert_eq!(swap("player:slot0|player:slot0"), Err(EngineError::SwapSameTarget));
        assert_eq!(swap("p1|player:slot0"), Err(EngineError::SwapSameTarget));
        assert_eq!(swap("player:slot0|opponent:slot0"), Err(EngineError::SwapDifferentBoards));
        assert_eq!(swap("player:slot0|player:slot1"), Err(EngineError::SwapTargetsNotCreatures));
    }

    #[test]
    fn test_swap_exchanges_and_tires() {
        let lib = library();
        let mut s = swap_board();
        apply_play(&mut s, &CardId::new("swap"), Some("player:slot0|player:slot2"), &lib).unwrap();
        let powers: Vec<_> = s.player.board.iter().map(|u| (u.power, u.tired)).collect();
        assert_eq!(powers, vec![(4, true), (0, false), (2, true)]);
        assert_eq!(s.chain_count, 1);
        assert_eq!(s.player.mana, 0);
    }
}
