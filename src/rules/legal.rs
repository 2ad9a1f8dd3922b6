//! Legal action enumeration.
//!
//! Everything listed here is accepted by `apply`, and everything `apply`
//! accepts (in canonical reference form) is listed here. Order is stable:
//! hand plays in hand order, then attacks and sacrifices per board unit,
//! then permanent activations, then `End` last.
//!
//! Canonical references: attack sources and targets and sacrifice
//! targets use uids; spell, mod and activation targets use slot tokens.
//! A card held twice yields its plays once.

use rustc_hash::FxHashSet;

use crate::cards::{BuffRequirement, CardDefinition, CardInstance, CardLibrary, CardType, Effect, Keyword};
use crate::core::action::{self, BoardSide, OPPONENT};
use crate::core::{Action, Board, GameState};
use crate::effects::passive::has_mod_effect;
use crate::effects::targeting::{creature_indexes, guard_indexes, has_creatures, is_creature};

use super::engine::apply;
use super::play::{has_ready_ally, repeat_surcharge, requires_ready_ally};

pub(crate) fn legal_actions(state: &GameState, library: &CardLibrary) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut seen = FxHashSet::default();

    for card in state.player.hand.iter() {
        if !seen.insert(card) {
            continue;
        }
        let Some(def) = library.get(card.as_str()) else {
            continue;
        };
        if state.player.mana < def.cost {
            continue;
        }
        match def.card_type {
            CardType::Spell => spell_plays(state, def, library, &mut actions),
            CardType::Mod => mod_plays(state, def, library, &mut actions),
            CardType::Creature => creature_plays(state, def, library, &mut actions),
            CardType::Effect => actions.push(Action::play(def.id.clone())),
        }
    }

    unit_actions(state, library, &mut actions);
    permanent_activations(state, library, &mut actions);
    actions.push(Action::End);
    actions
}

fn slots(board: &Board, side: BoardSide, library: &CardLibrary) -> Vec<String> {
    creature_indexes(board, library)
        .into_iter()
        .map(|i| action::slot(side, i))
        .collect()
}

fn reference(unit: &CardInstance, side: BoardSide, index: usize) -> String {
    if unit.uid.is_empty() {
        action::slot(side, index)
    } else {
        unit.uid.clone()
    }
}

fn spell_plays(state: &GameState, def: &CardDefinition, library: &CardLibrary, out: &mut Vec<Action>) {
    let surcharge = repeat_surcharge(def);
    if let Some(extra) = surcharge {
        if state.last_spell.is_none() || state.player.mana < def.cost + extra {
            return;
        }
    }

    let card = || def.id.clone();
    let mut plays = Vec::new();
    if def.has_effect(|e| matches!(e, Effect::Damage { .. })) {
        plays.push(Action::play_at(card(), OPPONENT));
        for target in slots(&state.opponent.board, BoardSide::Opponent, library) {
            plays.push(Action::play_at(card(), target));
        }
    } else if def.has_effect(|e| matches!(e, Effect::PurgeMods)) {
        let targets: Vec<_> = slots(&state.player.board, BoardSide::Player, library)
            .into_iter()
            .chain(slots(&state.opponent.board, BoardSide::Opponent, library))
            .collect();
        plays.extend(targets.into_iter().map(|t| Action::play_at(card(), t)));
    } else if def.has_effect(|e| matches!(e, Effect::BorrowEnemy { .. })) {
        for target in slots(&state.opponent.board, BoardSide::Opponent, library) {
            plays.push(Action::play_at(card(), target));
        }
    } else if def.has_effect(|e| matches!(e, Effect::SwapPositions)) {
        for side in [BoardSide::Player, BoardSide::Opponent] {
            let indexes = creature_indexes(state.board(side), library);
            for (n, &first) in indexes.iter().enumerate() {
                for &second in &indexes[n + 1..] {
                    let target = action::pair(&action::slot(side, first), &action::slot(side, second));
                    plays.push(Action::play_at(card(), target));
                }
            }
        }
    } else {
        plays.push(Action::play(card()));
    }

    if surcharge.is_some() {
        // The recorded spell is replayed against its recorded target, which
        // may no longer be valid.
        plays.retain(|play| apply(state, play, library).is_ok());
    }
    out.extend(plays);
}

fn mod_plays(state: &GameState, def: &CardDefinition, library: &CardLibrary, out: &mut Vec<Action>) {
    let needs_power = def.has_effect(|e| matches!(e, Effect::Shield { .. }));
    for side in [BoardSide::Player, BoardSide::Opponent] {
        for (index, unit) in state.board(side).iter().enumerate() {
            if !is_creature(unit, library) || (needs_power && unit.power <= 0) {
                continue;
            }
            out.push(Action::play_at(def.id.clone(), action::slot(side, index)));
        }
    }
}

fn creature_plays(state: &GameState, def: &CardDefinition, library: &CardLibrary, out: &mut Vec<Action>) {
    if def.base_power().is_none() {
        return;
    }
    if requires_ready_ally(def) && !has_ready_ally(state, library) {
        return;
    }
    if def.has_effect(|e| matches!(e, Effect::DevourAlly)) {
        for target in slots(&state.player.board, BoardSide::Player, library) {
            out.push(Action::play_at(def.id.clone(), target));
        }
        return;
    }
    out.push(Action::play(def.id.clone()));
}

/// Attacks and sacrifices for every ready player creature.
fn unit_actions(state: &GameState, library: &CardLibrary, out: &mut Vec<Action>) {
    let guards = guard_indexes(&state.opponent.board, library);
    let hero_open = !has_creatures(&state.opponent.board, library);

    for (index, unit) in state.player.board.iter().enumerate() {
        if !is_creature(unit, library)
            || unit.tired
            || has_mod_effect(unit, library, |e| matches!(e, Effect::NoAttack))
        {
            continue;
        }
        let source = reference(unit, BoardSide::Player, index);
        if hero_open {
            out.push(Action::attack(source.clone(), OPPONENT));
        }
        for (enemy_index, enemy) in state.opponent.board.iter().enumerate() {
            if !is_creature(enemy, library) {
                continue;
            }
            if !guards.is_empty() && !guards.contains(&enemy_index) {
                continue;
            }
            out.push(Action::attack(
                source.clone(),
                reference(enemy, BoardSide::Opponent, enemy_index),
            ));
        }

        if unit.has_keyword(Keyword::Sacrifice) && has_sacrifice_buff(unit, library) {
            for (other_index, other) in state.player.board.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                out.push(Action::activate(
                    source.clone(),
                    Some(reference(other, BoardSide::Player, other_index)),
                ));
            }
        }
    }
}

fn has_sacrifice_buff(unit: &CardInstance, library: &CardLibrary) -> bool {
    library.get(unit.card.as_str()).is_some_and(|def| {
        def.has_effect(|e| {
            matches!(
                e,
                Effect::Buff {
                    requires: Some(BuffRequirement::SacrificeSelf),
                    ..
                }
            )
        })
    })
}

/// Counter-driven abilities of effect permanents.
fn permanent_activations(state: &GameState, library: &CardLibrary, out: &mut Vec<Action>) {
    for (index, unit) in state.player.board.iter().enumerate() {
        let Some(def) = library.get(unit.card.as_str()) else {
            continue;
        };
        if def.card_type != CardType::Effect {
            continue;
        }
        let source = reference(unit, BoardSide::Player, index);
        let threshold = def.effects.iter().find_map(|e| match e {
            Effect::ActivateDamage { threshold, .. } => Some(*threshold),
            _ => None,
        });
        match threshold {
            Some(threshold) => {
                if unit.counter < threshold {
                    continue;
                }
                out.push(Action::activate(source.clone(), Some(OPPONENT.to_string())));
                let targets = slots(&state.opponent.board, BoardSide::Opponent, library)
                    .into_iter()
                    .chain(slots(&state.player.board, BoardSide::Player, library));
                for target in targets {
                    out.push(Action::activate(source.clone(), Some(target)));
                }
            }
            None => {
                if def.has_effect(|e| matches!(e, Effect::ActivateMana)) && unit.counter > 0 {
                    out.push(Action::activate(source, None));
                }
            }
        }
    }
}
