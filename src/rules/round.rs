//! The end-of-round sequence.
//!
//! Order matters and is fixed:
//!
//! 1. Poison ticks on both boards, then the hero's poison
//! 2. Deaths
//! 3. End buffs, then flank on each board, then self buffs (deaths if any)
//! 4. End-of-round boss damage and mass-death clones
//! 5. Borrowed creatures go home, anchored bonuses settle
//! 6. Mana adjustments, untap, and the round counters roll over

use crate::cards::CardLibrary;
use crate::core::{BoardSide, GameState};
use crate::effects::passive::{
    apply_end_boss_damage, apply_end_buffs, apply_end_mana, apply_end_self_buffs,
    apply_flank_buffs, apply_mass_death_clones, return_borrowed,
};
use crate::effects::{damage_unit, resolve_deaths, settle_anchored_and_resolve};

pub(crate) fn apply_end(state: &mut GameState, library: &CardLibrary) {
    for side in [BoardSide::Player, BoardSide::Opponent] {
        tick_poison(state, side, library);
    }
    let hero_poison = state.opponent.poison;
    if hero_poison > 0 {
        state.damage_opponent(hero_poison);
    }
    resolve_deaths(state, library);

    apply_end_buffs(state, library);
    apply_flank_buffs(state, BoardSide::Player, library);
    apply_flank_buffs(state, BoardSide::Opponent, library);
    if apply_end_self_buffs(state, library) {
        resolve_deaths(state, library);
    }

    apply_end_boss_damage(state, library);
    apply_mass_death_clones(state, library);
    return_borrowed(state);
    settle_anchored_and_resolve(state, library);
    apply_end_mana(state, library);

    for unit in state.player.board.iter_mut() {
        unit.tired = false;
    }
    state.chain_count = 0;
    state.turn += 1;
    state.player.mana += state.mana_per_round;
    state.round_deaths = 0;
    state.last_spell = None;
}

/// Poisoned units take their poison as damage. Spawned broodlings land
/// inside the live length and are visited too (they carry no poison).
fn tick_poison(state: &mut GameState, side: BoardSide, library: &CardLibrary) {
    let mut index = 0;
    while index < state.board(side).len() {
        let poison = state.board(side)[index].poison;
        if poison > 0 {
            damage_unit(state, side, index, poison, library);
        }
        index += 1;
    }
}
