//! Round-limit predicates shared by the solver, the verifier and the
//! ghost walk.

use crate::core::GameState;

/// The state is on its last permitted round.
#[must_use]
pub fn is_final_round(state: &GameState) -> bool {
    state.rounds_remaining() == Some(1)
}

/// The state has ended more rounds than permitted.
#[must_use]
pub fn is_past_round_limit(state: &GameState) -> bool {
    state.target_rounds.is_some_and(|limit| state.turn > limit)
}

/// A win reached before round `target_rounds` of a multi-round puzzle.
#[must_use]
pub fn is_early_win(state: &GameState, target_rounds: u32) -> bool {
    target_rounds > 1 && state.turn < target_rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(turn: u32, limit: Option<u32>) -> GameState {
        GameState {
            turn,
            target_rounds: limit,
            ..GameState::default()
        }
    }

    #[test]
    fn test_final_round_boundaries() {
        assert!(!is_final_round(&at(1, None)));
        assert!(is_final_round(&at(1, Some(1))));
        assert!(!is_final_round(&at(1, Some(2))));
        assert!(is_final_round(&at(2, Some(2))));
        assert!(!is_final_round(&at(3, Some(2))));
    }

    #[test]
    fn test_past_round_limit_boundaries() {
        assert!(!is_past_round_limit(&at(5, None)));
        assert!(!is_past_round_limit(&at(3, Some(3))));
        assert!(is_past_round_limit(&at(4, Some(3))));
    }

    #[test]
    fn test_early_win() {
        assert!(!is_early_win(&at(1, None), 1));
        assert!(is_early_win(&at(1, None), 2));
        assert!(!is_early_win(&at(2, None), 2));
        assert!(!is_early_win(&at(3, None), 2));
    }
}
