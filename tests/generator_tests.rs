//! Generator integration tests.

mod common;

use proptest::prelude::*;

use common::generator_library;
use puzzle_forge::generator::{solve_mana_plan, ManaConstraint, ManaPlan};
use puzzle_forge::{
    apply, generate_puzzle, is_win, solve, CardId, GameRng, GenerateConfig, GenerateError, SearchConfig,
};

fn quick_config(seed: u32) -> GenerateConfig {
    GenerateConfig::default().with_seed(seed).with_max_solutions(0)
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_puzzle() {
    let lib = generator_library();
    let first = generate_puzzle(&lib, &quick_config(11)).unwrap();
    let second = generate_puzzle(&lib, &quick_config(11)).unwrap();

    assert_eq!(first.puzzle, second.puzzle);
    assert_eq!(first.attempts, second.attempts);
    assert_eq!(first.rejections, second.rejections);
    assert_eq!(first.puzzle.id, "puzzle_11");
    assert_eq!(first.puzzle.seed, Some(11));

    let other = generate_puzzle(&lib, &quick_config(12)).unwrap();
    assert_eq!(other.puzzle.id, "puzzle_12");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_generation_is_reproducible(seed in any::<u32>()) {
        let lib = generator_library();
        let config = quick_config(seed).with_decoys(2);
        let first = generate_puzzle(&lib, &config).map(|generated| generated.puzzle);
        let second = generate_puzzle(&lib, &config).map(|generated| generated.puzzle);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        }
    }
}

// =============================================================================
// Generated Puzzles
// =============================================================================

#[test]
fn test_generated_puzzles_are_exactly_lethal() {
    let lib = generator_library();
    for seed in 0..8 {
        let generated = generate_puzzle(&lib, &quick_config(seed)).unwrap();
        let puzzle = &generated.puzzle;
        assert!(generated.verification.is_none());
        assert_eq!(puzzle.target_rounds, Some(1));

        let start = puzzle.initial_state();
        let end = puzzle
            .solution
            .iter()
            .try_fold(start.clone(), |state, action| apply(&state, action, &lib))
            .unwrap();
        assert!(is_win(&end), "seed {seed}: solution does not win");
        assert_eq!(end.opponent.health, 0, "seed {seed}: boss health is not exact");

        // One mana less and the recorded line breaks.
        let mut poorer = start.clone();
        poorer.player.mana -= 1;
        let replayed = puzzle
            .solution
            .iter()
            .try_fold(poorer, |state, action| apply(&state, action, &lib));
        assert!(replayed.is_err(), "seed {seed}: start mana is not tight");

        let solved = solve(&start, &lib, SearchConfig::solver()).unwrap();
        assert!(solved.is_solvable());
    }
}

#[test]
fn test_required_cards_are_played() {
    let lib = generator_library();
    let config = quick_config(5).with_required_cards(vec![CardId::new("lancer")]);
    let generated = generate_puzzle(&lib, &config).unwrap();
    assert!(generated.puzzle.played_cards().contains(&CardId::new("lancer")));
}

#[test]
fn test_min_hand_size_is_honoured() {
    let lib = generator_library();
    let generated = generate_puzzle(&lib, &quick_config(3).with_min_hand_size(3)).unwrap();
    assert!(generated.puzzle.player.hand.len() >= 3);
}

#[test]
fn test_boss_board_in_range() {
    let lib = generator_library();
    for seed in 0..4 {
        let generated = generate_puzzle(&lib, &quick_config(seed).with_boss_board(1, 2)).unwrap();
        let board = &generated.puzzle.opponent.board;
        assert!((1..=2).contains(&board.len()), "seed {seed}: {} boss units", board.len());
        assert_eq!(
            generated.puzzle.opponent.name.as_deref(),
            Some("Toad Bureaucrat")
        );
    }
}

#[test]
fn test_multi_round_without_income_rejects_early_mana() {
    // Nothing in this pool produces mana, so every walk spends its whole
    // hand in round one.
    let lib = generator_library();
    let config = quick_config(1).with_target_rounds(2).with_max_attempts(20);
    match generate_puzzle(&lib, &config).unwrap_err() {
        GenerateError::Failed { attempts, rejections } => {
            assert_eq!(attempts, 20);
            assert_eq!(rejections.iter().map(|(_, count)| count).sum::<usize>(), 20);
            assert!(rejections.iter().any(|(code, _)| code == "early_mana"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Mana Plan
// =============================================================================

#[test]
fn test_mana_plan_is_minimal() {
    let constraints = [
        ManaConstraint { round: 1, required: 3 },
        ManaConstraint { round: 2, required: 5 },
    ];
    for seed in 0..20 {
        let plan = solve_mana_plan(&constraints, &mut GameRng::new(seed));
        assert!((0..=2).contains(&plan.mana_per_round));
        assert!(constraints.iter().all(|c| c.is_met_by(plan)));

        let tighter = ManaPlan {
            start_mana: plan.start_mana - 1,
            ..plan
        };
        assert!(!constraints.iter().all(|c| c.is_met_by(tighter)));
        assert_eq!(plan.start_mana, 5 - plan.mana_per_round);
    }
}
