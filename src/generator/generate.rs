//! The generation loop: attempts until one passes verification.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardLibrary};
use crate::core::GameRng;
use crate::error::GenerateError;
use crate::rules::{PuzzleRules, RulesEngine};

use super::attempt::{build_puzzle_attempt, Rejection};
use super::boss::GeneratorPools;
use super::puzzle::Puzzle;
use super::verify::{SolveCheck, VerifyOptions, VerifyStatus};

/// Puzzle generation settings.
///
/// Counting budgets use `0` for "unlimited".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Seed for the generator RNG; also names the puzzle.
    pub seed: u32,

    /// Cards drawn per attempt.
    pub hand_size: usize,

    /// Reject puzzles whose solution plays fewer cards (0 = off).
    pub min_hand_size: usize,

    /// Cards placed in every drawn hand and required in the solution.
    pub required_cards: Vec<CardId>,

    /// Random extra cards added to the final hand.
    pub decoys: usize,

    /// Round budget of the puzzle. Above one, early wins are rejected.
    pub target_rounds: u32,

    /// Boss creature count range.
    pub boss_min: usize,
    pub boss_max: usize,

    /// Mods per boss creature, at most.
    pub boss_mods_max: usize,

    pub boss_name: String,

    /// Ghost walk length that aborts an attempt (0 = unlimited).
    pub action_budget: usize,

    /// Verifier node budget (0 = unlimited).
    pub solver_budget: usize,

    /// Reject puzzles with more solutions than this (0 = no cap).
    pub max_solutions: usize,

    /// Attempts before giving up (0 = unlimited).
    pub max_attempts: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            hand_size: 4,
            min_hand_size: 0,
            required_cards: Vec::new(),
            decoys: 0,
            target_rounds: 1,
            boss_min: 0,
            boss_max: 0,
            boss_mods_max: 0,
            boss_name: "Toad Bureaucrat".to_string(),
            action_budget: 200,
            solver_budget: 0,
            max_solutions: 1,
            max_attempts: 1000,
        }
    }
}

impl GenerateConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    #[must_use]
    pub fn with_min_hand_size(mut self, min_hand_size: usize) -> Self {
        self.min_hand_size = min_hand_size;
        self
    }

    #[must_use]
    pub fn with_required_cards(mut self, cards: Vec<CardId>) -> Self {
        self.required_cards = cards;
        self
    }

    #[must_use]
    pub fn with_decoys(mut self, decoys: usize) -> Self {
        self.decoys = decoys;
        self
    }

    /// Set the round budget (at least one).
    #[must_use]
    pub fn with_target_rounds(mut self, rounds: u32) -> Self {
        self.target_rounds = rounds.max(1);
        self
    }

    /// Set the boss creature range; `max` is raised to `min` if lower.
    #[must_use]
    pub fn with_boss_board(mut self, min: usize, max: usize) -> Self {
        self.boss_min = min;
        self.boss_max = max.max(min);
        self
    }

    #[must_use]
    pub fn with_boss_mods(mut self, mods_max: usize) -> Self {
        self.boss_mods_max = mods_max;
        self
    }

    #[must_use]
    pub fn with_boss_name(mut self, name: impl Into<String>) -> Self {
        self.boss_name = name.into();
        self
    }

    #[must_use]
    pub fn with_action_budget(mut self, budget: usize) -> Self {
        self.action_budget = budget;
        self
    }

    #[must_use]
    pub fn with_solver_budget(mut self, budget: usize) -> Self {
        self.solver_budget = budget;
        self
    }

    #[must_use]
    pub fn with_max_solutions(mut self, max: usize) -> Self {
        self.max_solutions = max;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    fn solution_cap(&self) -> Option<usize> {
        (self.max_solutions > 0).then_some(self.max_solutions)
    }

    /// Verification is needed when a cap or a round floor is enforced.
    #[must_use]
    pub fn needs_verification(&self) -> bool {
        self.solution_cap().is_some() || self.target_rounds > 1
    }

    fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            max_nodes: self.solver_budget,
            enforce_early_win: self.target_rounds > 1,
            target_rounds: self.target_rounds,
            max_solutions: self.solution_cap(),
            ..VerifyOptions::default()
        }
    }
}

/// Verifier verdict on an accepted puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerifyStatus,
    /// Wins found before the search stopped.
    pub solutions: usize,
    pub visited: usize,
}

/// An accepted puzzle and how it was reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Generated {
    pub puzzle: Puzzle,
    pub attempts: usize,
    /// Rejected attempts per reason.
    pub rejections: BTreeMap<Rejection, usize>,
    /// `None` when no verification was needed.
    pub verification: Option<Verification>,
}

/// Generate a puzzle with the puzzle rules and default pools.
pub fn generate_puzzle(library: &CardLibrary, config: &GenerateConfig) -> Result<Generated, GenerateError> {
    generate_puzzle_with(&PuzzleRules, library, &GeneratorPools::from_library(library), config)
}

/// Generate a puzzle with any rules engine and pools.
///
/// Each attempt draws from one RNG seeded with `config.seed`, so the whole
/// run is reproducible.
pub fn generate_puzzle_with<E: RulesEngine + ?Sized>(
    engine: &E,
    library: &CardLibrary,
    pools: &GeneratorPools,
    config: &GenerateConfig,
) -> Result<Generated, GenerateError> {
    let mut rng = GameRng::new(config.seed);
    let mut rejections: BTreeMap<Rejection, usize> = BTreeMap::new();
    let mut attempts = 0;

    while config.max_attempts == 0 || attempts < config.max_attempts {
        attempts += 1;
        let attempt = build_puzzle_attempt(engine, config, pools, library, &mut rng)?;
        let puzzle = match attempt.outcome {
            Ok(puzzle) => puzzle,
            Err(reason) => {
                debug!(
                    "attempt #{attempts} [{}] rejected: {} ({} actions)",
                    attempt.hand_label,
                    reason.label(),
                    attempt.action_count
                );
                *rejections.entry(reason).or_default() += 1;
                continue;
            }
        };

        let verification = if config.needs_verification() {
            let mut check = SolveCheck::new(&puzzle, config.verify_options());
            let status = check.run(engine, library)?;
            if let VerifyStatus::Reject(reason) = status {
                debug!("attempt #{attempts} rejected by verifier: {}", reason.label());
                *rejections.entry(reason).or_default() += 1;
                continue;
            }
            if !status.is_acceptable() {
                debug!("attempt #{attempts} rejected by verifier: no solutions");
                *rejections.entry(Rejection::NoSolutions).or_default() += 1;
                continue;
            }
            Some(Verification {
                status,
                solutions: check.wins(),
                visited: check.visited(),
            })
        } else {
            None
        };

        info!(
            "generated {} after {attempts} attempt(s): {} cards, boss health {}",
            puzzle.id,
            puzzle.player.hand.len(),
            puzzle.opponent.health
        );
        return Ok(Generated {
            puzzle,
            attempts,
            rejections,
            verification,
        });
    }

    Err(GenerateError::Failed {
        attempts,
        rejections: rejections
            .into_iter()
            .map(|(reason, count)| (reason.code().to_string(), count))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenerateConfig::default();
        assert_eq!(config.hand_size, 4);
        assert_eq!(config.action_budget, 200);
        assert_eq!(config.max_solutions, 1);
        assert!(config.needs_verification());
        assert_eq!(config.verify_options().max_solutions, Some(1));
        assert!(!config.verify_options().enforce_early_win);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GenerateConfig::default()
            .with_seed(9)
            .with_target_rounds(0)
            .with_boss_board(2, 1)
            .with_max_solutions(0);

        assert_eq!(config.seed, 9);
        assert_eq!(config.target_rounds, 1);
        assert_eq!((config.boss_min, config.boss_max), (2, 2));
        assert!(!config.needs_verification());

        let multi = config.with_target_rounds(3);
        assert!(multi.needs_verification());
        assert!(multi.verify_options().enforce_early_win);
    }

    #[test]
    fn test_serialization() {
        let config = GenerateConfig::default().with_required_cards(vec![CardId::new("spark")]);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: GenerateConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_empty_library_fails_with_counts() {
        let config = GenerateConfig::default().with_max_attempts(3);
        let err = generate_puzzle(&CardLibrary::new(), &config).unwrap_err();
        match err {
            GenerateError::Failed { attempts, rejections } => {
                assert_eq!(attempts, 3);
                assert_eq!(rejections, vec![("hand_types".to_string(), 3)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
