//! Procedural puzzle generation.
//!
//! ## Pipeline
//!
//! 1. Draw a hand and a boss board ([`boss`])
//! 2. Discover a winning line by random self-play ([`ghost`])
//! 3. Back-solve the tightest mana plan for that line ([`mana`])
//! 4. Freeze the line into a [`Puzzle`] and pad the hand ([`materialize`])
//! 5. Prove solvability, uniqueness and round forcing ([`verify`])
//!
//! [`attempt`] runs steps 1 to 4 once; [`generate`] loops attempts and
//! verifies them. Everything is driven by one seeded [`GameRng`], so a
//! seed reproduces its puzzle exactly.
//!
//! [`GameRng`]: crate::core::GameRng

pub mod attempt;
pub mod boss;
pub mod generate;
pub mod ghost;
pub mod mana;
pub mod materialize;
pub mod puzzle;
pub mod verify;

pub use attempt::{build_puzzle_attempt, AttemptResult, Rejection};
pub use boss::{build_boss_board, is_boss_mod_allowed, BossBoardSpec, GeneratorPools};
pub use generate::{generate_puzzle, generate_puzzle_with, GenerateConfig, Generated, Verification};
pub use ghost::{ghost_walk, GhostOptions, GhostResult};
pub use mana::{derive_mana_plan, mana_constraints, play_cost, solve_mana_plan, ManaConstraint, ManaPlan};
pub use materialize::{add_decoys, materialize, obfuscate, MaterializeOptions};
pub use puzzle::{Difficulty, Puzzle};
pub use verify::{SolveCheck, VerifyOptions, VerifyStatus};
