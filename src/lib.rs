//! # puzzle-forge
//!
//! Rules engine, solver and procedural generator for single-player
//! "lethal this turn" card puzzles.
//!
//! ## Design Principles
//!
//! 1. **Pure Rules**: `apply` never mutates its input. Every transition
//!    returns a fresh state or a typed [`EngineError`].
//!
//! 2. **Persistent Data Structures**: boards and hands are `im` vectors, so
//!    cloning a state for search is cheap.
//!
//! 3. **Deterministic Generation**: one seeded [`GameRng`] drives every
//!    random choice. A seed reproduces its puzzle exactly.
//!
//! ## Architecture
//!
//! - **Action Engine**: legal moves, effects and death cascades behind
//!   the [`RulesEngine`] trait.
//!
//! - **Search Engine**: a budgeted depth-first search, stepped in batches,
//!   shared by the player-facing solver and the generator's verifier.
//!
//! - **Generator**: random self-play finds a winning line, which is frozen
//!   into a puzzle with an exactly tight mana economy.
//!
//! - **Level Series**: coverage-driven progressions with staged
//!   relaxation and a difficulty profile keyed to the absolute level.
//!
//! ## Modules
//!
//! - `core`: actions, state, RNG
//! - `cards`: card definitions, effects, instances, library
//! - `effects`: damage, death resolution, passive auras, targeting
//! - `rules`: the rules engine (play, combat, round end, legal moves)
//! - `search`: depth-first solver and verifier
//! - `generator`: ghost walk, mana plan, materialization, generation loop
//! - `series`: level series and meta profile
//! - `error`: error types

pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod generator;
pub mod rules;
pub mod search;
pub mod series;

// Re-export commonly used types
pub use crate::core::{Action, Board, BoardSide, GameRng, GameState, Opponent, Side, StateKey, OPPONENT};

pub use crate::cards::{CardDefinition, CardId, CardInstance, CardLibrary, CardType, Effect, Keyword};

pub use crate::rules::{apply, is_win, legal_actions, PuzzleRules, RulesEngine};

pub use crate::search::{solve, DfsSearch, SearchConfig, SearchStats, SearchStatus, SolveResult};

pub use crate::generator::{
    generate_puzzle, ghost_walk, materialize, Difficulty, GenerateConfig, Generated, GhostOptions, Puzzle,
    Rejection, SolveCheck, VerifyOptions, VerifyStatus,
};

pub use crate::series::{
    build_level_series, build_meta_level_series, build_meta_profile, LevelRequest, MetaOptions, MetaProfile,
    MetaSeriesOptions, SeriesEvent, SeriesFailure, SeriesHooks, SeriesOptions, SeriesResult,
};

pub use crate::error::{EngineError, EngineResult, GenerateError, SeriesError};
