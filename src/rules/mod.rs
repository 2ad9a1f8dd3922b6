//! Puzzle rules: the pure action engine.
//!
//! Search and generation call into [`RulesEngine`] and never interpret
//! card effects directly.
//!
//! - `play`: playing creatures, spells, effects and mods from hand
//! - `combat`: attacks and activated abilities
//! - `round`: the end-of-round sequence
//! - `legal`: action enumeration, kept in lockstep with the above

pub mod combat;
pub mod engine;
pub mod legal;
pub mod play;
pub mod round;

pub use engine::{apply, is_win, legal_actions, PuzzleRules, RulesEngine};
