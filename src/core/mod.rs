//! Core types: state, actions, references and RNG.
//!
//! Everything here is plain data. Rules live in `rules`, effect plumbing
//! in `effects`.

pub mod action;
pub mod rng;
pub mod state;

pub use action::{Action, BoardSide, OPPONENT};
pub use rng::GameRng;
pub use state::{Board, GameState, LastSpell, Opponent, Side, StateKey};
