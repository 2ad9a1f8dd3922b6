//! Effect plumbing shared by every action.
//!
//! ## Key Features
//!
//! - **Targeting**: reference resolution, adjacency, guard and testudo queries
//! - **Damage**: shield absorption and brood spawning
//! - **Passives**: auras, counters and end-of-round effects read off permanents
//! - **Deaths**: the death-resolution fixed point and anchored-aura settlement

pub mod damage;
pub mod deaths;
pub mod passive;
pub mod targeting;

pub use damage::{damage_unit, Hit};
pub use deaths::{resolve_deaths, settle_anchored, settle_anchored_and_resolve};
