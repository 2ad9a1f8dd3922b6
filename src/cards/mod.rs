//! Card system: definitions, effects, instances, and library.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardType`: creature / spell / effect / mod
//! - `Keyword`: Ability tags
//! - `Effect`: Closed set of effect kinds
//! - `CardDefinition`: Static card data
//! - `CardInstance`: Runtime board occupant
//! - `CardLibrary`: Card definition lookup

pub mod definition;
pub mod effect;
pub mod instance;
pub mod registry;

pub use definition::{CardDefinition, CardId, CardType, Keyword, Stats};
pub use effect::{BuffRequirement, Effect};
pub use instance::{CardInstance, KeywordList, ModList};
pub use registry::CardLibrary;

/// Definition id of the spawned brood token.
pub const BROODLING_ID: &str = "broodling";

/// Mod id whose tag is consumed together with a shield charge.
pub const WOODEN_SHIELD_ID: &str = "wooden_shield";
