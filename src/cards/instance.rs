//! Card instances - board occupants.
//!
//! `CardInstance` represents one card standing on a board at a specific
//! moment. It tracks mutable state like current power, granted keywords,
//! attached mods and poison.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{CardDefinition, CardId, Keyword};

/// Keyword list of an instance. Most units carry at most a few.
pub type KeywordList = SmallVec<[Keyword; 4]>;

/// Ordered list of mod card ids attached to an instance.
pub type ModList = SmallVec<[CardId; 2]>;

/// A card instance on a board.
///
/// `uid` is empty until the state is normalized; after that it never
/// changes and is unique within the game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstance {
    /// Stable reference (`p<N>` for player-side allocations, `o<N>` for opponent).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    /// Definition id.
    pub card: CardId,

    /// Current power. At or below zero means dead at the next death pass.
    #[serde(default)]
    pub power: i32,

    /// Current keywords (printed plus granted).
    #[serde(default)]
    pub keywords: KeywordList,

    /// Attached mod ids, in attach order.
    #[serde(default)]
    pub mods: ModList,

    /// Cannot attack or activate until the round ends.
    #[serde(default)]
    pub tired: bool,

    #[serde(default)]
    pub poison: i32,

    /// Absorbs the next instance of damage per charge.
    #[serde(default)]
    pub shield: i32,

    /// Number of prior rebirths.
    #[serde(default)]
    pub rebirths: i32,

    /// Generic accumulator for activation thresholds.
    #[serde(default)]
    pub counter: i32,

    /// Taken from the opponent until end of round.
    #[serde(default)]
    pub borrowed: bool,

    /// Power multiplier applied when a borrowed unit goes home (0 = default).
    #[serde(default)]
    pub borrowed_multiplier: i32,

    /// Last adjacency bonus applied, so re-settling only applies the delta.
    #[serde(default)]
    pub anchored_bonus: i32,
}

impl CardInstance {
    /// Fresh instance of a definition with printed power and keywords.
    #[must_use]
    pub fn from_definition(def: &CardDefinition, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            card: def.id.clone(),
            power: def.base_power().unwrap_or(0),
            keywords: def.keywords.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Instance with no uid yet, for building states by hand.
    #[must_use]
    pub fn unassigned(card: impl Into<CardId>, power: i32) -> Self {
        Self {
            card: card.into(),
            power,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Add a keyword if not already present.
    pub fn grant_keyword(&mut self, keyword: Keyword) {
        if !self.has_keyword(keyword) {
            self.keywords.push(keyword);
        }
    }

    #[must_use]
    pub fn has_mod(&self, card: &str) -> bool {
        self.mods.iter().any(|m| m == card)
    }

    /// Set tired (builder pattern).
    #[must_use]
    pub fn with_tired(mut self, tired: bool) -> Self {
        self.tired = tired;
        self
    }

    /// Attach a mod id without applying its effects (builder pattern).
    #[must_use]
    pub fn with_mod(mut self, card: impl Into<CardId>) -> Self {
        self.mods.push(card.into());
        self
    }
}
