//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card type:
//! its category, cost, base power, printed keywords and effect list.
//! Instance-specific data (current power, mods, poison) is stored
//! separately in `CardInstance`.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use super::effect::Effect;

/// Unique identifier for a card definition (e.g. `"iron_golem"`).
///
/// This identifies the "type" of card, not a specific instance in a game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for CardId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CardId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Card category. Determines how a play is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    /// A unit that fights on the board.
    Creature,
    /// One-shot effect list resolved at play time.
    Spell,
    /// Passive permanent read reactively by other systems.
    Effect,
    /// Attachment applied to a target creature.
    Mod,
}

impl CardType {
    /// All card types in a fixed order.
    pub const ALL: [CardType; 4] = [
        CardType::Creature,
        CardType::Spell,
        CardType::Effect,
        CardType::Mod,
    ];

    /// Wire name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CardType::Creature => "creature",
            CardType::Spell => "spell",
            CardType::Effect => "effect",
            CardType::Mod => "mod",
        }
    }
}

/// Ability tags printed on cards or granted at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Guard,
    Storm,
    Pierce,
    Chain,
    Sacrifice,
    Testudo,
    Venom,
    Brood,
    Scavenger,
    Rebirth,
    Relay,
    Order,
    Sleepy,
}

impl Keyword {
    /// Wire name of this keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Guard => "guard",
            Keyword::Storm => "storm",
            Keyword::Pierce => "pierce",
            Keyword::Chain => "chain",
            Keyword::Sacrifice => "sacrifice",
            Keyword::Testudo => "testudo",
            Keyword::Venom => "venom",
            Keyword::Brood => "brood",
            Keyword::Scavenger => "scavenger",
            Keyword::Rebirth => "rebirth",
            Keyword::Relay => "relay",
            Keyword::Order => "order",
            Keyword::Sleepy => "sleepy",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Printed stats block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub power: i32,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use puzzle_forge::cards::{CardDefinition, CardType, Effect, Keyword};
///
/// let lancer = CardDefinition::new("lancer", "Lancer", CardType::Creature, 3)
///     .with_power(5)
///     .with_keyword(Keyword::Pierce);
///
/// assert_eq!(lancer.base_power(), Some(5));
/// assert!(lancer.has_keyword(Keyword::Pierce));
///
/// let spark = CardDefinition::new("spark", "Spark", CardType::Spell, 1)
///     .with_effect(Effect::Damage { amount: 2, chain_amount: Some(4) });
/// assert!(spark.has_effect(|e| matches!(e, Effect::Damage { .. })));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Card category.
    #[serde(rename = "type")]
    pub card_type: CardType,

    /// Mana cost to play.
    #[serde(default)]
    pub cost: i32,

    /// Printed keywords.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<Keyword>,

    /// Base stats (creatures and some effects).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,

    /// Ordered effect list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl CardDefinition {
    /// Create a new card definition with no stats, keywords or effects.
    #[must_use]
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, card_type: CardType, cost: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            cost,
            keywords: Vec::new(),
            stats: None,
            effects: Vec::new(),
        }
    }

    /// Set base power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.stats = Some(Stats { power });
        self
    }

    /// Add a printed keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Append an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card_type == CardType::Creature
    }

    /// Base power, if the card has stats.
    #[must_use]
    pub fn base_power(&self) -> Option<i32> {
        self.stats.map(|s| s.power)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Check whether any effect matches the predicate.
    #[must_use]
    pub fn has_effect<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Effect) -> bool,
    {
        self.effects.iter().any(predicate)
    }

    /// Sum a per-effect amount over the effect list.
    ///
    /// The extractor returns `None` for effects that do not contribute.
    #[must_use]
    pub fn sum_effects<F>(&self, extract: F) -> i32
    where
        F: Fn(&Effect) -> Option<i32>,
    {
        self.effects.iter().filter_map(extract).sum()
    }

    /// Surcharge paid on top of `cost` when this spell repeats the last one.
    #[must_use]
    pub fn repeat_surcharge(&self) -> Option<i32> {
        self.effects.iter().find_map(|e| match e {
            Effect::RepeatLastSpell { surcharge } => Some(*surcharge),
            _ => None,
        })
    }
}
