//! Card library for definition lookup.
//!
//! The `CardLibrary` stores all card definitions for a game. It provides
//! fast lookup by id and iterates in registration order, so anything
//! derived from it (generator pools, decoy picks) is reproducible.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId, CardType};

/// Library of card definitions.
///
/// ## Example
///
/// ```
/// use puzzle_forge::cards::{CardDefinition, CardLibrary, CardType};
///
/// let mut library = CardLibrary::new();
/// library.register(CardDefinition::new("spark", "Spark", CardType::Spell, 1));
///
/// let found = library.get("spark").unwrap();
/// assert_eq!(found.name, "Spark");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardLibrary {
    cards: FxHashMap<CardId, CardDefinition>,
    order: Vec<CardId>,
}

impl CardLibrary {
    /// Create a new empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from a list of definitions. Later duplicates win.
    pub fn from_definitions(defs: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut library = Self::new();
        for def in defs {
            library.register(def);
        }
        library
    }

    /// Register a card definition, returning the one it replaced.
    pub fn register(&mut self, card: CardDefinition) -> Option<CardDefinition> {
        let id = card.id.clone();
        let previous = self.cards.insert(id.clone(), card);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Get a card definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    /// Card type of an id, if known.
    #[must_use]
    pub fn card_type(&self, id: &str) -> Option<CardType> {
        self.get(id).map(|def| def.card_type)
    }

    /// Whether the id names a creature definition.
    #[must_use]
    pub fn is_creature(&self, id: &str) -> bool {
        self.card_type(id) == Some(CardType::Creature)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    /// Find cards matching a predicate, in registration order.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &CardDefinition>
    where
        F: Fn(&CardDefinition) -> bool,
    {
        self.iter().filter(move |c| predicate(c))
    }
}

impl FromIterator<CardDefinition> for CardLibrary {
    fn from_iter<I: IntoIterator<Item = CardDefinition>>(iter: I) -> Self {
        Self::from_definitions(iter)
    }
}
