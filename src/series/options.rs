//! Level-series settings.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::error::SeriesError;

/// Settings for [`build_level_series`](super::build_level_series).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesOptions {
    /// Base seed; each attempt derives its own.
    pub seed: u32,

    /// Cards the series should introduce, in order. Blank and repeated
    /// ids are dropped.
    pub coverage_cards: Vec<CardId>,

    /// Uncovered cards required per level before relaxation.
    pub new_cards_per_level: usize,

    /// Minimum cards a solution must play.
    pub min_used_cards: usize,

    /// Round budgets cycled across levels and attempts. Zeros are ignored.
    pub target_rounds: Vec<u32>,

    /// Ceiling for rounds raised during relaxation.
    pub max_target_rounds: u32,

    /// Attempts per stage.
    pub max_attempts_per_level: usize,

    /// Stages per level, the strict stage included.
    pub max_relaxation_stages: usize,

    /// Fixed level count. `None` runs until every card is covered.
    pub levels: Option<usize>,

    /// Levels after this one require no new cards. `Some(0)` disables
    /// coverage entirely.
    pub coverage_until_level: Option<usize>,

    /// Reject puzzles whose solution skips a required card.
    pub require_required_cards_used: bool,

    /// Fail when cards remain uncovered at the end.
    pub require_full_coverage: bool,

    /// Keep relaxing minimum card use and round budgets after the
    /// required-card stages run out.
    pub relax_until_success: bool,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            coverage_cards: Vec::new(),
            new_cards_per_level: 3,
            min_used_cards: 3,
            target_rounds: vec![1, 2],
            max_target_rounds: 6,
            max_attempts_per_level: 25,
            max_relaxation_stages: 60,
            levels: None,
            coverage_until_level: None,
            require_required_cards_used: false,
            require_full_coverage: true,
            relax_until_success: false,
        }
    }
}

impl SeriesOptions {
    /// Options covering `cards`, everything else default.
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = impl Into<CardId>>) -> Self {
        Self::default().with_coverage_cards(cards)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_coverage_cards(mut self, cards: impl IntoIterator<Item = impl Into<CardId>>) -> Self {
        self.coverage_cards = cards.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_new_cards_per_level(mut self, count: usize) -> Self {
        self.new_cards_per_level = count;
        self
    }

    #[must_use]
    pub fn with_min_used_cards(mut self, count: usize) -> Self {
        self.min_used_cards = count;
        self
    }

    #[must_use]
    pub fn with_target_rounds(mut self, rounds: Vec<u32>) -> Self {
        self.target_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_max_target_rounds(mut self, rounds: u32) -> Self {
        self.max_target_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_max_attempts_per_level(mut self, attempts: usize) -> Self {
        self.max_attempts_per_level = attempts;
        self
    }

    #[must_use]
    pub fn with_max_relaxation_stages(mut self, stages: usize) -> Self {
        self.max_relaxation_stages = stages;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = Some(levels);
        self
    }

    #[must_use]
    pub fn with_coverage_until_level(mut self, level: usize) -> Self {
        self.coverage_until_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_require_required_cards_used(mut self, require: bool) -> Self {
        self.require_required_cards_used = require;
        self
    }

    #[must_use]
    pub fn with_require_full_coverage(mut self, require: bool) -> Self {
        self.require_full_coverage = require;
        self
    }

    #[must_use]
    pub fn with_relax_until_success(mut self, relax: bool) -> Self {
        self.relax_until_success = relax;
        self
    }

    /// Coverage cards trimmed, without blanks or repeats, in first-seen order.
    #[must_use]
    pub fn coverage_order(&self) -> Vec<CardId> {
        let mut seen = FxHashSet::default();
        self.coverage_cards
            .iter()
            .map(|card| card.as_str().trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(CardId::new)
            .collect()
    }

    /// Round budgets of at least one.
    #[must_use]
    pub fn round_choices(&self) -> Vec<u32> {
        self.target_rounds.iter().copied().filter(|r| *r >= 1).collect()
    }

    /// Check the options before any generation work.
    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.coverage_order().is_empty() {
            return Err(SeriesError::Config("Coverage card list is empty.".to_string()));
        }
        if self.new_cards_per_level < 1 {
            return Err(SeriesError::Config("newCardsPerLevel must be >= 1.".to_string()));
        }
        if self.max_attempts_per_level < 1 {
            return Err(SeriesError::Config("maxAttemptsPerLevel must be >= 1.".to_string()));
        }
        if self.max_relaxation_stages < 1 {
            return Err(SeriesError::Config("maxRelaxationStages must be >= 1.".to_string()));
        }
        if self.round_choices().is_empty() {
            return Err(SeriesError::Config(
                "At least one targetRounds value is required.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let options = SeriesOptions::default();
        assert_eq!(options.new_cards_per_level, 3);
        assert_eq!(options.target_rounds, vec![1, 2]);
        assert_eq!(options.max_relaxation_stages, 60);
        assert!(options.require_full_coverage);
        assert!(!options.relax_until_success);
    }

    #[test]
    fn test_builder_pattern() {
        let options = SeriesOptions::new(["a", "b"])
            .with_seed(7)
            .with_levels(3)
            .with_target_rounds(vec![0, 2])
            .with_relax_until_success(true);
        assert_eq!(options.seed, 7);
        assert_eq!(options.levels, Some(3));
        assert_eq!(options.round_choices(), vec![2]);
        assert!(options.relax_until_success);
    }

    #[test]
    fn test_serialization() {
        let options = SeriesOptions::new(["a"]).with_coverage_until_level(4);
        let json = serde_json::to_string(&options).unwrap();
        let deserialized: SeriesOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, deserialized);
    }

    #[test]
    fn test_coverage_order_dedupes() {
        let options = SeriesOptions::new([" a", "b", "", "a", "c ", "b"]);
        assert_eq!(
            options.coverage_order(),
            vec![CardId::new("a"), CardId::new("b"), CardId::new("c")]
        );
    }

    #[test]
    fn test_validation_messages() {
        let message = |options: SeriesOptions| options.validate().unwrap_err().to_string();

        assert_eq!(message(SeriesOptions::new([" "])), "Coverage card list is empty.");
        assert_eq!(
            message(SeriesOptions::new(["a"]).with_new_cards_per_level(0)),
            "newCardsPerLevel must be >= 1."
        );
        assert_eq!(
            message(SeriesOptions::new(["a"]).with_max_attempts_per_level(0)),
            "maxAttemptsPerLevel must be >= 1."
        );
        assert_eq!(
            message(SeriesOptions::new(["a"]).with_max_relaxation_stages(0)),
            "maxRelaxationStages must be >= 1."
        );
        assert_eq!(
            message(SeriesOptions::new(["a"]).with_target_rounds(vec![0])),
            "At least one targetRounds value is required."
        );
        assert!(SeriesOptions::new(["a"]).validate().is_ok());
    }
}
