//! The puzzle interchange format.
//!
//! This is the boundary between generation and any storage or UI layer:
//!
//! ```json
//! {
//!   "id": "puzzle_7",
//!   "difficulty": "medium",
//!   "seed": 7,
//!   "tags": ["sacrifice", "pierce"],
//!   "targetRounds": 1,
//!   "manaPerRound": 0,
//!   "player": { "mana": 5, "hand": ["cultist", "lancer"], "board": [] },
//!   "opponent": { "name": "Boss", "health": 6, "board": [] },
//!   "solution": [{ "type": "play", "card": "cultist" }]
//! }
//! ```

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{Action, GameState, Opponent, Side};

/// Coarse difficulty label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Label inferred from the length of the solution line.
    #[must_use]
    pub fn from_action_count(count: usize) -> Self {
        match count {
            0..=2 => Difficulty::Easy,
            3 | 4 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-contained puzzle definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_per_round: Option<i32>,
    pub player: Side,
    pub opponent: Opponent,
    /// Known winning line from [`Puzzle::initial_state`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solution: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Puzzle {
    /// Normalized starting state.
    #[must_use]
    pub fn initial_state(&self) -> GameState {
        GameState {
            player: self.player.clone(),
            opponent: self.opponent.clone(),
            mana_per_round: self.mana_per_round.unwrap_or(0),
            target_rounds: self.target_rounds,
            ..GameState::default()
        }
        .normalize()
    }

    /// Card ids of every play in the solution, in order.
    #[must_use]
    pub fn played_sequence(&self) -> Vec<CardId> {
        self.solution
            .iter()
            .filter_map(Action::played_card)
            .cloned()
            .collect()
    }

    /// Distinct played card ids, in first-play order.
    #[must_use]
    pub fn played_cards(&self) -> Vec<CardId> {
        let mut seen = FxHashSet::default();
        self.played_sequence()
            .into_iter()
            .filter(|card| seen.insert(card.clone()))
            .collect()
    }

    /// Parse the JSON interchange form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON interchange form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
