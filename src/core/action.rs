//! Action representation and board references.
//!
//! Actions are a closed tagged union matching the interchange format:
//!
//! - `{"type":"play","card":"spark","target":"opponent"}`
//! - `{"type":"attack","source":"p3","target":"o1"}`
//! - `{"type":"activate","source":"p2","target":"player:slot0"}`
//! - `{"type":"end"}`
//!
//! `source`/`target` strings are references resolved by the rules engine:
//! a stable uid, a positional slot token (`player:slot<N>` /
//! `opponent:slot<N>`), the literal `opponent` for the enemy hero, or a
//! pipe-joined pair of slot tokens for two-target spells.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;

/// Reference to the enemy hero.
pub const OPPONENT: &str = "opponent";

const PLAYER_SLOT: &str = "player:slot";
const OPPONENT_SLOT: &str = "opponent:slot";

/// A complete game action.
///
/// ## Example
///
/// ```
/// use puzzle_forge::core::{Action, action};
///
/// let attack = Action::attack("p1", action::opponent_slot(0));
/// let json = serde_json::to_string(&attack).unwrap();
/// assert_eq!(json, r#"{"type":"attack","source":"p1","target":"opponent:slot0"}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Play a card from hand.
    Play {
        card: CardId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    /// Attack with a ready creature.
    Attack { source: String, target: String },
    /// Use an activated ability of a board unit.
    Activate {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    /// End the round.
    End,
}

impl Action {
    /// Untargeted play.
    #[must_use]
    pub fn play(card: impl Into<CardId>) -> Self {
        Action::Play {
            card: card.into(),
            target: None,
        }
    }

    /// Targeted play.
    #[must_use]
    pub fn play_at(card: impl Into<CardId>, target: impl Into<String>) -> Self {
        Action::Play {
            card: card.into(),
            target: Some(target.into()),
        }
    }

    #[must_use]
    pub fn attack(source: impl Into<String>, target: impl Into<String>) -> Self {
        Action::Attack {
            source: source.into(),
            target: target.into(),
        }
    }

    #[must_use]
    pub fn activate(source: impl Into<String>, target: Option<String>) -> Self {
        Action::Activate {
            source: source.into(),
            target,
        }
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Action::End)
    }

    /// Card id if this is a play.
    #[must_use]
    pub fn played_card(&self) -> Option<&CardId> {
        match self {
            Action::Play { card, .. } => Some(card),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Play { card, target: None } => write!(f, "play {card}"),
            Action::Play {
                card,
                target: Some(t),
            } => write!(f, "play {card} -> {t}"),
            Action::Attack { source, target } => write!(f, "attack {source} -> {target}"),
            Action::Activate { source, target: None } => write!(f, "activate {source}"),
            Action::Activate {
                source,
                target: Some(t),
            } => write!(f, "activate {source} -> {t}"),
            Action::End => f.write_str("end"),
        }
    }
}

/// Which board a reference points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardSide {
    Player,
    Opponent,
}

impl BoardSide {
    /// Uid prefix for units allocated on this side.
    #[must_use]
    pub const fn uid_prefix(self) -> &'static str {
        match self {
            BoardSide::Player => "p",
            BoardSide::Opponent => "o",
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            BoardSide::Player => BoardSide::Opponent,
            BoardSide::Opponent => BoardSide::Player,
        }
    }
}

/// Positional token for a player board slot.
#[must_use]
pub fn player_slot(index: usize) -> String {
    format!("{PLAYER_SLOT}{index}")
}

/// Positional token for an opponent board slot.
#[must_use]
pub fn opponent_slot(index: usize) -> String {
    format!("{OPPONENT_SLOT}{index}")
}

/// Positional token for a slot on either side.
#[must_use]
pub fn slot(side: BoardSide, index: usize) -> String {
    match side {
        BoardSide::Player => player_slot(index),
        BoardSide::Opponent => opponent_slot(index),
    }
}

/// Pipe-joined pair reference for two-target spells.
#[must_use]
pub fn pair(first: &str, second: &str) -> String {
    format!("{first}|{second}")
}

/// Split a pair reference; both halves must be non-empty.
#[must_use]
pub fn split_pair(reference: &str) -> Option<(&str, &str)> {
    let (first, second) = reference.split_once('|')?;
    if first.is_empty() || second.is_empty() {
        return None;
    }
    // Anything after a second pipe is ignored.
    let second = second.split('|').next().unwrap_or(second);
    Some((first, second))
}

/// Parse a positional slot token.
///
/// Returns `Some((side, Some(index)))` for a well-formed token,
/// `Some((side, None))` for a token with that prefix but an unparseable
/// index, and `None` when the reference is not a slot token at all.
#[must_use]
pub fn parse_slot(reference: &str) -> Option<(BoardSide, Option<usize>)> {
    if let Some(rest) = reference.strip_prefix(PLAYER_SLOT) {
        return Some((BoardSide::Player, rest.parse().ok()));
    }
    if let Some(rest) = reference.strip_prefix(OPPONENT_SLOT) {
        return Some((BoardSide::Opponent, rest.parse().ok()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_tokens() {
        assert_eq!(player_slot(2), "player:slot2");
        assert_eq!(opponent_slot(0), "opponent:slot0");
        assert_eq!(parse_slot("player:slot2"), Some((BoardSide::Player, Some(2))));
        assert_eq!(parse_slot("opponent:slotx"), Some((BoardSide::Opponent, None)));
        assert_eq!(parse_slot("p3"), None);
        assert_eq!(parse_slot(OPPONENT), None);
    }

    #[test]
    fn test_pairs() {
        let p = pair("player:slot0", "player:slot1");
        assert_eq!(split_pair(&p), Some(("player:slot0", "player:slot1")));
        assert_eq!(split_pair("player:slot0"), None);
        assert_eq!(split_pair("player:slot0|"), None);
    }

    #[test]
    fn test_wire_format() {
        let end: Action = serde_json::from_str(r#"{"type":"end"}"#).unwrap();
        assert!(end.is_end());

        let play: Action = serde_json::from_str(r#"{"type":"play","card":"spark"}"#).unwrap();
        assert_eq!(play, Action::play("spark"));
        assert_eq!(serde_json::to_string(&play).unwrap(), r#"{"type":"play","card":"spark"}"#);

        let activate = Action::activate("p1", Some("p2".to_string()));
        let json = serde_json::to_string(&activate).unwrap();
        assert_eq!(serde_json::from_str::<Action>(&json).unwrap(), activate);
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::play_at("spark", OPPONENT).to_string(), "play spark -> opponent");
        assert_eq!(Action::End.to_string(), "end");
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(BoardSide::Player.uid_prefix(), "p");
        assert_eq!(BoardSide::Opponent.other(), BoardSide::Player);
        assert_eq!(slot(BoardSide::Opponent, 3), "opponent:slot3");
    }
}
