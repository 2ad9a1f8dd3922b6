//! Game state: both sides, round bookkeeping and the uid allocator.
//!
//! Hands and boards are `im` persistent vectors, so cloning a state before
//! applying an action is O(1) and the input state is never observed to
//! change.
//!
//! ## Canonical key
//!
//! [`GameState::key`] serializes a borrowed view of the whole state with
//! `bincode` into an order-sensitive byte string. Two states share a key iff
//! every field is equal, board order included.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::BoardSide;
use crate::cards::{CardId, CardInstance, Keyword};
use crate::error::{EngineError, EngineResult};

/// An ordered board.
pub type Board = Vector<CardInstance>;

const fn one() -> u32 {
    1
}

/// The player's side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Side {
    #[serde(default)]
    pub mana: i32,
    #[serde(default)]
    pub hand: Vector<CardId>,
    #[serde(default)]
    pub board: Board,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<Vector<CardId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graveyard: Option<Vector<CardId>>,
}

/// The boss side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opponent {
    pub health: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub board: Board,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<Vector<CardId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graveyard: Option<Vector<CardId>>,
    #[serde(default)]
    pub poison: i32,
}

/// The most recent spell cast this round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSpell {
    pub card_id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Complete game state.
///
/// Create via [`GameState::normalize`] so every board unit has a uid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub player: Side,
    pub opponent: Opponent,

    /// Cards played so far this round.
    #[serde(default)]
    pub chain_count: u32,

    /// 1-based round counter.
    #[serde(default = "one")]
    pub turn: u32,

    /// Next uid number to hand out.
    #[serde(default = "one")]
    pub next_uid: u32,

    #[serde(default)]
    pub mana_per_round: i32,

    /// Hard round ceiling, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rounds: Option<u32>,

    /// Deaths this round.
    #[serde(default)]
    pub round_deaths: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_spell: Option<LastSpell>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player: Side::default(),
            opponent: Opponent::default(),
            chain_count: 0,
            turn: 1,
            next_uid: 1,
            mana_per_round: 0,
            target_rounds: None,
            round_deaths: 0,
            last_spell: None,
        }
    }
}

impl GameState {
    /// Assign uids to every unit that lacks one: player board first (`p`),
    /// then opponent board (`o`), drawing from `next_uid`.
    ///
    /// `next_uid` is first raised past every numbered uid already on the
    /// boards, so a stored puzzle reloads with the allocator it was
    /// generated with.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.turn == 0 {
            self.turn = 1;
        }
        let highest = self
            .player
            .board
            .iter()
            .chain(self.opponent.board.iter())
            .filter_map(|unit| uid_number(&unit.uid))
            .max()
            .unwrap_or(0);
        self.next_uid = self.next_uid.max(highest.saturating_add(1)).max(1);
        for side in [BoardSide::Player, BoardSide::Opponent] {
            let len = self.board(side).len();
            for index in 0..len {
                if self.board(side)[index].uid.is_empty() {
                    let uid = self.allocate_uid(side);
                    if let Some(unit) = self.board_mut(side).get_mut(index) {
                        unit.uid = uid;
                    }
                }
            }
        }
        self
    }

    /// Hand out the next uid for a unit created on `side`.
    pub fn allocate_uid(&mut self, side: BoardSide) -> String {
        let uid = format!("{}{}", side.uid_prefix(), self.next_uid);
        self.next_uid += 1;
        uid
    }

    #[must_use]
    pub fn board(&self, side: BoardSide) -> &Board {
        match side {
            BoardSide::Player => &self.player.board,
            BoardSide::Opponent => &self.opponent.board,
        }
    }

    pub fn board_mut(&mut self, side: BoardSide) -> &mut Board {
        match side {
            BoardSide::Player => &mut self.player.board,
            BoardSide::Opponent => &mut self.opponent.board,
        }
    }

    /// Canonical, order-sensitive encoding of the full state.
    pub fn key(&self) -> EngineResult<StateKey> {
        bincode::serialize(&StateView::from(self))
            .map(StateKey)
            .map_err(|e| EngineError::StateEncoding(e.to_string()))
    }

    /// Rounds left including the current one, if a ceiling is set.
    #[must_use]
    pub fn rounds_remaining(&self) -> Option<i64> {
        self.target_rounds
            .map(|limit| i64::from(limit) - (i64::from(self.turn) - 1))
    }

    /// Damage the boss; health never drops below zero.
    pub fn damage_opponent(&mut self, amount: i32) {
        if amount > 0 {
            self.opponent.health = (self.opponent.health - amount).max(0);
        }
    }

    /// Heal the boss.
    pub fn heal_opponent(&mut self, amount: i32) {
        if amount > 0 {
            self.opponent.health += amount;
        }
    }
}

// Key views mirror the state field for field without any
// `skip_serializing_if`, so bincode always writes every field and two
// different states never share an encoding. The destructuring below is
// exhaustive: a new state field will not compile until it is keyed.

#[derive(Serialize)]
struct StateView<'a> {
    player: SideView<'a>,
    opponent: OpponentView<'a>,
    chain_count: u32,
    turn: u32,
    next_uid: u32,
    mana_per_round: i32,
    target_rounds: Option<u32>,
    round_deaths: u32,
    last_spell: Option<(&'a CardId, Option<&'a str>)>,
}

#[derive(Serialize)]
struct SideView<'a> {
    mana: i32,
    hand: &'a Vector<CardId>,
    board: Vec<UnitView<'a>>,
    deck: Option<&'a Vector<CardId>>,
    graveyard: Option<&'a Vector<CardId>>,
}

#[derive(Serialize)]
struct OpponentView<'a> {
    health: i32,
    name: Option<&'a str>,
    board: Vec<UnitView<'a>>,
    deck: Option<&'a Vector<CardId>>,
    graveyard: Option<&'a Vector<CardId>>,
    poison: i32,
}

#[derive(Serialize)]
struct UnitView<'a> {
    uid: &'a str,
    card: &'a CardId,
    power: i32,
    keywords: &'a [Keyword],
    mods: &'a [CardId],
    tired: bool,
    poison: i32,
    shield: i32,
    rebirths: i32,
    counter: i32,
    borrowed: bool,
    borrowed_multiplier: i32,
    anchored_bonus: i32,
}

fn board_view(board: &Board) -> Vec<UnitView<'_>> {
    board.iter().map(UnitView::from).collect()
}

impl<'a> From<&'a GameState> for StateView<'a> {
    fn from(state: &'a GameState) -> Self {
        let GameState {
            player,
            opponent,
            chain_count,
            turn,
            next_uid,
            mana_per_round,
            target_rounds,
            round_deaths,
            last_spell,
        } = state;
        let Side {
            mana,
            hand,
            board,
            deck,
            graveyard,
        } = player;
        let player = SideView {
            mana: *mana,
            hand,
            board: board_view(board),
            deck: deck.as_ref(),
            graveyard: graveyard.as_ref(),
        };
        let Opponent {
            health,
            name,
            board,
            deck,
            graveyard,
            poison,
        } = opponent;
        let opponent = OpponentView {
            health: *health,
            name: name.as_deref(),
            board: board_view(board),
            deck: deck.as_ref(),
            graveyard: graveyard.as_ref(),
            poison: *poison,
        };
        Self {
            player,
            opponent,
            chain_count: *chain_count,
            turn: *turn,
            next_uid: *next_uid,
            mana_per_round: *mana_per_round,
            target_rounds: *target_rounds,
            round_deaths: *round_deaths,
            last_spell: last_spell
                .as_ref()
                .map(|LastSpell { card_id, target }| (card_id, target.as_deref())),
        }
    }
}

impl<'a> From<&'a CardInstance> for UnitView<'a> {
    fn from(unit: &'a CardInstance) -> Self {
        let CardInstance {
            uid,
            card,
            power,
            keywords,
            mods,
            tired,
            poison,
            shield,
            rebirths,
            counter,
            borrowed,
            borrowed_multiplier,
            anchored_bonus,
        } = unit;
        Self {
            uid,
            card,
            power: *power,
            keywords,
            mods,
            tired: *tired,
            poison: *poison,
            shield: *shield,
            rebirths: *rebirths,
            counter: *counter,
            borrowed: *borrowed,
            borrowed_multiplier: *borrowed_multiplier,
            anchored_bonus: *anchored_bonus,
        }
    }
}

fn uid_number(uid: &str) -> Option<u32> {
    uid.strip_prefix(BoardSide::Player.uid_prefix())
        .or_else(|| uid.strip_prefix(BoardSide::Opponent.uid_prefix()))
        .and_then(|n| n.parse().ok())
}

/// Canonical state identity used for search memoization and walk cycle
/// detection.
///
/// Serialized as a lowercase hex string so it can key a JSON map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StateKey(Vec<u8>);

impl StateKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        hex::encode(key.0)
    }
}

impl TryFrom<String> for StateKey {
    type Error = hex::FromHexError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        hex::decode(hex).map(StateKey)
    }
}
