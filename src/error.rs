//! Error types.
//!
//! - [`EngineError`]: rule violations raised by the action engine. Search
//!   and ghost walks treat these as "branch not viable" and move on.
//! - [`GenerateError`]: a puzzle could not be produced at all.
//! - [`SeriesError`]: configuration problems and fatal level-series
//!   failures, the latter carrying full diagnostic context.

use thiserror::Error;

use crate::cards::CardId;
use crate::series::SeriesFailure;

/// Rule violation raised by `apply`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Unknown card: {0}")]
    UnknownCard(CardId),

    #[error("Card not in hand: {0}")]
    CardNotInHand(CardId),

    #[error("Not enough mana for {0}")]
    NotEnoughMana(CardId),

    #[error("Not enough mana to repeat the last spell")]
    NotEnoughManaToRepeat,

    #[error("Requires an untired creature already on your board")]
    RequiresReadyAlly,

    #[error("Card has no stats: {0}")]
    MissingStats(CardId),

    #[error("Devour requires a friendly creature target")]
    DevourRequiresTarget,

    #[error("Invalid devour target: {0}")]
    InvalidDevourTarget(String),

    #[error("Mod cards require a target creature")]
    ModRequiresTarget,

    #[error("Invalid mod target: {0}")]
    InvalidModTarget(String),

    #[error("Cannot apply {0} to a 0-power creature")]
    ShieldOnZeroPower(CardId),

    #[error("Spell requires a target")]
    SpellRequiresTarget,

    #[error("Invalid spell target: {0}")]
    InvalidSpellTarget(String),

    #[error("Unsupported spell target: {0}")]
    UnsupportedSpellTarget(String),

    #[error("Borrow spell requires an enemy creature target")]
    BorrowRequiresEnemy,

    #[error("Swap spell requires two targets")]
    SwapRequiresTwoTargets,

    #[error("Swap targets not found")]
    SwapTargetsNotFound,

    #[error("Swap targets must be creatures")]
    SwapTargetsNotCreatures,

    #[error("Swap targets must be on the same board")]
    SwapDifferentBoards,

    #[error("Swap targets must be two different units")]
    SwapSameTarget,

    #[error("No spell to repeat")]
    NoSpellToRepeat,

    #[error("Last spell is invalid: {0}")]
    InvalidLastSpell(CardId),

    #[error("Cannot repeat a repeat spell: {0}")]
    CannotRepeatRepeat(CardId),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Source is not a creature")]
    SourceNotCreature,

    #[error("Source is tired")]
    SourceTired,

    #[error("Source cannot attack")]
    SourceCannotAttack,

    #[error("Enemy minions are present; cannot attack opponent")]
    EnemyMinionsPresent,

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Guard is present; target must be a guard")]
    GuardPresent,

    #[error("Target is not a creature")]
    TargetNotCreature,

    #[error("Activation requires a target")]
    ActivateRequiresTarget,

    #[error("Not enough counters to activate")]
    NotEnoughCounters,

    #[error("No counters to convert")]
    NoCounters,

    #[error("Source has no sacrificial ability")]
    NotSacrificial,

    #[error("Cannot target self for sacrifice buff")]
    CannotTargetSelf,

    #[error("Sacrifice has no buff effect")]
    NoSacrificeBuff,

    #[error("State encoding failed: {0}")]
    StateEncoding(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

/// A puzzle could not be produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The walk did not produce a usable puzzle.
    #[error("{0}")]
    Materialize(String),

    /// The engine failed outside speculative probing (e.g. state encoding).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Every attempt was rejected.
    #[error("Failed to generate a valid puzzle.")]
    Failed {
        attempts: usize,
        rejections: Vec<(String, usize)>,
    },
}

/// Level-series failures.
#[derive(Clone, Debug, Error)]
pub enum SeriesError {
    /// Invalid options, raised before any generation work.
    #[error("{0}")]
    Config(String),

    /// A level could not be produced under any relaxation stage.
    #[error("{0}")]
    Generation(Box<SeriesFailure>),

    /// The series ran out of levels with cards still uncovered.
    #[error("Series completed without full coverage. Uncovered cards: {}", join_ids(.0))]
    IncompleteCoverage(Vec<CardId>),
}

pub(crate) fn join_ids(ids: &[CardId]) -> String {
    ids.iter().map(CardId::as_str).collect::<Vec<_>>().join(", ")
}
