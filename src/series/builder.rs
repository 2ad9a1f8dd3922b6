//! Coverage-driven level series.
//!
//! Each level requires the next uncovered cards in coverage order and
//! asks a caller-supplied generator for puzzles until one plays enough of
//! them. A level that cannot be produced walks down its stage plan
//! ([`plan_stages`]) and fails the series only when every stage has used
//! up its attempts.

use std::fmt;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::error::{join_ids, SeriesError};
use crate::generator::{GenerateConfig, Puzzle};

use super::options::SeriesOptions;
use super::stages::{plan_stages, Stage, StagePlanInput, StageRelaxation};

/// Seed for one attempt, wrapping at 32 bits.
#[must_use]
pub fn level_seed(base: u32, level: usize, attempt: usize) -> u32 {
    base.wrapping_add((level as u32).wrapping_mul(100_003))
        .wrapping_add((attempt as u32).wrapping_mul(101))
}

/// What the generator is asked for on one attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequest {
    /// Level number, from one.
    pub level: usize,
    /// Stage index within the level, from zero.
    pub stage: usize,
    pub relaxation: StageRelaxation,
    /// Attempt within the stage, from one.
    pub attempt: usize,
    /// Attempt within the level, from one. Seeds derive from this.
    pub overall_attempt: usize,
    pub seed: u32,
    pub target_rounds: u32,
    pub required_cards: Vec<CardId>,
    /// Cards the solution must play, never below the required count.
    pub min_used_cards: usize,
}

impl LevelRequest {
    /// Generator settings for this request on top of [`GenerateConfig`]
    /// defaults.
    #[must_use]
    pub fn generate_config(&self) -> GenerateConfig {
        GenerateConfig::default()
            .with_seed(self.seed)
            .with_target_rounds(self.target_rounds)
            .with_required_cards(self.required_cards.clone())
            .with_min_hand_size(self.min_used_cards)
    }
}

/// Why the series threw a generated puzzle away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRejection {
    MinUsedCards,
    Coverage,
    RequiredCards,
    CustomAccept,
}

impl SeriesRejection {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            SeriesRejection::MinUsedCards => "min_used_cards",
            SeriesRejection::Coverage => "coverage",
            SeriesRejection::RequiredCards => "required_cards",
            SeriesRejection::CustomAccept => "custom_accept",
        }
    }
}

impl fmt::Display for SeriesRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Attempt outcomes for one level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStats {
    pub attempted: usize,
    pub generate_errors: usize,
    pub rejected_min_used_cards: usize,
    pub rejected_coverage: usize,
    pub rejected_required_cards: usize,
    pub rejected_custom_accept: usize,
}

impl AttemptStats {
    pub fn record(&mut self, rejection: SeriesRejection) {
        let slot = match rejection {
            SeriesRejection::MinUsedCards => &mut self.rejected_min_used_cards,
            SeriesRejection::Coverage => &mut self.rejected_coverage,
            SeriesRejection::RequiredCards => &mut self.rejected_required_cards,
            SeriesRejection::CustomAccept => &mut self.rejected_custom_accept,
        };
        *slot += 1;
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected_min_used_cards
            + self.rejected_coverage
            + self.rejected_required_cards
            + self.rejected_custom_accept
    }
}

/// A stage as announced to progress listeners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    pub level: usize,
    pub stage: usize,
    pub relaxation: StageRelaxation,
    pub required_cards: Vec<CardId>,
    pub needed_new_coverage: usize,
    pub min_used_cards: usize,
    pub target_rounds_cap: u32,
    pub max_attempts: usize,
}

/// Progress notifications, in the order they happen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeriesEvent {
    LevelStart(StageInfo),
    LevelRelax(StageInfo),
    AttemptStart {
        request: LevelRequest,
        max_stage_attempts: usize,
        needed_new_coverage: usize,
    },
    AttemptError {
        level: usize,
        stage: usize,
        attempt: usize,
        message: String,
    },
    AttemptReject {
        level: usize,
        stage: usize,
        attempt: usize,
        reason: SeriesRejection,
    },
    LevelSuccess {
        level: usize,
        stage: usize,
        attempt: usize,
        newly_covered: Vec<CardId>,
        covered_count: usize,
        total_coverage: usize,
    },
}

impl SeriesEvent {
    /// Level the event belongs to.
    #[must_use]
    pub fn level(&self) -> usize {
        match self {
            SeriesEvent::LevelStart(info) | SeriesEvent::LevelRelax(info) => info.level,
            SeriesEvent::AttemptStart { request, .. } => request.level,
            SeriesEvent::AttemptError { level, .. }
            | SeriesEvent::AttemptReject { level, .. }
            | SeriesEvent::LevelSuccess { level, .. } => *level,
        }
    }
}

/// What an acceptance hook sees besides the puzzle.
#[derive(Clone, Copy, Debug)]
pub struct AcceptContext<'r> {
    pub request: &'r LevelRequest,
    pub played_sequence: &'r [CardId],
    pub played_cards: &'r [CardId],
}

type AcceptHook<'a> = Box<dyn FnMut(&Puzzle, &AcceptContext<'_>) -> bool + 'a>;
type ProgressHook<'a> = Box<dyn FnMut(&SeriesEvent) + 'a>;

/// Optional callbacks of [`build_level_series`].
#[derive(Default)]
pub struct SeriesHooks<'a> {
    /// Final say on puzzles that passed the built-in checks.
    pub accept: Option<AcceptHook<'a>>,
    pub on_progress: Option<ProgressHook<'a>>,
}

impl<'a> SeriesHooks<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl FnMut(&Puzzle, &AcceptContext<'_>) -> bool + 'a) -> Self {
        self.accept = Some(Box::new(accept));
        self
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: impl FnMut(&SeriesEvent) + 'a) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }
}

/// An accepted level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub level: usize,
    /// Attempts spent on the level, across stages.
    pub attempt_count: usize,
    pub request: LevelRequest,
    pub puzzle: Puzzle,
    pub played_sequence: Vec<CardId>,
    pub played_cards: Vec<CardId>,
    pub newly_covered: Vec<CardId>,
    /// Covered cards after this level, in coverage order.
    pub covered_cards: Vec<CardId>,
}

/// A finished series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub levels: Vec<LevelRecord>,
    pub coverage_order: Vec<CardId>,
    pub covered_cards: Vec<CardId>,
    pub uncovered_cards: Vec<CardId>,
}

/// Diagnostics for a level that could not be produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesFailure {
    pub level: usize,
    /// Attempts per stage.
    pub max_attempts: usize,
    /// Stages planned for the level.
    pub stages: usize,
    pub last_stage: usize,
    pub last_stage_relaxation: StageRelaxation,
    pub last_stage_min_used_cards: usize,
    pub last_stage_target_rounds_cap: u32,
    pub required_cards: Vec<CardId>,
    pub needed_new_coverage: usize,
    pub last_error: Option<String>,
    pub last_request: Option<LevelRequest>,
    pub attempt_stats: AttemptStats,
}

impl fmt::Display for SeriesFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = if self.required_cards.is_empty() {
            "(none)".to_string()
        } else {
            join_ids(&self.required_cards)
        };
        write!(
            f,
            "Failed to generate level {} after {} attempts across {} stage(s). Required cards: {}. Needed new coverage: {}.",
            self.level, self.attempt_stats.attempted, self.stages, required, self.needed_new_coverage
        )?;
        if let Some(error) = &self.last_error {
            write!(f, " Last error: {error}")?;
        }
        Ok(())
    }
}

enum AttemptFailure {
    Error(String),
    Rejected(SeriesRejection),
}

struct Accepted {
    played_sequence: Vec<CardId>,
    played_cards: Vec<CardId>,
    newly_covered: Vec<CardId>,
}

struct SeriesRun<'o, 'h, G> {
    options: &'o SeriesOptions,
    coverage_order: Vec<CardId>,
    coverage_set: FxHashSet<CardId>,
    round_choices: Vec<u32>,
    covered: FxHashSet<CardId>,
    generate: G,
    hooks: SeriesHooks<'h>,
}

impl<G, E> SeriesRun<'_, '_, G>
where
    G: FnMut(&LevelRequest) -> Result<Puzzle, E>,
    E: fmt::Display,
{
    fn emit(&mut self, event: SeriesEvent) {
        if let Some(on_progress) = self.hooks.on_progress.as_mut() {
            on_progress(&event);
        }
    }

    fn uncovered(&self) -> Vec<CardId> {
        self.coverage_order
            .iter()
            .filter(|card| !self.covered.contains(*card))
            .cloned()
            .collect()
    }

    fn covered_in_order(&self) -> Vec<CardId> {
        self.coverage_order
            .iter()
            .filter(|card| self.covered.contains(*card))
            .cloned()
            .collect()
    }

    fn is_fully_covered(&self) -> bool {
        self.covered.len() == self.coverage_order.len()
    }

    fn stage_info(&self, level: usize, stage: &Stage, required_cards: Vec<CardId>) -> StageInfo {
        StageInfo {
            level,
            stage: stage.index,
            relaxation: stage.relaxation,
            needed_new_coverage: required_cards.len(),
            required_cards,
            min_used_cards: stage.min_used_cards,
            target_rounds_cap: stage.target_rounds_cap(&self.round_choices, self.options.max_target_rounds),
            max_attempts: self.options.max_attempts_per_level,
        }
    }

    fn run_level(&mut self, level: usize) -> Result<LevelRecord, Box<SeriesFailure>> {
        let options = self.options;
        let uncovered = self.uncovered();
        let coverage_open = options.coverage_until_level.map_or(true, |last| level <= last);
        let strict_required = if coverage_open {
            options.new_cards_per_level.min(uncovered.len())
        } else {
            0
        };
        let stages = plan_stages(StagePlanInput {
            required: strict_required,
            min_used_cards: options.min_used_cards,
            max_target_rounds: options.max_target_rounds,
            relax_until_success: options.relax_until_success,
            max_stages: options.max_relaxation_stages,
        });

        let mut failure = SeriesFailure {
            level,
            max_attempts: options.max_attempts_per_level,
            stages: stages.len(),
            last_stage: 0,
            last_stage_relaxation: StageRelaxation::StrictStart,
            last_stage_min_used_cards: options.min_used_cards,
            last_stage_target_rounds_cap: 1,
            required_cards: Vec::new(),
            needed_new_coverage: 0,
            last_error: None,
            last_request: None,
            attempt_stats: AttemptStats::default(),
        };
        let mut overall_attempt = 0;

        for stage in &stages {
            let required_cards: Vec<CardId> = uncovered.iter().take(stage.required_count).cloned().collect();
            let info = self.stage_info(level, stage, required_cards.clone());
            let needed = info.needed_new_coverage;
            failure.last_stage = stage.index;
            failure.last_stage_relaxation = stage.relaxation;
            failure.last_stage_min_used_cards = stage.min_used_cards;
            failure.last_stage_target_rounds_cap = info.target_rounds_cap;
            failure.required_cards = required_cards.clone();
            failure.needed_new_coverage = needed;

            if stage.index == 0 {
                self.emit(SeriesEvent::LevelStart(info));
            } else {
                warn!(
                    "level {level}: relaxing to stage {} ({}), {} required card(s), min used {}",
                    stage.index, stage.relaxation, needed, stage.min_used_cards
                );
                self.emit(SeriesEvent::LevelRelax(info));
            }

            for attempt in 1..=options.max_attempts_per_level {
                overall_attempt += 1;
                let choice = self.round_choices[(level - 1 + attempt - 1) % self.round_choices.len()];
                let request = LevelRequest {
                    level,
                    stage: stage.index,
                    relaxation: stage.relaxation,
                    attempt,
                    overall_attempt,
                    seed: level_seed(options.seed, level, overall_attempt),
                    target_rounds: stage.target_rounds(choice, options.max_target_rounds),
                    required_cards: required_cards.clone(),
                    min_used_cards: stage.min_used_cards.max(required_cards.len()),
                };
                failure.last_request = Some(request.clone());
                failure.attempt_stats.attempted += 1;
                self.emit(SeriesEvent::AttemptStart {
                    request: request.clone(),
                    max_stage_attempts: options.max_attempts_per_level,
                    needed_new_coverage: needed,
                });

                match self.try_request(&request, needed) {
                    Ok((puzzle, accepted)) => {
                        return Ok(self.accept_level(request, puzzle, accepted, overall_attempt));
                    }
                    Err(AttemptFailure::Error(message)) => {
                        debug!("level {level} attempt {overall_attempt} failed: {message}");
                        failure.attempt_stats.generate_errors += 1;
                        failure.last_error = Some(message.clone());
                        self.emit(SeriesEvent::AttemptError {
                            level,
                            stage: stage.index,
                            attempt,
                            message,
                        });
                    }
                    Err(AttemptFailure::Rejected(reason)) => {
                        debug!("level {level} attempt {overall_attempt} rejected: {reason}");
                        failure.attempt_stats.record(reason);
                        self.emit(SeriesEvent::AttemptReject {
                            level,
                            stage: stage.index,
                            attempt,
                            reason,
                        });
                    }
                }
            }
        }
        Err(Box::new(failure))
    }

    fn try_request(&mut self, request: &LevelRequest, needed: usize) -> Result<(Puzzle, Accepted), AttemptFailure> {
        let puzzle = (self.generate)(request).map_err(|e| AttemptFailure::Error(e.to_string()))?;

        let played_sequence = puzzle.played_sequence();
        if played_sequence.len() < request.min_used_cards {
            return Err(AttemptFailure::Rejected(SeriesRejection::MinUsedCards));
        }
        let played_cards = puzzle.played_cards();
        let newly_covered: Vec<CardId> = played_cards
            .iter()
            .filter(|card| self.coverage_set.contains(*card) && !self.covered.contains(*card))
            .cloned()
            .collect();
        if newly_covered.len() < needed {
            return Err(AttemptFailure::Rejected(SeriesRejection::Coverage));
        }
        if self.options.require_required_cards_used
            && request.required_cards.iter().any(|card| !played_cards.contains(card))
        {
            return Err(AttemptFailure::Rejected(SeriesRejection::RequiredCards));
        }
        if let Some(accept) = self.hooks.accept.as_mut() {
            let context = AcceptContext {
                request,
                played_sequence: &played_sequence,
                played_cards: &played_cards,
            };
            if !accept(&puzzle, &context) {
                return Err(AttemptFailure::Rejected(SeriesRejection::CustomAccept));
            }
        }
        Ok((
            puzzle,
            Accepted {
                played_sequence,
                played_cards,
                newly_covered,
            },
        ))
    }

    fn accept_level(&mut self, request: LevelRequest, puzzle: Puzzle, accepted: Accepted, attempts: usize) -> LevelRecord {
        self.covered.extend(accepted.newly_covered.iter().cloned());
        let level = request.level;
        info!(
            "level {level} accepted on stage {} after {attempts} attempt(s): {} new, {}/{} covered",
            request.stage,
            accepted.newly_covered.len(),
            self.covered.len(),
            self.coverage_order.len()
        );
        self.emit(SeriesEvent::LevelSuccess {
            level,
            stage: request.stage,
            attempt: request.attempt,
            newly_covered: accepted.newly_covered.clone(),
            covered_count: self.covered.len(),
            total_coverage: self.coverage_order.len(),
        });
        LevelRecord {
            level,
            attempt_count: attempts,
            covered_cards: self.covered_in_order(),
            request,
            puzzle,
            played_sequence: accepted.played_sequence,
            played_cards: accepted.played_cards,
            newly_covered: accepted.newly_covered,
        }
    }
}

/// Build a level series.
///
/// `generate` is called once per attempt; its errors are counted and
/// retried, never propagated. Without a fixed level count the series
/// stops as soon as every coverage card has been played.
///
/// # Errors
///
/// [`SeriesError::Config`] for invalid options, [`SeriesError::Generation`]
/// when a level exhausts every stage, and
/// [`SeriesError::IncompleteCoverage`] when full coverage is required but
/// not reached.
pub fn build_level_series<G, E>(
    options: &SeriesOptions,
    generate: G,
    hooks: SeriesHooks<'_>,
) -> Result<SeriesResult, SeriesError>
where
    G: FnMut(&LevelRequest) -> Result<Puzzle, E>,
    E: fmt::Display,
{
    options.validate()?;
    let coverage_order = options.coverage_order();
    let mut run = SeriesRun {
        options,
        coverage_set: coverage_order.iter().cloned().collect(),
        round_choices: options.round_choices(),
        coverage_order,
        covered: FxHashSet::default(),
        generate,
        hooks,
    };

    let level_limit = options.levels.map_or(run.coverage_order.len(), |levels| levels.max(1));
    let mut levels = Vec::new();
    for level in 1..=level_limit {
        let record = run.run_level(level).map_err(SeriesError::Generation)?;
        levels.push(record);
        if options.levels.is_none() && run.is_fully_covered() {
            break;
        }
    }

    let uncovered_cards = run.uncovered();
    if options.require_full_coverage && !uncovered_cards.is_empty() {
        return Err(SeriesError::IncompleteCoverage(uncovered_cards));
    }
    Ok(SeriesResult {
        levels,
        covered_cards: run.covered_in_order(),
        coverage_order: run.coverage_order,
        uncovered_cards,
    })
}
