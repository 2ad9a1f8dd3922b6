//! Difficulty-scaled series over an absolute level range.
//!
//! The meta profile turns an absolute level number into generator
//! settings. Levels are grouped into tiers of `levels_per_tier`; every
//! tier grows the hand, the boss board and the budgets. Failed stages
//! within a level drop the effective tier again, so retries get easier,
//! never harder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardLibrary};
use crate::core::GameState;
use crate::error::{EngineResult, SeriesError};
use crate::generator::{GenerateConfig, Puzzle};
use crate::rules::PuzzleRules;
use crate::search::{DfsSearch, SearchConfig, SearchStatus};

use super::builder::{build_level_series, LevelRecord, LevelRequest, SeriesEvent, SeriesHooks};
use super::options::SeriesOptions;

/// Growth curve of the meta profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaOptions {
    pub levels_per_tier: usize,
    /// Failed stages that cost one tier.
    pub relax_tier_every_stages: usize,
    pub rounds_start: u32,
    pub rounds_max: u32,
    pub hand_size_start: usize,
    pub hand_size_max: usize,
    pub decoys_start: usize,
    pub decoys_max: usize,
    pub boss_min_start: usize,
    pub boss_min_max: usize,
    pub boss_max_start: usize,
    pub boss_max_max: usize,
    pub boss_mods_start: usize,
    pub boss_mods_max: usize,
    pub min_hand_size_step_every_tiers: usize,
    pub min_hand_size_max: usize,
    /// Solution cap below `tighten_solutions_at_tier`.
    pub loosened_solution_cap: usize,
    pub tighten_solutions_at_tier: usize,
    pub action_budget_start: usize,
    pub action_budget_step: usize,
    pub solver_budget_start: usize,
    pub solver_budget_step: usize,
}

impl Default for MetaOptions {
    fn default() -> Self {
        Self {
            levels_per_tier: 4,
            relax_tier_every_stages: 4,
            rounds_start: 1,
            rounds_max: 6,
            hand_size_start: 4,
            hand_size_max: 8,
            decoys_start: 0,
            decoys_max: 4,
            boss_min_start: 0,
            boss_min_max: 3,
            boss_max_start: 0,
            boss_max_max: 6,
            boss_mods_start: 0,
            boss_mods_max: 2,
            min_hand_size_step_every_tiers: 2,
            min_hand_size_max: 6,
            loosened_solution_cap: 2,
            tighten_solutions_at_tier: 2,
            action_budget_start: 220,
            action_budget_step: 60,
            solver_budget_start: 25_000,
            solver_budget_step: 2_500,
        }
    }
}

impl MetaOptions {
    #[must_use]
    pub fn with_levels_per_tier(mut self, levels: usize) -> Self {
        self.levels_per_tier = levels;
        self
    }

    #[must_use]
    pub fn with_relax_tier_every_stages(mut self, stages: usize) -> Self {
        self.relax_tier_every_stages = stages;
        self
    }

    #[must_use]
    pub fn with_rounds(mut self, start: u32, max: u32) -> Self {
        self.rounds_start = start;
        self.rounds_max = max;
        self
    }

    #[must_use]
    pub fn with_hand_size(mut self, start: usize, max: usize) -> Self {
        self.hand_size_start = start;
        self.hand_size_max = max;
        self
    }

    #[must_use]
    pub fn with_decoys(mut self, start: usize, max: usize) -> Self {
        self.decoys_start = start;
        self.decoys_max = max;
        self
    }

    #[must_use]
    pub fn with_solution_caps(mut self, loosened: usize, tighten_at_tier: usize) -> Self {
        self.loosened_solution_cap = loosened;
        self.tighten_solutions_at_tier = tighten_at_tier;
        self
    }
}

/// Where a profile is being computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProfileInput {
    pub absolute_level: usize,
    /// Stage index within the level.
    pub stage: usize,
    pub requested_target_rounds: u32,
    pub requested_min_used_cards: usize,
    pub base_min_used_cards: usize,
}

/// Generator settings for one level and stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProfile {
    pub tier: usize,
    /// Tier after stage relaxation.
    pub effective_tier: usize,
    pub hand_size: usize,
    pub min_hand_size: usize,
    pub decoys: usize,
    pub boss_min: usize,
    pub boss_max: usize,
    pub boss_mods: usize,
    pub target_rounds: u32,
    pub max_solutions: usize,
    pub action_budget: usize,
    pub solver_budget: usize,
}

/// `value` clamped to `min..=max`, or `min` when the range is empty.
fn clamp_to<T: Ord>(value: T, min: T, max: T) -> T {
    if max < min {
        return min;
    }
    value.clamp(min, max)
}

/// Profile for a level. Pure.
///
/// Difficulty follows the absolute level, so separate runs continue the
/// same curve. A higher `stage` never yields a harder profile.
#[must_use]
pub fn build_meta_profile(input: &MetaProfileInput, options: &MetaOptions) -> MetaProfile {
    let levels_per_tier = options.levels_per_tier.max(1);
    let relax_every = options.relax_tier_every_stages.max(1);
    let tier = input.absolute_level.saturating_sub(1) / levels_per_tier;
    let effective_tier = tier.saturating_sub(input.stage / relax_every);
    let half = effective_tier / 2;
    let third = effective_tier / 3;

    let hand_size = clamp_to(options.hand_size_start + effective_tier, 1, options.hand_size_max.max(1));
    let rounds_max = options.rounds_max.max(1);
    let rounds_base = clamp_to(options.rounds_start.saturating_add(half as u32), 1, rounds_max);
    let target_rounds = clamp_to(input.requested_target_rounds.max(rounds_base), 1, rounds_max);
    let decoys = clamp_to(options.decoys_start + half, 0, options.decoys_max);
    let boss_max = clamp_to(options.boss_max_start + half, 0, options.boss_max_max);
    let boss_min = clamp_to(options.boss_min_start + third, 0, options.boss_min_max.min(boss_max));
    let boss_mods = clamp_to(options.boss_mods_start + third, 0, options.boss_mods_max);

    let min_hand_base =
        input.base_min_used_cards + effective_tier / options.min_hand_size_step_every_tiers.max(1);
    let min_hand_size = clamp_to(
        input.requested_min_used_cards.max(min_hand_base),
        0,
        hand_size.min(options.min_hand_size_max),
    );

    let max_solutions = if effective_tier >= options.tighten_solutions_at_tier {
        1
    } else {
        options.loosened_solution_cap.max(1)
    };

    MetaProfile {
        tier,
        effective_tier,
        hand_size,
        min_hand_size,
        decoys,
        boss_min,
        boss_max,
        boss_mods,
        target_rounds,
        max_solutions,
        action_budget: options.action_budget_start + effective_tier * options.action_budget_step,
        solver_budget: options.solver_budget_start + effective_tier * options.solver_budget_step,
    }
}

/// Settings for [`build_meta_level_series`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSeriesOptions {
    pub seed: u32,
    /// First absolute level, at least one.
    pub start_level: usize,
    /// Last absolute level, inclusive.
    pub end_level: usize,
    /// Absolute level after which no new cards are required.
    pub coverage_until_level: Option<usize>,
    pub coverage_cards: Vec<CardId>,
    pub new_cards_per_level: usize,
    pub min_used_cards: usize,
    pub target_rounds: Vec<u32>,
    pub max_target_rounds: u32,
    pub max_attempts_per_level: usize,
    pub max_relaxation_stages: usize,
    pub profile: MetaOptions,
    pub require_required_cards_used: bool,
    pub require_full_coverage: bool,
    pub relax_until_success: bool,
    /// Generator attempts per series attempt.
    pub inner_max_attempts: usize,
    /// Node budget of [`accept_meta_puzzle`]; 0 uses the profile's
    /// solver budget.
    pub accept_solver_budget: usize,
}

impl Default for MetaSeriesOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            start_level: 1,
            end_level: 24,
            coverage_until_level: None,
            coverage_cards: Vec::new(),
            new_cards_per_level: 3,
            min_used_cards: 3,
            target_rounds: vec![1, 2],
            max_target_rounds: 6,
            max_attempts_per_level: 25,
            max_relaxation_stages: 60,
            profile: MetaOptions::default(),
            require_required_cards_used: false,
            require_full_coverage: false,
            relax_until_success: true,
            inner_max_attempts: 300,
            accept_solver_budget: 50_000,
        }
    }
}

impl MetaSeriesOptions {
    /// Options covering `cards`, everything else default.
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = impl Into<CardId>>) -> Self {
        Self {
            coverage_cards: cards.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the absolute level range.
    #[must_use]
    pub fn with_levels(mut self, start: usize, end: usize) -> Self {
        self.start_level = start;
        self.end_level = end;
        self
    }

    #[must_use]
    pub fn with_coverage_until_level(mut self, level: usize) -> Self {
        self.coverage_until_level = Some(level);
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
    pub fn with_profile(mut self, profile: MetaOptions) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn with_require_full_coverage(mut self, require: bool) -> Self {
        self.require_full_coverage = require;
        self
    }

    #[must_use]
    pub fn with_inner_max_attempts(mut self, attempts: usize) -> Self {
        self.inner_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_accept_solver_budget(mut self, budget: usize) -> Self {
        self.accept_solver_budget = budget;
        self
    }

    /// Copy with `start_level >= 1` and `end_level >= start_level`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let start_level = self.start_level.max(1);
        Self {
            start_level,
            end_level: self.end_level.max(start_level),
            ..self.clone()
        }
    }

    /// Levels in the range.
    #[must_use]
    pub fn level_count(&self) -> usize {
        let normalized = self.normalized();
        normalized.end_level - normalized.start_level + 1
    }

    /// Absolute level of relative level `level`.
    #[must_use]
    pub fn absolute_level(&self, level: usize) -> usize {
        self.start_level.max(1) + level.saturating_sub(1)
    }

    /// Plain series settings over the relative level range.
    #[must_use]
    pub fn series_options(&self) -> SeriesOptions {
        let start = self.start_level.max(1);
        SeriesOptions {
            seed: self.seed,
            coverage_cards: self.coverage_cards.clone(),
            new_cards_per_level: self.new_cards_per_level,
            min_used_cards: self.min_used_cards,
            target_rounds: self.target_rounds.clone(),
            max_target_rounds: self.max_target_rounds,
            max_attempts_per_level: self.max_attempts_per_level,
            max_relaxation_stages: self.max_relaxation_stages,
            levels: Some(self.level_count()),
            coverage_until_level: self.coverage_until_level.map(|last| (last + 1).saturating_sub(start)),
            require_required_cards_used: self.require_required_cards_used,
            require_full_coverage: self.require_full_coverage,
            relax_until_success: self.relax_until_success,
        }
    }

    /// Series request extended with its absolute level and profile.
    #[must_use]
    pub fn meta_request(&self, request: &LevelRequest) -> MetaLevelRequest {
        let absolute_level = self.absolute_level(request.level);
        let profile = build_meta_profile(
            &MetaProfileInput {
                absolute_level,
                stage: request.stage,
                requested_target_rounds: request.target_rounds,
                requested_min_used_cards: request.min_used_cards,
                base_min_used_cards: self.min_used_cards,
            },
            &self.profile,
        );
        MetaLevelRequest {
            request: request.clone(),
            absolute_level,
            profile,
        }
    }
}

/// A series request with its difficulty profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaLevelRequest {
    #[serde(flatten)]
    pub request: LevelRequest,
    pub absolute_level: usize,
    pub profile: MetaProfile,
}

impl MetaLevelRequest {
    /// Generator settings: the profile's knobs with the request's seed and
    /// required cards.
    #[must_use]
    pub fn generate_config(&self, max_attempts: usize) -> GenerateConfig {
        let profile = &self.profile;
        GenerateConfig::default()
            .with_seed(self.request.seed)
            .with_hand_size(profile.hand_size)
            .with_min_hand_size(profile.min_hand_size)
            .with_decoys(profile.decoys)
            .with_target_rounds(profile.target_rounds)
            .with_boss_board(profile.boss_min, profile.boss_max)
            .with_boss_mods(profile.boss_mods)
            .with_action_budget(profile.action_budget)
            .with_solver_budget(profile.solver_budget)
            .with_max_solutions(profile.max_solutions)
            .with_max_attempts(max_attempts)
            .with_required_cards(self.request.required_cards.clone())
    }
}

/// An accepted meta level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaLevelRecord {
    #[serde(flatten)]
    pub record: LevelRecord,
    pub absolute_level: usize,
    pub profile: MetaProfile,
}

/// A finished meta series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaSeriesResult {
    pub start_level: usize,
    pub end_level: usize,
    pub levels: Vec<MetaLevelRecord>,
    pub coverage_order: Vec<CardId>,
    pub covered_cards: Vec<CardId>,
    pub uncovered_cards: Vec<CardId>,
}

/// What a meta acceptance hook sees besides the puzzle.
#[derive(Clone, Copy, Debug)]
pub struct MetaAcceptContext<'r> {
    pub request: &'r MetaLevelRequest,
    pub played_sequence: &'r [CardId],
    pub played_cards: &'r [CardId],
}

type MetaAcceptHook<'a> = Box<dyn FnMut(&Puzzle, &MetaAcceptContext<'_>) -> bool + 'a>;
type MetaProgressHook<'a> = Box<dyn FnMut(&SeriesEvent, usize) + 'a>;

/// Optional callbacks of [`build_meta_level_series`]. Progress listeners
/// also get the event's absolute level.
#[derive(Default)]
pub struct MetaHooks<'a> {
    pub accept: Option<MetaAcceptHook<'a>>,
    pub on_progress: Option<MetaProgressHook<'a>>,
}

impl<'a> MetaHooks<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl FnMut(&Puzzle, &MetaAcceptContext<'_>) -> bool + 'a) -> Self {
        self.accept = Some(Box::new(accept));
        self
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: impl FnMut(&SeriesEvent, usize) + 'a) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }
}

/// Build a series over `start_level..=end_level` with per-level profiles.
///
/// Coverage, relaxation and failure reporting are those of
/// [`build_level_series`]; levels are numbered relative to the start in
/// requests and events.
///
/// # Errors
///
/// Same as [`build_level_series`].
pub fn build_meta_level_series<G, E>(
    options: &MetaSeriesOptions,
    mut generate: G,
    hooks: MetaHooks<'_>,
) -> Result<MetaSeriesResult, SeriesError>
where
    G: FnMut(&MetaLevelRequest) -> Result<Puzzle, E>,
    E: fmt::Display,
{
    let normalized = options.normalized();
    let meta = &normalized;
    let MetaHooks { accept, on_progress } = hooks;

    let mut series_hooks = SeriesHooks::new();
    if let Some(mut accept) = accept {
        series_hooks = series_hooks.with_accept(move |puzzle, context| {
            let request = meta.meta_request(context.request);
            accept(
                puzzle,
                &MetaAcceptContext {
                    request: &request,
                    played_sequence: context.played_sequence,
                    played_cards: context.played_cards,
                },
            )
        });
    }
    if let Some(mut on_progress) = on_progress {
        series_hooks = series_hooks.with_progress(move |event| on_progress(event, meta.absolute_level(event.level())));
    }

    let result = build_level_series(
        &meta.series_options(),
        |request: &LevelRequest| generate(&meta.meta_request(request)),
        series_hooks,
    )?;

    let levels = result
        .levels
        .into_iter()
        .map(|record| {
            let MetaLevelRequest {
                absolute_level,
                profile,
                ..
            } = meta.meta_request(&record.request);
            MetaLevelRecord {
                record,
                absolute_level,
                profile,
            }
        })
        .collect();

    Ok(MetaSeriesResult {
        start_level: meta.start_level,
        end_level: meta.end_level,
        levels,
        coverage_order: result.coverage_order,
        covered_cards: result.covered_cards,
        uncovered_cards: result.uncovered_cards,
    })
}

/// Solver-backed acceptance: the puzzle must have at least one solution
/// and, when the search finishes within budget, no more than the
/// profile's cap.
///
/// `budget` caps visited nodes and seen states; 0 falls back to the
/// profile's solver budget, and a zero profile budget means unlimited.
pub fn accept_meta_puzzle(
    puzzle: &Puzzle,
    library: &CardLibrary,
    profile: &MetaProfile,
    budget: usize,
) -> EngineResult<bool> {
    let state = GameState {
        player: puzzle.player.clone(),
        opponent: puzzle.opponent.clone(),
        mana_per_round: puzzle.mana_per_round.unwrap_or(0),
        target_rounds: Some(puzzle.target_rounds.unwrap_or(profile.target_rounds)),
        ..GameState::default()
    }
    .normalize();

    let max_solutions = profile.max_solutions.max(1);
    let budget = if budget > 0 { budget } else { profile.solver_budget };
    let config = SearchConfig::default()
        .with_max_wins(max_solutions + 1)
        .with_max_nodes(budget)
        .with_max_seen(budget);

    let mut search = DfsSearch::new(state, config);
    let status = search.run(&PuzzleRules, library)?;
    let wins = search.wins();
    Ok(match status {
        SearchStatus::Budget => wins >= 1,
        _ => (1..=max_solutions).contains(&wins),
    })
}
