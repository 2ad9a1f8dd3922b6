//! Level series: many generator runs stitched into a progression.
//!
//! - [`build_level_series`] walks a coverage list, requiring the next
//!   uncovered cards on each level and relaxing one constraint at a time
//!   ([`stages`]) when a level will not come together.
//! - [`build_meta_level_series`] runs the same planner over an absolute
//!   level range, attaching a [`MetaProfile`] that scales hand size, boss
//!   board and budgets with the level.
//!
//! Generation itself is injected as a closure, so a series can drive
//! [`generate_puzzle`](crate::generator::generate_puzzle), a remote worker
//! or a test double.

pub mod builder;
pub mod meta;
pub mod options;
pub mod stages;

pub use builder::{
    build_level_series, level_seed, AcceptContext, AttemptStats, LevelRecord, LevelRequest, SeriesEvent,
    SeriesFailure, SeriesHooks, SeriesRejection, SeriesResult, StageInfo,
};
pub use meta::{
    accept_meta_puzzle, build_meta_level_series, build_meta_profile, MetaAcceptContext, MetaHooks,
    MetaLevelRecord, MetaLevelRequest, MetaOptions, MetaProfile, MetaProfileInput, MetaSeriesOptions,
    MetaSeriesResult,
};
pub use options::SeriesOptions;
pub use stages::{plan_stages, Stage, StagePlanInput, StageRelaxation};
