//! Budgeted depth-first search over puzzle states.
//!
//! One engine serves two roles:
//!
//! - **Solver**: records action paths, usually stops at a small win cap
//!   ([`solve`])
//! - **Verifier**: bounded nodes, no paths, used by the generator to prove
//!   "at least one" and "at most N" solutions
//!
//! Both drive [`DfsSearch`] in caller-controlled batches.

pub mod config;
pub mod dfs;
pub mod rounds;
pub mod stats;

pub use config::SearchConfig;
pub use dfs::{solve, solve_with, DfsSearch, SearchStatus, SolveResult};
pub use rounds::{is_early_win, is_final_round, is_past_round_limit};
pub use stats::SearchStats;
