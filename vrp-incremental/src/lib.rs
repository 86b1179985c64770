//! An incremental local search engine for vehicle routing problems.
//!
//! The crate is organized bottom up:
//! - [`models`] defines an immutable problem [`Model`](models::problem::Model) and a mutable
//!   [`Solution`](models::solution::Solution) which keeps forward propagated caches per stop;
//! - [`construction`] contains moves, the stop generator used by rules to evaluate moves without
//!   applying them, best move search and concrete constraints and objectives;
//! - [`solver`] contains search operators, the sequential [`Solver`](solver::Solver) and the
//!   [`ParallelSolver`](solver::ParallelSolver) which shares the best known solution between workers.

#![warn(missing_docs)]

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
#[macro_use]
#[allow(missing_docs)]
pub mod helpers;

pub mod construction;
pub mod models;
pub mod prelude;
pub mod solver;
pub mod utils;
