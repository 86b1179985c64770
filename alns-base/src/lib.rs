//! This crate exposes problem agnostic building blocks for adaptive large neighborhood search
//! solvers: seedable randomness, cooperative cancellation, self tuning parameters and telemetry.

#![warn(missing_docs)]

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
#[macro_use]
#[allow(missing_docs)]
pub mod helpers;

pub mod heuristics;
pub mod prelude;
pub mod telemetry;
pub mod termination;
pub mod utils;
