#[cfg(test)]
#[path = "../../tests/unit/solver/options_test.rs"]
mod options_test;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options of a single [`Solver`](crate::solver::Solver) run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOptions {
    /// A maximum amount of iterations, negative value means no limit.
    pub iterations: i64,
    /// A maximum duration of the run.
    #[serde(with = "seconds")]
    pub duration: Duration,
    /// Enables progress logging.
    #[serde(default)]
    pub log_progress: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { iterations: -1, duration: Duration::from_secs(30), log_progress: false }
    }
}

/// Options of a [`ParallelSolver`](crate::solver::ParallelSolver) run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelSolveOptions {
    /// A maximum amount of iterations over all runs, negative value means no limit.
    pub iterations: i64,
    /// A maximum duration of the whole search.
    #[serde(with = "seconds")]
    pub duration: Duration,
    /// A maximum amount of concurrent runs, negative value means all available cpus.
    pub parallel_runs: i32,
    /// An amount of randomly constructed start solutions on top of passed ones, negative value
    /// means one per parallel run.
    pub start_solutions: i32,
    /// Waits for all runs of a cycle before starting the next cycle.
    #[serde(default)]
    pub run_deterministically: bool,
    /// Enables progress logging.
    #[serde(default)]
    pub log_progress: bool,
}

impl Default for ParallelSolveOptions {
    fn default() -> Self {
        Self {
            iterations: -1,
            duration: Duration::from_secs(5),
            parallel_runs: -1,
            start_solutions: -1,
            run_deterministically: false,
            log_progress: false,
        }
    }
}

pub(crate) fn iterations_limit(iterations: i64) -> usize {
    usize::try_from(iterations).unwrap_or(usize::MAX)
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;

        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}
