//! Search operators of the adaptive large neighborhood search.

use crate::models::solution::Solution;
use crate::solver::SolveInformation;
use crate::utils::{CancellationToken, DefaultRandom, Float, GenericResult};

mod composite;
pub use self::composite::*;

mod plan;
pub use self::plan::*;

mod restart;
pub use self::restart::*;

mod unplan;
pub use self::unplan::*;

/// An operator which changes the work solution of a solver.
pub trait SolveOperator: Send {
    /// Returns a name of the operator.
    fn name(&self) -> &str;

    /// Returns a probability to execute the operator in an iteration.
    fn probability(&self) -> Float;

    /// Returns true if the work solution can become better than the best one after execution.
    fn can_result_in_improvement(&self) -> bool;

    /// Executes the operator.
    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()>;

    /// Updates adaptive parameters of the operator after each iteration.
    fn update_parameters(&mut self, _delta_score: Float) {}

    /// Called when a solver run starts.
    fn on_start_solve(&mut self, _information: &SolveInformation) {}

    /// Called when the best solution is improved.
    fn on_better_solution(&mut self, _information: &SolveInformation) {}
}

/// A state of a solver run passed to operators.
pub struct SolveContext<'a> {
    /// A solution changed by operators.
    pub work: &'a mut Solution,
    /// The best known solution of the run.
    pub best: &'a Solution,
    /// A random generator of the run.
    pub random: &'a DefaultRandom,
    /// An information about the run.
    pub information: &'a SolveInformation,
    /// A cancellation token of the run.
    pub token: &'a CancellationToken,
    is_reset: bool,
}

impl<'a> SolveContext<'a> {
    pub(crate) fn new(
        work: &'a mut Solution,
        best: &'a Solution,
        random: &'a DefaultRandom,
        information: &'a SolveInformation,
        token: &'a CancellationToken,
    ) -> Self {
        Self { work, best, random, information, token, is_reset: false }
    }

    /// Replaces the work solution with a copy of the best one.
    pub fn reset_to_best(&mut self) {
        *self.work = self.best.clone();
        self.is_reset = true;
    }

    /// Returns true if the work solution was reset.
    pub fn is_reset(&self) -> bool {
        self.is_reset
    }
}

fn validate_probability(probability: Float) -> GenericResult<()> {
    if (0. ..=1.).contains(&probability) {
        Ok(())
    } else {
        Err(format!("probability must be between 0 and 1, got {probability}").into())
    }
}
