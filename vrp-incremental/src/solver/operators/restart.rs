#[cfg(test)]
#[path = "../../../tests/unit/solver/operators/restart_test.rs"]
mod restart_test;

use super::*;
use crate::utils::{SolveParameter, compare_floats};
use std::cmp::Ordering;

/// An operator which resets the work solution to the best one when the best solution has not
/// been improved for more iterations than the parameter value.
pub struct RestartOperator {
    maximum_iterations: SolveParameter,
    last_improvement: usize,
}

impl RestartOperator {
    /// Creates a new instance of `RestartOperator`.
    pub fn new(maximum_iterations: SolveParameter) -> GenericResult<Self> {
        if maximum_iterations.value() < 0 {
            return Err(format!("maximum iterations must not be negative, got {}", maximum_iterations.value()).into());
        }

        Ok(Self { maximum_iterations, last_improvement: 0 })
    }
}

impl SolveOperator for RestartOperator {
    fn name(&self) -> &str {
        "restart"
    }

    fn probability(&self) -> Float {
        1.
    }

    fn can_result_in_improvement(&self) -> bool {
        true
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        let iteration = context.information.iteration;

        if compare_floats(context.work.score(), context.best.score()) == Ordering::Equal {
            self.last_improvement = iteration;
        }

        if iteration.saturating_sub(self.last_improvement) > self.maximum_iterations.value().max(0) as usize {
            context.reset_to_best();
            self.last_improvement = iteration;
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.maximum_iterations.update(delta_score);
    }

    fn on_start_solve(&mut self, _: &SolveInformation) {
        self.last_improvement = 0;
    }

    fn on_better_solution(&mut self, information: &SolveInformation) {
        self.last_improvement = information.iteration;
    }
}
