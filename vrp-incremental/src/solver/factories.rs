#[cfg(test)]
#[path = "../../tests/unit/solver/factories_test.rs"]
mod factories_test;

use crate::models::solution::Solution;
use crate::solver::*;
use crate::utils::*;
use std::sync::Arc;
use std::time::Duration;

/// Creates a factory which gives each run a random amount of iterations, a multiple of 200
/// up to 2000, and a duration of 30 seconds.
pub fn create_default_solve_options_factory() -> SolveOptionsFactory {
    Arc::new(|information: &ParallelSolveInformation| {
        Ok(SolveOptions {
            iterations: (1 + information.random.uniform_int(0, 9) as i64) * 200,
            duration: Duration::from_secs(30),
            log_progress: false,
        })
    })
}

/// Creates a factory of solvers which run an adaptive unplan operator followed by a plan
/// operator.
pub fn create_default_solver_factory(environment: Arc<Environment>) -> SolverFactory {
    Arc::new(move |_: &ParallelSolveInformation, solution: &Solution| {
        let model = solution.model().clone();
        let units = model.root_plan_units().count();
        let max_unplanned = i32::try_from(units / 20).unwrap_or(i32::MAX).max(2);

        let unplan = UnplanOperator::new(
            SolveParameter::new(SolveParameterSettings {
                start: 2,
                delta_after_iterations: 125,
                delta: 2,
                min: 2,
                max: max_unplanned,
                snap_back_after_improvement: true,
                zigzag: true,
            })
            .map_err(|err| err.context("unplan"))?,
        )?;

        let plan = PlanOperator::new(
            SolveParameter::new(SolveParameterSettings {
                start: 2,
                delta_after_iterations: 1_000_000_000,
                delta: 0,
                min: 2,
                max: 2,
                snap_back_after_improvement: true,
                zigzag: true,
            })
            .map_err(|err| err.context("plan"))?,
        )?;

        Solver::new(model, vec![Box::new(unplan), Box::new(plan)], environment.clone())
    })
}
