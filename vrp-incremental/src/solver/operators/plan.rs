#[cfg(test)]
#[path = "../../../tests/unit/solver/operators/plan_test.rs"]
mod plan_test;

use super::*;
use crate::construction::heuristics::{Move, best_move};
use crate::utils::SolveParameter;

/// An operator which plans unplanned plan units. It repeatedly draws a group of unplanned plan
/// units, finds the best move among them and executes it unless it worsens the score. Plan units
/// without executable moves are excluded from further draws.
pub struct PlanOperator {
    group_size: SolveParameter,
}

impl PlanOperator {
    /// Creates a new instance of `PlanOperator`.
    pub fn new(group_size: SolveParameter) -> GenericResult<Self> {
        if group_size.value() < 1 {
            return Err(format!("group size must be positive, got {}", group_size.value()).into());
        }

        Ok(Self { group_size })
    }

    /// Returns the group size parameter.
    pub fn group_size(&self) -> &SolveParameter {
        &self.group_size
    }
}

impl SolveOperator for PlanOperator {
    fn name(&self) -> &str {
        "plan"
    }

    fn probability(&self) -> Float {
        1.
    }

    fn can_result_in_improvement(&self) -> bool {
        true
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        let model = context.work.model().clone();
        let group_size = self.group_size.value().max(1) as usize;
        let mut unplanned = context.work.unplanned_plan_units().clone();

        while !unplanned.is_empty() && !context.token.is_cancelled() {
            let mut best = Move::NotExecutable;

            for unit in unplanned.random_elements(context.random, group_size) {
                let candidate = best_move(context.work, unit, context.token)?;

                if candidate.is_executable() {
                    best = best.take_best(candidate, context.random);
                } else {
                    unplanned.remove(unit);
                }
            }

            if let Some(unit) = best.plan_unit().filter(|_| best.is_executable()) {
                if best.value() <= 0. {
                    best.execute(context.work)?;
                }

                unplanned.remove(model.root_of(unit));
            }
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.group_size.update(delta_score);
    }
}
