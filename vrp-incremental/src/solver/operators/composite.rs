//! Operators which combine other operators.

#[cfg(test)]
#[path = "../../../tests/unit/solver/operators/composite_test.rs"]
mod composite_test;

use super::*;
use crate::utils::{AliasSampler, Random};

/// An operator which executes each of its operators with its own probability. Operators with zero
/// probability are dropped.
pub struct AndOperator {
    probability: Float,
    operators: Vec<Box<dyn SolveOperator>>,
    can_result_in_improvement: bool,
}

impl AndOperator {
    /// Creates a new instance of `AndOperator`.
    pub fn new(probability: Float, operators: Vec<Box<dyn SolveOperator>>) -> GenericResult<Self> {
        validate_probability(probability)?;
        let operators = non_zero_operators(operators)?;
        let can_result_in_improvement = operators.iter().any(|operator| operator.can_result_in_improvement());

        Ok(Self { probability, operators, can_result_in_improvement })
    }
}

impl SolveOperator for AndOperator {
    fn name(&self) -> &str {
        "and"
    }

    fn probability(&self) -> Float {
        self.probability
    }

    fn can_result_in_improvement(&self) -> bool {
        self.can_result_in_improvement
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        for operator in self.operators.iter_mut() {
            if context.token.is_cancelled() {
                break;
            }

            if context.random.is_hit(self.probability) {
                operator.execute(context).map_err(|err| err.context(operator.name()))?;
            }
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.operators.iter_mut().for_each(|operator| operator.update_parameters(delta_score));
    }

    fn on_start_solve(&mut self, information: &SolveInformation) {
        self.operators.iter_mut().for_each(|operator| operator.on_start_solve(information));
    }

    fn on_better_solution(&mut self, information: &SolveInformation) {
        self.operators.iter_mut().for_each(|operator| operator.on_better_solution(information));
    }
}

/// An operator which executes one of its operators sampled proportionally to their
/// probabilities. Operators with zero probability are dropped.
pub struct OrOperator {
    probability: Float,
    operators: Vec<Box<dyn SolveOperator>>,
    sampler: AliasSampler,
    can_result_in_improvement: bool,
}

impl OrOperator {
    /// Creates a new instance of `OrOperator`.
    pub fn new(probability: Float, operators: Vec<Box<dyn SolveOperator>>) -> GenericResult<Self> {
        validate_probability(probability)?;
        let operators = non_zero_operators(operators)?;
        let sampler = AliasSampler::new(operators.iter().map(|operator| operator.probability()).collect())?;
        let can_result_in_improvement = operators.iter().any(|operator| operator.can_result_in_improvement());

        Ok(Self { probability, operators, sampler, can_result_in_improvement })
    }
}

impl SolveOperator for OrOperator {
    fn name(&self) -> &str {
        "or"
    }

    fn probability(&self) -> Float {
        self.probability
    }

    fn can_result_in_improvement(&self) -> bool {
        self.can_result_in_improvement
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        let operator = &mut self.operators[self.sampler.sample(context.random)];

        operator.execute(context).map_err(|err| err.context(operator.name()))
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.operators.iter_mut().for_each(|operator| operator.update_parameters(delta_score));
    }

    fn on_start_solve(&mut self, information: &SolveInformation) {
        self.operators.iter_mut().for_each(|operator| operator.on_start_solve(information));
    }

    fn on_better_solution(&mut self, information: &SolveInformation) {
        self.operators.iter_mut().for_each(|operator| operator.on_better_solution(information));
    }
}

fn non_zero_operators(operators: Vec<Box<dyn SolveOperator>>) -> GenericResult<Vec<Box<dyn SolveOperator>>> {
    let operators = operators.into_iter().filter(|operator| operator.probability() > 0.).collect::<Vec<_>>();

    if operators.is_empty() {
        Err("at least one operator with probability larger than zero is required".into())
    } else {
        Ok(operators)
    }
}
