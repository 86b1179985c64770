use super::*;
use crate::construction::heuristics::random_solution_construction;
use crate::helpers::models::create_test_solution;
use crate::helpers::solver::*;
use crate::utils::CancellationToken;

fn create_solutions() -> (Solution, Solution) {
    let model = create_line_problem(1, &[1., 2.]);
    let work = create_test_solution(model);
    let mut best = work.clone();
    random_solution_construction(&mut best, &CancellationToken::new()).expect("no error");

    (work, best)
}

parameterized_test! {can_reset_after_iterations_without_improvement, (iteration, expected), {
    can_reset_after_iterations_without_improvement_impl(iteration, expected);
}}

can_reset_after_iterations_without_improvement! {
    case01_first_iteration: (0, false),
    case02_at_limit: (2, false),
    case03_above_limit: (3, true),
}

fn can_reset_after_iterations_without_improvement_impl(iteration: usize, expected: bool) {
    let (mut work, best) = create_solutions();
    let mut operator = RestartOperator::new(SolveParameter::constant(2)).expect("valid operator");

    let is_reset = with_solve_context(&mut work, &best, iteration, |context| {
        operator.execute(context).expect("no error");
        context.is_reset()
    });

    assert_eq!(is_reset, expected);
    assert_eq!(work.score() == best.score(), expected);
}

#[test]
fn can_track_last_improvement() {
    let (mut work, best) = create_solutions();
    let mut operator = RestartOperator::new(SolveParameter::constant(2)).expect("valid operator");
    let mut information = SolveInformation::new();
    information.iteration = 3;
    operator.on_better_solution(&information);

    let is_reset = with_solve_context(&mut work, &best, 5, |context| {
        operator.execute(context).expect("no error");
        context.is_reset()
    });

    assert!(!is_reset);
}

#[test]
fn can_reject_negative_maximum_iterations() {
    assert!(RestartOperator::new(SolveParameter::constant(-1)).is_err());
}
