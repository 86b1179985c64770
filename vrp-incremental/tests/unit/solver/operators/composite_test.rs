use super::*;
use crate::helpers::models::create_test_solution;
use crate::helpers::solver::*;
use crate::utils::{CancellationToken, DefaultRandom};
use std::sync::atomic::Ordering;

fn create_solution() -> Solution {
    create_test_solution(create_line_problem(1, &[1.]))
}

#[test]
fn can_execute_all_operators_of_and() {
    let (first, second) = (FakeOperator::new("first", 1., false), FakeOperator::new("second", 0.5, true));
    let (first_executions, second_executions) = (first.executions(), second.executions());
    let mut operator = AndOperator::new(1., vec![Box::new(first), Box::new(second)]).expect("valid operator");
    let mut work = create_solution();
    let best = work.clone();

    with_solve_context(&mut work, &best, 0, |context| operator.execute(context)).expect("no error");

    assert!(operator.can_result_in_improvement());
    assert_eq!(first_executions.load(Ordering::Relaxed), 1);
    assert_eq!(second_executions.load(Ordering::Relaxed), 1);
}

#[test]
fn can_execute_one_operator_of_or() {
    let (first, second) = (FakeOperator::new("first", 1., false), FakeOperator::new("second", 3., false));
    let (first_executions, second_executions) = (first.executions(), second.executions());
    let mut operator = OrOperator::new(1., vec![Box::new(first), Box::new(second)]).expect("valid operator");
    let mut work = create_solution();
    let best = work.clone();
    let (random, token, information) =
        (DefaultRandom::new_repeatable(0), CancellationToken::new(), SolveInformation::new());

    (0..100).for_each(|_| {
        let mut context = SolveContext::new(&mut work, &best, &random, &information, &token);
        operator.execute(&mut context).expect("no error");
    });

    let (first, second) = (first_executions.load(Ordering::Relaxed), second_executions.load(Ordering::Relaxed));
    assert!(!operator.can_result_in_improvement());
    assert_eq!(first + second, 100);
    assert!(second > first);
}

#[test]
fn can_drop_operators_with_zero_probability() {
    let (skipped, used) = (FakeOperator::new("skipped", 0., true), FakeOperator::new("used", 1., false));
    let (skipped_executions, used_executions) = (skipped.executions(), used.executions());
    let mut operator = OrOperator::new(1., vec![Box::new(skipped), Box::new(used)]).expect("valid operator");
    let mut work = create_solution();
    let best = work.clone();

    with_solve_context(&mut work, &best, 0, |context| operator.execute(context)).expect("no error");

    assert!(!operator.can_result_in_improvement());
    assert_eq!(skipped_executions.load(Ordering::Relaxed), 0);
    assert_eq!(used_executions.load(Ordering::Relaxed), 1);
}

#[test]
fn can_forward_parameter_updates() {
    let inner = FakeOperator::new("inner", 1., true);
    let deltas = inner.deltas();
    let mut operator = AndOperator::new(0.5, vec![Box::new(inner)]).expect("valid operator");

    operator.update_parameters(-2.);

    assert_eq!(operator.probability(), 0.5);
    assert_eq!(*deltas.lock().unwrap(), vec![-2.]);
}

parameterized_test! {can_reject_invalid_composition, (probability, inner_probability), {
    let and = AndOperator::new(probability, vec![Box::new(FakeOperator::new("inner", inner_probability, true))]);
    let or = OrOperator::new(probability, vec![Box::new(FakeOperator::new("inner", inner_probability, true))]);

    assert!(and.is_err());
    assert!(or.is_err());
}}

can_reject_invalid_composition! {
    case01_probability_above_one: (1.5, 1.),
    case02_negative_probability: (-0.1, 1.),
    case03_only_zero_operators: (1., 0.),
}
