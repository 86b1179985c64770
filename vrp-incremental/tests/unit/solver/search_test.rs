use super::*;
use crate::helpers::models::create_test_solution;
use crate::helpers::solver::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn create_options(iterations: i64) -> SolveOptions {
    SolveOptions { iterations, duration: Duration::from_secs(60), log_progress: false }
}

fn create_plan_operator() -> Box<dyn SolveOperator> {
    Box::new(PlanOperator::new(SolveParameter::constant(2)).expect("valid operator"))
}

#[test]
fn can_reject_invalid_operators() {
    let model = create_line_problem(1, &[1.]);
    let environment = create_test_environment();

    let empty = Solver::new(model.clone(), vec![], environment.clone());
    let not_improving = Solver::new(model, vec![Box::new(FakeOperator::new("fake", 1., false))], environment);

    assert!(empty.is_err());
    assert!(not_improving.is_err());
}

#[test]
fn can_find_better_solution() {
    let model = create_line_problem(2, &[1., 2., 3., 4.]);
    let start = create_test_solution(model.clone());
    let start_score = start.score();
    let mut solver = Solver::new(model, vec![create_plan_operator()], create_test_environment()).expect("valid solver");
    let mut scores = vec![];

    let outcome = solver
        .solve(start, &create_options(10), &CancellationToken::new(), |solution| scores.push(solution.score()))
        .expect("no error");

    assert_eq!(outcome.iterations, 10);
    assert!(outcome.best.unplanned_plan_units().is_empty());
    assert!(outcome.best.score() < start_score);
    assert_eq!(scores.first(), Some(&start_score));
    assert_eq!(scores.last(), Some(&outcome.best.score()));
    assert!(scores.windows(2).all(|pair| pair[1] < pair[0]));

    let progression = solver.progression().entries().iter().map(|entry| entry.value).collect::<Vec<_>>();
    assert_eq!(progression, scores);
}

#[test]
fn can_stop_when_cancelled() {
    let model = create_line_problem(1, &[1.]);
    let operator = FakeOperator::new("fake", 1., true);
    let executions = operator.executions();
    let mut solver = Solver::new(model.clone(), vec![Box::new(operator)], create_test_environment()).expect("valid");
    let cancelled = Arc::new(AtomicUsize::new(0));
    let counter = cancelled.clone();
    solver.events_mut().context_done.register(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    let token = CancellationToken::new();
    token.cancel();

    let outcome = solver.solve(create_test_solution(model), &create_options(-1), &token, |_| {}).expect("no error");

    assert_eq!(outcome.iterations, 0);
    assert_eq!(executions.load(Ordering::Relaxed), 0);
    assert_eq!(cancelled.load(Ordering::Relaxed), 1);
}

#[test]
fn can_stop_when_duration_is_over() {
    let model = create_line_problem(1, &[1.]);
    let mut solver =
        Solver::new(model.clone(), vec![Box::new(FakeOperator::new("fake", 1., true))], create_test_environment())
            .expect("valid solver");
    let options = SolveOptions { iterations: -1, duration: Duration::from_millis(50), log_progress: false };

    let outcome =
        solver.solve(create_test_solution(model), &options, &CancellationToken::new(), |_| {}).expect("no error");

    assert!(outcome.iterations > 0);
}

#[test]
fn can_trigger_events_in_order() {
    let model = create_line_problem(1, &[1.]);
    let mut solver = Solver::new(
        model.clone(),
        vec![Box::new(FakeOperator::new("first", 1., false)), create_plan_operator()],
        create_test_environment(),
    )
    .expect("valid solver");
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let record = |name: &'static str| {
        let events = events.clone();
        move |information: &SolveInformation| {
            events.lock().unwrap().push(format!("{name}:{}:{}", information.iteration, information.operators.join(",")))
        }
    };
    let handlers = solver.events_mut();
    handlers.start.register(record("start"));
    handlers.iterating.register(record("iterating"));
    handlers.operator_executed.register(record("executed"));
    handlers.new_best_solution.register(record("best"));
    handlers.iterated.register(record("iterated"));
    handlers.done.register(record("done"));

    solver.solve(create_test_solution(model), &create_options(2), &CancellationToken::new(), |_| {}).expect("no error");

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "start:0:",
            "iterating:0:",
            "executed:0:first",
            "executed:0:first,plan",
            "best:0:first,plan",
            "iterated:0:first,plan",
            "iterating:1:",
            "executed:1:first",
            "executed:1:first,plan",
            "iterated:1:first,plan",
            "done:1:first,plan",
        ]
    );
}

#[test]
fn can_pass_iteration_delta_score_to_operators() {
    let model = create_line_problem(1, &[1., 2.]);
    let operator = FakeOperator::new("observer", 1., false);
    let deltas = operator.deltas();
    let mut solver =
        Solver::new(model.clone(), vec![create_plan_operator(), Box::new(operator)], create_test_environment())
            .expect("valid solver");
    let start = create_test_solution(model);
    let start_score = start.score();

    let outcome = solver.solve(start, &create_options(3), &CancellationToken::new(), |_| {}).expect("no error");

    let deltas = deltas.lock().unwrap().clone();
    assert_eq!(deltas.len(), 3);
    assert!((deltas[0] - (outcome.best.score() - start_score)).abs() < 1e-6);
    assert_eq!(&deltas[1..], &[0., 0.]);
}

#[test]
fn can_skip_operators_with_zero_probability() {
    let model = create_line_problem(1, &[1.]);
    let skipped = FakeOperator::new("skipped", 0., true);
    let executions = skipped.executions();
    let mut solver =
        Solver::new(model.clone(), vec![Box::new(skipped), create_plan_operator()], create_test_environment())
            .expect("valid solver");

    solver.solve(create_test_solution(model), &create_options(5), &CancellationToken::new(), |_| {}).expect("no error");

    assert_eq!(executions.load(Ordering::Relaxed), 0);
}

#[test]
fn can_propagate_operator_error() {
    let model = create_line_problem(1, &[1.]);
    let failing = FakeOperator::new("failing", 1., true).with_action(|_| Err("broken".into()));
    let mut solver = Solver::new(model.clone(), vec![Box::new(failing)], create_test_environment()).expect("valid");

    let result = solver.solve(create_test_solution(model), &create_options(5), &CancellationToken::new(), |_| {});

    assert_eq!(result.err().map(|err| err.to_string()), Some("failing: broken".to_string()));
}

#[test]
fn can_reject_solution_of_another_model() {
    let model = create_line_problem(1, &[1.]);
    let other = create_line_problem(1, &[1.]);
    let mut solver = Solver::new(model, vec![create_plan_operator()], create_test_environment()).expect("valid");

    let result = solver.solve(create_test_solution(other), &create_options(1), &CancellationToken::new(), |_| {});

    assert!(result.is_err());
}

#[test]
fn can_reset_work_solution_to_best() {
    let model = create_line_problem(1, &[1., 2.]);
    let unplan = FakeOperator::new("unplan_all", 1., false).with_action(|context| {
        context.work.unplan_vehicle(0)?;
        Ok(())
    });
    let reset = FakeOperator::new("reset", 1., false).with_action(|context| {
        context.reset_to_best();
        Ok(())
    });
    let resets = Arc::new(AtomicUsize::new(0));
    let mut solver = Solver::new(
        model.clone(),
        vec![create_plan_operator(), Box::new(unplan), Box::new(reset)],
        create_test_environment(),
    )
    .expect("valid solver");
    let counter = resets.clone();
    solver.events_mut().reset.register(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let outcome = solver.solve(create_test_solution(model), &create_options(2), &CancellationToken::new(), |_| {});

    let outcome = outcome.expect("no error");
    assert!(outcome.best.unplanned_plan_units().is_empty());
    assert_eq!(resets.load(Ordering::Relaxed), 2);
}
