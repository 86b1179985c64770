use super::*;
use crate::construction::heuristics::best_move;
use crate::helpers::models::*;

struct UnplannedContext {
    solution: Solution,
    single: usize,
    one_of: usize,
    all_of: usize,
}

fn create_context() -> UnplannedContext {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, single) = builder.add_single(1.);
    builder.add_sequence(&[2., 3.]);
    let (_, cheap) = builder.add_single(4.);
    let (expensive_stop, expensive) = builder.add_single(5.);
    let (_, left) = builder.add_single(6.);
    let (_, right) = builder.add_single(7.);
    let one_of = builder.model_mut().new_plan_one_of_plan_units(vec![cheap, expensive]).expect("valid unit");
    let all_of = builder.model_mut().new_plan_all_plan_units(vec![left, right], true).expect("valid unit");
    let mut cost = StopExpression::new("cost", 10.);
    cost.set_value(expensive_stop, 30.);
    builder.model_mut().add_objective(1., create_unplanned_objective(Arc::new(cost)).expect("valid")).expect("valid");

    UnplannedContext { solution: create_test_solution(builder.build()), single, one_of, all_of }
}

#[test]
fn can_calculate_cost_of_unplanned_units() {
    let context = create_context();

    assert_eq!(context.solution.score(), 10. + 20. + 20. + 20.);
}

#[test]
fn can_estimate_cost_decrease_of_planned_units() {
    let UnplannedContext { mut solution, single, one_of, .. } = create_context();

    let move_stops = create_tail_move(&solution, 0, single);
    assert_eq!(move_stops.value(), -10.);
    assert_estimated_delta(&mut solution, move_stops);

    let best = best_move(&mut solution, one_of, &CancellationToken::new()).expect("no error");
    assert_eq!(best.value(), -20.);
    assert_eq!(best.execute(&mut solution), Ok(true));
    assert_eq!(solution.score(), 20. + 20.);
    assert_solution_consistency(&solution);
}

#[test]
fn can_charge_all_of_unit_until_completed() {
    let UnplannedContext { mut solution, all_of, .. } = create_context();
    let children = solution.model().plan_unit(all_of).as_units().expect("units plan unit").units.clone();

    let partial = create_tail_move(&solution, 0, children[0]);
    assert_eq!(partial.value(), 0.);

    let best = best_move(&mut solution, all_of, &CancellationToken::new()).expect("no error");
    assert_eq!(best.value(), -20.);
    assert_eq!(best.execute(&mut solution), Ok(true));
    assert_eq!(solution.score(), 10. + 20. + 20.);
    assert_solution_consistency(&solution);

    assert_eq!(solution.unplan(all_of), Ok(true));
    assert_eq!(solution.score(), 70.);
}

#[test]
fn can_reject_negative_unplanned_cost() {
    assert!(create_unplanned_objective(Arc::new(StopExpression::new("cost", -1.))).is_err());
}
