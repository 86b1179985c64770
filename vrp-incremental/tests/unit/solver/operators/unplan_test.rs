use super::*;
use crate::helpers::models::*;
use crate::helpers::solver::*;

fn create_planned_solution(positions: &[Float]) -> (Solution, Vec<usize>) {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let units = positions.iter().map(|&position| builder.add_single(position).1).collect::<Vec<_>>();
    let mut solution = create_test_solution(builder.build());
    units.iter().for_each(|&unit| assert!(append_on_vehicle(&mut solution, 0, unit)));

    (solution, units)
}

#[test]
fn can_unplan_units_at_same_location() {
    let (mut solution, units) = create_planned_solution(&[1., 1., 1., 5.]);

    let unplanned = unplan_location(&mut solution, units[1]).expect("no error");

    assert_eq!(unplanned, 3);
    assert_eq!(get_vehicle_stop_ids(&solution, 0), vec!["s3"]);
    assert_solution_consistency(&solution);
}

parameterized_test! {can_unplan_some_stops_of_vehicle, (keep_chance, expected), {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3.]);

    let unplanned = unplan_some_stops_of_vehicle(&mut solution, &DefaultRandom::new_repeatable(0), keep_chance)
        .expect("no error");

    assert_eq!(unplanned, expected);
    assert_eq!(solution.vehicle(0).number_of_stops(), 3 - expected);
    assert_solution_consistency(&solution);
}}

can_unplan_some_stops_of_vehicle! {
    case01_keep_none: (0., 3),
    case02_keep_all: (1., 0),
}

#[test]
fn can_keep_fixed_stops_when_vehicle_is_unplanned() {
    let mut builder = TestModelBuilder::default();
    let vehicle = builder.add_vehicle(0., 0.);
    let (fixed, _) = builder.add_single(1.);
    let (_, free) = builder.add_single(2.);
    builder.model_mut().add_initial_stop(vehicle, fixed, true).expect("valid stop");
    let mut solution = create_test_solution(builder.build());
    assert!(append_on_vehicle(&mut solution, 0, free));

    unplan_vehicle_islands(&mut solution, 0, 0.).expect("no error");

    assert_eq!(get_vehicle_stop_ids(&solution, 0), vec!["s0"]);
    assert!(unplan_some_stops_of_vehicle(&mut solution, &DefaultRandom::new_repeatable(0), 0.).is_ok());
    assert_eq!(get_vehicle_stop_ids(&solution, 0), vec!["s0"]);
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_stops_within_distance_on_other_vehicles() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    builder.add_vehicle(0., 0.);
    let (_, own) = builder.add_single(1.);
    let (_, close) = builder.add_single(1.001);
    let (_, far) = builder.add_single(5.);
    let mut solution = create_test_solution(builder.build());
    assert!(append_on_vehicle(&mut solution, 0, own));
    assert!(append_on_vehicle(&mut solution, 1, close));
    assert!(append_on_vehicle(&mut solution, 1, far));

    unplan_vehicle_islands(&mut solution, 0, 200.).expect("no error");

    assert!(solution.vehicle(0).is_empty());
    assert_eq!(get_vehicle_stop_ids(&solution, 1), vec!["s2"]);
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_single_unit_of_island() {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3., 4.]);

    let unplanned = unplan_island(&mut solution, &DefaultRandom::new_repeatable(0), 1).expect("no error");

    assert_eq!(unplanned, 1);
    assert_eq!(solution.vehicle(0).number_of_stops(), 3);
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_neighbours_of_island() {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3., 4., 5., 6., 7., 8.]);

    let unplanned = unplan_island(&mut solution, &DefaultRandom::new_repeatable(1), 4).expect("no error");

    assert!(unplanned >= 1);
    assert_eq!(solution.unplanned_plan_units().len(), unplanned);
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_requested_amount_of_units() {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3., 4., 5., 6.]);
    let best = solution.clone();
    let mut operator = UnplanOperator::new(SolveParameter::constant(2)).expect("valid operator");

    with_solve_context(&mut solution, &best, 0, |context| operator.execute(context)).expect("no error");

    assert!(!solution.unplanned_plan_units().is_empty());
    assert!(!operator.can_result_in_improvement());
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_location_units_by_operator() {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3., 4.]);
    let best = solution.clone();
    let mut operator = UnplanLocationOperator::new(SolveParameter::constant(4)).expect("valid operator");

    with_solve_context(&mut solution, &best, 0, |context| operator.execute(context)).expect("no error");

    assert_eq!(solution.unplanned_plan_units().len(), 2);
    assert_solution_consistency(&solution);
}

#[test]
fn can_unplan_vehicles_by_operator() {
    let (mut solution, _) = create_planned_solution(&[1., 2., 3.]);
    let best = solution.clone();
    let mut operator =
        UnplanVehiclesOperator::new(SolveParameter::constant(1), 0., 0.5).expect("valid operator");

    with_solve_context(&mut solution, &best, 0, |context| operator.execute(context)).expect("no error");

    assert_eq!(operator.probability(), 0.5);
    assert!(solution.vehicle(0).is_empty());
    assert_solution_consistency(&solution);
}

parameterized_test! {can_reject_invalid_unplan_vehicles, (distance, probability), {
    assert!(UnplanVehiclesOperator::new(SolveParameter::constant(1), distance, probability).is_err());
}}

can_reject_invalid_unplan_vehicles! {
    case01_negative_distance: (-1., 0.5),
    case02_infinite_distance: (Float::INFINITY, 0.5),
    case03_invalid_probability: (10., 1.5),
}
