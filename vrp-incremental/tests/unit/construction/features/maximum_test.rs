use super::*;
use crate::construction::heuristics::{Move, StopPosition};
use crate::helpers::models::*;

fn create_move(solution: &Solution, unit: usize, positions: &[(usize, usize, usize)]) -> MoveStops {
    let positions = positions.iter().map(|&(previous, stop, next)| StopPosition::new(previous, stop, next)).collect();

    MoveStops::new(solution, unit, positions).expect("valid move")
}

fn maximum(value: Float) -> Arc<dyn Expression> {
    Arc::new(ConstantExpression::new("capacity", value))
}

#[test]
fn can_limit_level_of_positive_loads() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let units = (1..=3).map(|position| builder.add_single(position as Float)).collect::<Vec<_>>();
    let mut load = StopExpression::new("load", 0.);
    units.iter().for_each(|&(stop, _)| load.set_value(stop, 1.));
    builder
        .model_mut()
        .add_constraint(create_maximum_constraint("capacity", Arc::new(load), maximum(2.)).expect("valid"))
        .expect("valid");
    let mut solution = create_test_solution(builder.build());
    assert_eq!(solution.model().constraints()[0].estimation_cost(), Cost::Constant);

    assert!(append_on_vehicle(&mut solution, 0, units[0].1));
    assert!(append_on_vehicle(&mut solution, 0, units[1].1));

    let move_stops = create_tail_move(&solution, 0, units[2].1);
    let (is_violated, hint) = solution.model().constraints()[0].estimate_is_violated(&move_stops, &solution);
    assert!(is_violated);
    assert!(hint.skip_vehicle);
    assert_solution_consistency(&solution);
}

struct PickupDeliveryContext {
    solution: Solution,
    planned: (usize, usize),
    new: (usize, (usize, usize)),
}

fn create_pickup_delivery_context() -> PickupDeliveryContext {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (planned_stops, planned_unit) = builder.add_sequence(&[1., 4.]);
    let (new_stops, new_unit) = builder.add_sequence(&[2., 3.]);
    let mut load = StopExpression::new("load", 0.);
    for stops in [&planned_stops, &new_stops] {
        load.set_value(stops[0], 2.);
        load.set_value(stops[1], -2.);
    }
    builder
        .model_mut()
        .add_constraint(create_maximum_constraint("capacity", Arc::new(load), maximum(2.)).expect("valid"))
        .expect("valid");
    let mut solution = create_test_solution(builder.build());
    assert_eq!(solution.model().constraints()[0].estimation_cost(), Cost::LinearStop);

    let (first, last) = (solution.vehicle(0).first().index(), solution.vehicle(0).last().index());
    let planned = (planned_stops[0], planned_stops[1]);
    let move_stops =
        create_move(&solution, planned_unit, &[(first, planned.0, planned.1), (planned.0, planned.1, last)]);
    assert_eq!(Move::from(move_stops).execute(&mut solution), Ok(true));

    PickupDeliveryContext { solution, planned, new: (new_unit, (new_stops[0], new_stops[1])) }
}

parameterized_test! {can_limit_level_of_pickup_and_delivery, (positions, expected), {
    can_limit_level_of_pickup_and_delivery_impl(positions, expected);
}}

can_limit_level_of_pickup_and_delivery! {
    case01_inside: ("inside", false),
    case02_after: ("after", true),
    case03_before: ("before", true),
    case04_overlap: ("overlap", false),
}

fn can_limit_level_of_pickup_and_delivery_impl(positions: &str, expected: bool) {
    let PickupDeliveryContext { mut solution, planned: (pickup, delivery), new: (unit, (p, d)) } =
        create_pickup_delivery_context();
    let (first, last) = (solution.vehicle(0).first().index(), solution.vehicle(0).last().index());

    let positions = match positions {
        "inside" => vec![(pickup, p, d), (p, d, delivery)],
        "after" => vec![(delivery, p, d), (p, d, last)],
        "before" => vec![(first, p, d), (p, d, pickup)],
        "overlap" => vec![(first, p, pickup), (pickup, d, delivery)],
        _ => unreachable!(),
    };
    let move_stops = create_move(&solution, unit, positions.as_slice());

    assert_eq!(move_stops.is_allowed(), expected);
    if expected {
        assert_estimated_delta(&mut solution, move_stops);
    }
}

#[test]
fn can_penalize_peak_excess() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (first_stop, first) = builder.add_single(1.);
    let (second_stop, second) = builder.add_single(2.);
    let key = builder.model_mut().new_data_key().expect("valid key");
    let mut load = StopExpression::new("load", 0.);
    load.set_value(first_stop, 1.);
    load.set_value(second_stop, 1.);
    builder
        .model_mut()
        .add_objective(1., create_maximum_objective("capacity", key, Arc::new(load), maximum(1.), 10.).expect("valid"))
        .expect("valid");
    let mut solution = create_test_solution(builder.build());

    let move_stops = create_tail_move(&solution, 0, first);
    assert_eq!(move_stops.value(), 0.);
    assert_estimated_delta(&mut solution, move_stops);

    let move_stops = create_tail_move(&solution, 0, second);
    assert_eq!(move_stops.value(), 11.);
    assert_estimated_delta(&mut solution, move_stops);

    let last = solution.vehicle(0).last();
    assert_eq!(last.data::<PeakLevel>(key), Some(&PeakLevel(2.)));
}

#[test]
fn can_penalize_peak_excess_of_pickup_and_delivery() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (stops, unit) = builder.add_sequence(&[1., 2.]);
    let key = builder.model_mut().new_data_key().expect("valid key");
    let mut load = StopExpression::new("load", 0.);
    load.set_value(stops[0], 2.);
    load.set_value(stops[1], -2.);
    builder
        .model_mut()
        .add_objective(1., create_maximum_objective("capacity", key, Arc::new(load), maximum(1.), 10.).expect("valid"))
        .expect("valid");
    let mut solution = create_test_solution(builder.build());
    let (first, last) = (solution.vehicle(0).first().index(), solution.vehicle(0).last().index());

    let move_stops = create_move(&solution, unit, &[(first, stops[0], stops[1]), (stops[0], stops[1], last)]);

    assert_eq!(move_stops.value(), 11.);
    assert_estimated_delta(&mut solution, move_stops);
    assert_eq!(solution.stop(stops[1]).data::<PeakLevel>(key), Some(&PeakLevel(2.)));
}

#[test]
fn can_reject_negative_penalty_offset() {
    let mut model = Model::new();
    let key = model.new_data_key().expect("valid key");

    let result = create_maximum_objective("capacity", key, maximum(1.), maximum(1.), -1.);

    assert!(result.is_err());
}
