use super::*;
use crate::construction::features::{create_maximum_stops_constraint, create_travel_duration_objective};
use crate::helpers::models::*;
use crate::helpers::utils::FakeRandom;
use crate::models::problem::ConstantExpression;
use std::sync::Arc;
use tinyvec::tiny_vec;

fn single_position(solution: &Solution, unit: usize, previous: usize) -> MoveStops {
    let stop = solution.model().stops_of(unit)[0];
    let next = solution.stop(previous).next().index();

    MoveStops::new(solution, unit, tiny_vec!([StopPosition; 2] => StopPosition::new(previous, stop, next)))
        .expect("valid move")
}

#[test]
fn can_estimate_maximum_stops_violation() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, first_unit) = builder.add_single(1.);
    let (_, second_unit) = builder.add_single(2.);
    let (pair, pair_unit) = builder.add_sequence(&[3., 4.]);
    builder
        .model_mut()
        .add_constraint(
            create_maximum_stops_constraint(Arc::new(ConstantExpression::new("max", 1.))).expect("valid constraint"),
        )
        .expect("valid model");
    let mut solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();
    let last = solution.vehicle(0).last().index();

    let pair_move = MoveStops::new(
        &solution,
        pair_unit,
        tiny_vec!([StopPosition; 2] => StopPosition::new(first, pair[0], pair[1]), StopPosition::new(pair[0], pair[1], last)),
    )
    .expect("valid move");
    assert!(!pair_move.is_allowed());
    let (violated, hint) = check_constraints(&solution, &pair_move);
    assert!(violated);
    assert!(hint.skip_vehicle);

    let first_move = single_position(&solution, first_unit, first);
    assert!(first_move.is_allowed());
    assert_eq!(Move::from(first_move).execute(&mut solution), Ok(true));

    let second_move = single_position(&solution, second_unit, first);
    assert!(!second_move.is_allowed());
    assert!(!Move::from(second_move).is_executable());
    assert_solution_consistency(&solution);
}

#[test]
fn can_estimate_delta_score() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, unit) = builder.add_single(3.);
    builder.model_mut().add_objective(2., create_travel_duration_objective().expect("valid objective")).expect("valid");
    let mut solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();

    let move_stops = single_position(&solution, unit, first);

    assert_eq!(move_stops.value(), 2. * 6. * LINE_UNIT_DURATION);
    assert_eq!(estimate_delta_score(&solution, &move_stops), move_stops.value());
    assert_eq!(move_stops.previous(&solution).index(), first);
    assert_eq!(move_stops.next(&solution).index(), solution.vehicle(0).last().index());
    assert_eq!(move_stops.vehicle(&solution).index(), 0);

    let score = solution.score();
    let value = move_stops.value();
    assert_eq!(Move::from(move_stops).execute(&mut solution), Ok(true));
    assert_eq!(solution.score(), score + value);
}

#[test]
fn can_reject_invalid_positions() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (stop, unit) = builder.add_single(1.);
    let (other, _) = builder.add_single(2.);
    let (pair, pair_unit) = builder.add_sequence(&[3., 4.]);
    let parent = builder.model_mut().new_plan_one_of_plan_units(vec![unit]).expect("valid unit");
    let solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();
    let last = solution.vehicle(0).last().index();
    let create = |unit: usize, positions: StopPositions| MoveStops::new(&solution, unit, positions);

    assert!(create(parent, tiny_vec!([StopPosition; 2] => StopPosition::new(first, stop, last))).is_err());
    assert!(create(unit, tiny_vec!([StopPosition; 2] => StopPosition::new(first, other, last))).is_err());
    assert!(create(unit, tiny_vec!([StopPosition; 2] => StopPosition::new(last, stop, first))).is_err());
    assert!(create(pair_unit, tiny_vec!([StopPosition; 2] => StopPosition::new(first, pair[0], last))).is_err());
    assert!(
        create(
            pair_unit,
            tiny_vec!([StopPosition; 2] => StopPosition::new(pair[1], pair[0], last), StopPosition::new(first, pair[1], pair[0]))
        )
        .is_err()
    );
}

#[test]
fn can_skip_stale_move_on_execution() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, first_unit) = builder.add_single(1.);
    let (_, second_unit) = builder.add_single(2.);
    let mut solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();

    let stale = Move::from(single_position(&solution, first_unit, first));
    let fresh = Move::from(single_position(&solution, second_unit, first));
    assert_eq!(fresh.execute(&mut solution), Ok(true));

    assert!(stale.is_executable());
    assert_eq!(stale.execute(&mut solution), Ok(false));
    assert!(solution.unplanned_plan_units().contains(first_unit));
    assert_eq!(fresh.execute(&mut solution), Ok(false));
    assert_solution_consistency(&solution);
}

#[test]
fn can_handle_not_executable_move() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    builder.add_single(1.);
    let mut solution = create_test_solution(builder.build());
    let not_executable = Move::default();

    assert_eq!(not_executable.plan_unit(), None);
    assert_eq!(not_executable.value(), Float::INFINITY);
    assert_eq!(not_executable.value_seen(), 0);
    assert!(!not_executable.is_executable());
    assert!(!not_executable.is_improvement());
    assert_eq!(not_executable.execute(&mut solution), Ok(false));
}

parameterized_test! {can_take_best_move, (ints, left_wins), {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, left_unit) = builder.add_single(1.);
    let (_, right_unit) = builder.add_single(2.);
    let solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();
    let left = Move::from(single_position(&solution, left_unit, first));
    let right = Move::from(single_position(&solution, right_unit, first));

    let best = left.take_best(right, &FakeRandom::new(ints, vec![]));

    let expected = if left_wins { left_unit } else { right_unit };
    assert_eq!(best.plan_unit(), Some(expected));
    assert_eq!(best.value_seen(), 2);
}}

can_take_best_move! {
    case_01_left: (vec![0], true),
    case_02_right: (vec![1], false),
}

#[test]
fn can_prefer_executable_and_cheaper_moves() {
    let mut builder = TestModelBuilder::default();
    builder.add_vehicle(0., 0.);
    let (_, near_unit) = builder.add_single(1.);
    let (_, far_unit) = builder.add_single(5.);
    builder.model_mut().add_objective(1., create_travel_duration_objective().expect("valid objective")).expect("valid");
    let solution = create_test_solution(builder.build());
    let first = solution.vehicle(0).first().index();
    let random = FakeRandom::new(vec![], vec![]);

    let near = Move::from(single_position(&solution, near_unit, first));
    let far = Move::from(single_position(&solution, far_unit, first));

    assert_eq!(Move::NotExecutable.take_best(far.clone(), &random).plan_unit(), Some(far_unit));
    assert_eq!(far.clone().take_best(Move::NotExecutable, &random).plan_unit(), Some(far_unit));
    assert_eq!(far.take_best(near.clone(), &random).plan_unit(), Some(near_unit));
    assert!(!near.is_improvement());
}

mod properties {
    use super::*;
    use crate::construction::features::*;
    use crate::models::problem::{Expression, Model, StopExpression};
    use proptest::prelude::*;
    use rustc_hash::FxHashMap;
    use tinyvec::tiny_vec;

    fn constant(name: &str, value: Float) -> Arc<dyn Expression> {
        Arc::new(ConstantExpression::new(name, value))
    }

    /// Builds a model with two vehicle types and all rules, the cluster rule is used as objective
    /// only: its constraint rejects moves by centroids of other vehicles, not by the result.
    fn create_model_with_all_rules(
        vehicles: &[Float],
        singles: &[(Float, Option<u8>)],
        pairs: &[(Float, Float)],
    ) -> Arc<Model> {
        let mut builder = TestModelBuilder::default();
        let other_type = add_line_vehicle_type(builder.model_mut(), "vt1", 30.);
        vehicles.iter().enumerate().for_each(|(idx, &position)| {
            let vehicle_type = if idx % 2 == 1 { other_type } else { builder.vehicle_type() };
            builder.add_vehicle_of_type(vehicle_type, 0., position);
        });

        let mut load = StopExpression::new("load", 0.);
        let mut latest = StopExpression::new("latest", 10800.);
        let mut stop_attributes = FxHashMap::default();
        let mut items = FxHashMap::default();

        for (idx, &(position, earliest)) in singles.iter().enumerate() {
            let (stop, _) = builder.add_single(position);
            load.set_value(stop, 1.);
            if let Some(earliest) = earliest {
                builder.model_mut().set_stop_earliest_start(stop, earliest as Float * 600.).expect("valid stop");
            }
            if idx == 0 {
                stop_attributes.insert(stop, vec!["cold".to_string()]);
                latest.set_value(stop, 5400.);
            }
        }

        for (idx, &(pickup, delivery)) in pairs.iter().enumerate() {
            let (stops, _) = builder.add_sequence(&[pickup, delivery]);
            let name = if idx % 2 == 0 { "a" } else { "b" };
            load.set_value(stops[0], 2.);
            load.set_value(stops[1], -2.);
            items.insert(stops[0], MixItem { name: name.to_string(), quantity: 1 });
            items.insert(stops[1], MixItem { name: name.to_string(), quantity: -1 });
        }

        let load: Arc<dyn Expression> = Arc::new(load);
        let latest: Arc<dyn Expression> = Arc::new(latest);
        let vehicle_type_attributes = std::iter::once((other_type, vec!["cold".to_string()])).collect();

        let model = builder.model_mut();
        let wait_key = model.new_data_key().expect("valid key");
        let mix_key = model.new_data_key().expect("valid key");
        let peak_key = model.new_data_key().expect("valid key");
        let cluster_key = model.new_data_key().expect("valid key");

        let constraints = vec![
            create_maximum_constraint("capacity", load.clone(), constant("capacity", 4.)),
            create_maximum_stops_constraint(constant("stops", 5.)),
            create_maximum_duration_constraint(constant("duration", 14400.)),
            create_maximum_travel_duration_constraint(constant("travel", 7200.)),
            create_maximum_wait_stop_constraint(Arc::new(StopExpression::new("stop_wait", 1200.))),
            create_maximum_wait_vehicle_constraint(wait_key, constant("vehicle_wait", 1800.)),
            create_latest_constraint(TemporalReference::OnStart, latest.clone()),
            create_attributes_constraint(stop_attributes, vehicle_type_attributes),
            create_no_mix_constraint("no_mix", mix_key, items),
        ];
        constraints.into_iter().for_each(|constraint| {
            model.add_constraint(constraint.expect("valid constraint")).expect("valid model");
        });

        let objectives = vec![
            (1., create_travel_duration_objective()),
            (0.1, create_vehicles_duration_objective()),
            (1., create_vehicles_objective(constant("vehicle_cost", 100.))),
            (1., create_unplanned_objective(Arc::new(StopExpression::new("unplanned", 10000.)))),
            (1., create_latest_objective(TemporalReference::OnEnd, latest, constant("lateness", 0.5))),
            (1., create_maximum_objective("soft_capacity", peak_key, load, constant("soft", 2.), 10.)),
            (
                1.,
                create_earliness_objective(
                    TemporalReference::OnArrival,
                    Arc::new(StopExpression::new("target", 600.)),
                    constant("earliness", 0.1),
                ),
            ),
            (1., create_expression_objective(Arc::new(StopExpression::new("penalty", 1.)))),
            (
                1e-9,
                create_cluster_objective(cluster_key, ClusterOptions { include_first: true, include_last: false }),
            ),
        ];
        objectives.into_iter().for_each(|(factor, objective)| {
            model.add_objective(factor, objective.expect("valid objective")).expect("valid model");
        });

        builder.build()
    }

    /// Inserts stops of the unit before the stops at given locations of the vehicle sequence.
    fn create_positions(solution: &Solution, unit: usize, vehicle: usize, picks: (usize, usize)) -> StopPositions {
        let stops = solution.model().stops_of(unit);
        let target = solution.vehicle(vehicle).stops().map(|stop| stop.index()).collect::<Vec<_>>();
        let size = target.len() - 1;

        match stops.as_slice() {
            &[stop] => {
                let location = 1 + picks.0 % size;
                tiny_vec!([StopPosition; 2] => StopPosition::new(target[location - 1], stop, target[location]))
            }
            &[pickup, delivery] => {
                let (first, second) = (1 + picks.0 % size, 1 + picks.1 % size);
                let (first, second) = (first.min(second), first.max(second));

                if first == second {
                    tiny_vec!([StopPosition; 2] =>
                        StopPosition::new(target[first - 1], pickup, delivery),
                        StopPosition::new(pickup, delivery, target[first]))
                } else {
                    tiny_vec!([StopPosition; 2] =>
                        StopPosition::new(target[first - 1], pickup, target[first]),
                        StopPosition::new(target[second - 1], delivery, target[second]))
                }
            }
            _ => unreachable!("plan units have one or two stops"),
        }
    }

    /// Applies the move ignoring its estimate and returns true if the result violates any rule.
    fn is_violated_after_insertion(solution: &Solution, move_stops: &MoveStops) -> bool {
        let mut solution = solution.clone();
        let placements = move_stops.positions().iter().map(|p| (p.stop, p.previous)).collect::<Vec<_>>();

        match solution.insert_stops(move_stops.plan_unit(), placements.as_slice()) {
            Ok(true) => !solution.constraint_violations().is_empty(),
            Ok(false) => true,
            Err(err) => panic!("cannot insert stops: {err}"),
        }
    }

    prop_compose! {
        fn model_prototype()
        (
         vehicles in prop::collection::vec(0_u8..20, 2..4),
         singles in prop::collection::vec((0_u8..20, prop::option::of(0_u8..6)), 1..8),
         pairs in prop::collection::vec((0_u8..20, 0_u8..20), 1..4),
        ) -> (Vec<Float>, Vec<(Float, Option<u8>)>, Vec<(Float, Float)>) {
            (
                vehicles.into_iter().map(Float::from).collect(),
                singles.into_iter().map(|(position, earliest)| (Float::from(position), earliest)).collect(),
                pairs.into_iter().map(|(pickup, delivery)| (Float::from(pickup), Float::from(delivery))).collect(),
            )
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(40))]

        #[test]
        fn can_estimate_moves_as_executed(
            (vehicles, singles, pairs) in model_prototype(),
            picks in prop::collection::vec((any::<usize>(), any::<usize>(), any::<usize>(), any::<usize>()), 1..24),
        ) {
            let model = create_model_with_all_rules(vehicles.as_slice(), singles.as_slice(), pairs.as_slice());
            let mut solution = create_test_solution(model.clone());
            prop_assert!(solution.constraint_violations().is_empty());

            for (unit_pick, vehicle_pick, first, second) in picks {
                let mut unplanned = solution.unplanned_plan_units().as_slice().to_vec();
                if unplanned.is_empty() {
                    break;
                }
                unplanned.sort_unstable();

                let unit = unplanned[unit_pick % unplanned.len()];
                let vehicle = vehicle_pick % model.vehicles().len();
                let positions = create_positions(&solution, unit, vehicle, (first, second));
                let move_stops = MoveStops::new(&solution, unit, positions).expect("valid move");

                if !move_stops.is_allowed() {
                    prop_assert!(is_violated_after_insertion(&solution, &move_stops), "move {:?}", move_stops);
                    continue;
                }

                let before = solution.score();
                let estimated = move_stops.value();
                prop_assert_eq!(Move::from(move_stops).execute(&mut solution), Ok(true));

                let actual = solution.score() - before;
                prop_assert!(
                    (actual - estimated).abs() <= 1e-6 * (1. + estimated.abs()),
                    "actual delta {}, estimated {}", actual, estimated
                );
                assert_solution_consistency(&solution);
            }
        }
    }
}
