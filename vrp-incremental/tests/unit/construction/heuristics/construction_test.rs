use super::*;
use crate::construction::features::create_maximum_stops_constraint;
use crate::helpers::models::*;
use crate::models::problem::ConstantExpression;
use crate::utils::Float;
use std::sync::Arc;

fn create_solution(vehicles: usize, units: usize, max_stops: Option<Float>) -> Solution {
    let mut builder = TestModelBuilder::default();
    (0..vehicles).for_each(|_| {
        builder.add_vehicle(0., 0.);
    });
    (0..units).for_each(|idx| {
        builder.add_single(idx as Float + 1.);
    });

    if let Some(max_stops) = max_stops {
        builder
            .model_mut()
            .add_constraint(
                create_maximum_stops_constraint(Arc::new(ConstantExpression::new("max", max_stops)))
                    .expect("valid constraint"),
            )
            .expect("valid model");
    }

    create_test_solution(builder.build())
}

parameterized_test! {can_plan_units_randomly, (vehicles, units, max_stops, expected), {
    can_plan_units_randomly_impl(vehicles, units, max_stops, expected);
}}

can_plan_units_randomly! {
    case01_all_on_one_vehicle: (1, 5, None, 5),
    case02_all_on_many_vehicles: (3, 6, None, 6),
    case03_limited_by_stops: (1, 3, Some(2.), 2),
    case04_limited_by_stops_on_many_vehicles: (2, 5, Some(2.), 4),
    case05_no_units: (2, 0, None, 0),
}

fn can_plan_units_randomly_impl(vehicles: usize, units: usize, max_stops: Option<Float>, expected: usize) {
    let mut solution = create_solution(vehicles, units, max_stops);

    let planned = random_solution_construction(&mut solution, &CancellationToken::new()).expect("no error");

    assert_eq!(planned, expected);
    assert_eq!(solution.planned_plan_units().len(), expected);
    assert_eq!(solution.unplanned_plan_units().len(), units - expected);
    assert_solution_consistency(&solution);
}

#[test]
fn can_stop_construction_when_cancelled() {
    let mut solution = create_solution(1, 3, None);
    let token = CancellationToken::new();
    token.cancel();

    let planned = random_solution_construction(&mut solution, &token).expect("no error");

    assert_eq!(planned, 0);
    assert_eq!(solution.unplanned_plan_units().len(), 3);
}

#[test]
fn can_skip_planned_units() {
    let mut solution = create_solution(1, 3, None);
    assert_eq!(random_solution_construction(&mut solution, &CancellationToken::new()), Ok(3));

    assert_eq!(random_solution_construction(&mut solution, &CancellationToken::new()), Ok(0));
}
