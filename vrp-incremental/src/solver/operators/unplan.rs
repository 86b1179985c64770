//! Operators which unplan parts of the work solution.

#[cfg(test)]
#[path = "../../../tests/unit/solver/operators/unplan_test.rs"]
mod unplan_test;

use super::*;
use crate::models::common::Distance;
use crate::models::solution::SolutionStop;
use crate::utils::{AliasSampler, Random, SolveParameter, compare_floats};

const VEHICLE_CHANCE: Float = 0.01;
const ISLAND_CHANCE: Float = 0.0132;
const KEEP_VEHICLE_STOP_CHANCE: Float = 0.2;

/// An operator which unplans about the parameter amount of plan units. Most of the time it
/// unplans a random plan unit together with plan units at the same location. Rarely it unplans
/// most stops of a random vehicle or a random plan unit with plan units of closest stops.
pub struct UnplanOperator {
    number_of_units: SolveParameter,
}

impl UnplanOperator {
    /// Creates a new instance of `UnplanOperator`.
    pub fn new(number_of_units: SolveParameter) -> GenericResult<Self> {
        Ok(Self { number_of_units })
    }

    /// Returns the number of units parameter.
    pub fn number_of_units(&self) -> &SolveParameter {
        &self.number_of_units
    }
}

impl SolveOperator for UnplanOperator {
    fn name(&self) -> &str {
        "unplan"
    }

    fn probability(&self) -> Float {
        1.
    }

    fn can_result_in_improvement(&self) -> bool {
        false
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        let number_of_units = self.number_of_units.value().max(0) as usize;
        let random = context.random;

        let mut count = 0;
        while count < number_of_units && !context.work.planned_plan_units().is_empty() {
            if context.token.is_cancelled() {
                break;
            }

            let chance = random.uniform_real(0., 1.);
            let unplanned = if chance < VEHICLE_CHANCE {
                unplan_some_stops_of_vehicle(context.work, random, KEEP_VEHICLE_STOP_CHANCE)?
            } else if chance < ISLAND_CHANCE {
                unplan_island(context.work, random, number_of_units - count)?
            } else {
                match context.work.planned_plan_units().random_element(random) {
                    Some(unit) => unplan_location(context.work, unit)?,
                    None => break,
                }
            };

            count += 1 + unplanned;
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.number_of_units.update(delta_score);
    }
}

/// An operator which unplans whole vehicles. Vehicles with fewer stops are sampled more often.
/// Plan units within the distance of unplanned stops are unplanned too.
pub struct UnplanVehiclesOperator {
    number_of_vehicles: SolveParameter,
    distance: Distance,
    probability: Float,
}

impl UnplanVehiclesOperator {
    /// Creates a new instance of `UnplanVehiclesOperator`.
    pub fn new(number_of_vehicles: SolveParameter, distance: Distance, probability: Float) -> GenericResult<Self> {
        validate_probability(probability)?;

        if !distance.is_finite() || distance < 0. {
            return Err(format!("distance must be non-negative, got {distance}").into());
        }

        Ok(Self { number_of_vehicles, distance, probability })
    }
}

impl SolveOperator for UnplanVehiclesOperator {
    fn name(&self) -> &str {
        "unplan_vehicles"
    }

    fn probability(&self) -> Float {
        self.probability
    }

    fn can_result_in_improvement(&self) -> bool {
        false
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        if context.work.planned_plan_units().is_empty() {
            return Ok(());
        }

        let total = context.work.model().stops().len();
        let (vehicles, weights): (Vec<_>, Vec<_>) = context
            .work
            .vehicles()
            .filter(|vehicle| !vehicle.is_empty())
            .map(|vehicle| (vehicle.index(), 1. + total.saturating_sub(vehicle.number_of_stops()) as Float))
            .unzip();

        if vehicles.is_empty() {
            return Ok(());
        }

        let sampler = AliasSampler::new(weights)?;
        for _ in 0..self.number_of_vehicles.value().max(0) {
            if context.token.is_cancelled() {
                break;
            }

            unplan_vehicle_islands(context.work, vehicles[sampler.sample(context.random)], self.distance)?;
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.number_of_vehicles.update(delta_score);
    }
}

/// An operator which unplans about the parameter amount of plan units, each together with plan
/// units planned next to it at the same location.
pub struct UnplanLocationOperator {
    number_of_units: SolveParameter,
}

impl UnplanLocationOperator {
    /// Creates a new instance of `UnplanLocationOperator`.
    pub fn new(number_of_units: SolveParameter) -> GenericResult<Self> {
        Ok(Self { number_of_units })
    }
}

impl SolveOperator for UnplanLocationOperator {
    fn name(&self) -> &str {
        "unplan_location"
    }

    fn probability(&self) -> Float {
        1.
    }

    fn can_result_in_improvement(&self) -> bool {
        false
    }

    fn execute(&mut self, context: &mut SolveContext<'_>) -> GenericResult<()> {
        let number_of_units = self.number_of_units.value().max(0) as usize;

        let mut count = 0;
        while count < number_of_units && !context.token.is_cancelled() {
            let Some(unit) = context.work.planned_plan_units().random_element(context.random) else {
                break;
            };

            count += 1 + unplan_location(context.work, unit)?;
        }

        Ok(())
    }

    fn update_parameters(&mut self, delta_score: Float) {
        self.number_of_units.update(delta_score);
    }
}

/// Unplans the root plan unit with roots of stops planned next to its stops at the same location.
/// Returns amount of unplanned roots.
pub fn unplan_location(solution: &mut Solution, unit: usize) -> GenericResult<usize> {
    let mut units = vec![unit];
    planned_stops_of(solution, unit).into_iter().for_each(|stop| {
        collect_same_location(solution.stop(stop), &mut units);
    });

    unplan_each(solution, units)
}

/// Unplans the root plan unit with roots of stops planned next to its stops at the same location
/// and roots of stops within the distance of its stops. Returns amount of unplanned roots.
pub fn unplan_island(solution: &mut Solution, random: &DefaultRandom, number_of_stops: usize) -> GenericResult<usize> {
    let Some(root) = solution.planned_plan_units().random_element(random) else {
        return Ok(0);
    };

    let stops = planned_stops_of(solution, root);
    if stops.is_empty() {
        return Ok(0);
    }

    let stop = stops[random.index(stops.len())];
    if !solution.unplan(root)? {
        return Ok(0);
    }

    if number_of_stops <= 1 {
        return Ok(1);
    }

    let mut count = 0;
    for other in closest_stops(solution, stop) {
        let Some(unit) = solution.model().stop(other).plan_unit else {
            continue;
        };

        if !solution.is_planned(solution.model().root_of(unit)) || random.is_head_not_tails() {
            continue;
        }

        if solution.unplan(unit)? {
            count += 1;
        }

        if count > 3 && count > number_of_stops - 1 {
            break;
        }
    }

    Ok(1 + count)
}

/// Unplans plan units of a random non empty vehicle, each stop is skipped with given chance.
/// Returns amount of unplanned roots.
pub fn unplan_some_stops_of_vehicle(
    solution: &mut Solution,
    random: &DefaultRandom,
    keep_chance: Float,
) -> GenericResult<usize> {
    let vehicles = solution.vehicles().filter(|vehicle| !vehicle.is_empty()).map(|v| v.index()).collect::<Vec<_>>();
    if vehicles.is_empty() {
        return Ok(0);
    }

    let vehicle = vehicles[random.index(vehicles.len())];
    let units = solution
        .vehicle(vehicle)
        .regular_stops()
        .filter_map(|stop| stop.plan_unit())
        .filter(|&unit| !solution.is_fixed(unit))
        .collect::<Vec<_>>();

    let mut count = 0;
    for unit in units {
        if random.is_hit(keep_chance) {
            continue;
        }

        if solution.unplan(unit)? {
            count += 1;
        }
    }

    Ok(count)
}

/// Unplans all non fixed plan units of the vehicle, each with its location and distance island.
pub fn unplan_vehicle_islands(solution: &mut Solution, vehicle: usize, distance: Distance) -> GenericResult<()> {
    let stops = solution.vehicle(vehicle).regular_stops().map(|stop| stop.index()).collect::<Vec<_>>();

    for stop in stops {
        let Some(unit) = solution.model().stop(stop).plan_unit else {
            continue;
        };

        if !solution.stop(stop).is_planned() || solution.is_fixed(unit) {
            continue;
        }

        let mut units = vec![unit];
        collect_same_location(solution.stop(stop), &mut units);

        if distance > 0. {
            let model = solution.model();
            let location = model.stop(stop).location;

            units.extend(
                model
                    .stops()
                    .iter()
                    .filter(|other| other.index != stop && location.haversine_distance(&other.location) <= distance)
                    .filter_map(|other| other.plan_unit),
            );
        }

        unplan_each(solution, units)?;
    }

    Ok(())
}

fn planned_stops_of(solution: &Solution, unit: usize) -> Vec<usize> {
    solution.model().stops_of(unit).into_iter().filter(|&stop| solution.stop(stop).is_planned()).collect()
}

fn collect_same_location(stop: SolutionStop<'_>, units: &mut Vec<usize>) {
    let location = stop.model_stop().location;

    let mut next = stop.next();
    while !next.is_last() && next.model_stop().location == location {
        units.extend(next.plan_unit());
        next = next.next();
    }

    let mut previous = stop.previous();
    while !previous.is_first() && previous.model_stop().location == location {
        units.extend(previous.plan_unit());
        previous = previous.previous();
    }
}

fn unplan_each(solution: &mut Solution, units: Vec<usize>) -> GenericResult<usize> {
    let mut roots = units.into_iter().map(|unit| solution.model().root_of(unit)).collect::<Vec<_>>();
    roots.sort_unstable();
    roots.dedup();

    roots.into_iter().try_fold(0, |count, root| Ok(count + usize::from(solution.unplan(root)?)))
}

/// Returns regular stops of the model ordered by distance to the stop, closest first.
fn closest_stops(solution: &Solution, stop: usize) -> Vec<usize> {
    let model = solution.model();
    let location = model.stop(stop).location;

    let mut stops = model
        .stops()
        .iter()
        .filter(|other| other.index != stop && other.is_regular() && other.location.is_valid())
        .map(|other| (location.haversine_distance(&other.location), other.index))
        .collect::<Vec<_>>();
    stops.sort_by(|(left, _), (right, _)| compare_floats(*left, *right));

    stops.into_iter().map(|(_, index)| index).collect()
}
