//! Features which put limits on a vehicle tour.

#[cfg(test)]
#[path = "../../../tests/unit/construction/features/tour_limits_test.rs"]
mod tour_limits_test;

use super::*;

/// Creates a constraint which limits amount of stops per vehicle, the limit is resolved by the
/// vehicle type expression.
pub fn create_maximum_stops_constraint(maximum: Arc<dyn Expression>) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(MaximumStopsConstraint { maximum, maxima: vec![] }))
}

/// Creates a constraint which limits the time between the vehicle start and the end of its last stop.
pub fn create_maximum_duration_constraint(maximum: Arc<dyn Expression>) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(MaximumDurationConstraint { maximum, maxima: vec![] }))
}

/// Creates a constraint which limits the total travel duration of a vehicle.
pub fn create_maximum_travel_duration_constraint(maximum: Arc<dyn Expression>) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(MaximumTravelDurationConstraint { maximum, maxima: vec![] }))
}

struct MaximumStopsConstraint {
    maximum: Arc<dyn Expression>,
    maxima: Vec<Float>,
}

impl Constraint for MaximumStopsConstraint {
    fn name(&self) -> &str {
        "maximum_stops"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.maxima = resolve_by_vehicle_type(model, self.maximum.as_ref());
        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::Constant
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle = move_stops.vehicle(solution);
        let stops = vehicle.number_of_stops() + move_stops.positions().len();

        if stops as Float > self.maxima[vehicle.vehicle_type().index] {
            (true, skip_vehicle_hint())
        } else {
            (false, no_positions_hint())
        }
    }

    fn does_vehicle_have_violations(&self, vehicle: SolutionVehicle<'_>) -> bool {
        vehicle.number_of_stops() as Float > self.maxima[vehicle.vehicle_type().index]
    }
}

struct MaximumDurationConstraint {
    maximum: Arc<dyn Expression>,
    maxima: Vec<Float>,
}

impl Constraint for MaximumDurationConstraint {
    fn name(&self) -> &str {
        "maximum_duration"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.maxima = resolve_by_vehicle_type(model, self.maximum.as_ref());
        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearStop
    }

    fn is_temporal(&self) -> bool {
        true
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle = move_stops.vehicle(solution);
        let maximum = self.maxima[vehicle.vehicle_type().index];
        let start = vehicle.start();

        let mut is_violated = false;
        walk_move(solution, move_stops, |step| {
            if step.values.end - start > maximum {
                is_violated = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        (is_violated, no_positions_hint())
    }

    fn does_vehicle_have_violations(&self, vehicle: SolutionVehicle<'_>) -> bool {
        vehicle.duration() > self.maxima[vehicle.vehicle_type().index]
    }
}

struct MaximumTravelDurationConstraint {
    maximum: Arc<dyn Expression>,
    maxima: Vec<Float>,
}

impl Constraint for MaximumTravelDurationConstraint {
    fn name(&self) -> &str {
        "maximum_travel_duration"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.maxima = resolve_by_vehicle_type(model, self.maximum.as_ref());
        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearStop
    }

    fn is_temporal(&self) -> bool {
        true
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle = move_stops.vehicle(solution);
        let maximum = self.maxima[vehicle.vehicle_type().index];
        let at_start = move_stops.previous(solution).cumulative_travel_duration();

        let mut travel = 0.;
        let mut is_violated = false;
        let last_visited = walk_move(solution, move_stops, |step| {
            travel += step.values.travel;
            is_violated = at_start + travel > maximum;

            if is_violated { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        if !is_violated {
            let remaining = vehicle.last().cumulative_travel_duration() - last_visited.cumulative_travel_duration();
            is_violated = at_start + travel + remaining > maximum;
        }

        (is_violated, no_positions_hint())
    }

    fn does_vehicle_have_violations(&self, vehicle: SolutionVehicle<'_>) -> bool {
        vehicle.last().cumulative_travel_duration() > self.maxima[vehicle.vehicle_type().index]
    }
}
