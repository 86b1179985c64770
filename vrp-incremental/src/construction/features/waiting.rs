#[cfg(test)]
#[path = "../../../tests/unit/construction/features/waiting_test.rs"]
mod waiting_test;

use super::*;

/// A total waiting time of a vehicle from its start up to the stop.
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulatedWait(pub Duration);

/// Creates a constraint which limits waiting time before service start at each stop. The limit
/// is resolved by the stop expression.
pub fn create_maximum_wait_stop_constraint(maxima: Arc<dyn Expression>) -> GenericResult<Box<dyn Constraint>> {
    if maxima.has_negative_values() {
        return Err("maximum wait must not be negative".into());
    }

    Ok(Box::new(MaximumWaitStopConstraint { maxima }))
}

struct MaximumWaitStopConstraint {
    maxima: Arc<dyn Expression>,
}

impl Constraint for MaximumWaitStopConstraint {
    fn name(&self) -> &str {
        "maximum_stop_wait"
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearStop
    }

    fn is_temporal(&self) -> bool {
        true
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let mut is_violated = false;

        walk_move(solution, move_stops, |step| {
            let wait = step.values.start - step.values.arrival;
            is_violated = wait > stop_value(self.maxima.as_ref(), step.to.model_stop());

            if is_violated { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        (is_violated, no_positions_hint())
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        !stop.is_first() && stop.waiting() > stop_value(self.maxima.as_ref(), stop.model_stop())
    }
}

/// Creates a constraint which limits the total waiting time of a vehicle. The limit is resolved
/// by the vehicle type expression.
pub fn create_maximum_wait_vehicle_constraint(
    key: StopDataKey,
    maxima: Arc<dyn Expression>,
) -> GenericResult<Box<dyn Constraint>> {
    if maxima.has_negative_values() {
        return Err("maximum wait must not be negative".into());
    }

    Ok(Box::new(MaximumWaitVehicleConstraint { key, maxima, resolved: vec![] }))
}

struct MaximumWaitVehicleConstraint {
    key: StopDataKey,
    maxima: Arc<dyn Expression>,
    resolved: Vec<Float>,
}

impl MaximumWaitVehicleConstraint {
    fn wait_at(&self, stop: SolutionStop<'_>) -> Duration {
        stop.data::<AccumulatedWait>(self.key).map_or(0., |wait| wait.0)
    }

    fn maximum_of(&self, vehicle: SolutionVehicle<'_>) -> Duration {
        self.resolved[vehicle.vehicle_type().index]
    }
}

impl Constraint for MaximumWaitVehicleConstraint {
    fn name(&self) -> &str {
        "maximum_vehicle_wait"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.resolved = resolve_by_vehicle_type(model, self.maxima.as_ref());
        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearStop
    }

    fn is_temporal(&self) -> bool {
        true
    }

    fn stop_data_key(&self) -> Option<StopDataKey> {
        Some(self.key)
    }

    fn update_stop_data(&self, stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        let wait = match (stop.is_first(), stop.is_last()) {
            (true, _) => 0.,
            (_, true) => self.wait_at(stop.previous()),
            _ => self.wait_at(stop.previous()) + stop.waiting(),
        };

        Ok(Some(Box::new(AccumulatedWait(wait))))
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle = move_stops.vehicle(solution);
        let maximum = self.maximum_of(vehicle);
        let mut wait = self.wait_at(move_stops.previous(solution));

        let end = walk_move(solution, move_stops, |step| {
            if !step.to.is_last() {
                wait += step.values.start - step.values.arrival;
            }

            if wait > maximum { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        // waiting after the walk end does not change
        let total = wait + self.wait_at(vehicle.last()) - self.wait_at(end);

        (total > maximum, no_positions_hint())
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        stop.is_planned() && stop.is_last() && self.wait_at(stop) > self.maximum_of(stop.vehicle())
    }
}
