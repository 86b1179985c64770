//! Objectives related to time and cost of travel.

#[cfg(test)]
#[path = "../../../tests/unit/construction/features/transport_test.rs"]
mod transport_test;

use super::*;

/// Creates an objective which minimizes total travel duration of all vehicles.
pub fn create_travel_duration_objective() -> GenericResult<Box<dyn Objective>> {
    Ok(Box::new(TravelDurationObjective))
}

/// Creates an objective which minimizes total duration of all vehicles, from the vehicle start to
/// the end of its last stop.
pub fn create_vehicles_duration_objective() -> GenericResult<Box<dyn Objective>> {
    Ok(Box::new(VehiclesDurationObjective))
}

/// Creates an objective which penalizes the referenced time of a stop being earlier than the
/// target time of the stop expression, weighted by the stop factor expression. Vehicle last stops
/// are not penalized.
pub fn create_earliness_objective(
    reference: TemporalReference,
    target: Arc<dyn Expression>,
    factor: Arc<dyn Expression>,
) -> GenericResult<Box<dyn Objective>> {
    if factor.has_negative_values() {
        return Err("earliness factor must not be negative".into());
    }

    Ok(Box::new(EarlinessObjective { reference, target, factor }))
}

/// Creates an objective which minimizes the sum of the expression values along all vehicles. The
/// expression must not depend on time.
pub fn create_expression_objective(expression: Arc<dyn Expression>) -> GenericResult<Box<dyn Objective>> {
    Ok(Box::new(ExpressionObjective { name: format!("expression_{}", expression.name()), expression }))
}

struct TravelDurationObjective;

impl Objective for TravelDurationObjective {
    fn name(&self) -> &str {
        "travel_duration"
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let at_start = move_stops.previous(solution).cumulative_travel_duration();

        let mut travel = 0.;
        let last_visited = walk_move(solution, move_stops, |step| {
            travel += step.values.travel;
            ControlFlow::Continue(())
        });

        travel - (last_visited.cumulative_travel_duration() - at_start)
    }

    fn value(&self, solution: &Solution) -> Float {
        solution.vehicles().map(|vehicle| vehicle.last().cumulative_travel_duration()).sum()
    }
}

struct VehiclesDurationObjective;

impl Objective for VehiclesDurationObjective {
    fn name(&self) -> &str {
        "vehicles_duration"
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let mut end = None;

        walk_move(solution, move_stops, |step| {
            if step.to.is_last() {
                end = Some(step.values.end);
            }

            ControlFlow::Continue(())
        });

        end.map_or(0., |end| end - move_stops.vehicle(solution).end())
    }

    fn value(&self, solution: &Solution) -> Float {
        solution.vehicles().map(|vehicle| vehicle.duration()).sum()
    }
}

struct EarlinessObjective {
    reference: TemporalReference,
    target: Arc<dyn Expression>,
    factor: Arc<dyn Expression>,
}

impl EarlinessObjective {
    fn penalty(&self, time: Timestamp, stop: &Stop) -> Float {
        if stop.is_last() {
            return 0.;
        }

        let earliness = (stop_value(self.target.as_ref(), stop) - time).max(0.);

        if earliness > 0. { earliness * stop_value(self.factor.as_ref(), stop) } else { 0. }
    }
}

impl Objective for EarlinessObjective {
    fn name(&self) -> &str {
        "earliness_penalty"
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let mut delta = 0.;

        walk_move(solution, move_stops, |step| {
            let stop = step.to.model_stop();
            delta += self.penalty(self.reference.of_values(&step.values), stop);

            if step.to.is_planned() {
                delta -= self.penalty(self.reference.of_stop(step.to), stop);
            }

            ControlFlow::Continue(())
        });

        delta
    }

    fn value(&self, solution: &Solution) -> Float {
        solution
            .vehicles()
            .flat_map(|vehicle| vehicle.regular_stops())
            .map(|stop| self.penalty(self.reference.of_stop(stop), stop.model_stop()))
            .sum()
    }
}

struct ExpressionObjective {
    name: String,
    expression: Arc<dyn Expression>,
}

impl Objective for ExpressionObjective {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn expressions(&self) -> Vec<Arc<dyn Expression>> {
        vec![self.expression.clone()]
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let vehicle_type = move_stops.vehicle(solution).vehicle_type();
        let mut generator = move_stops.stops(solution, false, false);

        let Some(mut from) = generator.next() else {
            return 0.;
        };

        let at_start = from.cumulative_value(self.expression.as_ref());
        let mut sum = 0.;
        for to in generator {
            sum += self.expression.value(Some(vehicle_type), Some(from.model_stop()), Some(to.model_stop()));
            from = to;
        }

        sum - (from.cumulative_value(self.expression.as_ref()) - at_start)
    }

    fn value(&self, solution: &Solution) -> Float {
        solution.vehicles().map(|vehicle| vehicle.last().cumulative_value(self.expression.as_ref())).sum()
    }
}
