#[cfg(test)]
#[path = "../../../tests/unit/construction/features/latest_test.rs"]
mod latest_test;

use super::*;

/// Creates a constraint which does not allow the referenced time of a stop to be after the latest
/// time given by the stop expression.
pub fn create_latest_constraint(
    reference: TemporalReference,
    latest: Arc<dyn Expression>,
) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(LatestConstraint { reference, latest }))
}

/// Creates an objective which penalizes lateness of the referenced time of a stop relative to the
/// latest time, weighted by the stop factor expression.
pub fn create_latest_objective(
    reference: TemporalReference,
    latest: Arc<dyn Expression>,
    factor: Arc<dyn Expression>,
) -> GenericResult<Box<dyn Objective>> {
    if factor.has_negative_values() {
        return Err("lateness factor must not be negative".into());
    }

    Ok(Box::new(LatestObjective { reference, latest, factor }))
}

fn name_of(reference: TemporalReference) -> &'static str {
    match reference {
        TemporalReference::OnStart => "late_start_penalty",
        TemporalReference::OnEnd => "late_end_penalty",
        TemporalReference::OnArrival => "late_arrival_penalty",
    }
}

struct LatestConstraint {
    reference: TemporalReference,
    latest: Arc<dyn Expression>,
}

impl Constraint for LatestConstraint {
    fn name(&self) -> &str {
        name_of(self.reference)
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
            is_violated =
                self.reference.of_values(&step.values) > stop_value(self.latest.as_ref(), step.to.model_stop());

            if is_violated { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        (is_violated, no_positions_hint())
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        stop.is_planned()
            && !stop.is_first()
            && self.reference.of_stop(stop) > stop_value(self.latest.as_ref(), stop.model_stop())
    }
}

struct LatestObjective {
    reference: TemporalReference,
    latest: Arc<dyn Expression>,
    factor: Arc<dyn Expression>,
}

impl LatestObjective {
    fn penalty(&self, time: Timestamp, stop: &Stop) -> Float {
        let lateness = (time - stop_value(self.latest.as_ref(), stop)).max(0.);

        if lateness > 0. { lateness * stop_value(self.factor.as_ref(), stop) } else { 0. }
    }
}

impl Objective for LatestObjective {
    fn name(&self) -> &str {
        name_of(self.reference)
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
            .flat_map(|vehicle| vehicle.stops().skip(1))
            .map(|stop| self.penalty(self.reference.of_stop(stop), stop.model_stop()))
            .sum()
    }
}
