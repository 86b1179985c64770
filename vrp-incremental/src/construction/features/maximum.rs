//! A cumulative level limit, for example a capacity of a vehicle.
//!
//! The level of a stop is the cumulative value of an expression from the vehicle start. The level
//! has to stay within `[0, maximum]` where the maximum is resolved per vehicle type.

#[cfg(test)]
#[path = "../../../tests/unit/construction/features/maximum_test.rs"]
mod maximum_test;

use super::*;

/// Creates a constraint which keeps the cumulative value of the expression within `[0, maximum]`.
pub fn create_maximum_constraint(
    name: &str,
    expression: Arc<dyn Expression>,
    maximum: Arc<dyn Expression>,
) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(MaximumConstraint { name: name.to_string(), level: MaximumLevel::new(expression, maximum) }))
}

/// Creates an objective which penalizes the peak excess of the cumulative value over the maximum
/// per vehicle. Each vehicle with an excess is additionally penalized by the penalty offset.
pub fn create_maximum_objective(
    name: &str,
    key: StopDataKey,
    expression: Arc<dyn Expression>,
    maximum: Arc<dyn Expression>,
    penalty_offset: Float,
) -> GenericResult<Box<dyn Objective>> {
    if !penalty_offset.is_finite() || penalty_offset < 0. {
        return Err(format!("penalty offset must be non-negative, got {penalty_offset}").into());
    }

    Ok(Box::new(MaximumObjective {
        name: name.to_string(),
        key,
        level: MaximumLevel::new(expression, maximum),
        penalty_offset,
    }))
}

/// A highest level reached by a vehicle up to the stop.
#[derive(Clone, Debug, PartialEq)]
pub struct PeakLevel(pub Float);

struct MaximumLevel {
    expression: Arc<dyn Expression>,
    maximum: Arc<dyn Expression>,
    maxima: Vec<Float>,
    has_negative_values: bool,
    no_effect: Vec<bool>,
    unit_deltas: Option<Vec<Float>>,
}

impl MaximumLevel {
    fn new(expression: Arc<dyn Expression>, maximum: Arc<dyn Expression>) -> Self {
        Self { expression, maximum, maxima: vec![], has_negative_values: true, no_effect: vec![], unit_deltas: None }
    }

    fn lock(&mut self, model: &Model) {
        self.maxima = resolve_by_vehicle_type(model, self.maximum.as_ref());
        self.has_negative_values = self.expression.has_negative_values();

        let is_stop_expression = self.expression.kind() == ExpressionKind::Stop;
        let values = model
            .plan_units()
            .iter()
            .map(|unit| match unit {
                PlanUnit::Stops(unit) if is_stop_expression => unit
                    .stops
                    .iter()
                    .map(|&stop| stop_value(self.expression.as_ref(), model.stop(stop)))
                    .collect::<Vec<_>>(),
                _ => vec![],
            })
            .collect::<Vec<_>>();

        self.no_effect =
            values.iter().map(|values| !values.is_empty() && values.iter().all(|&value| value == 0.)).collect();
        self.unit_deltas = (is_stop_expression && !self.has_negative_values)
            .then(|| values.iter().map(|values| values.iter().sum()).collect());
    }

    fn maximum_of(&self, vehicle: SolutionVehicle<'_>) -> Float {
        self.maxima[vehicle.vehicle_type().index]
    }

    fn is_out_of_range(&self, level: Float, maximum: Float) -> bool {
        level > maximum || level < 0.
    }

    /// Returns the change of levels of stops after the move and whether any level on the way from
    /// the move previous stop to its next stop violates the range.
    fn walk_move_stops(&self, move_stops: &MoveStops, solution: &Solution, maximum: Float) -> (Float, bool) {
        let vehicle_type = move_stops.vehicle(solution).vehicle_type();
        let mut generator = move_stops.stops(solution, false, false);

        let Some(mut from) = generator.next() else {
            return (0., false);
        };

        let mut level = from.cumulative_value(self.expression.as_ref());
        for to in generator {
            level += self.expression.value(Some(vehicle_type), Some(from.model_stop()), Some(to.model_stop()));

            if self.is_out_of_range(level, maximum) {
                return (0., true);
            }

            from = to;
        }

        (level - from.cumulative_value(self.expression.as_ref()), false)
    }

    /// Returns the highest level of planned stops after the move next stop, shifted by the delta,
    /// and whether any shifted level violates the range.
    fn walk_tail(&self, move_stops: &MoveStops, solution: &Solution, shift: Float, maximum: Float) -> (Float, bool) {
        let vehicle = move_stops.vehicle(solution);

        if !self.has_negative_values {
            let level = vehicle.last().cumulative_value(self.expression.as_ref()) + shift;
            return (level, level > maximum);
        }

        let next = move_stops.next(solution);
        let mut peak = Float::NEG_INFINITY;
        let mut is_violated = false;

        let mut current = next;
        loop {
            let level = current.cumulative_value(self.expression.as_ref()) + shift;
            peak = peak.max(level);
            is_violated |= self.is_out_of_range(level, maximum);

            if current.is_last() {
                break;
            }
            current = current.next();
        }

        (peak, is_violated)
    }
}

struct MaximumConstraint {
    name: String,
    level: MaximumLevel,
}

impl Constraint for MaximumConstraint {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn expressions(&self) -> Vec<Arc<dyn Expression>> {
        vec![self.level.expression.clone()]
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.level.lock(model);
        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        if self.level.unit_deltas.is_some() { Cost::Constant } else { Cost::LinearStop }
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let plan_unit = move_stops.plan_unit();
        if self.level.no_effect[plan_unit] {
            return (false, no_positions_hint());
        }

        let vehicle = move_stops.vehicle(solution);
        let maximum = self.level.maximum_of(vehicle);

        if let Some(deltas) = &self.level.unit_deltas {
            let level = vehicle.last().cumulative_value(self.level.expression.as_ref()) + deltas[plan_unit];
            return if level > maximum { (true, skip_vehicle_hint()) } else { (false, no_positions_hint()) };
        }

        let (shift, is_violated) = self.level.walk_move_stops(move_stops, solution, maximum);
        if is_violated {
            return (true, no_positions_hint());
        }

        let (_, is_violated) = self.level.walk_tail(move_stops, solution, shift, maximum);

        (is_violated, no_positions_hint())
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        stop.is_planned()
            && self
                .level
                .is_out_of_range(stop.cumulative_value(self.level.expression.as_ref()), self.level.maximum_of(stop.vehicle()))
    }
}

struct MaximumObjective {
    name: String,
    key: StopDataKey,
    level: MaximumLevel,
    penalty_offset: Float,
}

impl MaximumObjective {
    fn penalty(&self, peak: Float, maximum: Float) -> Float {
        let excess = peak - maximum;
        if excess > 0. { excess + self.penalty_offset } else { 0. }
    }

    fn peak_at(&self, stop: SolutionStop<'_>) -> Float {
        stop.data::<PeakLevel>(self.key).map_or_else(
            || {
                let mut peak = Float::NEG_INFINITY;
                let mut current = stop;
                loop {
                    peak = peak.max(current.cumulative_value(self.level.expression.as_ref()));
                    if current.is_first() {
                        break peak;
                    }
                    current = current.previous();
                }
            },
            |peak| peak.0,
        )
    }
}

impl Objective for MaximumObjective {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn expressions(&self) -> Vec<Arc<dyn Expression>> {
        vec![self.level.expression.clone()]
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.level.lock(model);
        Ok(())
    }

    fn stop_data_key(&self) -> Option<StopDataKey> {
        Some(self.key)
    }

    fn update_stop_data(&self, stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        let level = stop.cumulative_value(self.level.expression.as_ref());
        let peak = if stop.is_first() { level } else { self.peak_at(stop.previous()).max(level) };

        Ok(Some(Box::new(PeakLevel(peak))))
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let plan_unit = move_stops.plan_unit();
        if self.level.no_effect[plan_unit] {
            return 0.;
        }

        let vehicle = move_stops.vehicle(solution);
        let maximum = self.level.maximum_of(vehicle);
        let old_peak = self.peak_at(vehicle.last());

        let new_peak = if let Some(deltas) = &self.level.unit_deltas {
            vehicle.last().cumulative_value(self.level.expression.as_ref()) + deltas[plan_unit]
        } else {
            let vehicle_type = vehicle.vehicle_type();
            let mut generator = move_stops.stops(solution, false, false);
            let Some(mut from) = generator.next() else {
                return 0.;
            };

            let mut peak = self.peak_at(from);
            let mut level = from.cumulative_value(self.level.expression.as_ref());
            for to in generator {
                level +=
                    self.level.expression.value(Some(vehicle_type), Some(from.model_stop()), Some(to.model_stop()));
                peak = peak.max(level);
                from = to;
            }

            let shift = level - from.cumulative_value(self.level.expression.as_ref());
            let (tail_peak, _) = self.level.walk_tail(move_stops, solution, shift, maximum);

            peak.max(tail_peak)
        };

        self.penalty(new_peak, maximum) - self.penalty(old_peak, maximum)
    }

    fn value(&self, solution: &Solution) -> Float {
        solution
            .vehicles()
            .map(|vehicle| self.penalty(self.peak_at(vehicle.last()), self.level.maximum_of(vehicle)))
            .sum()
    }
}
