#[cfg(test)]
#[path = "../../../tests/unit/construction/features/minimize_unplanned_test.rs"]
mod minimize_unplanned_test;

use super::*;

/// Creates an objective which charges unplanned plan units. The cost of a stops unit is the sum
/// of its stop costs given by the stop expression, an all of unit costs the sum of its children
/// and a one of unit costs their average.
pub fn create_unplanned_objective(cost: Arc<dyn Expression>) -> GenericResult<Box<dyn Objective>> {
    if cost.has_negative_values() {
        return Err("unplanned cost must not be negative".into());
    }

    Ok(Box::new(UnplannedObjective { cost, costs: vec![] }))
}

struct UnplannedObjective {
    cost: Arc<dyn Expression>,
    costs: Vec<Float>,
}

impl UnplannedObjective {
    fn cost_of(&self, model: &Model, plan_unit: usize) -> Float {
        match model.plan_unit(plan_unit) {
            PlanUnit::Stops(unit) => {
                unit.stops.iter().map(|&stop| stop_value(self.cost.as_ref(), model.stop(stop))).sum()
            }
            PlanUnit::Units(unit) => {
                let total = unit.units.iter().map(|&child| self.cost_of(model, child)).sum::<Float>();

                if unit.plan_one_of && !unit.units.is_empty() { total / unit.units.len() as Float } else { total }
            }
        }
    }
}

impl Objective for UnplannedObjective {
    fn name(&self) -> &str {
        "unplanned"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.costs = (0..model.plan_units().len()).map(|unit| self.cost_of(model, unit)).collect();
        Ok(())
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        solution.root_completed_by(move_stops.plan_unit()).map_or(0., |root| -self.costs[root])
    }

    fn value(&self, solution: &Solution) -> Float {
        solution.unplanned_plan_units().as_slice().iter().map(|&root| self.costs[root]).sum()
    }
}
