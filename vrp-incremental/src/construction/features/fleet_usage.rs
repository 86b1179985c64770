#[cfg(test)]
#[path = "../../../tests/unit/construction/features/fleet_usage_test.rs"]
mod fleet_usage_test;

use super::*;

/// Creates an objective which charges a fixed cost for each used vehicle, the cost is resolved by
/// the vehicle type expression.
pub fn create_vehicles_objective(cost: Arc<dyn Expression>) -> GenericResult<Box<dyn Objective>> {
    Ok(Box::new(VehiclesObjective { cost, costs: vec![] }))
}

struct VehiclesObjective {
    cost: Arc<dyn Expression>,
    costs: Vec<Float>,
}

impl VehiclesObjective {
    fn cost_of(&self, vehicle: SolutionVehicle<'_>) -> Float {
        self.costs[vehicle.vehicle_type().index]
    }
}

impl Objective for VehiclesObjective {
    fn name(&self) -> &str {
        "vehicles"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        self.costs = resolve_by_vehicle_type(model, self.cost.as_ref());
        Ok(())
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let vehicle = move_stops.vehicle(solution);

        if vehicle.is_empty() { self.cost_of(vehicle) } else { 0. }
    }

    fn value(&self, solution: &Solution) -> Float {
        solution.vehicles().filter(|vehicle| !vehicle.is_empty()).map(|vehicle| self.cost_of(vehicle)).sum()
    }
}
