#[cfg(test)]
#[path = "../../../tests/unit/construction/features/attributes_test.rs"]
mod attributes_test;

use super::*;
use rustc_hash::{FxHashMap, FxHashSet};

/// Creates a constraint which allows a stop to be served only by vehicle types sharing at least one
/// attribute with it. Stops without attributes can be served by any vehicle type.
///
/// Attributes are given by stop index and by vehicle type index.
pub fn create_attributes_constraint(
    stop_attributes: FxHashMap<usize, Vec<String>>,
    vehicle_type_attributes: FxHashMap<usize, Vec<String>>,
) -> GenericResult<Box<dyn Constraint>> {
    let unique = |attributes: Vec<String>| attributes.into_iter().collect::<FxHashSet<_>>();

    Ok(Box::new(AttributesConstraint {
        stop_attributes: stop_attributes.into_iter().map(|(stop, attributes)| (stop, unique(attributes))).collect(),
        vehicle_type_attributes: vehicle_type_attributes
            .into_iter()
            .map(|(vehicle_type, attributes)| (vehicle_type, unique(attributes)))
            .collect(),
        vehicle_types: 0,
        compatible: vec![],
    }))
}

struct AttributesConstraint {
    stop_attributes: FxHashMap<usize, FxHashSet<String>>,
    vehicle_type_attributes: FxHashMap<usize, FxHashSet<String>>,
    vehicle_types: usize,
    compatible: Vec<bool>,
}

impl AttributesConstraint {
    fn is_stop_compatible(&self, stop: usize, vehicle_type: usize) -> bool {
        let Some(stop_attributes) = self.stop_attributes.get(&stop).filter(|attributes| !attributes.is_empty()) else {
            return true;
        };

        self.vehicle_type_attributes
            .get(&vehicle_type)
            .is_some_and(|attributes| !attributes.is_disjoint(stop_attributes))
    }
}

impl Constraint for AttributesConstraint {
    fn name(&self) -> &str {
        "attributes"
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        if let Some(stop) = self.stop_attributes.keys().find(|&&stop| stop >= model.stops().len()) {
            return Err(format!("attributes are set for unknown stop {stop}").into());
        }

        if let Some(stop) = self.stop_attributes.keys().find(|&&stop| !model.stop(stop).is_regular()) {
            return Err(format!("attributes cannot be set for vehicle stop '{}'", model.stop(*stop).id).into());
        }

        if let Some(vehicle_type) = self.vehicle_type_attributes.keys().find(|&&vt| vt >= model.vehicle_types().len()) {
            return Err(format!("attributes are set for unknown vehicle type {vehicle_type}").into());
        }

        let vehicle_types = model.vehicle_types().len();
        let this = &*self;
        let compatible = model
            .plan_units()
            .iter()
            .flat_map(|unit| {
                (0..vehicle_types).map(move |vehicle_type| match unit {
                    PlanUnit::Stops(unit) => unit.stops.iter().all(|&stop| this.is_stop_compatible(stop, vehicle_type)),
                    PlanUnit::Units(_) => true,
                })
            })
            .collect::<Vec<_>>();

        self.vehicle_types = vehicle_types;
        self.compatible = compatible;

        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::Constant
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle_type = move_stops.vehicle(solution).vehicle_type().index;

        if self.compatible[move_stops.plan_unit() * self.vehicle_types + vehicle_type] {
            (false, no_positions_hint())
        } else {
            (true, skip_vehicle_hint())
        }
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        stop.is_planned()
            && stop.model_stop().is_regular()
            && !self.is_stop_compatible(stop.index(), stop.vehicle().vehicle_type().index)
    }
}
