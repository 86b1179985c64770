#[cfg(test)]
#[path = "../../../tests/unit/models/problem/model_test.rs"]
mod model_test;

use crate::models::common::{Location, TimeWindow, Timestamp, validate_time_windows};
use crate::models::goal::{CheckedAt, Constraint, Objective, ObjectiveTerm, StopDataKey};
use crate::models::problem::*;
use crate::utils::{Float, GenericResult};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A default amount of sequences sampled for a plan unit with several stops.
pub const DEFAULT_SEQUENCE_SAMPLE_SIZE: usize = 24;

/// A problem definition: stops, vehicles, plan units and the rules which define feasibility and cost.
///
/// A model is built incrementally and then locked. Once locked, it can not be modified anymore
/// and can be shared between solutions.
pub struct Model {
    stops: Vec<Stop>,
    vehicle_types: Vec<VehicleType>,
    vehicles: Vec<Vehicle>,
    plan_units: Vec<PlanUnit>,
    constraints: Vec<Box<dyn Constraint>>,
    objectives: Vec<ObjectiveTerm>,
    data_keys: usize,
    sequence_sample_size: usize,
    is_locked: bool,

    expressions: Vec<Arc<dyn Expression>>,
    expression_slots: FxHashMap<usize, usize>,
    stop_checked: Vec<usize>,
    vehicle_checked: Vec<usize>,
    has_direct_arcs: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates a new empty instance of `Model`.
    pub fn new() -> Self {
        Self {
            stops: vec![],
            vehicle_types: vec![],
            vehicles: vec![],
            plan_units: vec![],
            constraints: vec![],
            objectives: vec![],
            data_keys: 0,
            sequence_sample_size: DEFAULT_SEQUENCE_SAMPLE_SIZE,
            is_locked: false,
            expressions: vec![],
            expression_slots: FxHashMap::default(),
            stop_checked: vec![],
            vehicle_checked: vec![],
            has_direct_arcs: false,
        }
    }

    /// Adds a new regular stop and returns its index.
    pub fn new_stop(&mut self, id: &str, location: Location) -> GenericResult<usize> {
        self.ensure_unlocked("add stop")?;

        Ok(self.push_stop(id, location, StopRole::Regular, None))
    }

    /// Sets time windows of the stop.
    pub fn set_stop_windows(&mut self, stop: usize, windows: Vec<TimeWindow>) -> GenericResult<()> {
        self.ensure_unlocked("set windows")?;
        let windows = validate_time_windows(windows)?;
        let stop = self.regular_stop_mut(stop)?;

        if stop.earliest_start.is_some() {
            return Err(format!("stop '{}' has earliest start already, it cannot have windows", stop.id).into());
        }

        stop.windows = windows;

        Ok(())
    }

    /// Sets an earliest start of the stop.
    pub fn set_stop_earliest_start(&mut self, stop: usize, earliest_start: Timestamp) -> GenericResult<()> {
        self.ensure_unlocked("set earliest start")?;
        let stop = self.regular_stop_mut(stop)?;

        if !stop.windows.is_empty() {
            return Err(format!("stop '{}' has windows already, it cannot have earliest start", stop.id).into());
        }

        stop.earliest_start = Some(earliest_start);

        Ok(())
    }

    /// Adds a new vehicle type and returns its index.
    pub fn new_vehicle_type(
        &mut self,
        id: &str,
        travel_duration: TimeDependentExpression,
        process_duration: Arc<dyn Expression>,
    ) -> GenericResult<usize> {
        self.ensure_unlocked("add vehicle type")?;

        if process_duration.has_negative_values() {
            return Err(format!("process duration of vehicle type '{id}' has negative values").into());
        }

        let index = self.vehicle_types.len();
        self.vehicle_types.push(VehicleType {
            index,
            id: id.to_string(),
            travel_duration: Arc::new(travel_duration),
            process_duration,
        });

        Ok(index)
    }

    /// Adds a new vehicle with its synthetic first and last stops and returns its index.
    pub fn new_vehicle(
        &mut self,
        id: &str,
        vehicle_type: usize,
        start_time: Timestamp,
        start_location: Location,
        end_location: Location,
    ) -> GenericResult<usize> {
        self.ensure_unlocked("add vehicle")?;

        if vehicle_type >= self.vehicle_types.len() {
            return Err(format!("unknown vehicle type {vehicle_type} for vehicle '{id}'").into());
        }

        if !start_time.is_finite() {
            return Err(format!("start time of vehicle '{id}' must be finite").into());
        }

        let index = self.vehicles.len();
        let first = self.push_stop(&format!("{id}-start"), start_location, StopRole::First, Some(index));
        let last = self.push_stop(&format!("{id}-end"), end_location, StopRole::Last, Some(index));

        self.vehicles.push(Vehicle {
            index,
            id: id.to_string(),
            vehicle_type,
            start_time,
            first,
            last,
            initial_stops: vec![],
        });

        Ok(index)
    }

    /// Adds a stop which is planned on the vehicle when a solution is created.
    pub fn add_initial_stop(&mut self, vehicle: usize, stop: usize, fixed: bool) -> GenericResult<()> {
        self.ensure_unlocked("add initial stop")?;
        self.regular_stop(stop)?;

        if self.vehicles.iter().flat_map(|v| v.initial_stops.iter()).any(|initial| initial.stop == stop) {
            return Err(format!("stop '{}' is an initial stop already", self.stops[stop].id).into());
        }

        let vehicle = self.vehicles.get_mut(vehicle).ok_or_else(|| format!("unknown vehicle {vehicle}"))?;
        vehicle.initial_stops.push(InitialStop { stop, fixed });

        Ok(())
    }

    /// Creates a plan unit of a single stop.
    pub fn new_plan_single_stop(&mut self, stop: usize) -> GenericResult<usize> {
        self.new_plan_multiple_stops(vec![stop], DirectedAcyclicGraph::default())
    }

    /// Creates a plan unit of stops which have to be visited in given order.
    pub fn new_plan_sequence(&mut self, stops: Vec<usize>) -> GenericResult<usize> {
        let mut dag = DirectedAcyclicGraph::default();
        stops.windows(2).try_for_each(|pair| dag.add_arc(pair[0], pair[1]))?;

        self.new_plan_multiple_stops(stops, dag)
    }

    /// Creates a plan unit of stops with precedence relations specified by the graph.
    pub fn new_plan_multiple_stops(&mut self, stops: Vec<usize>, dag: DirectedAcyclicGraph) -> GenericResult<usize> {
        self.ensure_unlocked("add plan unit")?;

        if stops.is_empty() {
            return Err("plan unit must have at least one stop".into());
        }

        let unique = stops.iter().copied().collect::<FxHashSet<_>>();
        if unique.len() != stops.len() {
            return Err("plan unit has duplicate stops".into());
        }

        for &stop in stops.iter() {
            let stop = self.regular_stop(stop)?;
            if let Some(unit) = stop.plan_unit {
                return Err(format!("stop '{}' belongs to plan unit {unit} already", stop.id).into());
            }
        }

        if let Some(arc) = dag.arcs().iter().find(|arc| !unique.contains(&arc.origin) || !unique.contains(&arc.destination)) {
            return Err(format!("arc {} -> {} refers to a stop outside of plan unit", arc.origin, arc.destination).into());
        }

        let index = self.plan_units.len();
        stops.iter().for_each(|&stop| self.stops[stop].plan_unit = Some(index));
        self.plan_units.push(PlanUnit::Stops(PlanStopsUnit { index, stops, dag, parent: None }));

        Ok(index)
    }

    /// Creates a plan unit where exactly one of child units is planned.
    pub fn new_plan_one_of_plan_units(&mut self, units: Vec<usize>) -> GenericResult<usize> {
        self.new_plan_units(units, true, false)
    }

    /// Creates a plan unit where all child units are planned, optionally on the same vehicle.
    pub fn new_plan_all_plan_units(&mut self, units: Vec<usize>, same_vehicle: bool) -> GenericResult<usize> {
        self.new_plan_units(units, false, same_vehicle)
    }

    fn new_plan_units(&mut self, units: Vec<usize>, plan_one_of: bool, same_vehicle: bool) -> GenericResult<usize> {
        self.ensure_unlocked("add plan unit")?;

        if units.is_empty() {
            return Err("plan unit must have at least one child plan unit".into());
        }

        if units.iter().copied().collect::<FxHashSet<_>>().len() != units.len() {
            return Err("plan unit has duplicate child plan units".into());
        }

        for &unit in units.iter() {
            let child = self.plan_units.get(unit).ok_or_else(|| format!("unknown plan unit {unit}"))?;
            if let Some(parent) = child.parent() {
                return Err(format!("plan unit {unit} belongs to plan unit {parent} already").into());
            }
        }

        let index = self.plan_units.len();
        units.iter().for_each(|&unit| self.plan_units[unit].set_parent(index));
        self.plan_units.push(PlanUnit::Units(PlanUnitsUnit { index, units, plan_one_of, same_vehicle, parent: None }));

        Ok(index)
    }

    /// Registers a new key for per stop data.
    pub fn new_data_key(&mut self) -> GenericResult<StopDataKey> {
        self.ensure_unlocked("add data key")?;
        self.data_keys += 1;

        Ok(StopDataKey(self.data_keys - 1))
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> GenericResult<()> {
        self.ensure_unlocked("add constraint")?;

        if self.constraints.iter().any(|c| c.name() == constraint.name()) {
            return Err(format!("constraint '{}' is added already", constraint.name()).into());
        }

        self.constraints.push(constraint);

        Ok(())
    }

    /// Adds an objective multiplied by a factor.
    pub fn add_objective(&mut self, factor: Float, objective: Box<dyn Objective>) -> GenericResult<()> {
        self.ensure_unlocked("add objective")?;

        if !factor.is_finite() {
            return Err(format!("factor of objective '{}' must be finite", objective.name()).into());
        }

        self.objectives.push(ObjectiveTerm { factor, objective });

        Ok(())
    }

    /// Sets the maximum amount of sequences sampled per plan unit and vehicle.
    pub fn set_sequence_sample_size(&mut self, size: usize) -> GenericResult<()> {
        self.ensure_unlocked("set sequence sample size")?;

        if size == 0 {
            return Err("sequence sample size must be positive".into());
        }

        self.sequence_sample_size = size;

        Ok(())
    }

    /// Locks the model: validates it, locks rules and prepares caches used by solutions.
    pub fn lock(&mut self) -> GenericResult<()> {
        self.ensure_unlocked("lock")?;

        if let Some(stop) = self.stops.iter().find(|stop| stop.is_regular() && stop.plan_unit.is_none()) {
            return Err(format!("stop '{}' does not belong to any plan unit", stop.id).into());
        }

        let mut constraints = std::mem::take(&mut self.constraints);
        let mut objectives = std::mem::take(&mut self.objectives);

        let result = constraints
            .iter_mut()
            .try_for_each(|c| c.lock(self).map_err(|err| err.context(c.name())))
            .and_then(|_| {
                objectives
                    .iter_mut()
                    .try_for_each(|term| term.objective.lock(self).map_err(|err| err.context(term.objective.name())))
            });

        constraints.sort_by_key(|c| c.estimation_cost());
        self.constraints = constraints;
        self.objectives = objectives;
        result?;

        let keys = self
            .constraints
            .iter()
            .filter_map(|c| c.stop_data_key())
            .chain(self.objectives.iter().filter_map(|term| term.objective.stop_data_key()))
            .collect::<Vec<_>>();

        if let Some(key) = keys.iter().find(|key| key.0 >= self.data_keys) {
            return Err(format!("data key {} is not registered in the model", key.0).into());
        }

        if keys.iter().copied().collect::<FxHashSet<_>>().len() != keys.len() {
            return Err("the same data key is used by several rules".into());
        }

        let expressions = self
            .constraints
            .iter()
            .flat_map(|c| c.expressions())
            .chain(self.objectives.iter().flat_map(|term| term.objective.expressions()))
            .collect::<Vec<_>>();

        for expression in expressions {
            if !self.expression_slots.contains_key(&expression.index()) {
                self.expression_slots.insert(expression.index(), self.expressions.len());
                self.expressions.push(expression);
            }
        }

        self.stop_checked = self.checked_constraints(CheckedAt::EachStop);
        self.vehicle_checked = self.checked_constraints(CheckedAt::EachVehicle);
        self.has_direct_arcs =
            self.plan_units.iter().filter_map(|unit| unit.as_stops()).any(|unit| unit.dag.direct_arcs().next().is_some());
        self.is_locked = true;

        Ok(())
    }

    /// Returns true if model is locked.
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Returns all stops including first and last ones of vehicles.
    pub fn stops(&self) -> &[Stop] {
        self.stops.as_slice()
    }

    /// Returns stop by its index.
    pub fn stop(&self, index: usize) -> &Stop {
        &self.stops[index]
    }

    /// Returns vehicle types.
    pub fn vehicle_types(&self) -> &[VehicleType] {
        self.vehicle_types.as_slice()
    }

    /// Returns vehicles.
    pub fn vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_slice()
    }

    /// Returns vehicle by its index.
    pub fn vehicle(&self, index: usize) -> &Vehicle {
        &self.vehicles[index]
    }

    /// Returns type of the vehicle.
    pub fn vehicle_type_of(&self, vehicle: usize) -> &VehicleType {
        &self.vehicle_types[self.vehicles[vehicle].vehicle_type]
    }

    /// Returns plan units.
    pub fn plan_units(&self) -> &[PlanUnit] {
        self.plan_units.as_slice()
    }

    /// Returns plan unit by its index.
    pub fn plan_unit(&self, index: usize) -> &PlanUnit {
        &self.plan_units[index]
    }

    /// Returns indices of plan units without parent.
    pub fn root_plan_units(&self) -> impl Iterator<Item = usize> + '_ {
        self.plan_units.iter().filter(|unit| unit.parent().is_none()).map(|unit| unit.index())
    }

    /// Returns the root of the plan unit hierarchy which contains given unit.
    pub fn root_of(&self, unit: usize) -> usize {
        let mut current = unit;
        while let Some(parent) = self.plan_units[current].parent() {
            current = parent;
        }

        current
    }

    /// Returns all stops of the plan unit and its descendants.
    pub fn stops_of(&self, unit: usize) -> Vec<usize> {
        match &self.plan_units[unit] {
            PlanUnit::Stops(unit) => unit.stops.clone(),
            PlanUnit::Units(unit) => unit.units.iter().flat_map(|&child| self.stops_of(child)).collect(),
        }
    }

    /// Returns stops units of the plan unit and its descendants.
    pub fn stops_units_of(&self, unit: usize) -> Vec<usize> {
        match &self.plan_units[unit] {
            PlanUnit::Stops(unit) => vec![unit.index],
            PlanUnit::Units(unit) => unit.units.iter().flat_map(|&child| self.stops_units_of(child)).collect(),
        }
    }

    /// Returns constraints ordered by estimation cost.
    pub fn constraints(&self) -> &[Box<dyn Constraint>] {
        self.constraints.as_slice()
    }

    /// Returns objective terms.
    pub fn objectives(&self) -> &[ObjectiveTerm] {
        self.objectives.as_slice()
    }

    /// Returns expressions which values are cached in solutions.
    pub fn expressions(&self) -> &[Arc<dyn Expression>] {
        self.expressions.as_slice()
    }

    /// Returns a cache slot of the expression with given index.
    pub fn expression_slot(&self, expression: usize) -> Option<usize> {
        self.expression_slots.get(&expression).copied()
    }

    /// Returns indices of constraints checked on each stop.
    pub fn stop_checked_constraints(&self) -> &[usize] {
        self.stop_checked.as_slice()
    }

    /// Returns indices of constraints checked on each vehicle.
    pub fn vehicle_checked_constraints(&self) -> &[usize] {
        self.vehicle_checked.as_slice()
    }

    /// Returns true if any plan unit has a direct arc.
    pub fn has_direct_arcs(&self) -> bool {
        self.has_direct_arcs
    }

    /// Returns true if there is a direct arc from one stop to another.
    pub fn must_be_neighbours(&self, from: usize, to: usize) -> bool {
        self.has_direct_arcs
            && self.stops[from]
                .plan_unit
                .and_then(|unit| self.plan_units[unit].as_stops())
                .is_some_and(|unit| unit.dag.has_direct_arc(from, to))
    }

    /// Returns amount of registered data keys.
    pub fn data_key_count(&self) -> usize {
        self.data_keys
    }

    /// Returns the maximum amount of sequences sampled per plan unit and vehicle.
    pub fn sequence_sample_size(&self) -> usize {
        self.sequence_sample_size
    }

    fn checked_constraints(&self, checked_at: CheckedAt) -> Vec<usize> {
        self.constraints.iter().enumerate().filter(|(_, c)| c.checked_at() == checked_at).map(|(idx, _)| idx).collect()
    }

    fn push_stop(&mut self, id: &str, location: Location, role: StopRole, vehicle: Option<usize>) -> usize {
        let index = self.stops.len();
        self.stops.push(Stop {
            index,
            id: id.to_string(),
            location,
            windows: vec![],
            earliest_start: None,
            role,
            plan_unit: None,
            vehicle,
        });

        index
    }

    fn regular_stop(&self, index: usize) -> GenericResult<&Stop> {
        match self.stops.get(index) {
            Some(stop) if stop.is_regular() => Ok(stop),
            Some(stop) => Err(format!("stop '{}' is a vehicle start or end", stop.id).into()),
            None => Err(format!("unknown stop {index}").into()),
        }
    }

    fn regular_stop_mut(&mut self, index: usize) -> GenericResult<&mut Stop> {
        self.regular_stop(index)?;

        Ok(&mut self.stops[index])
    }

    fn ensure_unlocked(&self, action: &str) -> GenericResult<()> {
        if self.is_locked { Err(format!("model is locked, cannot {action}").into()) } else { Ok(()) }
    }
}
