#[cfg(test)]
#[path = "../../../tests/unit/models/solution/solution_test.rs"]
mod solution_test;

use crate::models::goal::StopData;
use crate::models::problem::{Model, PlanUnit};
use crate::models::solution::{SolutionStop, SolutionVehicle};
use crate::utils::{DefaultRandom, Float, GenericResult, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A violation found by checking a planned solution against stop and vehicle checked constraints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// A name of violated constraint.
    pub constraint: String,
    /// A vehicle index.
    pub vehicle: usize,
    /// A stop index, `None` for a vehicle level violation.
    pub stop: Option<usize>,
}

/// A mutable assignment of plan units to vehicles.
///
/// All stops of the model live in flat arrays indexed by stop index. Planned stops form a doubly
/// linked list per vehicle which starts at the vehicle first stop and ends at its last stop.
/// Each planned stop keeps forward propagated values: times, cumulative travel, cached expression
/// values and rule data. Every edit propagates from the edit point to the vehicle end.
pub struct Solution {
    model: Arc<Model>,
    random: DefaultRandom,

    pub(crate) next: Vec<usize>,
    pub(crate) previous: Vec<usize>,
    pub(crate) vehicle: Vec<Option<usize>>,
    pub(crate) position: Vec<usize>,
    pub(crate) arrival: Vec<Float>,
    pub(crate) start: Vec<Float>,
    pub(crate) end: Vec<Float>,
    pub(crate) slack: Vec<Float>,
    pub(crate) cumulative_travel: Vec<Float>,
    pub(crate) values: Vec<Vec<Float>>,
    pub(crate) cumulative_values: Vec<Vec<Float>>,
    pub(crate) data: Vec<Vec<Option<Box<dyn StopData>>>>,

    planned: IndexSet,
    unplanned: IndexSet,
    fixed: IndexSet,

    objective_values: Vec<Float>,
    score: Float,
}

impl Solution {
    /// Creates a new solution for a locked model: initial stops are planned when feasible,
    /// everything else is unplanned. Fails if fixed initial stops are infeasible.
    pub fn new(model: Arc<Model>, random: DefaultRandom) -> GenericResult<Self> {
        if !model.is_locked() {
            return Err("model must be locked before a solution is created".into());
        }

        let size = model.stops().len();
        let slots = model.expressions().len();

        let mut solution = Self {
            random,
            next: (0..size).collect(),
            previous: (0..size).collect(),
            vehicle: vec![None; size],
            position: vec![0; size],
            arrival: vec![0.; size],
            start: vec![0.; size],
            end: vec![0.; size],
            slack: vec![0.; size],
            cumulative_travel: vec![0.; size],
            values: vec![vec![0.; size]; slots],
            cumulative_values: vec![vec![0.; size]; slots],
            data: (0..model.data_key_count()).map(|_| (0..size).map(|_| None).collect()).collect(),
            planned: IndexSet::default(),
            unplanned: model.root_plan_units().fold(IndexSet::default(), |mut acc, unit| {
                acc.add(unit);
                acc
            }),
            fixed: IndexSet::default(),
            objective_values: vec![0.; model.objectives().len()],
            score: 0.,
            model,
        };

        let model = solution.model.clone();
        for vehicle in model.vehicles() {
            let (first, last) = (vehicle.first, vehicle.last);

            solution.next[first] = last;
            solution.previous[last] = first;
            solution.vehicle[first] = Some(vehicle.index);
            solution.vehicle[last] = Some(vehicle.index);
            solution.position[first] = 0;
            solution.position[last] = 1;
            solution.arrival[first] = vehicle.start_time;
            solution.start[first] = vehicle.start_time;
            solution.end[first] = vehicle.start_time;
        }

        // all vehicles are linked before propagation as objectives visit every vehicle
        for vehicle in model.vehicles() {
            if let Some(constraint) = solution.propagate(vehicle.first)? {
                return Err(format!(
                    "vehicle '{}' violates constraint '{}' without any stops",
                    vehicle.id,
                    model.constraints()[constraint].name()
                )
                .into());
            }
        }

        solution.plan_initial_stops()?;
        solution.update_score();

        Ok(solution)
    }

    /// Returns the model.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Returns the random generator of this solution.
    pub fn random(&self) -> &DefaultRandom {
        &self.random
    }

    /// Returns the weighted sum of all objective values.
    pub fn score(&self) -> Float {
        self.score
    }

    /// Returns values of objective terms, already multiplied by their factors.
    pub fn objective_values(&self) -> &[Float] {
        self.objective_values.as_slice()
    }

    /// Returns a stop view.
    pub fn stop(&self, index: usize) -> SolutionStop<'_> {
        SolutionStop::new(self, index)
    }

    /// Returns a vehicle view.
    pub fn vehicle(&self, index: usize) -> SolutionVehicle<'_> {
        SolutionVehicle::new(self, index)
    }

    /// Returns all vehicles.
    pub fn vehicles(&self) -> impl Iterator<Item = SolutionVehicle<'_>> + '_ {
        (0..self.model.vehicles().len()).map(|index| SolutionVehicle::new(self, index))
    }

    /// Returns root plan units which are planned and can be unplanned.
    pub fn planned_plan_units(&self) -> &IndexSet {
        &self.planned
    }

    /// Returns root plan units which are not planned.
    pub fn unplanned_plan_units(&self) -> &IndexSet {
        &self.unplanned
    }

    /// Returns root plan units which are planned and never unplanned.
    pub fn fixed_plan_units(&self) -> &IndexSet {
        &self.fixed
    }

    /// Returns true if the root of given plan unit is fixed.
    pub fn is_fixed(&self, unit: usize) -> bool {
        self.fixed.contains(self.model.root_of(unit))
    }

    /// Returns true if plan unit is planned: all its stops for a stops unit, one child for a
    /// one of unit and all children for an all of unit.
    pub fn is_planned(&self, unit: usize) -> bool {
        match self.model.plan_unit(unit) {
            PlanUnit::Stops(unit) => unit.stops.first().is_some_and(|&stop| self.vehicle[stop].is_some()),
            PlanUnit::Units(unit) if unit.plan_one_of => unit.units.iter().any(|&child| self.is_planned(child)),
            PlanUnit::Units(unit) => unit.units.iter().all(|&child| self.is_planned(child)),
        }
    }

    /// Returns vehicle index of the stop, `None` if it is not planned.
    pub fn vehicle_index_of(&self, stop: usize) -> Option<usize> {
        self.vehicle[stop]
    }

    /// Unplans the root of given plan unit with all its stops. Returns false if the root is fixed,
    /// not planned or the solution becomes infeasible without it, in the latter case the solution
    /// is restored.
    pub fn unplan(&mut self, unit: usize) -> GenericResult<bool> {
        self.unplan_units(&[unit])
    }

    /// Unplans roots of given plan units at once, see [`Solution::unplan`].
    pub fn unplan_units(&mut self, units: &[usize]) -> GenericResult<bool> {
        let mut roots = units.iter().map(|&unit| self.model.root_of(unit)).collect::<Vec<_>>();
        roots.sort_unstable();
        roots.dedup();

        if roots.is_empty() || roots.iter().any(|&root| self.fixed.contains(root) || !self.planned.contains(root)) {
            return Ok(false);
        }

        self.detach_roots(&roots)
    }

    /// Unplans all non fixed plan units of the vehicle.
    pub fn unplan_vehicle(&mut self, vehicle: usize) -> GenericResult<bool> {
        let mut roots = self
            .vehicle(vehicle)
            .regular_stops()
            .filter_map(|stop| stop.plan_unit())
            .map(|unit| self.model.root_of(unit))
            .filter(|&root| !self.fixed.contains(root) && self.planned.contains(root))
            .collect::<Vec<_>>();
        roots.sort_unstable();
        roots.dedup();

        if roots.is_empty() {
            return Ok(false);
        }

        self.detach_roots(&roots)
    }

    /// Lists stop and vehicle level violations of the current state reported by all constraints.
    pub fn constraint_violations(&self) -> Vec<ConstraintViolation> {
        let constraints = self.model.constraints();

        self.vehicles()
            .flat_map(|vehicle| {
                let stop_violations = vehicle.stops().flat_map(move |stop| {
                    constraints.iter().filter(move |c| c.does_stop_have_violations(stop)).map(move |c| {
                        ConstraintViolation {
                            constraint: c.name().to_string(),
                            vehicle: vehicle.index(),
                            stop: Some(stop.index()),
                        }
                    })
                });

                let vehicle_violations =
                    constraints.iter().filter(move |c| c.does_vehicle_have_violations(vehicle)).map(move |c| {
                        ConstraintViolation { constraint: c.name().to_string(), vehicle: vehicle.index(), stop: None }
                    });

                stop_violations.chain(vehicle_violations)
            })
            .collect()
    }

    /// Returns the root which becomes planned if given plan unit is planned.
    pub(crate) fn root_completed_by(&self, unit: usize) -> Option<usize> {
        let mut child = unit;

        loop {
            match self.model.plan_unit(child).parent() {
                None => return Some(child),
                Some(parent) => {
                    let PlanUnit::Units(parent_unit) = self.model.plan_unit(parent) else {
                        return None;
                    };

                    let is_complete = parent_unit.plan_one_of
                        || parent_unit.units.iter().all(|&other| other == child || self.is_planned(other));

                    if !is_complete {
                        return None;
                    }

                    child = parent;
                }
            }
        }
    }

    /// Inserts stops of a stops unit at given positions: each entry is a stop and a stop after
    /// which it is inserted, entries are sorted in sequence order. Returns false and restores
    /// the solution if the result is infeasible.
    pub(crate) fn insert_stops(&mut self, unit: usize, placements: &[(usize, usize)]) -> GenericResult<bool> {
        let Some(&(_, anchor)) = placements.first() else {
            return Ok(false);
        };

        let completed = self.root_completed_by(unit);
        if let Some(root) = completed {
            self.unplanned.remove(root);
            self.planned.add(root);
        }

        placements.iter().for_each(|&(stop, previous)| self.attach(stop, previous));

        if self.propagate(anchor)?.is_none() {
            return Ok(true);
        }

        placements.iter().for_each(|&(stop, _)| self.detach(stop));

        if let Some(root) = completed {
            self.planned.remove(root);
            self.unplanned.add(root);
        }

        match self.propagate(anchor)? {
            None => Ok(false),
            Some(constraint) => Err(format!(
                "solution is infeasible after undoing insertion, constraint '{}'",
                self.model.constraints()[constraint].name()
            )
            .into()),
        }
    }

    /// Removes all planned stops of given root regardless of its completeness.
    pub(crate) fn discard_root(&mut self, root: usize) -> GenericResult<bool> {
        self.detach_roots(&[root])
    }

    fn detach_roots(&mut self, roots: &[usize]) -> GenericResult<bool> {
        let model = self.model.clone();

        let mut removed = Vec::new();
        for &root in roots {
            for stop in model.stops_of(root) {
                if let Some(vehicle) = self.vehicle[stop] {
                    removed.push((stop, self.previous[stop], vehicle));
                    self.detach(stop);
                }
            }
        }

        if removed.is_empty() {
            return Ok(false);
        }

        let was_planned = roots.iter().map(|&root| self.planned.remove(root)).collect::<Vec<_>>();
        roots.iter().zip(was_planned.iter()).filter(|(_, was)| **was).for_each(|(&root, _)| {
            self.unplanned.add(root);
        });

        let anchors = self.collect_anchors(&removed);

        if self.propagate_all(&anchors)?.is_none() {
            return Ok(true);
        }

        removed.iter().rev().for_each(|&(stop, previous, _)| self.attach(stop, previous));
        roots.iter().zip(was_planned.iter()).filter(|(_, was)| **was).for_each(|(&root, _)| {
            self.unplanned.remove(root);
            self.planned.add(root);
        });

        match self.propagate_all(&anchors)? {
            None => Ok(false),
            Some(constraint) => Err(format!(
                "solution is infeasible after undoing removal, constraint '{}'",
                model.constraints()[constraint].name()
            )
            .into()),
        }
    }

    fn collect_anchors(&self, removed: &[(usize, usize, usize)]) -> Vec<usize> {
        let mut anchors: FxHashMap<usize, usize> = FxHashMap::default();

        removed.iter().filter(|(_, previous, _)| self.vehicle[*previous].is_some()).for_each(|&(_, previous, vehicle)| {
            let anchor = anchors.entry(vehicle).or_insert(previous);
            if self.position[previous] < self.position[*anchor] {
                *anchor = previous;
            }
        });

        let mut anchors = anchors.into_values().collect::<Vec<_>>();
        anchors.sort_unstable();

        anchors
    }

    fn propagate_all(&mut self, anchors: &[usize]) -> GenericResult<Option<usize>> {
        let mut violation = None;
        for &anchor in anchors {
            if let Some(constraint) = self.propagate(anchor)? {
                violation = violation.or(Some(constraint));
            }
        }

        Ok(violation)
    }

    fn attach(&mut self, stop: usize, previous: usize) {
        let next = self.next[previous];

        self.previous[stop] = previous;
        self.next[stop] = next;
        self.next[previous] = stop;
        self.previous[next] = stop;
        self.vehicle[stop] = self.vehicle[previous];
    }

    fn detach(&mut self, stop: usize) {
        let (previous, next) = (self.previous[stop], self.next[stop]);

        self.next[previous] = next;
        self.previous[next] = previous;
        self.next[stop] = stop;
        self.previous[stop] = stop;
        self.vehicle[stop] = None;

        self.data.iter_mut().for_each(|data| data[stop] = None);
    }

    /// Propagates values from the stop to the end of its vehicle. Returns index of the first
    /// violated stop or vehicle checked constraint, if any.
    fn propagate(&mut self, from: usize) -> GenericResult<Option<usize>> {
        let model = self.model.clone();
        let Some(vehicle) = self.vehicle[from] else {
            return Err(format!("cannot propagate from unplanned stop '{}'", model.stop(from).id).into());
        };

        let vehicle_type = model.vehicle_type_of(vehicle);

        self.update_data(&model, from)?;

        let mut current = from;
        while !model.stop(current).is_last() {
            let next = self.next[current];
            let (from_stop, to_stop) = (model.stop(current), model.stop(next));

            for (slot, expression) in model.expressions().iter().enumerate() {
                let value = expression.value(Some(vehicle_type), Some(from_stop), Some(to_stop));
                self.values[slot][next] = value;
                self.cumulative_values[slot][next] = self.cumulative_values[slot][current] + value;
            }

            let temporal = vehicle_type.temporal_values(self.end[current], from_stop, to_stop);
            self.cumulative_travel[next] = self.cumulative_travel[current] + temporal.travel;
            self.arrival[next] = temporal.arrival;
            self.start[next] = temporal.start;
            self.end[next] = temporal.end;
            self.position[next] = self.position[current] + 1;

            self.update_data(&model, next)?;
            current = next;

            if let Some(&constraint) = model
                .stop_checked_constraints()
                .iter()
                .find(|&&c| model.constraints()[c].does_stop_have_violations(SolutionStop::new(self, next)))
            {
                return Ok(Some(constraint));
            }
        }

        if let Some(&constraint) = model
            .vehicle_checked_constraints()
            .iter()
            .find(|&&c| model.constraints()[c].does_vehicle_have_violations(SolutionVehicle::new(self, vehicle)))
        {
            return Ok(Some(constraint));
        }

        let mut slack = 0.;
        let mut current = current;
        loop {
            self.slack[current] = slack;
            slack += self.start[current] - self.arrival[current];

            if model.stop(current).is_first() {
                break;
            }
            current = self.previous[current];
        }

        self.update_score();

        Ok(None)
    }

    fn update_data(&mut self, model: &Model, stop: usize) -> GenericResult<()> {
        for constraint in model.constraints() {
            if let Some(key) = constraint.stop_data_key() {
                let data = constraint.update_stop_data(SolutionStop::new(self, stop))?;
                self.data[key.index()][stop] = data;
            }
        }

        for term in model.objectives() {
            if let Some(key) = term.objective.stop_data_key() {
                let data = term.objective.update_stop_data(SolutionStop::new(self, stop))?;
                self.data[key.index()][stop] = data;
            }
        }

        Ok(())
    }

    fn update_score(&mut self) {
        let model = self.model.clone();
        let values = model.objectives().iter().map(|term| term.factor * term.objective.value(self)).collect::<Vec<_>>();

        self.score = values.iter().sum();
        self.objective_values = values;
    }

    fn plan_initial_stops(&mut self) -> GenericResult<()> {
        let model = self.model.clone();

        let initial = model
            .vehicles()
            .iter()
            .flat_map(|vehicle| vehicle.initial_stops.iter().map(move |initial| (initial.stop, (vehicle.index, initial.fixed))))
            .collect::<FxHashMap<_, _>>();

        if initial.is_empty() {
            return Ok(());
        }

        let mut planned_roots = Vec::new();
        for root in model.root_plan_units() {
            let is_fixed = model.stops_of(root).iter().any(|stop| initial.get(stop).is_some_and(|(_, fixed)| *fixed));

            match self.select_initial_units(&model, root, &initial) {
                Some(units) => planned_roots.push((root, units, is_fixed)),
                None if is_fixed => {
                    return Err(format!("fixed initial stops of plan unit {root} do not form a complete plan unit").into());
                }
                None => {}
            }
        }

        let planned_stops = planned_roots
            .iter()
            .flat_map(|(_, units, _)| units.iter().flat_map(|&unit| model.stops_of(unit)))
            .collect::<FxHashSet<_>>();

        for vehicle in model.vehicles() {
            let mut previous = vehicle.first;
            for initial in vehicle.initial_stops.iter().filter(|initial| planned_stops.contains(&initial.stop)) {
                self.attach(initial.stop, previous);
                previous = initial.stop;
            }
        }

        planned_roots.iter().for_each(|&(root, _, is_fixed)| {
            self.unplanned.remove(root);
            if is_fixed {
                self.fixed.add(root);
            } else {
                self.planned.add(root);
            }
        });

        let firsts = model.vehicles().iter().map(|vehicle| vehicle.first).collect::<Vec<_>>();
        let mut violated = Vec::new();
        for &first in firsts.iter() {
            if self.propagate(first)?.is_some() {
                violated.push(first);
            }
        }

        if violated.is_empty() {
            return Ok(());
        }

        let infeasible_roots = planned_roots
            .iter()
            .filter(|(_, units, _)| {
                units.iter().flat_map(|&unit| model.stops_of(unit)).any(|stop| {
                    self.vehicle[stop].is_some_and(|vehicle| violated.contains(&model.vehicle(vehicle).first))
                })
            })
            .collect::<Vec<_>>();

        if let Some((root, _, _)) = infeasible_roots.iter().find(|(_, _, is_fixed)| *is_fixed) {
            return Err(format!("fixed initial stops of plan unit {root} are infeasible").into());
        }

        for &&(root, _, _) in infeasible_roots.iter() {
            let stops = model.stops_of(root).into_iter().filter(|&stop| self.vehicle[stop].is_some()).collect::<Vec<_>>();
            stops.into_iter().for_each(|stop| self.detach(stop));
            self.planned.remove(root);
            self.unplanned.add(root);
        }

        for &first in firsts.iter() {
            if let Some(constraint) = self.propagate(first)? {
                return Err(format!(
                    "initial stops are infeasible, constraint '{}'",
                    model.constraints()[constraint].name()
                )
                .into());
            }
        }

        Ok(())
    }

    /// Selects stops units of the root covered by initial stops, each unit completely on one vehicle.
    fn select_initial_units(
        &self,
        model: &Model,
        unit: usize,
        initial: &FxHashMap<usize, (usize, bool)>,
    ) -> Option<Vec<usize>> {
        match model.plan_unit(unit) {
            PlanUnit::Stops(stops_unit) => {
                let vehicles = stops_unit.stops.iter().map(|stop| initial.get(stop).map(|(vehicle, _)| *vehicle)).collect::<Vec<_>>();
                let first = vehicles.first().copied().flatten()?;

                vehicles.iter().all(|vehicle| *vehicle == Some(first)).then(|| vec![unit])
            }
            PlanUnit::Units(units_unit) if units_unit.plan_one_of => {
                units_unit.units.iter().find_map(|&child| self.select_initial_units(model, child, initial))
            }
            PlanUnit::Units(units_unit) => {
                units_unit.units.iter().try_fold(Vec::new(), |mut acc, &child| {
                    acc.extend(self.select_initial_units(model, child, initial)?);
                    Some(acc)
                })
            }
        }
    }
}

impl Clone for Solution {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            random: self.random.fork(),
            next: self.next.clone(),
            previous: self.previous.clone(),
            vehicle: self.vehicle.clone(),
            position: self.position.clone(),
            arrival: self.arrival.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            slack: self.slack.clone(),
            cumulative_travel: self.cumulative_travel.clone(),
            values: self.values.clone(),
            cumulative_values: self.cumulative_values.clone(),
            data: self
                .data
                .iter()
                .map(|data| data.iter().map(|item| item.as_deref().map(|item| item.copy())).collect())
                .collect(),
            planned: self.planned.clone(),
            unplanned: self.unplanned.clone(),
            fixed: self.fixed.clone(),
            objective_values: self.objective_values.clone(),
            score: self.score,
        }
    }
}
