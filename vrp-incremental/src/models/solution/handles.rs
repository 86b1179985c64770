use crate::models::common::{Duration, Timestamp};
use crate::models::goal::{StopData, StopDataKey};
use crate::models::problem::{Expression, Stop, Vehicle, VehicleType};
use crate::models::solution::Solution;
use crate::utils::Float;
use std::fmt::{Debug, Formatter};

/// A read only view on a stop of a solution.
#[derive(Clone, Copy)]
pub struct SolutionStop<'a> {
    solution: &'a Solution,
    index: usize,
}

impl<'a> SolutionStop<'a> {
    pub(crate) fn new(solution: &'a Solution, index: usize) -> Self {
        Self { solution, index }
    }

    /// Returns stop index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the solution the stop belongs to.
    pub fn solution(&self) -> &'a Solution {
        self.solution
    }

    /// Returns the model stop.
    pub fn model_stop(&self) -> &'a Stop {
        self.solution.model().stop(self.index)
    }

    /// Returns index of plan unit which owns the stop.
    pub fn plan_unit(&self) -> Option<usize> {
        self.model_stop().plan_unit
    }

    /// Returns true if stop is planned on some vehicle.
    pub fn is_planned(&self) -> bool {
        self.solution.vehicle_index_of(self.index).is_some()
    }

    /// Returns true if stop is a vehicle start.
    pub fn is_first(&self) -> bool {
        self.model_stop().is_first()
    }

    /// Returns true if stop is a vehicle end.
    pub fn is_last(&self) -> bool {
        self.model_stop().is_last()
    }

    /// Returns the next stop, last stop returns itself.
    pub fn next(&self) -> SolutionStop<'a> {
        Self::new(self.solution, self.solution.next[self.index])
    }

    /// Returns the previous stop, first stop returns itself.
    pub fn previous(&self) -> SolutionStop<'a> {
        Self::new(self.solution, self.solution.previous[self.index])
    }

    /// Returns position in the vehicle sequence, first stop has zero position.
    pub fn position(&self) -> usize {
        self.solution.position[self.index]
    }

    /// Returns arrival time.
    pub fn arrival(&self) -> Timestamp {
        self.solution.arrival[self.index]
    }

    /// Returns service start time.
    pub fn start(&self) -> Timestamp {
        self.solution.start[self.index]
    }

    /// Returns service end time.
    pub fn end(&self) -> Timestamp {
        self.solution.end[self.index]
    }

    /// Returns waiting time before service start.
    pub fn waiting(&self) -> Duration {
        self.start() - self.arrival()
    }

    /// Returns total waiting time after this stop up to the end of the vehicle.
    pub fn slack(&self) -> Duration {
        self.solution.slack[self.index]
    }

    /// Returns travel duration from the previous stop.
    pub fn travel_duration(&self) -> Duration {
        if self.is_first() {
            0.
        } else {
            self.cumulative_travel_duration() - self.previous().cumulative_travel_duration()
        }
    }

    /// Returns travel duration from the vehicle start.
    pub fn cumulative_travel_duration(&self) -> Duration {
        self.solution.cumulative_travel[self.index]
    }

    /// Returns the value of the expression for transition from the previous stop.
    pub fn value(&self, expression: &dyn Expression) -> Float {
        if !self.is_planned() || self.is_first() {
            return 0.;
        }

        match self.solution.model().expression_slot(expression.index()) {
            Some(slot) => self.solution.values[slot][self.index],
            None => expression.value(
                Some(self.vehicle().vehicle_type()),
                Some(self.previous().model_stop()),
                Some(self.model_stop()),
            ),
        }
    }

    /// Returns the sum of expression values from the vehicle start up to this stop.
    pub fn cumulative_value(&self, expression: &dyn Expression) -> Float {
        if !self.is_planned() {
            return 0.;
        }

        match self.solution.model().expression_slot(expression.index()) {
            Some(slot) => self.solution.cumulative_values[slot][self.index],
            None => {
                let mut total = 0.;
                let mut current = *self;
                while !current.is_first() {
                    total += current.value(expression);
                    current = current.previous();
                }
                total
            }
        }
    }

    /// Returns data of the rule registered with the key.
    pub fn data<T: StopData>(&self, key: StopDataKey) -> Option<&'a T> {
        self.solution.data.get(key.index())?.get(self.index)?.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Returns the vehicle of a planned stop.
    ///
    /// # Panics
    /// Panics if the stop is not planned.
    pub fn vehicle(&self) -> SolutionVehicle<'a> {
        let vehicle = self.solution.vehicle_index_of(self.index);
        assert!(vehicle.is_some(), "stop '{}' is not planned", self.model_stop().id);

        SolutionVehicle::new(self.solution, vehicle.unwrap_or_default())
    }
}

impl PartialEq for SolutionStop<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && std::ptr::eq(self.solution, other.solution)
    }
}

impl Debug for SolutionStop<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionStop")
            .field("id", &self.model_stop().id)
            .field("position", &self.position())
            .field("start", &self.start())
            .finish()
    }
}

/// A read only view on a vehicle of a solution.
#[derive(Clone, Copy)]
pub struct SolutionVehicle<'a> {
    solution: &'a Solution,
    index: usize,
}

impl<'a> SolutionVehicle<'a> {
    pub(crate) fn new(solution: &'a Solution, index: usize) -> Self {
        Self { solution, index }
    }

    /// Returns vehicle index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the model vehicle.
    pub fn model_vehicle(&self) -> &'a Vehicle {
        self.solution.model().vehicle(self.index)
    }

    /// Returns the vehicle type.
    pub fn vehicle_type(&self) -> &'a VehicleType {
        self.solution.model().vehicle_type_of(self.index)
    }

    /// Returns the synthetic start stop.
    pub fn first(&self) -> SolutionStop<'a> {
        SolutionStop::new(self.solution, self.model_vehicle().first)
    }

    /// Returns the synthetic end stop.
    pub fn last(&self) -> SolutionStop<'a> {
        SolutionStop::new(self.solution, self.model_vehicle().last)
    }

    /// Returns amount of planned stops without start and end.
    pub fn number_of_stops(&self) -> usize {
        self.last().position() - 1
    }

    /// Returns true if vehicle has no planned stops.
    pub fn is_empty(&self) -> bool {
        self.number_of_stops() == 0
    }

    /// Returns time between the start of the first stop and the end of the last one.
    pub fn duration(&self) -> Duration {
        self.last().end() - self.first().start()
    }

    /// Returns the start time.
    pub fn start(&self) -> Timestamp {
        self.first().start()
    }

    /// Returns the end time.
    pub fn end(&self) -> Timestamp {
        self.last().end()
    }

    /// Returns all stops including start and end in sequence order.
    pub fn stops(&self) -> impl Iterator<Item = SolutionStop<'a>> + use<'a> {
        let first = self.first();
        let last = self.last().index();

        std::iter::successors(Some(first), move |stop| if stop.index() == last { None } else { Some(stop.next()) })
    }

    /// Returns planned stops without start and end in sequence order.
    pub fn regular_stops(&self) -> impl Iterator<Item = SolutionStop<'a>> + use<'a> {
        self.stops().filter(|stop| !stop.is_first() && !stop.is_last())
    }
}

impl PartialEq for SolutionVehicle<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && std::ptr::eq(self.solution, other.solution)
    }
}

impl Debug for SolutionVehicle<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionVehicle")
            .field("id", &self.model_vehicle().id)
            .field("stops", &self.number_of_stops())
            .finish()
    }
}
