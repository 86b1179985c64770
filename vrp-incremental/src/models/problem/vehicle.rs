use crate::models::common::{Duration, Timestamp};
use crate::models::problem::{Expression, Stop, TimeDependentExpression};
use std::sync::Arc;

/// Temporal values of a single transition between two stops.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TemporalValues {
    /// A travel duration.
    pub travel: Duration,
    /// An arrival time at the destination.
    pub arrival: Timestamp,
    /// A service start time at the destination.
    pub start: Timestamp,
    /// A service end time at the destination.
    pub end: Timestamp,
}

/// Shared properties of a group of vehicles.
pub struct VehicleType {
    /// A vehicle type index in the model.
    pub index: usize,
    /// A user defined identifier.
    pub id: String,
    /// A travel duration expression.
    pub travel_duration: Arc<TimeDependentExpression>,
    /// A service duration expression evaluated with the previous stop as `from` and the
    /// serviced stop as `to`.
    pub process_duration: Arc<dyn Expression>,
}

impl VehicleType {
    /// Calculates travel, arrival, start and end times at `to` when departing from `from` at `departure`.
    pub fn temporal_values(&self, departure: Timestamp, from: &Stop, to: &Stop) -> TemporalValues {
        let travel = if from.location.is_valid() && to.location.is_valid() {
            self.travel_duration.value_at_value(departure, Some(self), Some(from), Some(to))
        } else {
            0.
        };

        let arrival = departure + travel;
        let start = to.earliest_start_at(arrival);
        let end = start + self.process_duration.value(Some(self), Some(from), Some(to));

        TemporalValues { travel, arrival, start, end }
    }
}

/// A stop which is planned on a vehicle when a solution is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitialStop {
    /// A stop index.
    pub stop: usize,
    /// Specifies whether the stop is never unplanned.
    pub fixed: bool,
}

/// A vehicle which serves stops.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// A vehicle index in the model.
    pub index: usize,
    /// A user defined identifier.
    pub id: String,
    /// An index of vehicle type.
    pub vehicle_type: usize,
    /// A time when vehicle starts.
    pub start_time: Timestamp,
    /// An index of the synthetic start stop.
    pub first: usize,
    /// An index of the synthetic end stop.
    pub last: usize,
    /// Stops planned in this order when a solution is created.
    pub initial_stops: Vec<InitialStop>,
}
