#[cfg(test)]
#[path = "../../../tests/unit/models/problem/stop_test.rs"]
mod stop_test;

use crate::models::common::{Location, TimeWindow, Timestamp};

/// Specifies a role of the stop in a vehicle sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopRole {
    /// A stop which has to be planned as a part of plan unit.
    Regular,
    /// A synthetic stop which represents vehicle start.
    First,
    /// A synthetic stop which represents vehicle end.
    Last,
}

/// A location which has to be visited by a vehicle.
#[derive(Clone, Debug)]
pub struct Stop {
    /// A stop index in the model.
    pub index: usize,
    /// A user defined identifier.
    pub id: String,
    /// A location of the stop, can be unknown.
    pub location: Location,
    /// Sorted non overlapping time windows in which service can start.
    pub windows: Vec<TimeWindow>,
    /// An earliest time when service can start.
    pub earliest_start: Option<Timestamp>,
    /// A role of the stop.
    pub role: StopRole,
    /// An index of plan unit which owns the stop.
    pub plan_unit: Option<usize>,
    /// An index of vehicle, set for first and last stops only.
    pub vehicle: Option<usize>,
}

impl Stop {
    /// Returns true if stop is a vehicle start.
    pub fn is_first(&self) -> bool {
        self.role == StopRole::First
    }

    /// Returns true if stop is a vehicle end.
    pub fn is_last(&self) -> bool {
        self.role == StopRole::Last
    }

    /// Returns true if stop is neither first nor last one.
    pub fn is_regular(&self) -> bool {
        self.role == StopRole::Regular
    }

    /// Returns true if arrival at the stop can be followed by waiting.
    pub fn can_incur_waiting_time(&self) -> bool {
        !self.windows.is_empty() || self.earliest_start.is_some()
    }

    /// Returns the time when service can start for given arrival time.
    ///
    /// An arrival inside a window starts immediately, an arrival before a window waits for its
    /// opening. An arrival after the last window starts immediately: such lateness is a concern of
    /// a separate rule.
    pub fn earliest_start_at(&self, arrival: Timestamp) -> Timestamp {
        if let Some(earliest_start) = self.earliest_start {
            return arrival.max(earliest_start);
        }

        self.windows
            .iter()
            .find(|window| arrival < window.end)
            .map_or(arrival, |window| arrival.max(window.start))
    }

    /// Returns the end of the last window, if any.
    pub fn closing_time(&self) -> Option<Timestamp> {
        self.windows.last().map(|window| window.end)
    }
}
