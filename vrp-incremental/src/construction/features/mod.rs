//! Provides concrete constraints and objectives.

use crate::construction::heuristics::MoveStops;
use crate::models::common::*;
use crate::models::goal::*;
use crate::models::problem::*;
use crate::models::solution::*;
use crate::utils::*;
use std::ops::ControlFlow;
use std::sync::Arc;

mod attributes;
pub use self::attributes::*;

mod cluster;
pub use self::cluster::*;

mod fleet_usage;
pub use self::fleet_usage::*;

mod latest;
pub use self::latest::*;

mod maximum;
pub use self::maximum::*;

mod minimize_unplanned;
pub use self::minimize_unplanned::*;

mod no_mix;
pub use self::no_mix::*;

mod tour_limits;
pub use self::tour_limits::*;

mod transport;
pub use self::transport::*;

mod waiting;
pub use self::waiting::*;

/// Specifies which time of a stop is compared with a target time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemporalReference {
    /// Service start time.
    OnStart,
    /// Service end time.
    OnEnd,
    /// Arrival time.
    OnArrival,
}

impl TemporalReference {
    /// Returns the referenced time of temporal values.
    pub fn of_values(&self, values: &TemporalValues) -> Timestamp {
        match self {
            TemporalReference::OnStart => values.start,
            TemporalReference::OnEnd => values.end,
            TemporalReference::OnArrival => values.arrival,
        }
    }

    /// Returns the referenced time of a planned stop.
    pub fn of_stop(&self, stop: SolutionStop<'_>) -> Timestamp {
        match self {
            TemporalReference::OnStart => stop.start(),
            TemporalReference::OnEnd => stop.end(),
            TemporalReference::OnArrival => stop.arrival(),
        }
    }
}

/// A transition visited by [`walk_move`].
pub struct MoveStep<'a> {
    /// A stop the vehicle departs from.
    pub from: SolutionStop<'a>,
    /// A stop the vehicle arrives at, not planned if it is inserted by the move.
    pub to: SolutionStop<'a>,
    /// Temporal values at `to` as they would be after the move.
    pub values: TemporalValues,
}

/// Walks transitions of the vehicle as they would be after the move, starting at the stop after
/// which the first stop is inserted. The walk ends at the vehicle last stop or earlier, at the
/// first planned stop after all inserted stops whose end time does not change: all further stops
/// are not affected by the move. Returns the last visited stop.
pub fn walk_move<'a, F>(solution: &'a Solution, move_stops: &'a MoveStops, mut visit: F) -> SolutionStop<'a>
where
    F: FnMut(&MoveStep<'a>) -> ControlFlow<()>,
{
    let mut generator = move_stops.stops(solution, false, true);
    let Some(mut from) = generator.next() else {
        return move_stops.previous(solution);
    };

    let vehicle_type = move_stops.vehicle(solution).vehicle_type();
    let mut remaining = move_stops.positions().len();
    let mut departure = from.end();

    for to in generator {
        let values = vehicle_type.temporal_values(departure, from.model_stop(), to.model_stop());
        let step = MoveStep { from, to, values };

        if visit(&step).is_break() {
            return to;
        }

        if !to.is_planned() {
            remaining -= 1;
        } else if remaining == 0 && values.end == to.end() {
            return to;
        }

        departure = values.end;
        from = to;
    }

    from
}

fn resolve_by_vehicle_type(model: &Model, expression: &dyn Expression) -> Vec<Float> {
    model.vehicle_types().iter().map(|vehicle_type| expression.value(Some(vehicle_type), None, None)).collect()
}

fn stop_value(expression: &dyn Expression, stop: &Stop) -> Float {
    expression.value(None, None, Some(stop))
}
