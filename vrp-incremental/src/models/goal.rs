//! Specifies the protocol used by constraints and objectives to evaluate moves incrementally.

#[cfg(test)]
#[path = "../../tests/unit/models/goal_test.rs"]
mod goal_test;

use crate::construction::heuristics::MoveStops;
use crate::models::problem::{Expression, Model};
use crate::models::solution::{Solution, SolutionStop, SolutionVehicle};
use crate::utils::{Float, GenericResult};
use lazy_static::lazy_static;
use std::any::Any;
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;

/// An estimated cost of constraint evaluation. Cheaper constraints are evaluated first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cost {
    /// Does not depend on amount of stops.
    Constant,
    /// Linear in amount of stops of the move.
    LinearStop,
    /// Linear in amount of stops of the vehicle.
    LinearVehicle,
}

/// Specifies when a constraint has to be checked after a move is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckedAt {
    /// Estimation is exact, no check is needed.
    Never,
    /// Each stop is checked during propagation.
    EachStop,
    /// Each vehicle is checked after propagation.
    EachVehicle,
}

/// A key of per stop data registered in the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopDataKey(pub(crate) usize);

impl StopDataKey {
    /// Returns the slot index of this key.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Arbitrary data which a rule keeps for each planned stop and updates during propagation.
pub trait StopData: Any + Send + Sync + Debug {
    /// Makes a deep copy of the data.
    fn copy(&self) -> Box<dyn StopData>;

    /// Returns data as `Any` to downcast it.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Clone + Send + Sync + Debug> StopData for T {
    fn copy(&self) -> Box<dyn StopData> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Search pruning feedback returned alongside a violation estimate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopPositionsHint {
    /// If true, the plan unit can not be planned on this vehicle at all.
    pub skip_vehicle: bool,
    /// Alternative next stops worth trying.
    pub next_stops: Vec<usize>,
}

lazy_static! {
    static ref NO_POSITIONS_HINT: StopPositionsHint = StopPositionsHint::default();
    static ref SKIP_VEHICLE_HINT: StopPositionsHint = StopPositionsHint { skip_vehicle: true, next_stops: vec![] };
}

/// Returns a hint without any advice.
pub fn no_positions_hint() -> Cow<'static, StopPositionsHint> {
    Cow::Borrowed(&NO_POSITIONS_HINT)
}

/// Returns a hint which advises to skip the vehicle.
pub fn skip_vehicle_hint() -> Cow<'static, StopPositionsHint> {
    Cow::Borrowed(&SKIP_VEHICLE_HINT)
}

/// A result of a violation estimate.
pub type ViolationEstimate = (bool, Cow<'static, StopPositionsHint>);

/// A hard rule a solution has to satisfy.
pub trait Constraint: Send + Sync {
    /// Returns a name of the constraint.
    fn name(&self) -> &str;

    /// Returns expressions which per stop values are cached by a solution.
    fn expressions(&self) -> Vec<Arc<dyn Expression>> {
        vec![]
    }

    /// Called once when model is locked.
    fn lock(&mut self, _model: &Model) -> GenericResult<()> {
        Ok(())
    }

    /// Returns estimated cost of the violation estimate.
    fn estimation_cost(&self) -> Cost;

    /// Returns true if constraint depends on time.
    fn is_temporal(&self) -> bool {
        false
    }

    /// Returns a key of per stop data maintained by the constraint.
    fn stop_data_key(&self) -> Option<StopDataKey> {
        None
    }

    /// Calculates per stop data, called in sequence order for each stop whose predecessors are
    /// already updated.
    fn update_stop_data(&self, _stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        Ok(None)
    }

    /// Estimates whether the move violates the constraint without applying it.
    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate;

    /// Returns when the constraint has to be checked after a move is applied.
    fn checked_at(&self) -> CheckedAt {
        CheckedAt::Never
    }

    /// Checks a stop after propagation.
    fn does_stop_have_violations(&self, _stop: SolutionStop<'_>) -> bool {
        false
    }

    /// Checks a vehicle after propagation.
    fn does_vehicle_have_violations(&self, _vehicle: SolutionVehicle<'_>) -> bool {
        false
    }
}

/// A cost function a solver minimizes.
pub trait Objective: Send + Sync {
    /// Returns a name of the objective.
    fn name(&self) -> &str;

    /// Returns expressions which per stop values are cached by a solution.
    fn expressions(&self) -> Vec<Arc<dyn Expression>> {
        vec![]
    }

    /// Called once when model is locked.
    fn lock(&mut self, _model: &Model) -> GenericResult<()> {
        Ok(())
    }

    /// Returns a key of per stop data maintained by the objective.
    fn stop_data_key(&self) -> Option<StopDataKey> {
        None
    }

    /// Calculates per stop data, called in sequence order.
    fn update_stop_data(&self, _stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        Ok(None)
    }

    /// Estimates a change of the objective value if the move is applied.
    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float;

    /// Returns the objective value of the solution.
    fn value(&self, solution: &Solution) -> Float;
}

/// An objective multiplied by a factor.
pub struct ObjectiveTerm {
    /// A factor.
    pub factor: Float,
    /// An objective.
    pub objective: Box<dyn Objective>,
}
