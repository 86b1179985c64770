#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/moves_test.rs"]
mod moves_test;

use crate::construction::heuristics::StopGenerator;
use crate::models::goal::{ViolationEstimate, no_positions_hint};
use crate::models::problem::PlanUnit;
use crate::models::solution::{Solution, SolutionStop, SolutionVehicle};
use crate::utils::{Float, GenericResult, Random, compare_floats};
use std::cmp::Ordering;
use tinyvec::TinyVec;

/// A position of an unplanned stop between two stops.
///
/// Both `previous` and `next` are either planned stops of the same vehicle or stops of the same
/// move which are inserted at adjacent positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StopPosition {
    /// A stop after which the stop is inserted.
    pub previous: usize,
    /// An inserted stop.
    pub stop: usize,
    /// A stop before which the stop is inserted.
    pub next: usize,
}

impl StopPosition {
    /// Creates a new instance of `StopPosition`.
    pub fn new(previous: usize, stop: usize, next: usize) -> Self {
        Self { previous, stop, next }
    }
}

/// A collection of stop positions, most plan units have one or two stops.
pub type StopPositions = TinyVec<[StopPosition; 2]>;

/// A move which inserts all stops of a stops plan unit.
#[derive(Clone, Debug)]
pub struct MoveStops {
    plan_unit: usize,
    positions: StopPositions,
    value: Float,
    value_seen: usize,
    allowed: bool,
}

impl MoveStops {
    /// Creates a move after validating positions against the solution, then checks constraints
    /// and estimates the objective change.
    pub fn new(solution: &Solution, plan_unit: usize, positions: StopPositions) -> GenericResult<Self> {
        if !validate_positions(solution, plan_unit, positions.as_slice())? {
            return Err(format!("positions of plan unit {plan_unit} are not consistent with the solution").into());
        }

        let mut move_stops = Self::unchecked(plan_unit, positions);
        let (violated, _) = check_constraints(solution, &move_stops);
        move_stops.allowed = !violated;
        if move_stops.allowed {
            move_stops.value = estimate_delta_score(solution, &move_stops);
        }

        Ok(move_stops)
    }

    /// Creates a move which is not validated nor evaluated.
    pub(crate) fn unchecked(plan_unit: usize, positions: StopPositions) -> Self {
        Self { plan_unit, positions, value: 0., value_seen: 1, allowed: true }
    }

    /// Returns plan unit index.
    pub fn plan_unit(&self) -> usize {
        self.plan_unit
    }

    /// Returns positions in sequence order.
    pub fn positions(&self) -> &[StopPosition] {
        self.positions.as_slice()
    }

    /// Returns the planned stop after which the first stop is inserted.
    pub fn previous<'a>(&self, solution: &'a Solution) -> SolutionStop<'a> {
        solution.stop(self.positions.first().map_or(0, |p| p.previous))
    }

    /// Returns the planned stop before which the last stop is inserted.
    pub fn next<'a>(&self, solution: &'a Solution) -> SolutionStop<'a> {
        solution.stop(self.positions.last().map_or(0, |p| p.next))
    }

    /// Returns the vehicle of the move.
    pub fn vehicle<'a>(&self, solution: &'a Solution) -> SolutionVehicle<'a> {
        self.next(solution).vehicle()
    }

    /// Returns the estimated change of the score.
    pub fn value(&self) -> Float {
        self.value
    }

    /// Returns how many moves with the same value were seen when this one was selected.
    pub fn value_seen(&self) -> usize {
        self.value_seen
    }

    /// Returns true if no constraint is estimated to be violated.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns true if stop is inserted by this move.
    pub fn contains(&self, stop: usize) -> bool {
        self.positions.iter().any(|p| p.stop == stop)
    }

    /// Returns a generator over stops of the vehicle as they would be after the move.
    pub fn stops<'a>(&'a self, solution: &'a Solution, start_at_first: bool, end_at_last: bool) -> StopGenerator<'a> {
        StopGenerator::new(solution, self.positions.as_slice(), start_at_first, end_at_last)
    }

    pub(crate) fn set_evaluation(&mut self, value: Float, allowed: bool) {
        self.value = value;
        self.allowed = allowed;
    }

    fn execute(&self, solution: &mut Solution) -> GenericResult<bool> {
        if !self.allowed || !validate_positions(solution, self.plan_unit, self.positions.as_slice())? {
            return Ok(false);
        }

        let placements = self.positions.iter().map(|p| (p.stop, p.previous)).collect::<Vec<_>>();

        solution.insert_stops(self.plan_unit, placements.as_slice())
    }
}

/// A move which plans all children of all of plan unit, or one child of one of plan unit.
#[derive(Clone, Debug)]
pub struct MoveUnits {
    plan_unit: usize,
    moves: Vec<Move>,
    value: Float,
    value_seen: usize,
}

impl MoveUnits {
    pub(crate) fn new(plan_unit: usize, moves: Vec<Move>) -> Self {
        let value = moves.iter().map(|m| m.value()).sum();
        Self { plan_unit, moves, value, value_seen: 1 }
    }

    /// Returns plan unit index.
    pub fn plan_unit(&self) -> usize {
        self.plan_unit
    }

    /// Returns child moves in execution order.
    pub fn moves(&self) -> &[Move] {
        self.moves.as_slice()
    }

    fn execute(&self, solution: &mut Solution) -> GenericResult<bool> {
        for child in self.moves.iter() {
            if !child.execute(solution)? {
                let root = solution.model().root_of(self.plan_unit);
                if !solution.discard_root(root)? {
                    return Err(format!("cannot undo partially planned plan unit {}", self.plan_unit).into());
                }

                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// A move which plans a plan unit.
#[derive(Clone, Debug, Default)]
pub enum Move {
    /// Inserts stops of a stops unit.
    Stops(MoveStops),
    /// Inserts stops of several units.
    Units(MoveUnits),
    /// A move which can not be executed.
    #[default]
    NotExecutable,
}

impl Move {
    /// Returns plan unit index, if any.
    pub fn plan_unit(&self) -> Option<usize> {
        match self {
            Move::Stops(m) => Some(m.plan_unit),
            Move::Units(m) => Some(m.plan_unit),
            Move::NotExecutable => None,
        }
    }

    /// Returns the estimated score change, infinite for not executable move.
    pub fn value(&self) -> Float {
        match self {
            Move::Stops(m) if self.is_executable() => m.value,
            Move::Units(m) if self.is_executable() => m.value,
            _ => Float::INFINITY,
        }
    }

    /// Returns how many moves with the same value were seen.
    pub fn value_seen(&self) -> usize {
        match self {
            Move::Stops(m) => m.value_seen,
            Move::Units(m) => m.value_seen,
            Move::NotExecutable => 0,
        }
    }

    /// Returns true if the move can be executed.
    pub fn is_executable(&self) -> bool {
        match self {
            Move::Stops(m) => m.is_executable(),
            Move::Units(m) => !m.moves.is_empty() && m.moves.iter().all(|m| m.is_executable()),
            Move::NotExecutable => false,
        }
    }

    /// Returns true if the move is executable and estimated to decrease the score.
    pub fn is_improvement(&self) -> bool {
        self.is_executable() && self.value() < 0.
    }

    /// Returns the better move of two: an executable move beats a not executable one and a
    /// lower value wins. Ties are broken uniformly at random among all moves seen with that value.
    pub fn take_best(self, other: Move, random: &impl Random) -> Move {
        match (self.is_executable(), other.is_executable()) {
            (false, _) => return other,
            (true, false) => return self,
            _ => {}
        }

        match compare_floats(self.value(), other.value()) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal => {
                let (left, right) = (self.value_seen(), other.value_seen());
                let total = left + right;
                let mut winner = if random.index(total) < left { self } else { other };
                winner.set_value_seen(total);
                winner
            }
        }
    }

    /// Executes the move. Returns false if the move is not executable, stale or turns out to be
    /// infeasible, in the latter case the solution is restored.
    pub fn execute(&self, solution: &mut Solution) -> GenericResult<bool> {
        match self {
            Move::Stops(m) => m.execute(solution),
            Move::Units(m) => m.execute(solution),
            Move::NotExecutable => Ok(false),
        }
    }

    fn set_value_seen(&mut self, value_seen: usize) {
        match self {
            Move::Stops(m) => m.value_seen = value_seen,
            Move::Units(m) => m.value_seen = value_seen,
            Move::NotExecutable => {}
        }
    }
}

impl MoveStops {
    fn is_executable(&self) -> bool {
        self.allowed && !self.positions.is_empty()
    }
}

impl From<MoveStops> for Move {
    fn from(value: MoveStops) -> Self {
        Move::Stops(value)
    }
}

/// Evaluates constraints in model order, stops at the first violated one.
pub fn check_constraints(solution: &Solution, move_stops: &MoveStops) -> ViolationEstimate {
    solution
        .model()
        .constraints()
        .iter()
        .map(|constraint| constraint.estimate_is_violated(move_stops, solution))
        .find(|(violated, _)| *violated)
        .unwrap_or_else(|| (false, no_positions_hint()))
}

/// Estimates the score change of the move.
pub fn estimate_delta_score(solution: &Solution, move_stops: &MoveStops) -> Float {
    solution
        .model()
        .objectives()
        .iter()
        .map(|term| term.factor * term.objective.estimate_delta_value(move_stops, solution))
        .sum()
}

/// Validates positions: returns an error for positions which can never be valid and false for
/// positions which are not consistent with the current state of the solution.
fn validate_positions(solution: &Solution, plan_unit: usize, positions: &[StopPosition]) -> GenericResult<bool> {
    let model = solution.model();
    let Some(PlanUnit::Stops(unit)) = model.plan_units().get(plan_unit) else {
        return Err(format!("plan unit {plan_unit} is not a stops plan unit").into());
    };

    if positions.len() != unit.stops.len() {
        return Err(format!(
            "plan unit {plan_unit} has {} stops, but {} positions are given",
            unit.stops.len(),
            positions.len()
        )
        .into());
    }

    if let Some(position) = positions.iter().find(|p| !unit.stops.contains(&p.stop)) {
        return Err(format!("stop {} does not belong to plan unit {plan_unit}", position.stop).into());
    }

    if let Some(position) = positions.iter().find(|p| p.next >= model.stops().len() || model.stop(p.next).is_first()) {
        return Err(format!("stop {} cannot be inserted before a vehicle start", position.stop).into());
    }

    if let Some(position) =
        positions.iter().find(|p| p.previous >= model.stops().len() || model.stop(p.previous).is_last())
    {
        return Err(format!("stop {} cannot be inserted after a vehicle end", position.stop).into());
    }

    let sequence = positions.iter().map(|p| p.stop).collect::<Vec<_>>();
    if !unit.dag.is_allowed(sequence.as_slice())? {
        return Ok(false);
    }

    let is_planned = |stop: usize| solution.vehicle_index_of(stop).is_some();

    if sequence.iter().any(|&stop| is_planned(stop)) {
        return Ok(false);
    }

    let (Some(first), Some(last)) = (positions.first(), positions.last()) else {
        return Ok(false);
    };

    if !is_planned(first.previous) || !is_planned(last.next) {
        return Ok(false);
    }

    let vehicle = solution.vehicle_index_of(last.next);
    let mut anchor = first.previous;
    let mut min_position = 0;

    for (idx, position) in positions.iter().enumerate() {
        if is_planned(position.previous) {
            if solution.vehicle_index_of(position.previous) != vehicle || solution.position[position.previous] < min_position {
                return Ok(false);
            }
            anchor = position.previous;
        } else if idx == 0 || positions[idx - 1].stop != position.previous || positions[idx - 1].next != position.stop {
            return Ok(false);
        }

        if is_planned(position.next) {
            if solution.vehicle_index_of(position.next) != vehicle || solution.next[anchor] != position.next {
                return Ok(false);
            }
            min_position = solution.position[position.next];
        } else if positions.get(idx + 1).is_none_or(|p| p.stop != position.next || p.previous != position.stop) {
            return Ok(false);
        }
    }

    Ok(true)
}
