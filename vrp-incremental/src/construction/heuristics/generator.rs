#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/generator_test.rs"]
mod generator_test;

use crate::construction::heuristics::StopPosition;
use crate::models::solution::{Solution, SolutionStop};

#[derive(Clone, Copy, Debug)]
struct GeneratorState {
    next_stop: usize,
    active: usize,
    start_at_first: bool,
    end_at_last: bool,
    end_reached: bool,
}

/// Iterates over stops of a vehicle as they would be if a move was applied, without applying it.
///
/// The iteration starts at the vehicle first stop or at the stop after which the first stop
/// of the move is inserted. It ends at the vehicle last stop or at the stop before which the last
/// stop of the move is inserted.
#[derive(Clone)]
pub struct StopGenerator<'a> {
    solution: &'a Solution,
    positions: &'a [StopPosition],
    initial: GeneratorState,
    state: GeneratorState,
}

impl<'a> StopGenerator<'a> {
    /// Creates a new instance of `StopGenerator`.
    pub fn new(solution: &'a Solution, positions: &'a [StopPosition], start_at_first: bool, end_at_last: bool) -> Self {
        let next_stop = match (positions.first(), positions.last()) {
            (Some(first), Some(last)) if start_at_first => {
                solution.vehicle_index_of(last.next).map_or(first.previous, |vehicle| solution.model().vehicle(vehicle).first)
            }
            (Some(first), _) => first.previous,
            _ => 0,
        };

        let initial = GeneratorState { next_stop, active: 0, start_at_first, end_at_last, end_reached: positions.is_empty() };

        Self { solution, positions, initial, state: initial }
    }

    /// Restarts iteration from the beginning.
    pub fn restart(&mut self) {
        self.state = self.initial;
    }
}

impl<'a> Iterator for StopGenerator<'a> {
    type Item = SolutionStop<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = &mut self.state;
        if state.end_reached {
            return None;
        }

        let current = state.next_stop;
        let result = Some(self.solution.stop(current));

        if state.start_at_first {
            if current == self.positions[state.active].previous {
                state.start_at_first = false;
                state.next_stop = self.positions[state.active].stop;
            } else {
                state.next_stop = self.solution.next[current];
            }

            return result;
        }

        let is_planned = self.solution.vehicle_index_of(current).is_some();
        let is_last = self.solution.model().stop(current).is_last();

        if let Some(active) = self.positions.get(state.active) {
            if current == active.stop {
                state.next_stop = active.next;
                state.active += 1;
            } else if current == active.previous {
                state.next_stop = active.stop;
                state.active += 1;
            } else if !is_planned {
                state.next_stop = self.positions[state.active - 1].next;
            } else if is_last {
                state.end_reached = true;
            } else {
                state.next_stop = self.solution.next[current];
            }

            return result;
        }

        if !is_planned {
            state.next_stop = self.positions[state.active - 1].next;
        } else if state.end_at_last && !is_last {
            state.next_stop = self.solution.next[current];
        } else {
            state.end_reached = true;
        }

        result
    }
}
