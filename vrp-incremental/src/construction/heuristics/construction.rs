#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/construction_test.rs"]
mod construction_test;

use crate::construction::heuristics::best_move_for_vehicle;
use crate::models::solution::Solution;
use crate::utils::{CancellationToken, GenericResult, Random};

/// Constructs a solution by planning unplanned plan units in random order, each on the first
/// vehicle in random order which has an executable move for it. Returns the amount of planned
/// plan units.
pub fn random_solution_construction(solution: &mut Solution, token: &CancellationToken) -> GenericResult<usize> {
    let mut units = solution.unplanned_plan_units().as_slice().to_vec();
    solution.random().shuffle(units.as_mut_slice());

    let mut vehicles = (0..solution.model().vehicles().len()).collect::<Vec<_>>();
    let mut planned = 0;

    for unit in units {
        if token.is_cancelled() {
            break;
        }

        solution.random().shuffle(vehicles.as_mut_slice());

        for &vehicle in vehicles.iter() {
            let candidate = best_move_for_vehicle(solution, vehicle, unit, token)?;

            if candidate.is_executable() && candidate.execute(solution)? {
                planned += 1;
                break;
            }
        }
    }

    Ok(planned)
}
