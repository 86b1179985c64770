#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/insertions_test.rs"]
mod insertions_test;

use crate::construction::heuristics::*;
use crate::models::problem::{PlanStopsUnit, PlanUnit, PlanUnitsUnit};
use crate::models::solution::Solution;
use crate::utils::{CancellationToken, Float, GenericResult, Random, compare_floats};
use std::cmp::Ordering;
use std::ops::ControlFlow;
use tinyvec::tiny_vec;

/// Finds the best move of the plan unit over all vehicles.
pub fn best_move(solution: &mut Solution, plan_unit: usize, token: &CancellationToken) -> GenericResult<Move> {
    let mut best = Move::NotExecutable;

    for vehicle in 0..solution.model().vehicles().len() {
        if token.is_cancelled() {
            break;
        }

        let candidate = best_move_for_vehicle(solution, vehicle, plan_unit, token)?;
        best = best.take_best(candidate, solution.random());
    }

    Ok(best)
}

/// Finds the best move of the plan unit on the vehicle. A plan unit which is planned already has
/// no executable move.
pub fn best_move_for_vehicle(
    solution: &mut Solution,
    vehicle: usize,
    plan_unit: usize,
    token: &CancellationToken,
) -> GenericResult<Move> {
    if token.is_cancelled() || solution.is_planned(plan_unit) {
        return Ok(Move::NotExecutable);
    }

    let model = solution.model().clone();

    match model.plan_unit(plan_unit) {
        PlanUnit::Stops(unit) => Ok(best_move_stops(solution, vehicle, unit)),
        PlanUnit::Units(unit) if unit.plan_one_of => unit.units.iter().try_fold(Move::NotExecutable, |best, &child| {
            let candidate = best_move_for_vehicle(solution, vehicle, child, token)?;
            Ok(best.take_best(candidate, solution.random()))
        }),
        PlanUnit::Units(unit) => best_move_all_of(solution, vehicle, unit, token),
    }
}

fn best_move_stops(solution: &Solution, vehicle: usize, unit: &PlanStopsUnit) -> Move {
    if unit.stops.len() == 1 {
        best_move_single_stop(solution, vehicle, unit)
    } else {
        best_move_multiple_stops(solution, vehicle, unit)
    }
}

fn best_move_single_stop(solution: &Solution, vehicle: usize, unit: &PlanStopsUnit) -> Move {
    let stop = unit.stops[0];
    let random = solution.random();
    let target = solution.vehicle(vehicle).stops().map(|stop| stop.index()).collect::<Vec<_>>();

    let mut candidates: Vec<(Float, MoveStops)> = Vec::with_capacity(target.len());
    let mut best: Option<usize> = None;

    for (idx, pair) in target.windows(2).enumerate() {
        let move_stops = MoveStops::unchecked(unit.index, tiny_vec!([StopPosition; 2] => StopPosition::new(pair[0], stop, pair[1])));

        if idx == 0 {
            let (violated, hint) = check_constraints(solution, &move_stops);
            if hint.skip_vehicle {
                return Move::NotExecutable;
            }
            if violated {
                continue;
            }
        }

        let value = estimate_delta_score(solution, &move_stops);
        let is_better = best.is_none_or(|best| match compare_floats(value, candidates[best].0) {
            Ordering::Less => true,
            Ordering::Equal => random.is_head_not_tails(),
            Ordering::Greater => false,
        });

        candidates.push((value, move_stops));
        if is_better {
            best = Some(candidates.len() - 1);
        }
    }

    let Some(best) = best else {
        return Move::NotExecutable;
    };

    let (value, mut move_stops) = candidates.swap_remove(best);
    if !check_constraints(solution, &move_stops).0 {
        move_stops.set_evaluation(value, true);
        return move_stops.into();
    }

    let mut keys = candidates.iter().map(|(value, _)| (*value, random.uniform_real(0., 1.))).collect::<Vec<_>>();
    let mut order = (0..candidates.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| compare_floats(keys[a].0, keys[b].0).then(compare_floats(keys[a].1, keys[b].1)));
    keys.clear();

    order
        .into_iter()
        .find(|&idx| !check_constraints(solution, &candidates[idx].1).0)
        .map_or(Move::NotExecutable, |idx| {
            let (value, mut move_stops) = candidates.swap_remove(idx);
            move_stops.set_evaluation(value, true);
            move_stops.into()
        })
}

fn best_move_multiple_stops(solution: &Solution, vehicle: usize, unit: &PlanStopsUnit) -> Move {
    let model = solution.model();
    let random = solution.random();
    let target = solution.vehicle(vehicle).stops().map(|stop| stop.index()).collect::<Vec<_>>();

    let mut best = Move::NotExecutable;
    let mut skip_vehicle = false;

    for sequence in generate_sequences(unit, random, model.sequence_sample_size()) {
        generate_positions(model, sequence.as_slice(), target.as_slice(), &mut |positions| {
            let mut move_stops = MoveStops::unchecked(unit.index, positions);

            let (violated, hint) = check_constraints(solution, &move_stops);
            if hint.skip_vehicle {
                skip_vehicle = true;
                return ControlFlow::Break(());
            }

            if !violated {
                let value = estimate_delta_score(solution, &move_stops);
                move_stops.set_evaluation(value, true);
                best = std::mem::take(&mut best).take_best(move_stops.into(), random);
            }

            ControlFlow::Continue(())
        });

        if skip_vehicle {
            return Move::NotExecutable;
        }
    }

    best
}

fn best_move_all_of(
    solution: &mut Solution,
    vehicle: usize,
    unit: &PlanUnitsUnit,
    token: &CancellationToken,
) -> GenericResult<Move> {
    let mut units = unit.units.clone();
    solution.random().shuffle(units.as_mut_slice());

    let root = solution.model().root_of(unit.index);
    let mut moves = Vec::with_capacity(units.len());

    for (idx, &child) in units.iter().enumerate() {
        let candidate = if idx == 0 || unit.same_vehicle {
            best_move_for_vehicle(solution, vehicle, child, token)?
        } else {
            best_move(solution, child, token)?
        };

        if !candidate.is_executable() || !candidate.execute(solution)? {
            discard(solution, root, !moves.is_empty())?;
            return Ok(Move::NotExecutable);
        }

        moves.push(candidate);
    }

    discard(solution, root, true)?;

    Ok(Move::Units(MoveUnits::new(unit.index, moves)))
}

fn discard(solution: &mut Solution, root: usize, has_planned: bool) -> GenericResult<()> {
    if has_planned && !solution.discard_root(root)? {
        return Err(format!("cannot undo tentative moves of plan unit {root}").into());
    }

    Ok(())
}
