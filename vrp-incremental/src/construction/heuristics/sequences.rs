#[cfg(test)]
#[path = "../../../tests/unit/construction/heuristics/sequences_test.rs"]
mod sequences_test;

use crate::construction::heuristics::{StopPosition, StopPositions};
use crate::models::problem::{Model, PlanStopsUnit};
use crate::utils::Random;
use rustc_hash::FxHashMap;
use std::ops::ControlFlow;

/// Generates up to `max_sequences` orders of plan unit stops which respect its precedence graph.
/// Enumeration starts from a random permutation of stops, a stop with a direct arc is always
/// followed by its direct successor.
pub fn generate_sequences(unit: &PlanStopsUnit, random: &impl Random, max_sequences: usize) -> Vec<Vec<usize>> {
    if unit.stops.len() < 2 {
        return vec![unit.stops.clone()];
    }

    let mut order = unit.stops.clone();
    random.shuffle(order.as_mut_slice());

    let mut in_degree = unit.stops.iter().map(|&stop| (stop, 0_usize)).collect::<FxHashMap<_, _>>();
    unit.dag.arcs().iter().for_each(|arc| *in_degree.entry(arc.destination).or_default() += 1);

    let mut generator = SequenceGenerator {
        unit,
        order,
        in_degree,
        used: FxHashMap::default(),
        sequence: Vec::with_capacity(unit.stops.len()),
        results: vec![],
        max_sequences,
    };

    generator.visit(None);

    generator.results
}

struct SequenceGenerator<'a> {
    unit: &'a PlanStopsUnit,
    order: Vec<usize>,
    in_degree: FxHashMap<usize, usize>,
    used: FxHashMap<usize, bool>,
    sequence: Vec<usize>,
    results: Vec<Vec<usize>>,
    max_sequences: usize,
}

impl SequenceGenerator<'_> {
    fn visit(&mut self, direct_successor: Option<usize>) {
        if self.results.len() >= self.max_sequences {
            return;
        }

        if self.sequence.len() == self.unit.stops.len() {
            self.results.push(self.sequence.clone());
            return;
        }

        let candidates = match direct_successor {
            Some(successor) => vec![successor],
            None => self.order.clone(),
        };

        for stop in candidates {
            let is_used = self.used.get(&stop).copied().unwrap_or(false);
            if is_used || self.in_degree.get(&stop).copied().unwrap_or(0) != 0 {
                continue;
            }

            let arcs = self.unit.dag.outbound_arcs(stop);
            let mut successor = None;
            arcs.iter().for_each(|arc| {
                if let Some(degree) = self.in_degree.get_mut(&arc.destination) {
                    *degree -= 1;
                }
                if arc.is_direct {
                    successor = Some(arc.destination);
                }
            });

            self.used.insert(stop, true);
            self.sequence.push(stop);

            self.visit(successor);

            self.sequence.pop();
            self.used.insert(stop, false);
            arcs.iter().for_each(|arc| *self.in_degree.entry(arc.destination).or_default() += 1);

            if self.results.len() >= self.max_sequences {
                return;
            }
        }
    }
}

/// Enumerates non decreasing combinations of `n` locations in `[1, m]`.
pub fn combine_ascending<F>(n: usize, m: usize, yield_fn: &mut F)
where
    F: FnMut(&[usize]) -> ControlFlow<()>,
{
    let mut combination = Vec::with_capacity(n);
    let _ = combine(&mut combination, n, m, yield_fn);
}

fn combine<F>(combination: &mut Vec<usize>, n: usize, m: usize, yield_fn: &mut F) -> ControlFlow<()>
where
    F: FnMut(&[usize]) -> ControlFlow<()>,
{
    if combination.len() == n {
        return yield_fn(combination.as_slice());
    }

    let start = combination.last().copied().unwrap_or(1);
    for location in start..=m {
        combination.push(location);
        let flow = combine(combination, n, m, yield_fn);
        combination.pop();
        flow?;
    }

    ControlFlow::Continue(())
}

/// Enumerates positions of the sequence of stops within the target sequence of planned stops.
/// The target sequence starts with the vehicle first stop and ends with its last stop.
pub fn generate_positions<F>(model: &Model, source: &[usize], target: &[usize], yield_fn: &mut F)
where
    F: FnMut(StopPositions) -> ControlFlow<()>,
{
    if source.is_empty() || target.len() < 2 {
        return;
    }

    let check_neighbours = model.has_direct_arcs();

    combine_ascending(source.len(), target.len() - 1, &mut |locations: &[usize]| {
        if check_neighbours && !are_neighbours_kept(model, source, target, locations) {
            return ControlFlow::Continue(());
        }

        yield_fn(to_positions(source, target, locations))
    });
}

fn to_positions(source: &[usize], target: &[usize], locations: &[usize]) -> StopPositions {
    locations
        .iter()
        .enumerate()
        .map(|(idx, &location)| {
            let previous =
                if idx > 0 && locations[idx - 1] == location { source[idx - 1] } else { target[location - 1] };
            let next = if idx + 1 < locations.len() && locations[idx + 1] == location {
                source[idx + 1]
            } else {
                target[location]
            };

            StopPosition::new(previous, source[idx], next)
        })
        .collect()
}

/// Checks that planned stops connected by a direct arc are not split and that source stops
/// connected by a direct arc are inserted next to each other.
fn are_neighbours_kept(model: &Model, source: &[usize], target: &[usize], locations: &[usize]) -> bool {
    let splits_target = locations.iter().any(|&location| {
        location > 1 && model.must_be_neighbours(target[location - 1], target[location])
    });

    let splits_source = locations.windows(2).zip(source.windows(2)).any(|(locations, stops)| {
        locations[0] != locations[1] && model.must_be_neighbours(stops[0], stops[1])
    });

    !splits_target && !splits_source
}
