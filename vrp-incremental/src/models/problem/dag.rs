#[cfg(test)]
#[path = "../../../tests/unit/models/problem/dag_test.rs"]
mod dag_test;

use crate::utils::GenericResult;
use rustc_hash::{FxHashMap, FxHashSet};

/// An arc between two stops of a plan unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrecedenceArc {
    /// An origin stop index.
    pub origin: usize,
    /// A destination stop index.
    pub destination: usize,
    /// A direct arc requires destination to follow origin immediately.
    pub is_direct: bool,
}

/// A directed acyclic graph of precedence relations between stops of a plan unit.
#[derive(Clone, Debug, Default)]
pub struct DirectedAcyclicGraph {
    arcs: Vec<PrecedenceArc>,
    outbound: FxHashMap<usize, Vec<usize>>,
}

impl DirectedAcyclicGraph {
    /// Adds an arc which requires origin to be visited before destination.
    pub fn add_arc(&mut self, origin: usize, destination: usize) -> GenericResult<()> {
        self.add(PrecedenceArc { origin, destination, is_direct: false })
    }

    /// Adds a direct arc which requires destination to be visited immediately after origin.
    /// Origin can have only one outgoing direct arc, destination only one incoming.
    pub fn add_direct_arc(&mut self, origin: usize, destination: usize) -> GenericResult<()> {
        let arc = PrecedenceArc { origin, destination, is_direct: true };
        if self.arcs.contains(&arc) {
            return Ok(());
        }

        if let Some(other) = self.arcs.iter().find(|a| a.is_direct && a.origin == origin) {
            return Err(format!("stop {origin} already has a direct arc to stop {}", other.destination).into());
        }

        if let Some(other) = self.arcs.iter().find(|a| a.is_direct && a.destination == destination) {
            return Err(format!("stop {destination} already has a direct arc from stop {}", other.origin).into());
        }

        self.add(arc)
    }

    /// Returns all arcs.
    pub fn arcs(&self) -> &[PrecedenceArc] {
        self.arcs.as_slice()
    }

    /// Returns direct arcs.
    pub fn direct_arcs(&self) -> impl Iterator<Item = &PrecedenceArc> + '_ {
        self.arcs.iter().filter(|arc| arc.is_direct)
    }

    /// Returns arcs which start at given stop.
    pub fn outbound_arcs(&self, origin: usize) -> Vec<PrecedenceArc> {
        self.arcs.iter().filter(|arc| arc.origin == origin).copied().collect()
    }

    /// Returns true if there is a direct arc from origin to destination.
    pub fn has_direct_arc(&self, origin: usize, destination: usize) -> bool {
        self.arcs.iter().any(|arc| arc.is_direct && arc.origin == origin && arc.destination == destination)
    }

    /// Returns a destination of direct arc from given origin.
    pub fn direct_successor(&self, origin: usize) -> Option<usize> {
        self.arcs.iter().find(|arc| arc.is_direct && arc.origin == origin).map(|arc| arc.destination)
    }

    /// Returns true if there are no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Checks whether visiting stops in given order respects all arcs between them.
    /// Fails if sequence has duplicates.
    pub fn is_allowed(&self, sequence: &[usize]) -> GenericResult<bool> {
        let positions = sequence.iter().enumerate().map(|(position, &stop)| (stop, position)).collect::<FxHashMap<_, _>>();

        if positions.len() != sequence.len() {
            return Err("sequence contains duplicate stops".into());
        }

        Ok(self.arcs.iter().all(|arc| match (positions.get(&arc.origin), positions.get(&arc.destination)) {
            (Some(&origin), Some(&destination)) if arc.is_direct => destination == origin + 1,
            (Some(&origin), Some(&destination)) => origin < destination,
            _ => true,
        }))
    }

    fn add(&mut self, arc: PrecedenceArc) -> GenericResult<()> {
        if arc.origin == arc.destination {
            return Err(format!("arc from stop {} to itself creates a cycle", arc.origin).into());
        }

        if self.arcs.contains(&arc) {
            return Ok(());
        }

        if self.is_reachable(arc.destination, arc.origin) {
            return Err(format!("arc from stop {} to stop {} creates a cycle", arc.origin, arc.destination).into());
        }

        self.outbound.entry(arc.origin).or_default().push(arc.destination);
        self.arcs.push(arc);

        Ok(())
    }

    fn is_reachable(&self, from: usize, to: usize) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }

            if visited.insert(current) {
                stack.extend(self.outbound.get(&current).into_iter().flatten().copied());
            }
        }

        false
    }
}
