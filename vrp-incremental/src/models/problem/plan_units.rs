use crate::models::problem::DirectedAcyclicGraph;

/// A unit of planning: either all its stops are planned on one vehicle or none.
#[derive(Clone, Debug)]
pub struct PlanStopsUnit {
    /// A plan unit index in the model.
    pub index: usize,
    /// Stop indices.
    pub stops: Vec<usize>,
    /// Precedence relations between stops.
    pub dag: DirectedAcyclicGraph,
    /// A parent plan unit index.
    pub parent: Option<usize>,
}

/// A unit of planning composed of other plan units.
#[derive(Clone, Debug)]
pub struct PlanUnitsUnit {
    /// A plan unit index in the model.
    pub index: usize,
    /// Child plan unit indices.
    pub units: Vec<usize>,
    /// If true, exactly one child is planned, otherwise all children are planned.
    pub plan_one_of: bool,
    /// Requires all children to be planned on the same vehicle.
    pub same_vehicle: bool,
    /// A parent plan unit index.
    pub parent: Option<usize>,
}

/// A plan unit.
#[derive(Clone, Debug)]
pub enum PlanUnit {
    /// A unit of stops.
    Stops(PlanStopsUnit),
    /// A unit of other units.
    Units(PlanUnitsUnit),
}

impl PlanUnit {
    /// Returns plan unit index.
    pub fn index(&self) -> usize {
        match self {
            PlanUnit::Stops(unit) => unit.index,
            PlanUnit::Units(unit) => unit.index,
        }
    }

    /// Returns parent plan unit index.
    pub fn parent(&self) -> Option<usize> {
        match self {
            PlanUnit::Stops(unit) => unit.parent,
            PlanUnit::Units(unit) => unit.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: usize) {
        match self {
            PlanUnit::Stops(unit) => unit.parent = Some(parent),
            PlanUnit::Units(unit) => unit.parent = Some(parent),
        }
    }

    /// Returns stops unit, if it is one.
    pub fn as_stops(&self) -> Option<&PlanStopsUnit> {
        match self {
            PlanUnit::Stops(unit) => Some(unit),
            PlanUnit::Units(_) => None,
        }
    }

    /// Returns units unit, if it is one.
    pub fn as_units(&self) -> Option<&PlanUnitsUnit> {
        match self {
            PlanUnit::Stops(_) => None,
            PlanUnit::Units(unit) => Some(unit),
        }
    }
}
