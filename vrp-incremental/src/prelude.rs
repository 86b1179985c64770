//! This module reimports commonly used types.

pub use crate::construction::heuristics::{Move, MoveStops, MoveUnits, StopPosition, random_solution_construction};

pub use crate::models::common::{Distance, Duration, Location, TimeWindow, Timestamp};
pub use crate::models::goal::{Constraint, Cost, Objective, StopData, StopDataKey, ViolationEstimate};
pub use crate::models::problem::{
    ConstantExpression, DirectedAcyclicGraph, Expression, HaversineExpression, Model, StopExpression,
    TimeDependentExpression,
};
pub use crate::models::solution::{Solution, SolutionStop, SolutionVehicle};

pub use crate::solver::{
    ParallelSolveOptions, ParallelSolver, SolutionStream, SolveEvents, SolveOperator, SolveOptions, Solver,
};

pub use alns_base::prelude::*;
