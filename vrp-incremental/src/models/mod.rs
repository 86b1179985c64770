//! A collection of models to represent problem and solution of a vehicle routing problem.

pub mod common;
pub mod goal;
pub mod problem;
pub mod solution;
