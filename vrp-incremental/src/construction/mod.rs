//! This module contains building blocks for local search.
//!
//! # Moves
//!
//! A move describes where stops of an unplanned plan unit would be inserted. Constraints and
//! objectives evaluate a move without applying it: they walk stops of a vehicle as they would be
//! after the move using a stop generator and the cached values of planned stops. Only a move
//! which is selected is executed and propagated through the solution.
//!

pub mod features;
pub mod heuristics;
