//! Reexports helper functionality from the base crate plus domain specific helpers.

pub use alns_base::heuristics::{SolveParameter, SolveParameterSettings};
pub use alns_base::telemetry::*;
pub use alns_base::termination::*;
pub use alns_base::utils::*;

mod collections;
pub use self::collections::*;
