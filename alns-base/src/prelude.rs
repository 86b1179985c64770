//! This module reimports commonly used types.

pub use crate::heuristics::{SolveParameter, SolveParameterSettings};
pub use crate::telemetry::{InfoLogger, Progression, ProgressionEntry, Telemetry};
pub use crate::termination::CancellationToken;
pub use crate::utils::{
    AliasSampler, DefaultRandom, Environment, Float, GenericError, GenericResult, Random, RandomGen, Timer,
    compare_floats,
};
