use crate::telemetry::InfoLogger;
use crate::utils::DefaultRandom;
use std::sync::Arc;

/// Returns amount of available logical cpus.
pub fn get_cpus() -> usize {
    num_cpus::get()
}

/// Keeps track of environment specific information which influences algorithm behavior.
#[derive(Clone)]
pub struct Environment {
    /// A seed of a random generator, `None` means entropy based seeding.
    pub seed: Option<u64>,

    /// An information logger.
    pub logger: InfoLogger,

    /// An amount of logical cpus which can be used.
    pub available_cpus: usize,
}

impl Environment {
    /// Creates a new instance of `Environment`.
    pub fn new(seed: Option<u64>, logger: InfoLogger) -> Self {
        Self { seed, logger, available_cpus: get_cpus() }
    }

    /// Creates a new instance with repeatable randomness and silent logger.
    pub fn new_repeatable(seed: u64) -> Self {
        Self::new(Some(seed), Arc::new(|_| {}))
    }

    /// Creates a random generator respecting the configured seed.
    pub fn new_random(&self) -> DefaultRandom {
        self.seed.map_or_else(DefaultRandom::default, DefaultRandom::new_repeatable)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None, Arc::new(|msg: &str| println!("{msg}")))
    }
}
