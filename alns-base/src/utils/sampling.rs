#[cfg(test)]
#[path = "../../tests/unit/utils/sampling_test.rs"]
mod sampling_test;

use crate::utils::{Float, GenericResult, Random};
use rand::distributions::Distribution;
use rand_distr::WeightedAliasIndex;

/// Samples indices proportionally to their weights in constant time using the alias method.
pub struct AliasSampler {
    inner: WeightedAliasIndex<Float>,
}

impl AliasSampler {
    /// Creates a new instance of `AliasSampler`. Fails when weights are empty, negative or all zero.
    pub fn new(weights: Vec<Float>) -> GenericResult<Self> {
        WeightedAliasIndex::new(weights)
            .map(|inner| Self { inner })
            .map_err(|err| format!("cannot create alias sampler: {err}").into())
    }

    /// Samples an index.
    pub fn sample(&self, random: &impl Random) -> usize {
        self.inner.sample(&mut *random.get_rng())
    }
}
