#[cfg(test)]
#[path = "../../tests/unit/utils/random_test.rs"]
mod random_test;

use crate::utils::{Float, compare_floats};
use rand::prelude::*;
use std::cell::{RefCell, RefMut};

/// Provides the way to use randomized values in generic way.
pub trait Random {
    /// Produces integral random value, uniformly distributed on the closed interval [min, max]
    fn uniform_int(&self, min: i32, max: i32) -> i32;

    /// Produces real random value, uniformly distributed on the closed interval [min, max)
    fn uniform_real(&self, min: Float, max: Float) -> Float;

    /// Flips a coin and returns true if it is "heads", false otherwise.
    fn is_head_not_tails(&self) -> bool;

    /// Tests probability value in (0., 1.) range.
    fn is_hit(&self, probability: Float) -> bool;

    /// Returns an index from collected with probability weight.
    /// Uses exponential distribution where the weights are the rate of the distribution (lambda)
    /// and selects the smallest sampled value.
    fn weighted(&self, weights: &[usize]) -> usize;

    /// Returns RNG.
    fn get_rng(&self) -> RandomGen<'_>;

    /// Returns an index uniformly distributed on [0, size). Size must be positive.
    fn index(&self, size: usize) -> usize {
        assert!(size > 0);
        self.get_rng().gen_range(0..size)
    }

    /// Shuffles items in place.
    fn shuffle<T>(&self, items: &mut [T])
    where
        Self: Sized,
    {
        items.shuffle(&mut *self.get_rng());
    }
}

/// Specifies underlying random generator type.
pub type RandomGen<'a> = RefMut<'a, SmallRng>;

/// A default random implementation which owns its own generator stream.
///
/// Each instance can be moved between threads, but it is not meant to be shared: parallel
/// workers should [`fork`](DefaultRandom::fork) their own instance instead.
#[derive(Debug)]
pub struct DefaultRandom {
    rng: RefCell<SmallRng>,
}

impl DefaultRandom {
    /// Creates a new instance with reproducible stream of values.
    pub fn new_repeatable(seed: u64) -> Self {
        Self { rng: RefCell::new(SmallRng::seed_from_u64(seed)) }
    }

    /// Creates a new independent instance seeded from this one.
    pub fn fork(&self) -> Self {
        let seed = self.rng.borrow_mut().next_u64();
        Self::new_repeatable(seed)
    }

    /// Returns next raw value, can be used to seed other generators.
    pub fn next_seed(&self) -> u64 {
        self.rng.borrow_mut().next_u64()
    }
}

impl Default for DefaultRandom {
    fn default() -> Self {
        Self { rng: RefCell::new(SmallRng::from_entropy()) }
    }
}

impl Clone for DefaultRandom {
    fn clone(&self) -> Self {
        self.fork()
    }
}

impl Random for DefaultRandom {
    fn uniform_int(&self, min: i32, max: i32) -> i32 {
        if min == max {
            return min;
        }

        assert!(min < max);
        self.get_rng().gen_range(min..max + 1)
    }

    fn uniform_real(&self, min: Float, max: Float) -> Float {
        if (min - max).abs() < Float::EPSILON {
            return min;
        }

        assert!(min < max);
        self.get_rng().gen_range(min..max)
    }

    fn is_head_not_tails(&self) -> bool {
        self.get_rng().gen_bool(0.5)
    }

    fn is_hit(&self, probability: Float) -> bool {
        self.get_rng().gen_bool(probability.clamp(0., 1.))
    }

    fn weighted(&self, weights: &[usize]) -> usize {
        weights
            .iter()
            .zip(0_usize..)
            .map(|(&weight, index)| (-self.uniform_real(0., 1.).ln() / weight as Float, index))
            .min_by(|a, b| compare_floats(a.0, b.0))
            .map_or(0, |(_, index)| index)
    }

    fn get_rng(&self) -> RandomGen<'_> {
        self.rng.borrow_mut()
    }
}
