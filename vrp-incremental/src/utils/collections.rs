#[cfg(test)]
#[path = "../../tests/unit/utils/collections_test.rs"]
mod collections_test;

use crate::utils::Random;
use nohash_hasher::IntMap;

/// An unordered set of indices with constant time insert, remove, membership test and random pick.
#[derive(Clone, Debug, Default)]
pub struct IndexSet {
    items: Vec<usize>,
    positions: IntMap<usize, usize>,
}

impl IndexSet {
    /// Adds an index, returns false if it is already present.
    pub fn add(&mut self, index: usize) -> bool {
        if self.positions.contains_key(&index) {
            return false;
        }

        self.positions.insert(index, self.items.len());
        self.items.push(index);

        true
    }

    /// Removes an index, returns false if it is not present.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(position) = self.positions.remove(&index) else {
            return false;
        };

        self.items.swap_remove(position);
        if let Some(&moved) = self.items.get(position) {
            self.positions.insert(moved, position);
        }

        true
    }

    /// Checks whether index is present.
    pub fn contains(&self, index: usize) -> bool {
        self.positions.contains_key(&index)
    }

    /// Returns amount of indices.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns indices in unspecified order.
    pub fn as_slice(&self) -> &[usize] {
        self.items.as_slice()
    }

    /// Returns a random index, if any.
    pub fn random_element(&self, random: &impl Random) -> Option<usize> {
        if self.items.is_empty() { None } else { Some(self.items[random.index(self.items.len())]) }
    }

    /// Returns up to `amount` distinct random indices.
    pub fn random_elements(&self, random: &impl Random, amount: usize) -> Vec<usize> {
        let mut items = self.items.clone();
        random.shuffle(items.as_mut_slice());
        items.truncate(amount);

        items
    }
}
