use std::mem;

use indexmap::IndexSet;

/// A pair of insertion-ordered sets, one accepting producers while the other
/// is drained by the consumer.
///
/// `insert` always lands in the active set. `swap_and_take` hands the active
/// set to the caller and makes the other one active, so entries inserted while
/// a batch is being processed are delivered with the next batch, exactly once.
pub struct DoubleBufferedSet<T: Copy + PartialEq + Eq + std::hash::Hash> {
    sets: [IndexSet<T>; 2],
    active: usize,
}

impl<T: Copy + PartialEq + Eq + std::hash::Hash> DoubleBufferedSet<T> {
    pub fn new() -> Self {
        Self { sets: [IndexSet::new(), IndexSet::new()], active: 0 }
    }

    /// Inserts into the active set. Returns whether the item was newly added to it.
    pub fn insert(&mut self, item: T) -> bool {
        self.sets[self.active].insert(item)
    }

    /// Takes the active set for draining and flips the roles.
    pub fn swap_and_take(&mut self) -> IndexSet<T> {
        let taken = mem::take(&mut self.sets[self.active]);
        self.active ^= 1;
        taken
    }

    pub fn len(&self) -> usize {
        self.sets[0].len() + self.sets[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets[0].is_empty() && self.sets[1].is_empty()
    }
}

impl<T: Copy + PartialEq + Eq + std::hash::Hash> Default for DoubleBufferedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::DoubleBufferedSet;
    use itertools::Itertools;

    #[test]
    fn test_swap_alternation() {
        let mut buffer = DoubleBufferedSet::new();
        assert!(buffer.insert(1));
        assert!(buffer.insert(2));
        assert!(!buffer.insert(1));
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.swap_and_take().iter().copied().collect_vec(), vec![1, 2]);
        assert!(buffer.is_empty());

        // Entries inserted after the swap land in the other set
        assert!(buffer.insert(3));
        assert_eq!(buffer.swap_and_take().iter().copied().collect_vec(), vec![3]);
        assert!(buffer.swap_and_take().is_empty());
    }
}
