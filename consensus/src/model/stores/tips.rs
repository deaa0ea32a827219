use indexmap::IndexSet;
use itertools::Itertools;
use parking_lot::RwLock;
use rand::Rng;
use tangle_hashes::Hash;

#[derive(Default)]
struct TipSets {
    unsolid: IndexSet<Hash>,
    solid: IndexSet<Hash>,
}

/// Tracks the current tips of the tangle, split by solidity class.
///
/// A tip is a transaction no other transaction approves yet. It enters as
/// unsolid and migrates to the solid class once its full ancestry is locally
/// available, making it eligible for selection by new attachments.
#[derive(Default)]
pub struct TipsTracker {
    sets: RwLock<TipSets>,
}

impl TipsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly arrived transaction as an unsolid tip and retires
    /// its parents from both tip classes.
    pub fn add_tip(&self, new_tip: Hash, new_tip_parents: &[Hash]) {
        let mut sets = self.sets.write();
        for parent in new_tip_parents {
            sets.unsolid.swap_remove(parent);
            sets.solid.swap_remove(parent);
        }
        sets.unsolid.insert(new_tip);
    }

    /// Moves `hash` to the solid class if it is still tracked as a tip.
    pub fn mark_solid(&self, hash: Hash) {
        let mut sets = self.sets.write();
        if sets.unsolid.swap_remove(&hash) {
            sets.solid.insert(hash);
        }
    }

    pub fn remove_tip(&self, hash: Hash) {
        let mut sets = self.sets.write();
        sets.unsolid.swap_remove(&hash);
        sets.solid.swap_remove(&hash);
    }

    /// Samples a uniformly random solid tip, or `None` when no tip is solid yet.
    pub fn random_solid_tip(&self) -> Option<Hash> {
        let sets = self.sets.read();
        if sets.solid.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..sets.solid.len());
        sets.solid.get_index(index).copied()
    }

    /// Returns the (unsolid, solid) tip counts.
    pub fn tip_counts(&self) -> (usize, usize) {
        let sets = self.sets.read();
        (sets.unsolid.len(), sets.solid.len())
    }

    pub fn get(&self) -> Vec<Hash> {
        let sets = self.sets.read();
        sets.unsolid.iter().chain(sets.solid.iter()).copied().collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_lifecycle() {
        let tips = TipsTracker::new();
        tips.add_tip(1.into(), &[]);
        tips.add_tip(2.into(), &[1.into()]);
        tips.add_tip(3.into(), &[1.into()]);
        assert_eq!(tips.tip_counts(), (2, 0));

        tips.mark_solid(2.into());
        assert_eq!(tips.tip_counts(), (1, 1));
        assert_eq!(tips.random_solid_tip(), Some(2.into()));

        // A new tip retires its parents regardless of their class
        tips.add_tip(4.into(), &[2.into(), 3.into()]);
        assert_eq!(tips.tip_counts(), (1, 0));
        assert_eq!(tips.random_solid_tip(), None);

        // Marking an untracked hash has no effect
        tips.mark_solid(9.into());
        assert_eq!(tips.tip_counts(), (1, 0));

        tips.remove_tip(4.into());
        assert_eq!(tips.get(), Vec::<Hash>::new());
    }
}
