use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use tangle_hashes::Hash;

/// Tracks hashes whose full transactions were requested from peers and are
/// still outstanding.
///
/// The set is bounded. When full, a random entry is evicted to make room, so
/// a node which is far behind keeps requesting recent gaps instead of growing
/// the set without limit.
pub struct TransactionRequester {
    pending: Mutex<IndexSet<Hash>>,
    max_pending: usize,
}

impl TransactionRequester {
    pub fn new(max_pending: usize) -> Self {
        Self { pending: Mutex::new(IndexSet::new()), max_pending }
    }

    pub fn is_requested(&self, hash: Hash) -> bool {
        self.pending.lock().contains(&hash)
    }

    /// Queues `hash` for retrieval from peers. Returns `false` if it was
    /// already pending.
    pub fn request(&self, hash: Hash) -> bool {
        let mut pending = self.pending.lock();
        if pending.contains(&hash) {
            return false;
        }
        if pending.len() == self.max_pending {
            debug!("Pending transaction requests reached their limit ({}), evicting a random request", self.max_pending);
            let rand_index = rand::thread_rng().gen_range(0..pending.len());
            if let Some(rand_hash) = pending.swap_remove_index(rand_index) {
                debug!("Evicted {} from the pending transaction requests", rand_hash);
            }
        }
        pending.insert(hash);
        true
    }

    /// Drops the request for `hash`, usually because the transaction arrived.
    /// Returns whether it was pending.
    pub fn clear(&self, hash: Hash) -> bool {
        self.pending.lock().swap_remove(&hash)
    }

    pub fn pending(&self) -> Vec<Hash> {
        self.pending.lock().iter().copied().collect_vec()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
