use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{trace, warn};
use parking_lot::{Mutex, RwLock};
use tangle_consensus_core::config::Params;
use tangle_consensus_core::tx::TxEntry;
use tangle_consensus_core::{HashMapCustomHasher, TxHashSet};
use tangle_hashes::Hash;

use crate::model::services::requester::TransactionRequester;
use crate::model::services::snapshot::{Snapshot, SnapshotProvider};
use crate::model::stores::errors::{StoreResult, StoreResultExt};
use crate::model::stores::tangle::TangleStore;
use crate::model::stores::tips::TipsTracker;
use crate::pipeline::ProcessingCounters;

use super::DoubleBufferedSet;

enum Visit {
    Enter(Hash),
    Exit(Hash),
}

/// The processor driving transactions from arrival to solidity.
///
/// Two periodic workers share the state: the propagation worker walks the
/// approvers of freshly solidified transactions and quick-checks each one,
/// while the retry worker re-examines transactions whose ancestry was
/// incomplete when they arrived, using the bounded cascade check which may
/// request missing ancestors from peers.
pub struct TransactionSolidifier<T: TangleStore> {
    // Stores
    tangle_store: Arc<RwLock<T>>,

    // Services
    snapshot_provider: Arc<SnapshotProvider>,
    requester: Arc<TransactionRequester>,
    tips: Arc<TipsTracker>,

    // Work buffers
    new_solids: Mutex<DoubleBufferedSet<Hash>>,
    for_retry: Mutex<DoubleBufferedSet<Hash>>,

    // Config
    params: Params,

    // Shutdown
    shutdown_initiator: Mutex<Option<Sender<()>>>,
    shutdown_listener: Receiver<()>,
    is_exiting: AtomicBool,

    // Counters
    counters: Arc<ProcessingCounters>,
}

impl<T: TangleStore + Send + Sync + 'static> TransactionSolidifier<T> {
    pub fn new(
        tangle_store: Arc<RwLock<T>>,
        snapshot_provider: Arc<SnapshotProvider>,
        requester: Arc<TransactionRequester>,
        tips: Arc<TipsTracker>,
        params: Params,
        counters: Arc<ProcessingCounters>,
    ) -> Self {
        let (shutdown_initiator, shutdown_listener) = unbounded();
        Self {
            tangle_store,
            snapshot_provider,
            requester,
            tips,
            new_solids: Mutex::new(DoubleBufferedSet::new()),
            for_retry: Mutex::new(DoubleBufferedSet::new()),
            params,
            shutdown_initiator: Mutex::new(Some(shutdown_initiator)),
            shutdown_listener,
            is_exiting: AtomicBool::new(false),
            counters,
        }
    }

    /// Spawns the propagation and retry workers.
    pub fn init(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let propagator = self.clone();
        let rescanner = self.clone();
        vec![
            thread::Builder::new().name("solidity-propagation".to_string()).spawn(move || propagator.propagation_worker()).unwrap(),
            thread::Builder::new().name("solidification-retry".to_string()).spawn(move || rescanner.retry_worker()).unwrap(),
        ]
    }

    fn propagation_worker(self: &Arc<Self>) {
        let period = self.params.propagation_period;
        while let Err(RecvTimeoutError::Timeout) = self.shutdown_listener.recv_timeout(period) {
            self.propagate_solid_transactions();
        }
        trace!("solidity propagation thread exiting");
    }

    fn retry_worker(self: &Arc<Self>) {
        let period = self.params.rescan_period;
        while let Err(RecvTimeoutError::Timeout) = self.shutdown_listener.recv_timeout(period) {
            self.rescan();
        }
        trace!("solidification retry thread exiting");
    }

    pub fn signal_exit(&self) {
        self.is_exiting.store(true, Ordering::Relaxed);
        // Dropping the initiator disconnects the listener and wakes both workers
        self.shutdown_initiator.lock().take();
    }

    pub fn shutdown(&self, wait_handles: Vec<JoinHandle<()>>) {
        self.signal_exit();
        // Wait for the workers to exit
        for handle in wait_handles {
            handle.join().unwrap();
        }
    }

    /// Queues a freshly solidified transaction for approver propagation.
    /// Never blocks on traversal work.
    pub fn add_solid_transaction(&self, hash: Hash) {
        self.new_solids.lock().insert(hash);
    }

    /// Queues a transaction with incomplete ancestry for periodic re-examination.
    pub fn add_retry_transaction(&self, hash: Hash) {
        if self.for_retry.lock().insert(hash) {
            self.counters.retries_enqueued.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Entry point for a newly stored transaction. Clears any pending fetch
    /// request for it, then attempts the cheap direct solidity check, falling
    /// back to the retry queue when the ancestry is not yet complete.
    pub fn update_transaction_status(&self, hash: Hash) -> StoreResult<()> {
        self.requester.clear(hash);
        let snapshot = self.snapshot_provider.current();
        self.update_status(hash, &snapshot)
    }

    fn update_status(&self, hash: Hash, snapshot: &Snapshot) -> StoreResult<()> {
        if !self.quick_solidify(hash, snapshot)? {
            self.add_retry_transaction(hash);
        }
        Ok(())
    }

    /// Drains the newly solid batch and quick-checks the approvers of each
    /// entry, cascading solidity across the frontier. Public so embedders and
    /// tests can drive rounds without the background workers.
    pub fn propagate_solid_transactions(&self) {
        let batch = self.new_solids.lock().swap_and_take();
        if batch.is_empty() {
            return;
        }
        let snapshot = self.snapshot_provider.current();
        for hash in batch {
            if self.is_exiting.load(Ordering::Relaxed) {
                break;
            }
            if let Err(err) = self.propagate_to_approvers(hash, &snapshot) {
                warn!("Failed to propagate solidity from {}: {}", hash, err);
            }
        }
    }

    fn propagate_to_approvers(&self, hash: Hash, snapshot: &Snapshot) -> StoreResult<()> {
        let approvers = self.tangle_store.read().approvers(hash)?;
        for approver in approvers.iter().copied() {
            if snapshot.is_solid_entry_point(approver) {
                continue;
            }
            self.update_status(approver, snapshot)?;
        }
        Ok(())
    }

    /// Attempts to solidify `hash` directly from its parents' state. Returns
    /// whether the transaction is solid once the call completes.
    ///
    /// A fresh transition persists the solid flag and height, marks the hash
    /// solid in the tips tracker and feeds it to the propagation queue. A
    /// placeholder parent fails the check without triggering a fetch; fetches
    /// are left to the bounded cascade so ancient pruned ancestry is not
    /// endlessly re-requested.
    fn quick_solidify(&self, hash: Hash, snapshot: &Snapshot) -> StoreResult<bool> {
        let entry = self.tangle_store.read().get(hash)?;
        if entry.solid {
            return Ok(true);
        }
        if entry.is_placeholder() {
            return Ok(false);
        }
        match self.height_from_parents(&entry, snapshot)? {
            Some(height) => {
                self.finalize_solid(hash, height)?;
                self.counters.quick_solidified.fetch_add(1, Ordering::Relaxed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Longest-path height over the parents, or `None` when either parent is
    /// neither a solid entry point nor solid itself.
    fn height_from_parents(&self, entry: &TxEntry, snapshot: &Snapshot) -> StoreResult<Option<u64>> {
        let mut height = 0;
        for parent in entry.parents() {
            match self.parent_height(parent, snapshot)? {
                Some(parent_height) => height = height.max(parent_height + 1),
                None => return Ok(None),
            }
        }
        Ok(Some(height))
    }

    fn parent_height(&self, parent: Hash, snapshot: &Snapshot) -> StoreResult<Option<u64>> {
        if snapshot.is_solid_entry_point(parent) {
            return Ok(Some(0));
        }
        match self.tangle_store.read().get(parent).optional()? {
            Some(entry) if entry.solid => Ok(Some(entry.height)),
            _ => Ok(None),
        }
    }

    fn finalize_solid(&self, hash: Hash, height: u64) -> StoreResult<()> {
        self.tangle_store.write().set_solid(hash, height)?;
        self.tips.mark_solid(hash);
        self.add_solid_transaction(hash);
        Ok(())
    }

    /// Drains the retry batch and runs the bounded cascade check over each
    /// entry, solidifying ancestries found complete and requesting genuinely
    /// missing ones. Public so embedders and tests can drive rounds without
    /// the background workers.
    pub fn rescan(&self) {
        let batch = self.for_retry.lock().swap_and_take();
        if batch.is_empty() {
            return;
        }
        let snapshot = self.snapshot_provider.current();
        for hash in batch {
            if self.is_exiting.load(Ordering::Relaxed) {
                break;
            }
            if let Err(err) = self.check_and_solidify(hash, &snapshot) {
                warn!("Failed to examine ancestry of {}: {}", hash, err);
            }
        }
    }

    fn check_and_solidify(&self, root: Hash, snapshot: &Snapshot) -> StoreResult<()> {
        if self.tangle_store.read().get(root).optional()?.is_some_and(|entry| entry.solid) {
            return Ok(());
        }
        let mut analyzed = snapshot.solid_entry_points().clone();
        if self.cascade_solidity_check(root, &mut analyzed, self.params.max_analyzed_transactions)? {
            self.solidify_ancestry(root, snapshot)?;
        }
        Ok(())
    }

    /// Determines whether the entire ancestry of `root` down to the entry
    /// point horizon is locally present.
    ///
    /// `analyzed` must be pre-seeded with the snapshot's solid entry points so
    /// the horizon is never descended; it accumulates every examined hash and
    /// carries the dedup state for the call. The walk gives up and reports not
    /// solid once `analyzed` grows `max_analyzed` entries beyond its seed. At
    /// most one new fetch request is issued per call: the first placeholder
    /// without a pending request stops the walk early.
    pub fn cascade_solidity_check(&self, root: Hash, analyzed: &mut TxHashSet, max_analyzed: usize) -> StoreResult<bool> {
        self.counters.cascade_checks.fetch_add(1, Ordering::Relaxed);
        let max_count = max_analyzed.saturating_add(analyzed.len());
        let mut solid = true;
        let mut queue = VecDeque::from([root]);
        while let Some(hash) = queue.pop_front() {
            if !analyzed.insert(hash) {
                continue;
            }
            if analyzed.len() >= max_count {
                return Ok(false);
            }
            match self.tangle_store.read().get(hash).optional()? {
                Some(entry) if entry.solid => {}
                Some(entry) if !entry.is_placeholder() => {
                    let [trunk, branch] = entry.parents();
                    queue.push_back(trunk);
                    queue.push_back(branch);
                }
                // A placeholder, or a hash with no entry at all, is a gap in the ancestry
                _ => {
                    solid = false;
                    if !self.requester.is_requested(hash) {
                        self.requester.request(hash);
                        break;
                    }
                }
            }
        }
        Ok(solid)
    }

    /// Marks the full ancestry of `root` solid, parents first, so every height
    /// is computed from already-final parent heights.
    fn solidify_ancestry(&self, root: Hash, snapshot: &Snapshot) -> StoreResult<()> {
        let mut visited = TxHashSet::new();
        let mut stack = vec![Visit::Enter(root)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(hash) => {
                    if snapshot.is_solid_entry_point(hash) || !visited.insert(hash) {
                        continue;
                    }
                    let entry = self.tangle_store.read().get(hash)?;
                    if entry.solid || entry.is_placeholder() {
                        continue;
                    }
                    stack.push(Visit::Exit(hash));
                    let [trunk, branch] = entry.parents();
                    stack.push(Visit::Enter(trunk));
                    stack.push(Visit::Enter(branch));
                }
                Visit::Exit(hash) => {
                    let entry = self.tangle_store.read().get(hash)?;
                    if entry.solid {
                        continue;
                    }
                    // Height can only be missing if a concurrent walk raced us
                    // to a parent, in which case that walk owns the subtree
                    if let Some(height) = self.height_from_parents(&entry, snapshot)? {
                        self.finalize_solid(hash, height)?;
                        self.counters.cascade_solidified.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn processing_counters(&self) -> &Arc<ProcessingCounters> {
        &self.counters
    }

    /// True when no freshly solidified transactions await propagation.
    pub fn is_new_solid_buffer_empty(&self) -> bool {
        self.new_solids.lock().is_empty()
    }

    /// True when no transactions await a solidification retry.
    pub fn is_retry_buffer_empty(&self) -> bool {
        self.for_retry.lock().is_empty()
    }
}
