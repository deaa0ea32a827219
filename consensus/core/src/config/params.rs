use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default period of the solidity propagation worker
pub const DEFAULT_PROPAGATION_PERIOD: Duration = Duration::from_millis(500);

/// Default period of the solidification retry worker
pub const DEFAULT_RESCAN_PERIOD: Duration = Duration::from_millis(250);

/// Default bound on the number of transactions examined by a single ancestry check
pub const DEFAULT_MAX_ANALYZED_TRANSACTIONS: usize = 5000;

/// Default capacity of the pending transaction-request registry
pub const DEFAULT_MAX_PENDING_REQUESTS: usize = 10_000;

/// Engine parameters governing worker cadence and traversal bounds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Params {
    /// Time between solidity propagation rounds
    pub propagation_period: Duration,

    /// Time between solidification retry rounds
    pub rescan_period: Duration,

    /// Max number of transactions examined by a single ancestry check beyond the
    /// snapshot horizon seed. Once reached the check conservatively reports
    /// non-solidity
    pub max_analyzed_transactions: usize,

    /// Max number of simultaneously pending fetch requests
    pub max_pending_requests: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            propagation_period: DEFAULT_PROPAGATION_PERIOD,
            rescan_period: DEFAULT_RESCAN_PERIOD,
            max_analyzed_transactions: DEFAULT_MAX_ANALYZED_TRANSACTIONS,
            max_pending_requests: DEFAULT_MAX_PENDING_REQUESTS,
        }
    }
}
