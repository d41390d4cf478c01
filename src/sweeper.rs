//! Periodic reclamation of expired keys.
//!
//! Lazy expiry on access already keeps reads correct; the sweeper exists
//! to reclaim space held by expired keys that are never touched again. It
//! wakes on a fixed cadence, takes the store write lock and removes every
//! expired string entry.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::store::SharedStore;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15);

/// Spawns the background sweeper task.
pub fn start_sweeper(store: SharedStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;
            let removed = store.write().await.purge_expired();
            if removed > 0 {
                debug!(removed, "swept expired keys");
            }
        }
    })
}
