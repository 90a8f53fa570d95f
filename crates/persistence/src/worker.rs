//! Background save writer.
//!
//! The game loop hands snapshots to [`SaveWorker::submit`], which never
//! blocks: when the queue is full the snapshot is dropped, since a newer one
//! follows at the next autosave.

use crate::codec::Snapshot;
use crate::store::{SaveStore, StoreError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct SaveWorker {
    tx: mpsc::Sender<Snapshot>,
    handle: JoinHandle<u64>,
}

impl SaveWorker {
    /// Spawn the writer on the current tokio runtime. `keep` rows of history
    /// are retained per slot.
    pub fn spawn(store: SaveStore, slot: impl Into<String>, capacity: usize, keep: u32) -> Self {
        let slot = slot.into();
        let (tx, mut rx) = mpsc::channel::<Snapshot>(capacity.max(1));
        let handle = tokio::spawn(async move {
            let mut written = 0u64;
            while let Some(snapshot) = rx.recv().await {
                match store.write(&slot, &snapshot).await {
                    Ok(id) => {
                        written += 1;
                        debug!(%slot, id, "save written");
                        if let Err(e) = store.prune(&slot, keep).await {
                            warn!(error = %e, "pruning old saves failed");
                        }
                    }
                    Err(e) => warn!(error = %e, %slot, "save failed"),
                }
            }
            written
        });
        Self { tx, handle }
    }

    /// Queue a snapshot without waiting. Returns false if it was dropped.
    pub fn submit(&self, snapshot: Snapshot) -> bool {
        match self.tx.try_send(snapshot) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("save queue full, dropping snapshot");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("save worker closed, dropping snapshot");
                false
            }
        }
    }

    /// Flush queued saves and stop. Returns how many were written.
    pub async fn finish(self) -> Result<u64, StoreError> {
        drop(self.tx);
        self.handle
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))
    }
}
