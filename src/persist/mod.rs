//! Coalesced, strictly ordered snapshot persistence.
//!
//! A single writer task owns the debounce state machine
//! {Idle, Pending(deadline), Writing}: `schedule_save` replaces the pending
//! snapshot and refreshes the deadline, so a burst of N mutations quiesces
//! into one write; `flush_now` forces the pending snapshot through
//! immediately. Because there is exactly one writer, writes can never
//! reorder or overlap.

pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::persist::storage::SnapshotStorage;

enum Command {
    Schedule(Vec<u8>),
    Flush(Option<Vec<u8>>, oneshot::Sender<bool>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveState {
    Idle,
    Pending,
    Writing,
}

pub struct PersistenceGateway {
    tx: mpsc::UnboundedSender<Command>,
    writer: tokio::task::JoinHandle<()>,
}

impl PersistenceGateway {
    pub fn spawn(storage: Arc<dyn SnapshotStorage>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(writer_loop(storage, debounce, rx));
        Self { tx, writer }
    }

    /// Hand the writer the latest snapshot and (re)arm the debounce timer.
    /// Never blocks; a burst of calls produces exactly one write.
    pub fn schedule_save(&self, bytes: Vec<u8>) {
        if self.tx.send(Command::Schedule(bytes)).is_err() {
            tracing::error!("Persistence writer is gone; dropping scheduled save");
        }
    }

    /// Cancel the debounce timer and write immediately. Passing `bytes`
    /// replaces any pending snapshot first. Resolves once the write (or the
    /// decision that nothing needs writing) completes.
    pub async fn flush_now(&self, bytes: Option<Vec<u8>>) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(bytes, ack_tx)).is_err() {
            return false;
        }
        ack_rx.await.unwrap_or(false)
    }

    /// Close the command lane and wait for the final drain.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Persistence writer task failed during shutdown");
        }
    }
}

async fn writer_loop(
    storage: Arc<dyn SnapshotStorage>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<Vec<u8>> = None;
    let mut deadline: Option<Instant> = None;
    let mut state = SaveState::Idle;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(bytes)) => {
                    // Refresh, never duplicate: the previous deadline is
                    // simply replaced
                    if state == SaveState::Pending {
                        tracing::trace!("Save already pending, deadline refreshed");
                    }
                    pending = Some(bytes);
                    deadline = Some(Instant::now() + debounce);
                    state = SaveState::Pending;
                }
                Some(Command::Flush(bytes, ack)) => {
                    if let Some(bytes) = bytes {
                        pending = Some(bytes);
                    }
                    deadline = None;
                    let ok = write_pending(&storage, &mut pending, &mut state);
                    let _ = ack.send(ok);
                }
                None => {
                    // Channel closed: final drain, then exit
                    write_pending(&storage, &mut pending, &mut state);
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                write_pending(&storage, &mut pending, &mut state);
            }
        }
    }
}

fn write_pending(
    storage: &Arc<dyn SnapshotStorage>,
    pending: &mut Option<Vec<u8>>,
    state: &mut SaveState,
) -> bool {
    let Some(bytes) = pending.take() else {
        *state = SaveState::Idle;
        return true;
    };

    *state = SaveState::Writing;
    tracing::trace!(state = ?state, len = bytes.len(), "Writing snapshot");
    let result = storage.write_snapshot(&bytes);
    *state = SaveState::Idle;

    match result {
        Ok(()) => {
            tracing::debug!(len = bytes.len(), "Snapshot written");
            true
        }
        Err(e) => {
            // In-memory state stays authoritative; the next scheduled save
            // will try again
            tracing::error!(error = %e, "Snapshot write failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::storage::MemoryStorage;
    use super::*;

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_schedules_coalesces_into_one_write() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        for i in 0..5u8 {
            gateway.schedule_save(vec![i]);
            settle().await;
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        assert_eq!(storage.write_count(), 0);

        tokio::time::advance(Duration::from_millis(400)).await;
        settle().await;

        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.snapshot().as_deref(), Some([4u8].as_slice()));
        gateway.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn flush_cancels_timer_and_writes_once() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        gateway.schedule_save(b"pending".to_vec());
        assert!(gateway.flush_now(None).await);
        assert_eq!(storage.write_count(), 1);

        // The cancelled timer must not fire a second write
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(storage.write_count(), 1);
        gateway.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn flush_with_no_pending_write_is_a_no_op() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        assert!(gateway.flush_now(None).await);
        assert_eq!(storage.write_count(), 0);
        gateway.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_leaves_the_lane_usable() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        storage.fail_next_write();
        assert!(!gateway.flush_now(Some(b"lost".to_vec())).await);

        assert!(gateway.flush_now(Some(b"recovered".to_vec())).await);
        assert_eq!(storage.snapshot().as_deref(), Some(b"recovered".as_slice()));
        assert_eq!(storage.write_count(), 1);
        gateway.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn writes_land_in_submission_order() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        for i in 0..3u8 {
            assert!(gateway.flush_now(Some(vec![i])).await);
        }

        assert_eq!(storage.write_count(), 3);
        assert_eq!(storage.snapshot().as_deref(), Some([2u8].as_slice()));
        gateway.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_the_pending_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let gateway = PersistenceGateway::spawn(storage.clone(), Duration::from_millis(300));

        gateway.schedule_save(b"final".to_vec());
        gateway.shutdown().await;

        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.snapshot().as_deref(), Some(b"final".as_slice()));
    }
}
