//! Debounced write-behind persistence.
//!
//! Every committed reducer transition schedules a write; transitions that
//! land inside the debounce window coalesce into a single write carrying
//! the latest snapshot. Writes are best-effort: a failure is logged and
//! superseded by the next scheduled write, and never rolls back or blocks
//! the in-memory state. Closing the handle flushes the final pending
//! snapshot before the task exits.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::engine::state::PortfolioState;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::storage::PortfolioStore;

pub struct SyncHandle {
    tx: mpsc::UnboundedSender<PortfolioState>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Queue the latest committed state for writing. Never blocks and
    /// never fails the caller; a dead task just drops the snapshot.
    pub fn schedule(&self, snapshot: PortfolioState) {
        let _ = self.tx.send(snapshot);
    }

    /// Close the queue and wait for the final flush.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

/// Spawn the write-behind task for one identity.
pub fn spawn(
    user_id: String,
    mut store: Box<dyn PortfolioStore>,
    debounce: Duration,
) -> SyncHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<PortfolioState>();

    let task = tokio::spawn(async move {
        while let Some(mut latest) = rx.recv().await {
            // Coalesce: keep swallowing newer snapshots until the queue
            // stays quiet for a full debounce window.
            loop {
                match timeout(debounce, rx.recv()).await {
                    Ok(Some(next)) => latest = next,
                    Ok(None) => {
                        // Queue closed mid-burst: flush and exit.
                        write(store.as_mut(), &user_id, &latest);
                        return;
                    }
                    Err(_elapsed) => break,
                }
            }
            write(store.as_mut(), &user_id, &latest);
        }
    });

    SyncHandle { tx, task }
}

fn write(store: &mut dyn PortfolioStore, user_id: &str, state: &PortfolioState) {
    match store.save(user_id, state) {
        Ok(()) => log(
            Level::Debug,
            Domain::Persist,
            "snapshot_written",
            obj(&[
                ("user_id", v_str(user_id)),
                ("cash", v_num(state.cash)),
                ("holdings", v_num(state.holdings.len() as f64)),
            ]),
        ),
        // Superseded by the next scheduled write; never a trade error.
        Err(err) => log(
            Level::Warn,
            Domain::Persist,
            "snapshot_write_failed",
            obj(&[
                ("user_id", v_str(user_id)),
                ("error", v_str(&err.to_string())),
            ]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingStore {
        writes: Arc<AtomicUsize>,
        last: Arc<Mutex<Option<PortfolioState>>>,
        fail: bool,
    }

    impl PortfolioStore for CountingStore {
        fn load(&mut self, _user_id: &str) -> Result<Option<PortfolioState>> {
            Ok(None)
        }

        fn save(&mut self, _user_id: &str, state: &PortfolioState) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("disk on fire"));
            }
            *self.last.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    fn state_with_cash(cash: f64) -> PortfolioState {
        PortfolioState::new(cash)
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_one_write() {
        let writes = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let store = CountingStore { writes: writes.clone(), last: last.clone(), fail: false };

        let handle = spawn("u".to_string(), Box::new(store), Duration::from_millis(40));
        for cash in [1.0, 2.0, 3.0, 4.0, 5.0] {
            handle.schedule(state_with_cash(cash));
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(last.lock().unwrap().as_ref().unwrap().cash, 5.0);

        handle.shutdown().await;
        // Nothing pending, so shutdown adds no write.
        assert_eq!(writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_snapshot() {
        let writes = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let store = CountingStore { writes: writes.clone(), last: last.clone(), fail: false };

        let handle = spawn("u".to_string(), Box::new(store), Duration::from_secs(60));
        handle.schedule(state_with_cash(7.0));
        // Debounce window is nowhere near elapsed; shutdown must still
        // flush the latest snapshot before returning.
        handle.shutdown().await;

        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(last.lock().unwrap().as_ref().unwrap().cash, 7.0);
    }

    #[tokio::test]
    async fn test_failed_write_is_superseded() {
        let writes = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let store = CountingStore { writes: writes.clone(), last: last.clone(), fail: true };

        let handle = spawn("u".to_string(), Box::new(store), Duration::from_millis(20));
        handle.schedule(state_with_cash(1.0));
        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.schedule(state_with_cash(2.0));
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Both attempts happened; neither tore down the task.
        assert_eq!(writes.load(Ordering::SeqCst), 2);
        handle.shutdown().await;
    }
}
