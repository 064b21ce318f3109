// src/tasks.rs
//! In-flight operation tracking: at most one running operation per entity,
//! each cancellable.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};

type Registry = Arc<Mutex<HashMap<String, Running>>>;

static NEXT_OPERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Running {
    id: u64,
    abort: AbortHandle,
}

#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    running: Registry,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `operation` for `key` on the tokio runtime. Fails with `Conflict`
    /// while another operation for the same key is still running.
    pub fn spawn<F, T>(&self, key: &str, operation: F) -> Result<OperationHandle<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut running = lock(&self.running);
        if running.contains_key(key) {
            warn!("Operation already in flight for {}", key);
            return Err(WorkflowError::conflict(format!(
                "an operation is already in flight for {}",
                key
            )));
        }

        let id = NEXT_OPERATION.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.running);
        let owned_key = key.to_string();
        let handle = tokio::spawn(async move {
            let outcome = operation.await;
            release(&registry, &owned_key, id);
            outcome
        });

        running.insert(
            key.to_string(),
            Running {
                id,
                abort: handle.abort_handle(),
            },
        );
        debug!("Started operation {} for {}", id, key);

        Ok(OperationHandle {
            key: key.to_string(),
            id,
            handle,
            registry: Arc::clone(&self.running),
        })
    }

    /// Aborts the running operation for `key`. Returns whether one was running.
    pub fn cancel(&self, key: &str) -> bool {
        match lock(&self.running).remove(key) {
            Some(running) => {
                running.abort.abort();
                info!("Cancelled operation for {}", key);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let mut running = lock(&self.running);
        let count = running.len();
        for (_, op) in running.drain() {
            op.abort.abort();
        }
        if count > 0 {
            info!("Cancelled {} in-flight operations", count);
        }
        count
    }

    pub fn in_flight(&self, key: &str) -> bool {
        lock(&self.running).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.running).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct OperationHandle<T> {
    key: String,
    id: u64,
    handle: JoinHandle<Result<T>>,
    registry: Registry,
}

impl<T> OperationHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the operation. A cancelled task yields `Cancelled`.
    pub async fn join(self) -> Result<T> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                release(&self.registry, &self.key, self.id);
                if err.is_cancelled() {
                    Err(WorkflowError::Cancelled(self.key))
                } else {
                    Err(WorkflowError::transport(format!(
                        "operation for {} panicked: {}",
                        self.key, err
                    )))
                }
            }
        }
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, Running>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Frees `key` only if it still belongs to operation `id`; a newer operation
/// for the same key keeps its slot.
fn release(registry: &Registry, key: &str, id: u64) {
    let mut running = lock(registry);
    if running.get(key).map(|r| r.id) == Some(id) {
        running.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_operation_for_same_key_conflicts() {
        let tracker = OperationTracker::new();
        let first = tracker
            .spawn("resume-1", async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(1u8)
            })
            .unwrap();

        let second = tracker.spawn("resume-1", async { Ok(2u8) });
        assert!(matches!(second, Err(WorkflowError::Conflict(_))));

        // a different entity is unaffected
        let other = tracker.spawn("resume-2", async { Ok(3u8) }).unwrap();

        assert_eq!(first.join().await.unwrap(), 1);
        assert_eq!(other.join().await.unwrap(), 3);
        assert!(tracker.is_empty());
        assert!(tracker.spawn("resume-1", async { Ok(4u8) }).is_ok());
    }

    #[tokio::test]
    async fn test_cancel_aborts_and_frees_key() {
        let tracker = OperationTracker::new();
        let handle = tracker
            .spawn("check-1", async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .unwrap();

        assert!(tracker.in_flight("check-1"));
        assert!(tracker.cancel("check-1"));
        assert!(!tracker.cancel("check-1"));
        assert!(!tracker.in_flight("check-1"));

        let err = handle.join().await.unwrap_err();
        assert_eq!(err, WorkflowError::Cancelled("check-1".into()));
    }

    #[tokio::test]
    async fn test_failed_operation_frees_key() {
        let tracker = OperationTracker::new();
        let handle = tracker
            .spawn("session-1", async {
                Err::<(), _>(WorkflowError::transport("connection refused"))
            })
            .unwrap();
        assert!(handle.join().await.is_err());
        assert!(!tracker.in_flight("session-1"));
    }
}
