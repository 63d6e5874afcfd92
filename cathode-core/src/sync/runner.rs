//! Bounded-concurrency fan-out for per-item sync operations.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::Result;

enum Outcome {
    Ok,
    Failed,
    TimedOut,
}

/// Aggregate of one bounded fan-out. Completion order across the fan-out is
/// unspecified; callers get counts plus the explicit failed-key list only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport<K> {
    pub succeeded: usize,
    pub failed: usize,
    pub failed_keys: Vec<K>,
}

impl<K> RunReport<K> {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Run `op` over `items` with at most `limit` operations in flight and a
/// per-operation timeout.
///
/// Each item is keyed through `key_of` before it is handed to `op`; failed
/// and timed-out keys come back in the report for the retry scheduler. A
/// timed-out operation is abandoned at the deadline (its future is dropped,
/// never awaited further) and does not block collection of the sibling
/// operations. The semaphore is acquired inside the task, so the timeout
/// covers only the operation itself, not queueing.
pub async fn run_bounded<I, K, Op, Fut, T>(
    items: Vec<I>,
    limit: usize,
    timeout: Duration,
    key_of: impl Fn(&I) -> K,
    op: Op,
) -> RunReport<K>
where
    I: Send + 'static,
    K: Clone + fmt::Display + Send + 'static,
    Op: Fn(I) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let limit = limit.max(1);
    let permits = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();
    let mut keys_by_task = HashMap::new();

    for item in items {
        let key = key_of(&item);
        let task_key = key.clone();
        let permits = Arc::clone(&permits);
        let op = op.clone();
        let handle = tasks.spawn(async move {
            let Ok(_permit) = permits.acquire().await else {
                return (task_key, Outcome::Failed);
            };
            match tokio::time::timeout(timeout, op(item)).await {
                Ok(Ok(_)) => (task_key, Outcome::Ok),
                Ok(Err(error)) => {
                    warn!(item = %task_key, %error, "sync operation failed");
                    (task_key, Outcome::Failed)
                }
                Err(_) => {
                    warn!(
                        item = %task_key,
                        timeout_secs = timeout.as_secs(),
                        "sync operation timed out; abandoning"
                    );
                    (task_key, Outcome::TimedOut)
                }
            }
        });
        keys_by_task.insert(handle.id(), key);
    }

    let mut report = RunReport {
        succeeded: 0,
        failed: 0,
        failed_keys: Vec::new(),
    };
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (_, Outcome::Ok))) => report.succeeded += 1,
            Ok((_, (key, _))) => {
                report.failed += 1;
                report.failed_keys.push(key);
            }
            Err(join_error) => {
                // A panicked operation still counts against its key.
                warn!(%join_error, "sync operation panicked");
                report.failed += 1;
                if let Some(key) = keys_by_task.get(&join_error.id()) {
                    report.failed_keys.push(key.clone());
                }
            }
        }
    }

    report
}
