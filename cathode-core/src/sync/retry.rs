//! Adaptive retry scheduling for batch sync jobs.
//!
//! One observable signal, the batch failure rate, picks between three
//! treatments: nothing to do, retry only the failed items with exponential
//! backoff, or snooze the whole batch because the upstream itself looks
//! unhealthy. Error types are never inspected.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Failure rate at or above which the whole batch snoozes.
    pub failure_threshold: f32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Attempts before a batch is dropped.
    pub max_attempts: u16,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 0.8,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision<K> {
    /// Every item succeeded; nothing is rescheduled.
    Done,
    /// Retry budget spent; the host logs and drops the batch.
    Exhausted,
    /// Failure rate crossed the threshold: a systemic upstream condition,
    /// not isolated bad items. The host re-enqueues the entire original
    /// batch after a linearly growing cooldown, succeeded items included
    /// (safe, since every write is an idempotent upsert).
    Snooze { delay: Duration },
    /// Isolated failures: re-enqueue exactly these keys after exponential
    /// backoff. Successes are never retried.
    Retry { failed: Vec<K>, delay: Duration },
}

/// Classify the outcome of one batch attempt.
///
/// `attempt` is 1-based: the first run of a batch evaluates with
/// `attempt = 1`, so a partial retry waits exactly `base_delay` and doubles
/// from there.
pub fn evaluate<K>(
    policy: &RetryPolicy,
    attempt: u16,
    total: usize,
    failed: Vec<K>,
) -> RetryDecision<K> {
    if total == 0 || failed.is_empty() {
        return RetryDecision::Done;
    }
    if attempt >= policy.max_attempts {
        return RetryDecision::Exhausted;
    }
    let attempt = attempt.max(1);

    let failure_rate = failed.len() as f32 / total as f32;
    if failure_rate >= policy.failure_threshold {
        let delay = policy
            .base_delay
            .saturating_mul(u32::from(attempt))
            .min(policy.max_delay);
        RetryDecision::Snooze { delay }
    } else {
        // Shift capped well below overflow; max_delay clamps long before.
        let exponent = u32::from(attempt - 1).min(16);
        let delay = policy
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(policy.max_delay);
        RetryDecision::Retry { failed, delay }
    }
}
