//! Bus counters
//!
//! Totals only; no per-topic labels, so the counters stay bounded no matter
//! how many topics are created.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of bus counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Messages accepted by `publish`
    pub messages_published_total: u64,
    /// Clones pushed into subscriber queues
    pub queue_deliveries_total: u64,
    /// Successful callback invocations
    pub callback_deliveries_total: u64,
    /// Callback invocations that returned an error
    pub callback_failures_total: u64,
    /// Queues removed because their receiver was dropped
    pub queues_pruned_total: u64,
    /// Messages evicted by the history cap
    pub history_evicted_total: u64,
}

#[derive(Debug, Default)]
pub(crate) struct BusMetricsCollector {
    published: AtomicU64,
    queue_deliveries: AtomicU64,
    callback_deliveries: AtomicU64,
    callback_failures: AtomicU64,
    queues_pruned: AtomicU64,
    history_evicted: AtomicU64,
}

impl BusMetricsCollector {
    pub(crate) fn record_publish(&self, delivered: usize, pruned: usize, evicted: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.queue_deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.queues_pruned.fetch_add(pruned as u64, Ordering::Relaxed);
        self.history_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_callback(&self, ok: bool) {
        let counter = if ok {
            &self.callback_deliveries
        } else {
            &self.callback_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BusStats {
        BusStats {
            messages_published_total: self.published.load(Ordering::Relaxed),
            queue_deliveries_total: self.queue_deliveries.load(Ordering::Relaxed),
            callback_deliveries_total: self.callback_deliveries.load(Ordering::Relaxed),
            callback_failures_total: self.callback_failures.load(Ordering::Relaxed),
            queues_pruned_total: self.queues_pruned.load(Ordering::Relaxed),
            history_evicted_total: self.history_evicted.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_accumulates() {
        let collector = BusMetricsCollector::default();
        collector.record_publish(3, 1, 0);
        collector.record_publish(2, 0, 1);
        collector.record_callback(true);
        collector.record_callback(false);

        let stats = collector.snapshot();
        assert_eq!(stats.messages_published_total, 2);
        assert_eq!(stats.queue_deliveries_total, 5);
        assert_eq!(stats.queues_pruned_total, 1);
        assert_eq!(stats.history_evicted_total, 1);
        assert_eq!(stats.callback_deliveries_total, 1);
        assert_eq!(stats.callback_failures_total, 1);
    }
}
