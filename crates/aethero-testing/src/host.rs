//! # Scripted Host Metrics
//!
//! A [`HostMetricsProvider`] that replays a fixed sequence of readings so
//! monitor tests can drive thresholds and sampling failures deterministically.

use aethero_observability::{DiskUsage, HostMetricsProvider, HostSnapshot, SamplingError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued readings, then repeats a fallback reading forever
#[derive(Debug, Clone)]
pub struct ScriptedHostMetrics {
    readings: Arc<Mutex<VecDeque<Result<HostSnapshot, SamplingError>>>>,
    fallback: HostSnapshot,
    call_count: Arc<Mutex<usize>>,
}

impl ScriptedHostMetrics {
    /// Create a provider that always reports an idle host
    pub fn new() -> Self {
        Self {
            readings: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Self::snapshot(10.0, 20.0, 30.0),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Build a snapshot with the given percentages on a 1000-unit disk
    pub fn snapshot(cpu_percent: f64, memory_percent: f64, disk_percent: f64) -> HostSnapshot {
        let total = 1000;
        let used = (disk_percent * total as f64 / 100.0).round() as u64;
        HostSnapshot {
            cpu_percent,
            memory_percent,
            disk_usage: DiskUsage::from_totals(total, total.saturating_sub(used)),
        }
    }

    /// Queue one successful reading
    pub fn with_reading(self, cpu_percent: f64, memory_percent: f64, disk_percent: f64) -> Self {
        self.push(Ok(Self::snapshot(cpu_percent, memory_percent, disk_percent)));
        self
    }

    /// Queue one sampling failure
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(SamplingError::Unavailable(message.into())));
        self
    }

    /// Reading returned once the queue is empty
    pub fn with_fallback(mut self, snapshot: HostSnapshot) -> Self {
        self.fallback = snapshot;
        self
    }

    /// Queue a reading after construction
    pub fn push(&self, reading: Result<HostSnapshot, SamplingError>) {
        self.readings.lock().unwrap().push_back(reading);
    }

    /// Number of samples taken so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Readings not yet consumed
    pub fn remaining(&self) -> usize {
        self.readings.lock().unwrap().len()
    }
}

impl Default for ScriptedHostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostMetricsProvider for ScriptedHostMetrics {
    async fn sample(&self) -> Result<HostSnapshot, SamplingError> {
        *self.call_count.lock().unwrap() += 1;
        self.readings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback))
    }
}
