//! Threshold evaluation and alert fan-out

use aethero_core::{AlertThresholds, CallbackResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::monitor::SystemMetricsSample;

/// Payload handed to alert callbacks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub alerts: Vec<String>,
    pub metrics: SystemMetricsSample,
}

/// Receives every alert raised by the monitor.
///
/// Errors are logged by the monitor and never stop other callbacks.
#[async_trait]
pub trait AlertCallback: Send + Sync {
    async fn on_alert(&self, alert: &Alert) -> CallbackResult;
}

/// Messages for every metric strictly above its threshold
pub fn check_thresholds(sample: &SystemMetricsSample, thresholds: &AlertThresholds) -> Vec<String> {
    let mut alerts = Vec::new();

    if sample.cpu_percent > thresholds.cpu_percent {
        alerts.push(format!("High CPU usage: {}%", sample.cpu_percent));
    }
    if sample.memory_percent > thresholds.memory_percent {
        alerts.push(format!("High memory usage: {}%", sample.memory_percent));
    }
    if sample.disk_usage.percent > thresholds.disk_percent {
        alerts.push(format!("High disk usage: {}%", sample.disk_usage.percent));
    }

    alerts
}
