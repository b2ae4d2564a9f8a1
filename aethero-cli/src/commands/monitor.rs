//! `aethero monitor`: sample the local host and report alerts

use aethero::{
    Alert, AlertCallback, CallbackError, CallbackResult, HostMetricsProvider, Monitor,
    MonitorConfig,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::CliError;

/// Prints each alert as one JSON line
struct PrintAlerts;

#[async_trait]
impl AlertCallback for PrintAlerts {
    async fn on_alert(&self, alert: &Alert) -> CallbackResult {
        let line = serde_json::to_string(&json!({"alert": alert}))
            .map_err(|e| CallbackError::new(e.to_string()))?;
        println!("{line}");
        Ok(())
    }
}

/// Take `samples` readings `interval` apart, printing each one, and return
/// the final health report.
pub async fn run_monitor(
    provider: Arc<dyn HostMetricsProvider>,
    config: MonitorConfig,
    samples: usize,
    interval: Duration,
) -> Result<Value, CliError> {
    let monitor = Monitor::new(provider, config)?;
    monitor.add_alert_callback(Arc::new(PrintAlerts));

    for index in 0..samples {
        if index > 0 {
            tokio::time::sleep(interval).await;
        }
        match monitor.collect_metrics().await {
            Ok(sample) => println!("{}", serde_json::to_string(&json!({"sample": sample}))?),
            Err(e) => warn!(error = %e, "Skipping failed host sample"),
        }
    }

    Ok(serde_json::to_value(monitor.health().await)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aethero::testing::ScriptedHostMetrics;

    #[tokio::test(start_paused = true)]
    async fn test_monitor_reports_degraded_health_on_alert() {
        let host = ScriptedHostMetrics::new()
            .with_reading(20.0, 30.0, 40.0)
            .with_reading(95.0, 30.0, 40.0);

        let health = run_monitor(Arc::new(host.clone()), MonitorConfig::default(), 2, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(host.call_count(), 2);
        assert_eq!(health["status"], "degraded");
        assert_eq!(health["reason"], "High CPU usage: 95%");
    }

    #[tokio::test]
    async fn test_sampling_failure_is_unhealthy() {
        let host = ScriptedHostMetrics::new().with_failure("no sensors");
        let health = run_monitor(Arc::new(host), MonitorConfig::default(), 1, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(health["status"], "unhealthy");
    }
}
