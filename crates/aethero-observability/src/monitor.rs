//! Periodic host sampling, agent metrics and alerting

use aethero_core::{AgentId, MonitorConfig};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock as StdRwLock};
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::ObservabilityError;
use crate::agent_metrics::{AgentMetrics, AgentMetricsReport, AgentStatus};
use crate::alerts::{Alert, AlertCallback, check_thresholds};
use crate::health::HealthReport;
use crate::host::{DiskUsage, HostMetricsProvider, HostSnapshot, SamplingError};
use crate::metrics::MonitorMetrics;

/// One host reading stored in the monitor's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemMetricsSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_usage: DiskUsage,
    pub timestamp: DateTime<Utc>,
}

impl SystemMetricsSample {
    pub fn from_snapshot(snapshot: HostSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            cpu_percent: snapshot.cpu_percent,
            memory_percent: snapshot.memory_percent,
            disk_usage: snapshot.disk_usage,
            timestamp,
        }
    }
}

/// Samples host resources, keeps live agent records and raises threshold alerts.
///
/// ```rust,no_run
/// use aethero_core::MonitorConfig;
/// use aethero_observability::{Monitor, SysinfoHostMetrics};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MonitorConfig::default();
/// let interval = config.interval;
/// let monitor = Arc::new(Monitor::new(Arc::new(SysinfoHostMetrics::new()), config)?);
///
/// let handle = monitor.spawn(interval);
/// // ...
/// monitor.stop();
/// handle.await?;
/// # Ok(())
/// # }
/// ```
pub struct Monitor {
    provider: Arc<dyn HostMetricsProvider>,
    config: MonitorConfig,
    samples: RwLock<Vec<SystemMetricsSample>>,
    agents: DashMap<AgentId, AgentMetrics>,
    alert_callbacks: StdRwLock<Vec<Arc<dyn AlertCallback>>>,
    last_sampling_error: StdRwLock<Option<String>>,
    running: AtomicBool,
    shutdown: Notify,
    metrics: MonitorMetrics,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .field("agents", &self.agents.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Monitor {
    pub fn new(
        provider: Arc<dyn HostMetricsProvider>,
        config: MonitorConfig,
    ) -> Result<Self, ObservabilityError> {
        Ok(Self {
            provider,
            config,
            samples: RwLock::new(Vec::new()),
            agents: DashMap::new(),
            alert_callbacks: StdRwLock::new(Vec::new()),
            last_sampling_error: StdRwLock::new(None),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
            metrics: MonitorMetrics::new("aethero")?,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Prometheus gauges owned by this monitor
    pub fn metrics(&self) -> &MonitorMetrics {
        &self.metrics
    }

    /// Register a callback invoked for every alert, in registration order
    pub fn add_alert_callback(&self, callback: Arc<dyn AlertCallback>) {
        self.alert_callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the monitor as running so a later [`Monitor::run`] keeps sampling
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Run the sampling loop while the monitor is running.
    ///
    /// The flag is owned by [`Monitor::start`] and [`Monitor::stop`]; a loop
    /// entered after `stop()` returns at once. A failed sample is logged and
    /// followed by `error_backoff` instead of `interval`. The in-flight sample
    /// always completes before the loop exits.
    pub async fn run(&self, interval: Duration) {
        self.run_loop(interval).await;
    }

    /// [`Monitor::start`], then [`Monitor::run`] on the tokio runtime
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        self.start();
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.run_loop(interval).await })
    }

    /// Ask the loop to exit; pending sleeps are interrupted
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    async fn run_loop(&self, interval: Duration) {
        info!(
            interval = ?interval,
            error_backoff = ?self.config.error_backoff,
            "Starting Aethero monitoring system"
        );

        loop {
            let stopped = self.shutdown.notified();
            tokio::pin!(stopped);
            stopped.as_mut().enable();

            if !self.is_running() {
                break;
            }

            let pause = match self.collect_metrics().await {
                Ok(_) => interval,
                Err(e) => {
                    error!(error = %e, "Error in monitoring loop");
                    self.config.error_backoff
                }
            };

            tokio::select! {
                () = tokio::time::sleep(pause) => {}
                () = &mut stopped => {}
            }
        }

        info!("Monitoring stopped");
    }

    /// Take one host sample, store it and raise alerts for exceeded thresholds.
    pub async fn collect_metrics(&self) -> Result<SystemMetricsSample, SamplingError> {
        let snapshot = match self.provider.sample().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.metrics.sampling_errors_total.inc();
                *self
                    .last_sampling_error
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(e.to_string());
                return Err(e);
            }
        };

        let sample = SystemMetricsSample::from_snapshot(snapshot, Utc::now());
        self.samples.write().await.push(sample);
        *self
            .last_sampling_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.metrics.record_sample(&sample);

        info!(
            cpu_percent = sample.cpu_percent,
            memory_percent = sample.memory_percent,
            disk_percent = sample.disk_usage.percent,
            "Collected system metrics"
        );

        let alerts = check_thresholds(&sample, &self.config.thresholds);
        if !alerts.is_empty() {
            self.raise(Alert {
                timestamp: Utc::now(),
                alerts,
                metrics: sample,
            })
            .await;
        }

        Ok(sample)
    }

    async fn raise(&self, alert: Alert) {
        self.metrics.alerts_total.inc();
        warn!(alerts = ?alert.alerts, "Alert thresholds exceeded");

        let callbacks = self
            .alert_callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for callback in callbacks {
            if let Err(e) = callback.on_alert(&alert).await {
                self.metrics.alert_callback_failures_total.inc();
                error!(error = %e, "Alert callback failed");
            }
        }
    }

    /// Replace the agent's record; fields missing from `report` take defaults.
    pub fn update_agent_metrics(&self, agent_id: &AgentId, report: AgentMetricsReport) -> AgentMetrics {
        let metrics = AgentMetrics::from_report(agent_id.clone(), report);
        self.metrics.record_agent(&metrics);
        self.agents.insert(agent_id.clone(), metrics.clone());

        info!(agent_id = %agent_id, status = %metrics.status, "Updated metrics for agent");
        metrics
    }

    /// The most recent `limit` samples, oldest first. `None` or `Some(0)` returns all.
    pub async fn get_system_metrics(&self, limit: Option<usize>) -> Vec<SystemMetricsSample> {
        let samples = self.samples.read().await;
        let skip = match limit {
            Some(limit) if limit > 0 => samples.len().saturating_sub(limit),
            _ => 0,
        };
        samples[skip..].to_vec()
    }

    pub fn get_agent_metrics(&self, agent_id: &AgentId) -> Option<AgentMetrics> {
        self.agents.get(agent_id).map(|entry| entry.value().clone())
    }

    pub fn all_agent_metrics(&self) -> HashMap<AgentId, AgentMetrics> {
        self.agents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Health derived from the latest sample and agent records
    pub async fn health(&self) -> HealthReport {
        let sampling_error = self
            .last_sampling_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let latest = self.samples.read().await.last().copied();
        let alerts = latest
            .map(|sample| check_thresholds(&sample, &self.config.thresholds))
            .unwrap_or_default();

        let mut failed_agents: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|entry| entry.value().status == AgentStatus::Failed)
            .map(|entry| entry.key().clone())
            .collect();
        failed_agents.sort();

        HealthReport::evaluate(
            sampling_error.as_deref(),
            &alerts,
            failed_agents,
            latest.map(|sample| sample.timestamp),
            self.agents.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aethero_core::{AlertThresholds, CallbackError, CallbackResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted(Mutex<VecDeque<Result<HostSnapshot, SamplingError>>>);

    impl Scripted {
        fn new(readings: Vec<Result<HostSnapshot, SamplingError>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(readings.into())))
        }
    }

    #[async_trait]
    impl HostMetricsProvider for Scripted {
        async fn sample(&self) -> Result<HostSnapshot, SamplingError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(reading(10.0)))
        }
    }

    fn reading(cpu: f64) -> HostSnapshot {
        HostSnapshot {
            cpu_percent: cpu,
            memory_percent: 20.0,
            disk_usage: DiskUsage::from_totals(100, 60),
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<Alert>>);

    #[async_trait]
    impl AlertCallback for Collect {
        async fn on_alert(&self, alert: &Alert) -> CallbackResult {
            self.0.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl AlertCallback for Failing {
        async fn on_alert(&self, _alert: &Alert) -> CallbackResult {
            Err(CallbackError::new("pager offline"))
        }
    }

    fn monitor(readings: Vec<Result<HostSnapshot, SamplingError>>) -> Monitor {
        Monitor::new(Scripted::new(readings), MonitorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_high_cpu_raises_one_alert() {
        let monitor = monitor(vec![Ok(reading(85.0)), Ok(reading(50.0))]);
        let collected = Arc::new(Collect::default());
        monitor.add_alert_callback(Arc::new(Failing));
        monitor.add_alert_callback(collected.clone());

        monitor.collect_metrics().await.unwrap();
        monitor.collect_metrics().await.unwrap();

        let alerts = collected.0.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alerts.len(), 1);
        assert!(alerts[0].alerts[0].contains("CPU"));
        assert_eq!(alerts[0].metrics.cpu_percent, 85.0);
        assert_eq!(monitor.metrics().alert_callback_failures_total.get(), 1);
    }

    #[tokio::test]
    async fn test_custom_thresholds() {
        let config = MonitorConfig {
            thresholds: AlertThresholds {
                cpu_percent: 40.0,
                ..AlertThresholds::default()
            },
            ..MonitorConfig::default()
        };
        let monitor = Monitor::new(Scripted::new(vec![Ok(reading(50.0))]), config).unwrap();
        let collected = Arc::new(Collect::default());
        monitor.add_alert_callback(collected.clone());

        monitor.collect_metrics().await.unwrap();
        assert_eq!(collected.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_and_limit() {
        let monitor = monitor(vec![Ok(reading(1.0)), Ok(reading(2.0)), Ok(reading(3.0))]);
        for _ in 0..3 {
            monitor.collect_metrics().await.unwrap();
        }

        let last_two = monitor.get_system_metrics(Some(2)).await;
        assert_eq!(
            last_two.iter().map(|s| s.cpu_percent).collect::<Vec<_>>(),
            vec![2.0, 3.0]
        );
        assert_eq!(monitor.get_system_metrics(None).await.len(), 3);
        assert_eq!(monitor.get_system_metrics(Some(0)).await.len(), 3);
    }

    #[tokio::test]
    async fn test_sampling_error_is_returned_and_not_stored() {
        let monitor = monitor(vec![Err(SamplingError::Unavailable("boom".into()))]);
        assert!(monitor.collect_metrics().await.is_err());
        assert!(monitor.get_system_metrics(None).await.is_empty());
        assert_eq!(monitor.health().await.status.as_str(), "unhealthy");

        monitor.collect_metrics().await.unwrap();
        assert!(monitor.health().await.status.is_healthy());
    }

    #[tokio::test]
    async fn test_agent_metrics_last_write_wins() {
        let monitor = monitor(Vec::new());
        let agent = AgentId::new_unchecked("agent-1");

        monitor.update_agent_metrics(
            &agent,
            AgentMetricsReport {
                tasks_processed: Some(5),
                errors_count: Some(2),
                ..AgentMetricsReport::default()
            }
            .with_status(AgentStatus::Busy),
        );
        monitor.update_agent_metrics(
            &agent,
            AgentMetricsReport::default().with_status(AgentStatus::Idle),
        );

        let metrics = monitor.get_agent_metrics(&agent).unwrap();
        assert_eq!(metrics.status, AgentStatus::Idle);
        assert_eq!(metrics.tasks_processed, 0);
        assert_eq!(metrics.errors_count, 0);
        assert_eq!(monitor.all_agent_metrics().len(), 1);
        assert!(monitor.get_agent_metrics(&AgentId::new_unchecked("other")).is_none());
    }

    #[tokio::test]
    async fn test_failed_agent_degrades_health() {
        let monitor = monitor(Vec::new());
        monitor.update_agent_metrics(
            &AgentId::new_unchecked("agent-1"),
            AgentMetricsReport::default().with_status(AgentStatus::Failed),
        );
        let report = monitor.health().await;
        assert_eq!(report.status.as_str(), "degraded");
        assert_eq!(report.failed_agents, vec![AgentId::new_unchecked("agent-1")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_uses_error_backoff_and_stops() {
        let monitor = Arc::new(monitor(vec![
            Err(SamplingError::Unavailable("boom".into())),
            Ok(reading(10.0)),
        ]));

        let handle = monitor.spawn(Duration::from_secs(60));
        assert!(monitor.is_running());

        // first sample fails immediately, second follows after the 5s back-off
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(monitor.get_system_metrics(None).await.len(), 1);

        // the next sample is a full interval away
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(monitor.get_system_metrics(None).await.len(), 1);

        monitor.stop();
        handle.await.unwrap();
        assert!(!monitor.is_running());
        assert_eq!(monitor.metrics().sampling_errors_total.get(), 1);
    }

    #[tokio::test]
    async fn test_stop_before_run_is_polled_wins() {
        let monitor = Arc::new(monitor(vec![]));
        monitor.start();

        let runner = Arc::clone(&monitor);
        let handle = tokio::spawn(async move { runner.run(Duration::from_millis(10)).await });
        monitor.stop();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop must observe the earlier stop")
            .unwrap();
        assert!(!monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_samples_after_start() {
        let monitor = Arc::new(monitor(vec![Ok(reading(10.0))]));
        monitor.start();

        let runner = Arc::clone(&monitor);
        let handle = tokio::spawn(async move { runner.run(Duration::from_secs(10)).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        monitor.stop();
        handle.await.unwrap();

        assert_eq!(monitor.get_system_metrics(None).await.len(), 1);
    }
}
