//! Prometheus gauges for the monitor
//!
//! Each monitor owns its own [`Registry`], so several monitors (and tests)
//! can coexist in one process without name collisions.

use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::agent_metrics::AgentMetrics;
use crate::monitor::SystemMetricsSample;

/// Metrics system errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metrics encoding produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone)]
pub struct MonitorMetrics {
    registry: Registry,
    pub host_cpu_percent: Gauge,
    pub host_memory_percent: Gauge,
    pub host_disk_percent: Gauge,
    pub samples_total: IntCounter,
    pub sampling_errors_total: IntCounter,
    pub alerts_total: IntCounter,
    pub alert_callback_failures_total: IntCounter,
    pub agent_tasks_processed: GaugeVec, // cardinality: one series per agent
    pub agent_errors: GaugeVec,          // cardinality: one series per agent
}

impl MonitorMetrics {
    pub fn new(namespace: &str) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let host_cpu_percent = Gauge::with_opts(Opts::new(
            format!("{namespace}_host_cpu_percent"),
            "Most recent host CPU usage in percent",
        ))?;
        let host_memory_percent = Gauge::with_opts(Opts::new(
            format!("{namespace}_host_memory_percent"),
            "Most recent host memory usage in percent",
        ))?;
        let host_disk_percent = Gauge::with_opts(Opts::new(
            format!("{namespace}_host_disk_percent"),
            "Most recent disk usage in percent",
        ))?;
        let samples_total = IntCounter::with_opts(Opts::new(
            format!("{namespace}_monitor_samples_total"),
            "Host samples collected",
        ))?;
        let sampling_errors_total = IntCounter::with_opts(Opts::new(
            format!("{namespace}_monitor_sampling_errors_total"),
            "Host samples that failed",
        ))?;
        let alerts_total = IntCounter::with_opts(Opts::new(
            format!("{namespace}_monitor_alerts_total"),
            "Alerts raised",
        ))?;
        let alert_callback_failures_total = IntCounter::with_opts(Opts::new(
            format!("{namespace}_monitor_alert_callback_failures_total"),
            "Alert callback invocations that failed",
        ))?;
        let agent_tasks_processed = GaugeVec::new(
            Opts::new(
                format!("{namespace}_agent_tasks_processed"),
                "Tasks processed as last reported by each agent",
            ),
            &["agent_id"],
        )?;
        let agent_errors = GaugeVec::new(
            Opts::new(
                format!("{namespace}_agent_errors"),
                "Errors as last reported by each agent",
            ),
            &["agent_id"],
        )?;

        registry.register(Box::new(host_cpu_percent.clone()))?;
        registry.register(Box::new(host_memory_percent.clone()))?;
        registry.register(Box::new(host_disk_percent.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(sampling_errors_total.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(alert_callback_failures_total.clone()))?;
        registry.register(Box::new(agent_tasks_processed.clone()))?;
        registry.register(Box::new(agent_errors.clone()))?;

        Ok(Self {
            registry,
            host_cpu_percent,
            host_memory_percent,
            host_disk_percent,
            samples_total,
            sampling_errors_total,
            alerts_total,
            alert_callback_failures_total,
            agent_tasks_processed,
            agent_errors,
        })
    }

    pub(crate) fn record_sample(&self, sample: &SystemMetricsSample) {
        self.samples_total.inc();
        self.host_cpu_percent.set(sample.cpu_percent);
        self.host_memory_percent.set(sample.memory_percent);
        self.host_disk_percent.set(sample.disk_usage.percent);
    }

    pub(crate) fn record_agent(&self, metrics: &AgentMetrics) {
        let agent_id = metrics.agent_id.as_str();
        self.agent_tasks_processed
            .with_label_values(&[agent_id])
            .set(metrics.tasks_processed as f64);
        self.agent_errors
            .with_label_values(&[agent_id])
            .set(metrics.errors_count as f64);
    }

    /// Get Prometheus registry for metrics export
    pub fn prometheus_registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
