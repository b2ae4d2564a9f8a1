//! Aethero Observability
//!
//! Host and agent telemetry for the Aethero runtime: the [`Monitor`] polls a
//! [`HostMetricsProvider`], keeps live per-agent records, raises threshold
//! alerts through registered callbacks and exports Prometheus gauges from a
//! per-instance registry. [`trace::init_tracing`] installs the structured
//! logging subscriber used by the binaries.

pub mod agent_metrics;
pub mod alerts;
pub mod health;
pub mod host;
pub mod metrics;
pub mod monitor;
pub mod trace;

pub use agent_metrics::{AgentMetrics, AgentMetricsReport, AgentStatus};
pub use alerts::{Alert, AlertCallback, check_thresholds};
pub use health::{HealthReport, HealthStatus};
#[cfg(feature = "sysinfo")]
pub use host::SysinfoHostMetrics;
pub use host::{DiskUsage, HostMetricsProvider, HostSnapshot, SamplingError};
pub use metrics::{MetricsError, MonitorMetrics};
pub use monitor::{Monitor, SystemMetricsSample};
pub use trace::init_tracing;

/// Observability framework errors
#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] metrics::MetricsError),
}
