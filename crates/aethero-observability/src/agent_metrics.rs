//! Per-agent live metrics records

use aethero_core::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of agent states reported to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Initialized,
    Active,
    Idle,
    Busy,
    Failed,
    Stopped,
    #[default]
    Unknown,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Initialized => "initialized",
            AgentStatus::Active => "active",
            AgentStatus::Idle => "idle",
            AgentStatus::Busy => "busy",
            AgentStatus::Failed => "failed",
            AgentStatus::Stopped => "stopped",
            AgentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update reported by an agent; absent fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentMetricsReport {
    pub status: Option<AgentStatus>,
    pub tasks_processed: Option<u64>,
    pub errors_count: Option<u64>,
    /// Seconds
    pub avg_processing_time: Option<f64>,
    pub last_active: Option<DateTime<Utc>>,
    pub memory_usage: Option<f64>,
    pub cpu_usage: Option<f64>,
}

impl AgentMetricsReport {
    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Live record for one agent. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub tasks_processed: u64,
    pub errors_count: u64,
    pub avg_processing_time: f64,
    pub last_active: DateTime<Utc>,
    pub memory_usage: f64,
    pub cpu_usage: f64,
}

impl AgentMetrics {
    pub fn from_report(agent_id: AgentId, report: AgentMetricsReport) -> Self {
        Self {
            agent_id,
            status: report.status.unwrap_or_default(),
            tasks_processed: report.tasks_processed.unwrap_or(0),
            errors_count: report.errors_count.unwrap_or(0),
            avg_processing_time: report.avg_processing_time.unwrap_or(0.0),
            last_active: report.last_active.unwrap_or_else(Utc::now),
            memory_usage: report.memory_usage.unwrap_or(0.0),
            cpu_usage: report.cpu_usage.unwrap_or(0.0),
        }
    }
}
