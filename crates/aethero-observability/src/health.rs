//! Health summary derived from the monitor's latest state

use aethero_core::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health check status levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthStatus {
    /// No alerts on the latest sample and no failed agents
    Healthy,
    /// Thresholds exceeded or an agent reported `failed`
    Degraded { reason: String },
    /// The most recent host sample could not be taken
    Unhealthy { reason: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded { .. } => "degraded",
            HealthStatus::Unhealthy { .. } => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Degraded { reason } => write!(f, "degraded: {reason}"),
            HealthStatus::Unhealthy { reason } => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// Snapshot returned by [`crate::Monitor::health`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub status: HealthStatus,
    pub last_sample_at: Option<DateTime<Utc>>,
    pub agents_tracked: usize,
    pub failed_agents: Vec<AgentId>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub(crate) fn evaluate(
        sampling_error: Option<&str>,
        alerts: &[String],
        failed_agents: Vec<AgentId>,
        last_sample_at: Option<DateTime<Utc>>,
        agents_tracked: usize,
    ) -> Self {
        let status = if let Some(error) = sampling_error {
            HealthStatus::Unhealthy {
                reason: error.to_string(),
            }
        } else {
            let mut reasons: Vec<String> = alerts.to_vec();
            if !failed_agents.is_empty() {
                let ids: Vec<&str> = failed_agents.iter().map(AgentId::as_str).collect();
                reasons.push(format!("Failed agents: {}", ids.join(", ")));
            }
            if reasons.is_empty() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded {
                    reason: reasons.join("; "),
                }
            }
        };

        Self {
            status,
            last_sample_at,
            agents_tracked,
            failed_agents,
            checked_at: Utc::now(),
        }
    }
}
