//! Host resource sampling

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Usage of the monitored filesystem, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    /// Build from total and free bytes; `percent` is 0 for an empty total
    pub fn from_totals(total: u64, free: u64) -> Self {
        let free = free.min(total);
        let used = total - free;
        Self {
            total,
            used,
            free,
            percent: percent_of(used, total),
        }
    }
}

/// One reading of host resources
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_usage: DiskUsage,
}

#[derive(Debug, Clone, Error)]
pub enum SamplingError {
    #[error("host metrics unavailable: {0}")]
    Unavailable(String),

    #[error("invalid host reading for {metric}: {value}")]
    InvalidReading { metric: &'static str, value: f64 },
}

/// Source of host readings for the monitor.
#[async_trait]
pub trait HostMetricsProvider: Send + Sync {
    async fn sample(&self) -> Result<HostSnapshot, SamplingError>;
}

pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

#[cfg(feature = "sysinfo")]
pub use self::system::SysinfoHostMetrics;

#[cfg(feature = "sysinfo")]
mod system {
    use super::{DiskUsage, HostMetricsProvider, HostSnapshot, SamplingError, percent_of};
    use async_trait::async_trait;
    use std::path::Path;
    use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, System};
    use tokio::sync::Mutex;

    /// Reads the local host through `sysinfo`.
    ///
    /// CPU usage is measured across [`MINIMUM_CPU_UPDATE_INTERVAL`], so each
    /// sample takes at least that long. Disk usage is the filesystem mounted
    /// at `/`, or the sum of all disks when there is none.
    pub struct SysinfoHostMetrics {
        system: Mutex<System>,
    }

    impl Default for SysinfoHostMetrics {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SysinfoHostMetrics {
        pub fn new() -> Self {
            Self {
                system: Mutex::new(System::new()),
            }
        }

        fn disk_usage() -> Result<DiskUsage, SamplingError> {
            let disks = Disks::new_with_refreshed_list();
            if disks.list().is_empty() {
                return Err(SamplingError::Unavailable("no disks reported".to_string()));
            }

            let root = disks
                .list()
                .iter()
                .find(|disk| disk.mount_point() == Path::new("/"));

            Ok(match root {
                Some(disk) => DiskUsage::from_totals(disk.total_space(), disk.available_space()),
                None => {
                    let (total, free) = disks.list().iter().fold((0u64, 0u64), |(t, f), d| {
                        (
                            t.saturating_add(d.total_space()),
                            f.saturating_add(d.available_space()),
                        )
                    });
                    DiskUsage::from_totals(total, free)
                }
            })
        }
    }

    #[async_trait]
    impl HostMetricsProvider for SysinfoHostMetrics {
        async fn sample(&self) -> Result<HostSnapshot, SamplingError> {
            let mut system = self.system.lock().await;

            system.refresh_cpu_usage();
            tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
            system.refresh_cpu_usage();
            let cpu_percent = f64::from(system.global_cpu_usage());
            if !cpu_percent.is_finite() {
                return Err(SamplingError::InvalidReading {
                    metric: "cpu_percent",
                    value: cpu_percent,
                });
            }

            system.refresh_memory();
            let total_memory = system.total_memory();
            if total_memory == 0 {
                return Err(SamplingError::Unavailable(
                    "total memory reported as zero".to_string(),
                ));
            }
            let memory_percent = percent_of(system.used_memory(), total_memory);
            drop(system);

            Ok(HostSnapshot {
                cpu_percent: (cpu_percent * 10.0).round() / 10.0,
                memory_percent,
                disk_usage: Self::disk_usage()?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage_from_totals() {
        let usage = DiskUsage::from_totals(1000, 250);
        assert_eq!(usage.used, 750);
        assert_eq!(usage.free, 250);
        assert_eq!(usage.percent, 75.0);
    }

    #[test]
    fn test_disk_usage_handles_empty_and_inconsistent_totals() {
        assert_eq!(DiskUsage::from_totals(0, 0).percent, 0.0);
        let clamped = DiskUsage::from_totals(100, 500);
        assert_eq!(clamped.free, 100);
        assert_eq!(clamped.used, 0);
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(2, 3), 66.7);
    }

    #[cfg(feature = "sysinfo")]
    #[tokio::test]
    async fn test_sysinfo_sample_is_in_range() {
        let provider = SysinfoHostMetrics::new();
        // Containers without disks report Unavailable; anything else must be sane.
        if let Ok(snapshot) = provider.sample().await {
            assert!((0.0..=100.0 * 1024.0).contains(&snapshot.cpu_percent));
            assert!((0.0..=100.0).contains(&snapshot.memory_percent));
            assert!((0.0..=100.0).contains(&snapshot.disk_usage.percent));
        }
    }
}
