use core::fmt;
use getset::CopyGetters;
use serde::{Deserialize, Serialize};
use tracing::info;
use typed_builder::TypedBuilder;

/// Convert a raw byte count to binary megabytes (MiB).
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// The individual measurements that make up a [`MetricsSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Cpu,
    Memory,
    Disk,
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricField::Cpu => write!(f, "cpu"),
            MetricField::Memory => write!(f, "memory"),
            MetricField::Disk => write!(f, "disk"),
        }
    }
}

/// Point-in-time health of a node process and its host.
///
/// Each field is measured independently. A field whose measurement failed
/// is left at `0.0`; the error list returned next to the snapshot is the
/// only way to tell that apart from a true zero.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize, CopyGetters, TypedBuilder,
)]
#[getset(get_copy = "pub")]
pub struct MetricsSnapshot {
    /// CPU utilization of the node process. Can exceed 100% on multi-core hosts.
    #[builder(default)]
    cpu_percentage: f64,
    /// Free host memory in MiB.
    #[builder(default)]
    free_memory_mb: f64,
    /// Free space on the data directory's volume in MiB.
    #[builder(default)]
    free_space_mb: f64,
}

impl MetricsSnapshot {
    pub fn value(&self, field: MetricField) -> f64 {
        match field {
            MetricField::Cpu => self.cpu_percentage,
            MetricField::Memory => self.free_memory_mb,
            MetricField::Disk => self.free_space_mb,
        }
    }

    /// One-line summary of the snapshot. Fields listed in `failed` read `-`
    /// instead of their placeholder zero.
    pub fn summary(&self, failed: &[MetricField]) -> String {
        let show = |field: MetricField, unit: &str| {
            if failed.contains(&field) {
                "-".to_string()
            } else {
                format!("{:.2}{unit}", self.value(field))
            }
        };
        format!(
            "CPU: {}, Free Memory: {}, Free Space: {}",
            show(MetricField::Cpu, "%"),
            show(MetricField::Memory, "MB"),
            show(MetricField::Disk, "MB"),
        )
    }

    pub fn log_snapshot(&self, failed: &[MetricField]) {
        info!(failed = failed.len(), "{}", self.summary(failed));
    }
}
