use crate::collector::{
    CpuSamplerRef, DiskProbeRef, HostMemoryProbe, MemoryProbeRef, ProcessCpuSampler,
    VolumeDiskProbe,
};
use crate::error::CollectionError;
use crate::fs::FileSystem;
use crate::pid::read_pid;
use crate::snapshot::{bytes_to_mb, MetricsSnapshot};
use common::NodeConfig;
use core::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use typed_builder::TypedBuilder;

/// Gathers a [`MetricsSnapshot`] for a node.
///
/// The CPU, memory and disk measurements run concurrently and fail
/// independently: a failure is recorded in the returned error list and
/// leaves only its own field at zero. Collection as a whole never fails.
///
/// # Examples
///
/// ```no_run
/// # async fn run() {
/// use common::NodeConfig;
/// use metrics::{fs::OsFileSystem, MetricsCollector};
///
/// let config = NodeConfig::default();
/// let (snapshot, errors) = MetricsCollector::new()
///     .collect(&OsFileSystem, config.sampling_window(), &config)
///     .await;
/// let failed: Vec<_> = errors.iter().map(|err| err.field()).collect();
/// snapshot.log_snapshot(&failed);
/// for err in &errors {
///     eprintln!("{}: {err}", err.field());
/// }
/// # }
/// ```
#[derive(Clone, TypedBuilder)]
pub struct MetricsCollector {
    #[builder(default = Arc::new(ProcessCpuSampler) as CpuSamplerRef)]
    cpu_sampler: CpuSamplerRef,
    #[builder(default = Arc::new(HostMemoryProbe) as MemoryProbeRef)]
    memory_probe: MemoryProbeRef,
    #[builder(default = Arc::new(VolumeDiskProbe) as DiskProbeRef)]
    disk_probe: DiskProbeRef,
}

impl fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// A collector backed by the host's real process, memory and disk probes.
    pub fn new() -> Self {
        MetricsCollector::builder().build()
    }

    /// Collect a snapshot. `sampling_window` is the span over which CPU
    /// utilization is measured; `config` names the PID file and the data
    /// directory. Errors are returned in measurement order: CPU, memory, disk.
    #[instrument(
        skip(self, fs, config),
        fields(
            pid_file = %config.pid_file().display(),
            data_directory = %config.data_directory().display(),
        )
    )]
    pub async fn collect(
        &self,
        fs: &dyn FileSystem,
        sampling_window: Duration,
        config: &NodeConfig,
    ) -> (MetricsSnapshot, Vec<CollectionError>) {
        let (cpu, memory, disk) = tokio::join!(
            self.cpu_percentage(fs, config.pid_file(), sampling_window),
            self.free_memory_mb(),
            self.free_space_mb(config.data_directory()),
        );

        let mut errors = Vec::new();
        let snapshot = MetricsSnapshot::builder()
            .cpu_percentage(record(cpu, &mut errors))
            .free_memory_mb(record(memory, &mut errors))
            .free_space_mb(record(disk, &mut errors))
            .build();

        debug!(failed = errors.len(), "Finished collecting metrics");
        (snapshot, errors)
    }

    async fn cpu_percentage(
        &self,
        fs: &dyn FileSystem,
        pid_file: &Path,
        window: Duration,
    ) -> Result<f64, CollectionError> {
        let pid = read_pid(fs, pid_file).await?;
        self.cpu_sampler.sample(pid, window).await
    }

    async fn free_memory_mb(&self) -> Result<f64, CollectionError> {
        self.memory_probe.free_memory().await.map(bytes_to_mb)
    }

    async fn free_space_mb(&self, data_directory: &Path) -> Result<f64, CollectionError> {
        self.disk_probe.free_space(data_directory).await.map(bytes_to_mb)
    }
}

/// Unwrap a measurement, or record its error and fall back to zero.
fn record(result: Result<f64, CollectionError>, errors: &mut Vec<CollectionError>) -> f64 {
    result.unwrap_or_else(|err| {
        warn!(field = %err.field(), "{}", err);
        errors.push(err);
        0.0
    })
}

/// Collect a snapshot with the host's real probes.
pub async fn gather_metrics(
    fs: &dyn FileSystem,
    sampling_window: Duration,
    config: &NodeConfig,
) -> (MetricsSnapshot, Vec<CollectionError>) {
    MetricsCollector::new()
        .collect(fs, sampling_window, config)
        .await
}
