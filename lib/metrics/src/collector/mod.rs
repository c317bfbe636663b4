//! Host and process introspection capabilities.
//!
//! Each probe is a narrow async trait so collection logic can run against
//! fakes. The production implementations are backed by `/proc` and
//! `sysinfo` (CPU), `sysinfo` (memory) and `statvfs` (disk).

use crate::error::CollectionError;
use crate::pid::Pid;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub mod cpu;
pub mod disk;
pub mod memory;

pub use cpu::ProcessCpuSampler;
pub use disk::VolumeDiskProbe;
pub use memory::HostMemoryProbe;

#[async_trait]
pub trait CpuSampler: Send + Sync {
    /// Sample the CPU utilization of `pid` over `window`, as a percentage of
    /// one core (so it may exceed 100 on multi-core hosts).
    async fn sample(&self, pid: Pid, window: Duration) -> Result<f64, CollectionError>;
}

#[async_trait]
pub trait MemoryProbe: Send + Sync {
    /// Free host memory in bytes.
    async fn free_memory(&self) -> Result<u64, CollectionError>;
}

#[async_trait]
pub trait DiskProbe: Send + Sync {
    /// Free bytes on the volume that contains `path`.
    async fn free_space(&self, path: &Path) -> Result<u64, CollectionError>;
}

/// A reference-counted reference to a [`CpuSampler`].
pub type CpuSamplerRef = Arc<dyn CpuSampler>;

/// A reference-counted reference to a [`MemoryProbe`].
pub type MemoryProbeRef = Arc<dyn MemoryProbe>;

/// A reference-counted reference to a [`DiskProbe`].
pub type DiskProbeRef = Arc<dyn DiskProbe>;
