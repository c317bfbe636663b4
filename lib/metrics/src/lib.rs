//! Point-in-time health metrics for a node process and its host: the
//! process's CPU utilization, free host memory, and free space on the
//! node's data directory.

pub mod collector;
pub mod error;
pub mod fs;
pub mod gather;
pub mod pid;
pub mod snapshot;

pub use error::{CollectionError, PidFileError};
pub use gather::{gather_metrics, MetricsCollector};
pub use pid::Pid;
pub use snapshot::{bytes_to_mb, MetricField, MetricsSnapshot};
