use super::MemoryProbe;
use crate::error::CollectionError;
use async_trait::async_trait;
use sysinfo::System;
use tokio::task;
use tracing::{instrument, trace};

/// Reads host memory statistics with `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostMemoryProbe;

#[async_trait]
impl MemoryProbe for HostMemoryProbe {
    #[instrument(level = "debug", skip(self))]
    async fn free_memory(&self) -> Result<u64, CollectionError> {
        let (total, free) = task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_memory();
            (system.total_memory(), system.free_memory())
        })
        .await
        .map_err(|err| CollectionError::MemoryQuery(err.to_string()))?;

        // sysinfo reports zeroes rather than failing when the host exposes
        // no memory statistics
        if total == 0 {
            return Err(CollectionError::MemoryQuery(
                "host reported no memory statistics".to_string(),
            ));
        }

        trace!(total, free, "Read host memory");
        Ok(free)
    }
}
