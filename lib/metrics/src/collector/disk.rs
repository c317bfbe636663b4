use super::DiskProbe;
use crate::error::CollectionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{instrument, trace};

/// Reads free space of the volume holding a path.
///
/// On unix this is `statvfs(2)` on the path itself, so any directory works
/// regardless of how the volume is mounted. Elsewhere the mounted disk with
/// the longest mount point containing the path is used.
#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeDiskProbe;

#[cfg(unix)]
fn free_bytes(path: &Path) -> Result<u64, String> {
    let stat = nix::sys::statvfs::statvfs(path).map_err(|errno| errno.to_string())?;
    Ok(u64::from(stat.blocks_free()).saturating_mul(u64::from(stat.fragment_size())))
}

#[cfg(not(unix))]
fn free_bytes(path: &Path) -> Result<u64, String> {
    use sysinfo::Disks;

    let path = std::fs::canonicalize(path).map_err(|err| err.to_string())?;
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
        .ok_or_else(|| format!("no mounted volume contains `{}`", path.display()))
}

#[async_trait]
impl DiskProbe for VolumeDiskProbe {
    #[instrument(level = "debug", skip(self))]
    async fn free_space(&self, path: &Path) -> Result<u64, CollectionError> {
        let owned: PathBuf = path.to_path_buf();
        let free = task::spawn_blocking(move || free_bytes(&owned))
            .await
            .map_err(|err| err.to_string())
            .and_then(|result| result)
            .map_err(|reason| CollectionError::DiskQuery {
                path: path.to_path_buf(),
                reason,
            })?;

        trace!(path = %path.display(), free, "Read volume free space");
        Ok(free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_free_space_of_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let free = VolumeDiskProbe.free_space(dir.path()).await.unwrap();
        assert!(free > 0);
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not").join("created");

        let err = VolumeDiskProbe.free_space(&missing).await.unwrap_err();
        match err {
            CollectionError::DiskQuery { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
