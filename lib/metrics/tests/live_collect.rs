//! Collection against the real host, using this test process as the node.

use common::NodeConfig;
use metrics::fs::OsFileSystem;
use metrics::{gather_metrics, CollectionError, MetricField};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const WINDOW: Duration = Duration::from_millis(250);

fn setup(pid_contents: &str) -> (NodeConfig, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let pid_file = temp_dir.path().join("pid.lock");
    let data_directory = temp_dir.path().join("data");
    fs::write(&pid_file, pid_contents).unwrap();
    fs::create_dir(&data_directory).unwrap();

    let config = NodeConfig::builder()
        .pid_file(pid_file)
        .data_directory(data_directory)
        .sampling_window(WINDOW)
        .build();
    (config, temp_dir)
}

#[tokio::test]
async fn collects_all_fields_for_live_process() {
    let (config, _temp_dir) = setup(&format!("{}\n", std::process::id()));

    let (snapshot, errors) = gather_metrics(&OsFileSystem, config.sampling_window(), &config).await;

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert!(snapshot.cpu_percentage() >= 0.0);
    assert!(snapshot.free_memory_mb() > 0.0);
    assert!(snapshot.free_space_mb() > 0.0);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn busy_process_reports_its_load() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let (config, _temp_dir) = setup(&std::process::id().to_string());
    let stop = Arc::new(AtomicBool::new(false));
    let spinner = std::thread::spawn({
        let stop = stop.clone();
        move || {
            let mut spins = 0u64;
            while !stop.load(Ordering::Relaxed) {
                spins = std::hint::black_box(spins.wrapping_add(1));
            }
            spins
        }
    });

    let (snapshot, errors) =
        gather_metrics(&OsFileSystem, Duration::from_millis(500), &config).await;
    stop.store(true, Ordering::Relaxed);
    spinner.join().unwrap();

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert!(
        snapshot.cpu_percentage() > 25.0,
        "busy process sampled at {}%",
        snapshot.cpu_percentage()
    );
}

#[tokio::test]
async fn out_of_range_pid_only_fails_cpu() {
    let (config, _temp_dir) = setup("-1\n");

    let (snapshot, errors) = gather_metrics(&OsFileSystem, WINDOW, &config).await;

    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(matches!(errors[0], CollectionError::ProcessNotFound(-1)));
    assert!(snapshot.free_memory_mb() > 0.0);
    assert!(snapshot.free_space_mb() > 0.0);
}

#[tokio::test]
async fn dead_process_only_fails_cpu() {
    let (config, _temp_dir) = setup(&(u32::MAX - 1).to_string());

    let (snapshot, errors) = gather_metrics(&OsFileSystem, WINDOW, &config).await;

    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(matches!(errors[0], CollectionError::ProcessNotFound(_)));
    assert_eq!(snapshot.cpu_percentage(), 0.0);
    assert!(snapshot.free_memory_mb() > 0.0);
    assert!(snapshot.free_space_mb() > 0.0);
}

#[tokio::test]
async fn missing_data_directory_only_fails_disk() {
    let (mut config, temp_dir) = setup(&std::process::id().to_string());
    config.set_data_directory(temp_dir.path().join("missing"));

    let (snapshot, errors) = gather_metrics(&OsFileSystem, WINDOW, &config).await;

    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].field(), MetricField::Disk);
    assert!(snapshot.free_memory_mb() > 0.0);
    assert_eq!(snapshot.free_space_mb(), 0.0);
}

#[tokio::test]
async fn missing_pid_file_only_fails_cpu() {
    let (mut config, _temp_dir) = setup("");
    config.set_pid_file(Path::new("/definitely/not/here.pid").to_path_buf());

    let (snapshot, errors) = gather_metrics(&OsFileSystem, WINDOW, &config).await;

    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(matches!(errors[0], CollectionError::PidFile { .. }));
    assert!(snapshot.free_space_mb() > 0.0);
}

#[tokio::test]
async fn repeated_collection_never_fails() {
    let (config, _temp_dir) = setup(&std::process::id().to_string());

    for _ in 0..2 {
        let (_, errors) = gather_metrics(&OsFileSystem, WINDOW, &config).await;
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }
}
