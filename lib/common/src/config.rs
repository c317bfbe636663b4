//! Configuration for the node whose health is being inspected.

use config::{Config, Environment, File, FileFormat};
use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use typed_builder::TypedBuilder;

/// Default location of the PID file written by the broker on startup.
pub const DEFAULT_PID_FILE: &str = "/var/lib/redpanda/data/pid.lock";

/// Default data directory. Its volume is probed for free disk space.
pub const DEFAULT_DATA_DIRECTORY: &str = "/var/lib/redpanda/data";

/// Default CPU sampling window. CPU utilization is a diff between two
/// snapshots of process times, taken this far apart.
pub const DEFAULT_SAMPLING_WINDOW: Duration = Duration::from_secs(1);

/// Prefix of environment variables that override file configuration
/// (e.g. `NODESTAT__PID_FILE=/run/broker.pid`).
pub const ENV_PREFIX: &str = "NODESTAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    CopyGetters,
    Setters,
    TypedBuilder,
)]
#[getset(set = "pub")]
pub struct NodeConfig {
    /// Path to a file holding the process id of the node, on a single line.
    #[getset(get = "pub")]
    #[builder(setter(into))]
    pid_file: PathBuf,
    /// Directory whose volume is measured for free space.
    #[getset(get = "pub")]
    #[builder(setter(into))]
    data_directory: PathBuf,
    /// Window over which the node's CPU utilization is sampled.
    #[getset(get_copy = "pub")]
    #[builder(default = DEFAULT_SAMPLING_WINDOW)]
    #[serde(rename = "sampling_window_ms", with = "millis")]
    sampling_window: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig::builder()
            .pid_file(DEFAULT_PID_FILE)
            .data_directory(DEFAULT_DATA_DIRECTORY)
            .build()
    }
}

impl NodeConfig {
    /// Load configuration from defaults, an optional TOML file, and
    /// `NODESTAT__*` environment variables, in increasing precedence.
    pub fn load(file_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(file_path, ENV_PREFIX)
    }

    #[instrument(level = "debug")]
    fn load_with_prefix(file_path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("pid_file", DEFAULT_PID_FILE)?
            .set_default("data_directory", DEFAULT_DATA_DIRECTORY)?
            .set_default(
                "sampling_window_ms",
                DEFAULT_SAMPLING_WINDOW.as_millis() as i64,
            )?;

        if let Some(path) = file_path {
            debug!(path = %path.display(), "Reading configuration file");
            // An explicitly named file must exist
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            );
        }

        let config = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<NodeConfig>()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pid_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("pid_file cannot be empty".to_string()));
        }

        if self.data_directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "data_directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// (De)serializes a [`Duration`] as a whole number of milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
