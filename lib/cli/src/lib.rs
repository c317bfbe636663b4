use clap::{command, Args, Parser, Subcommand, ValueEnum};
use common::{ConfigError, NodeConfig};
use core::fmt;
use getset::Getters;
use std::path::PathBuf;
use std::time::Duration;

pub mod report;
pub mod status;

/// nodestat: point-in-time health of a node and its host
#[derive(Debug, Parser, Getters)]
#[command(name = "nodestat")]
#[command(about = "nodestat: CPU, memory and disk health of a running node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    #[getset(get = "pub")]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect CPU, free memory and free disk space for the node
    Status(StatusArgs),
    /// Print the process id recorded in the node's PID file
    PidFile(PidFileArgs),
}

/// Where the node configuration comes from, plus per-invocation overrides.
#[derive(Debug, Default, Clone, Args, Getters)]
#[getset(get = "pub")]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the path of the node's PID file
    #[arg(long)]
    pid_file: Option<PathBuf>,
    /// Override the data directory probed for free space
    #[arg(long = "data-dir")]
    data_directory: Option<PathBuf>,
    /// Override the CPU sampling window, in milliseconds
    #[arg(long)]
    sampling_window_ms: Option<u64>,
}

impl ConfigArgs {
    /// Load the configuration and apply the command-line overrides on top.
    pub fn resolve(&self) -> Result<NodeConfig, ConfigError> {
        let mut config = NodeConfig::load(self.config.as_deref())?;

        if let Some(pid_file) = &self.pid_file {
            config.set_pid_file(pid_file.clone());
        }
        if let Some(data_directory) = &self.data_directory {
            config.set_data_directory(data_directory.clone());
        }
        if let Some(window) = self.sampling_window_ms {
            config.set_sampling_window(Duration::from_millis(window));
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args, Getters)]
#[getset(get = "pub")]
pub struct StatusArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format of the report
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Overall deadline for the collection, in milliseconds
    #[arg(short, long, default_value_t = 5_000)]
    timeout_ms: u64,
    /// Exit with a failure status if any metric could not be collected
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args, Getters)]
#[getset(get = "pub")]
pub struct PidFileArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
