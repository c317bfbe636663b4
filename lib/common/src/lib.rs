//! Shared configuration and tracing setup.

pub mod config;
pub mod util;

pub use crate::config::{
    ConfigError, NodeConfig, DEFAULT_DATA_DIRECTORY, DEFAULT_PID_FILE, DEFAULT_SAMPLING_WINDOW,
    ENV_PREFIX,
};
