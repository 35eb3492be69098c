//! Configuration for logvec
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::log::LOG_FILE_NAME;

/// Main configuration for a logvec sequence
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the log. Must already exist when a sequence is opened.
    /// Internal structure:
    ///   {data_dir}/
    ///     └── log          (append-only mutation log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// How each append is forced to storage before it counts as committed
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy, applied after every append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync data and metadata (`File::sync_all`)
    All,

    /// fdatasync (`File::sync_data`)
    Data,

    /// Hand the bytes to the OS and return. Survives a process crash but
    /// not a power loss; meant for benchmarks and bulk tests.
    Flush,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./logvec_data"),
            sync_strategy: SyncStrategy::Data,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the log file inside `data_dir`
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
