//! Sequence Module
//!
//! The durable ordered container that ties the log and memory together.
//!
//! ## Responsibilities
//! - Rebuild in-memory state by replaying the whole log on open
//! - Write every mutation to the log before applying it in memory
//! - Reject invalid indices before anything is written

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{LogVecError, Result};
use crate::log::{replay_with, LogAppender, LogReplayer, LogSink, MutationRecord, ReplayStats};

/// An ordered sequence of byte records backed by an append-only log
///
/// ## Mutation discipline
///
/// `push_back` and `erase` append a record to the log and force it to
/// storage first. Memory changes only after that append succeeded, so the
/// in-memory state is never ahead of the log.
///
/// ## Limitations
///
/// The log is never compacted. Every mutation, including erases, grows it.
/// At most one `Sequence` may be open on a directory at a time; nothing
/// enforces this across processes.
pub struct Sequence<S = File> {
    config: Config,
    log_path: PathBuf,
    items: Vec<Vec<u8>>,
    appender: LogAppender<S>,
}

impl Sequence<File> {
    /// Open the sequence stored in `config.data_dir`
    ///
    /// The directory must exist. The log inside it is created if missing,
    /// then replayed in full before this returns.
    pub fn open(config: Config) -> Result<Self> {
        Self::check_data_dir(&config)?;

        let log_path = config.log_path();
        let appender = LogAppender::open(&log_path, config.sync_strategy)?;
        Self::from_appender(config, log_path, appender)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }
}

impl<S: LogSink> Sequence<S> {
    /// Replay the log in `config.data_dir`, then append through `sink`
    ///
    /// `sink` must write to the end of that same log.
    pub fn open_with_sink(config: Config, sink: S) -> Result<Self> {
        Self::check_data_dir(&config)?;

        let log_path = config.log_path();
        let committed_len = match std::fs::metadata(&log_path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };
        let appender = LogAppender::with_sink(sink, committed_len, config.sync_strategy);
        Self::from_appender(config, log_path, appender)
    }

    fn check_data_dir(config: &Config) -> Result<()> {
        if !config.data_dir.is_dir() {
            return Err(LogVecError::Config(format!(
                "data directory {} does not exist",
                config.data_dir.display()
            )));
        }
        Ok(())
    }

    fn from_appender(config: Config, log_path: PathBuf, appender: LogAppender<S>) -> Result<Self> {
        tracing::debug!("Replaying log {}", log_path.display());

        let (items, stats) = Self::replay(&log_path)?;

        tracing::info!(
            "Replayed {} records ({} pushes, {} erases, {} bytes) from {}, {} elements",
            stats.records,
            stats.pushes,
            stats.erases,
            stats.log_bytes,
            log_path.display(),
            items.len()
        );

        Ok(Self {
            config,
            log_path,
            items,
            appender,
        })
    }

    /// Apply every record in the log to an empty sequence
    fn replay(log_path: &Path) -> Result<(Vec<Vec<u8>>, ReplayStats)> {
        let mut replayer = LogReplayer::start(log_path)?;
        let mut items: Vec<Vec<u8>> = Vec::new();

        let stats = replay_with(&mut replayer, |record| match record {
            MutationRecord::Push { content } => items.push(content),
            MutationRecord::Erase { index } => {
                items.remove(index);
            }
        })?;

        Ok((items, stats))
    }

    /// Append `value` to the end of the sequence
    ///
    /// Fails with `AppendFailure` if the log write fails, or with
    /// `FieldTooWide` (before anything is written) if `value` is longer than
    /// the log's length field can express. Memory is unchanged on any error.
    ///
    /// Steps:
    /// 1. Write the push record to the log (durability point)
    /// 2. Push to memory
    pub fn push_back(&mut self, value: impl Into<Vec<u8>>) -> Result<()> {
        let value = value.into();
        let offset = self.appender.append_push(&value)?;
        tracing::trace!("Push of {} bytes committed at offset {}", value.len(), offset);

        self.items.push(value);
        Ok(())
    }

    /// Get the element at `index`
    pub fn at(&self, index: usize) -> Result<&[u8]> {
        self.get(index).ok_or(LogVecError::OutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Get the element at `index`, or `None` if out of range
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.items.get(index).map(Vec::as_slice)
    }

    /// Remove the element at `index`, shifting later elements down by one
    ///
    /// Fails with `OutOfRange` or `AppendFailure`; memory is unchanged on any
    /// error.
    ///
    /// Steps:
    /// 1. Validate the index (nothing is written if it is out of range)
    /// 2. Write the erase record to the log (durability point)
    /// 3. Remove from memory
    pub fn erase(&mut self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(LogVecError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let offset = self.appender.append_erase(index)?;
        tracing::trace!("Erase of index {} committed at offset {}", index, offset);

        self.items.remove(index);
        Ok(())
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the elements in order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.items.iter().map(Vec::as_slice)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the log file path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Bytes of the log covered by committed records
    pub fn log_len(&self) -> u64 {
        self.appender.committed_len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
