//! Log Appender
//!
//! Handles appending encoded mutations to the log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use bytes::BytesMut;

use crate::config::SyncStrategy;
use crate::error::{LogVecError, Result};
use super::record::{encode_erase, encode_push, MutationRecord};

/// Destination of appended log bytes
///
/// Implemented for [`File`]. Other implementations exist to simulate
/// storage failures.
pub trait LogSink {
    /// Write the whole of `buf` at the end of the log
    fn write_record(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Force previously written bytes to storage
    fn sync(&mut self, strategy: SyncStrategy) -> io::Result<()>;

    /// Cut the log back to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_all(buf)?;
        self.flush()
    }

    fn sync(&mut self, strategy: SyncStrategy) -> io::Result<()> {
        match strategy {
            SyncStrategy::All => self.sync_all(),
            SyncStrategy::Data => self.sync_data(),
            SyncStrategy::Flush => Ok(()),
        }
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }
}

/// Appends records to the log, one durable write per record
///
/// A failed write or sync is rolled back to the last committed length so a
/// torn record never reaches a later replay. If the rollback fails too, the
/// appender refuses every further append.
pub struct LogAppender<S = File> {
    sink: S,
    sync_strategy: SyncStrategy,
    committed_len: u64,
    poisoned: bool,
    scratch: BytesMut,
}

impl LogAppender<File> {
    /// Open or create a log file for appending
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let committed_len = file.metadata()?.len();
        Ok(Self::with_sink(file, committed_len, sync_strategy))
    }
}

impl<S: LogSink> LogAppender<S> {
    /// Wrap a sink whose current log length is `committed_len`
    pub fn with_sink(sink: S, committed_len: u64, sync_strategy: SyncStrategy) -> Self {
        Self {
            sink,
            sync_strategy,
            committed_len,
            poisoned: false,
            scratch: BytesMut::new(),
        }
    }

    /// Append a record and force it to storage
    ///
    /// Returns the byte offset at which the record starts.
    pub fn append(&mut self, record: &MutationRecord) -> Result<u64> {
        match record {
            MutationRecord::Push { content } => self.append_push(content),
            MutationRecord::Erase { index } => self.append_erase(*index),
        }
    }

    /// Append a push record for `content`
    pub fn append_push(&mut self, content: &[u8]) -> Result<u64> {
        self.scratch.clear();
        encode_push(content, &mut self.scratch)?;
        self.commit_scratch()
    }

    /// Append an erase record for `index`
    pub fn append_erase(&mut self, index: usize) -> Result<u64> {
        self.scratch.clear();
        encode_erase(index, &mut self.scratch)?;
        self.commit_scratch()
    }

    /// Length of the log covered by successful appends
    pub fn committed_len(&self) -> u64 {
        self.committed_len
    }

    /// Whether a failed rollback has disabled this appender
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Get a reference to the underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn commit_scratch(&mut self) -> Result<u64> {
        if self.poisoned {
            return Err(LogVecError::AppendFailure(io::Error::new(
                io::ErrorKind::Other,
                "log appender disabled after a failed rollback",
            )));
        }

        let written = self
            .sink
            .write_record(&self.scratch)
            .and_then(|()| self.sink.sync(self.sync_strategy));

        match written {
            Ok(()) => {
                let offset = self.committed_len;
                self.committed_len += self.scratch.len() as u64;
                Ok(offset)
            }
            Err(err) => {
                self.roll_back();
                Err(LogVecError::AppendFailure(err))
            }
        }
    }

    fn roll_back(&mut self) {
        tracing::warn!(
            "Log append of {} bytes failed, truncating log to {} bytes",
            self.scratch.len(),
            self.committed_len
        );

        if let Err(err) = self.sink.truncate(self.committed_len) {
            tracing::error!("Log rollback failed, refusing further appends: {}", err);
            self.poisoned = true;
        }
    }
}
