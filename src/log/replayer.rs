//! Log Replayer
//!
//! Decodes the log from its first byte, one record at a time.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;
use std::path::Path;

use crate::error::{LogVecError, Result};
use super::record::{
    MutationRecord, ERASE_TAG, FIELD_SEPARATOR, MAX_FIELD_DIGITS, PUSH_TAG, RECORD_TERMINATOR,
};

/// Reads mutation records from a log in file order
///
/// The replayer is single-pass. Once it reports end of log or an error it
/// yields nothing more.
pub struct LogReplayer<R = BufReader<File>> {
    reader: Option<R>,
    /// Bytes consumed so far
    offset: u64,
    /// Offset of the record currently being decoded
    record_start: u64,
    done: bool,
}

/// Counters gathered while draining a log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of records decoded
    pub records: u64,

    /// Number of push records
    pub pushes: u64,

    /// Number of erase records
    pub erases: u64,

    /// Sum of the content lengths of all push records
    pub content_bytes: u64,

    /// Size of the log in bytes
    pub log_bytes: u64,
}

impl ReplayStats {
    pub(crate) fn observe(&mut self, record: &MutationRecord) {
        self.records += 1;
        match record {
            MutationRecord::Push { content } => {
                self.pushes += 1;
                self.content_bytes += content.len() as u64;
            }
            MutationRecord::Erase { .. } => self.erases += 1,
        }
    }
}

impl LogReplayer<BufReader<File>> {
    /// Open a log file for replay, positioned at its first byte
    ///
    /// A missing file replays as an empty log.
    pub fn start(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Ok(Self::from_reader(BufReader::new(file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No log at {}, replaying empty log", path.display());
                Ok(Self {
                    reader: None,
                    offset: 0,
                    record_start: 0,
                    done: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl<R: BufRead> LogReplayer<R> {
    /// Replay records from any buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Some(reader),
            offset: 0,
            record_start: 0,
            done: false,
        }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record, or `None` at a clean end of log
    pub fn next_record(&mut self) -> Result<Option<MutationRecord>> {
        if self.done {
            return Ok(None);
        }

        match self.read_record() {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<MutationRecord>> {
        self.record_start = self.offset;

        let tag = match self.read_byte()? {
            Some(tag) => tag,
            None => return Ok(None),
        };

        match tag {
            ERASE_TAG => {
                self.expect_byte(FIELD_SEPARATOR, "separator")?;
                let index = self.read_decimal(RECORD_TERMINATOR, "erase index")?;
                Ok(Some(MutationRecord::Erase { index }))
            }
            PUSH_TAG => {
                self.expect_byte(FIELD_SEPARATOR, "separator")?;
                let len = self.read_decimal(FIELD_SEPARATOR, "content length")?;
                let content = self.read_content(len)?;
                self.expect_byte(RECORD_TERMINATOR, "record terminator")?;
                Ok(Some(MutationRecord::Push { content }))
            }
            other => Err(self.parse_error(format!("unknown record tag 0x{:02x}", other))),
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };

        let byte = loop {
            match reader.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        };

        if byte.is_some() {
            reader.consume(1);
            self.offset += 1;
        }
        Ok(byte)
    }

    fn expect_byte(&mut self, expected: u8, what: &str) -> Result<()> {
        match self.read_byte()? {
            Some(byte) if byte == expected => Ok(()),
            Some(byte) => Err(self.parse_error(format!(
                "expected {} {:?}, found 0x{:02x}",
                what, expected as char, byte
            ))),
            None => Err(self.parse_error(format!("log ends before {}", what))),
        }
    }

    /// Parse an unsigned decimal field ending at `terminator`
    fn read_decimal(&mut self, terminator: u8, field: &str) -> Result<usize> {
        let mut value: usize = 0;
        let mut digits = 0;

        loop {
            match self.read_byte()? {
                Some(byte) if byte == terminator => break,
                Some(byte) if byte.is_ascii_digit() => {
                    digits += 1;
                    if digits > MAX_FIELD_DIGITS {
                        return Err(self.parse_error(format!(
                            "{} is wider than {} digits",
                            field, MAX_FIELD_DIGITS
                        )));
                    }
                    value = value * 10 + usize::from(byte - b'0');
                }
                Some(byte) => {
                    return Err(self.parse_error(format!(
                        "non-digit 0x{:02x} in {}",
                        byte, field
                    )))
                }
                None => return Err(self.parse_error(format!("log ends inside {}", field))),
            }
        }

        if digits == 0 {
            return Err(self.parse_error(format!("empty {}", field)));
        }
        Ok(value)
    }

    /// Read exactly `len` content bytes, whatever they contain
    fn read_content(&mut self, len: usize) -> Result<Vec<u8>> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Err(self.parse_error("log ends before content".to_string())),
        };

        // Grow as bytes arrive; a corrupt length must not pre-allocate.
        let mut content = Vec::new();
        reader.by_ref().take(len as u64).read_to_end(&mut content)?;
        self.offset += content.len() as u64;

        if content.len() < len {
            return Err(self.parse_error(format!(
                "content truncated: declared {} bytes, found {}",
                len,
                content.len()
            )));
        }
        Ok(content)
    }

    fn parse_error(&self, reason: String) -> LogVecError {
        LogVecError::ParseError {
            offset: self.record_start,
            reason,
        }
    }
}

impl<R: BufRead> Iterator for LogReplayer<R> {
    type Item = Result<MutationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl<R: BufRead> FusedIterator for LogReplayer<R> {}

/// Drain `replayer`, handing each record to `apply` in file order
///
/// Every erase is checked against the length rebuilt so far before it is
/// applied; an erase past the end is a `ParseError` at that record.
pub fn replay_with<R, F>(replayer: &mut LogReplayer<R>, mut apply: F) -> Result<ReplayStats>
where
    R: BufRead,
    F: FnMut(MutationRecord),
{
    let mut stats = ReplayStats::default();
    let mut len: u64 = 0;

    loop {
        let record_start = replayer.offset();
        let record = match replayer.next_record()? {
            Some(record) => record,
            None => break,
        };

        match &record {
            MutationRecord::Push { .. } => len += 1,
            MutationRecord::Erase { index } => {
                if *index as u64 >= len {
                    return Err(LogVecError::ParseError {
                        offset: record_start,
                        reason: format!(
                            "erase index {} out of range for sequence of length {}",
                            index, len
                        ),
                    });
                }
                len -= 1;
            }
        }

        stats.observe(&record);
        apply(record);
    }

    stats.log_bytes = replayer.offset();
    Ok(stats)
}

/// Decode and validate a whole log without building any state
///
/// Accepts exactly the logs that opening a sequence accepts.
pub fn verify(path: &Path) -> Result<ReplayStats> {
    let mut replayer = LogReplayer::start(path)?;
    replay_with(&mut replayer, |_| {})
}
