//! Mutation Log Module
//!
//! Provides durability through an append-only, text-framed mutation log.
//!
//! ## Responsibilities
//! - Encode each mutation and append it before it is applied in memory
//! - Force every append to storage before reporting success
//! - Replay the log from its first byte to rebuild state
//!
//! ## File Format
//! One record per line, ASCII framing, raw content bytes:
//! ```text
//! ┌─────┬───┬───────┬───┬─────────────────┬────┐
//! │ '1' │ , │  len  │ , │ content (len B) │ \n │   push
//! └─────┴───┴───────┴───┴─────────────────┴────┘
//! ┌─────┬───┬───────┬────┐
//! │ '0' │ , │ index │ \n │                          erase
//! └─────┴───┴───────┴────┘
//! ```
//! Numeric fields are unpadded decimal of at most [`MAX_FIELD_DIGITS`]
//! digits. The content length is authoritative: commas and newlines inside
//! the content are data, not delimiters.
//!
//! The log is never compacted; it grows by one record per mutation.

mod record;
mod appender;
mod replayer;

pub use record::{
    encode_erase, encode_push, MutationRecord, ERASE_TAG, FIELD_SEPARATOR, MAX_FIELD_DIGITS,
    PUSH_TAG, RECORD_TERMINATOR,
};
pub use appender::{LogAppender, LogSink};
pub use replayer::{replay_with, verify, LogReplayer, ReplayStats};

/// Name of the log file inside the data directory
pub const LOG_FILE_NAME: &str = "log";
