//! # logvec
//!
//! A durable ordered sequence of variable-length byte records:
//! - Every mutation is appended to a log before it touches memory
//! - State is rebuilt on open by replaying the log from its first byte
//! - Binary-safe records in a simple line-framed text format
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Sequence                            │
//! │          push_back / at / erase / len (single owner)        │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!     open       │                              │  mutate
//!                ▼                              ▼
//!        ┌───────────────┐              ┌───────────────┐
//!        │  LogReplayer  │              │  LogAppender  │
//!        │ (replay all)  │              │ (write+sync)  │
//!        └───────┬───────┘              └───────┬───────┘
//!                │                              │
//!                └──────────────┬───────────────┘
//!                               ▼
//!                       ┌───────────────┐
//!                       │ {data_dir}/log│
//!                       │ (append-only) │
//!                       └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use logvec::Sequence;
//!
//! # fn main() -> logvec::Result<()> {
//! let mut seq = Sequence::open_path("./data".as_ref())?;
//! seq.push_back("foo")?;
//! assert_eq!(seq.at(0)?, b"foo");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod sequence;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogVecError, Result};
pub use config::{Config, SyncStrategy};
pub use sequence::Sequence;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of logvec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
