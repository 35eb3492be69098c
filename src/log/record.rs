//! Mutation record definitions
//!
//! Defines the two logged mutations and their text framing.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LogVecError, Result};

/// Discriminator byte of an erase record
pub const ERASE_TAG: u8 = b'0';

/// Discriminator byte of a push record
pub const PUSH_TAG: u8 = b'1';

/// Separates the discriminator and numeric fields
pub const FIELD_SEPARATOR: u8 = b',';

/// Ends every record
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Widest decimal field (length or index) the log accepts
pub const MAX_FIELD_DIGITS: usize = 9;

const MAX_FIELD_VALUE: usize = 999_999_999;

/// A single mutation, as written to and read back from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Append `content` to the tail of the sequence
    Push { content: Vec<u8> },

    /// Remove the element at `index`, shifting later elements down
    Erase { index: usize },
}

impl MutationRecord {
    pub fn push(content: impl Into<Vec<u8>>) -> Self {
        MutationRecord::Push {
            content: content.into(),
        }
    }

    pub fn erase(index: usize) -> Self {
        MutationRecord::Erase { index }
    }

    /// Discriminator byte written first on the record's line
    pub fn tag(&self) -> u8 {
        match self {
            MutationRecord::Push { .. } => PUSH_TAG,
            MutationRecord::Erase { .. } => ERASE_TAG,
        }
    }

    /// Exact number of bytes `encode` produces
    pub fn encoded_len(&self) -> usize {
        match self {
            MutationRecord::Push { content } => {
                // tag , len , content \n
                4 + decimal_width(content.len()) + content.len()
            }
            // tag , index \n
            MutationRecord::Erase { index } => 3 + decimal_width(*index),
        }
    }

    /// Append the encoded record to `buf`
    ///
    /// Nothing is written to `buf` if a numeric field is too wide.
    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            MutationRecord::Push { content } => encode_push(content, buf),
            MutationRecord::Erase { index } => encode_erase(*index, buf),
        }
    }

    /// Encode the record into a fresh buffer
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a push record (`1,<len>,<content>\n`) into `buf`
pub fn encode_push(content: &[u8], buf: &mut BytesMut) -> Result<()> {
    check_field("content length", content.len())?;

    let len = content.len().to_string();
    buf.reserve(4 + len.len() + content.len());
    buf.put_u8(PUSH_TAG);
    buf.put_u8(FIELD_SEPARATOR);
    buf.put_slice(len.as_bytes());
    buf.put_u8(FIELD_SEPARATOR);
    buf.put_slice(content);
    buf.put_u8(RECORD_TERMINATOR);
    Ok(())
}

/// Encode an erase record (`0,<index>\n`) into `buf`
pub fn encode_erase(index: usize, buf: &mut BytesMut) -> Result<()> {
    check_field("erase index", index)?;

    let index = index.to_string();
    buf.reserve(3 + index.len());
    buf.put_u8(ERASE_TAG);
    buf.put_u8(FIELD_SEPARATOR);
    buf.put_slice(index.as_bytes());
    buf.put_u8(RECORD_TERMINATOR);
    Ok(())
}

fn check_field(field: &'static str, value: usize) -> Result<()> {
    if value > MAX_FIELD_VALUE {
        return Err(LogVecError::FieldTooWide {
            field,
            value,
            max_digits: MAX_FIELD_DIGITS,
        });
    }
    Ok(())
}

fn decimal_width(mut value: usize) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}
