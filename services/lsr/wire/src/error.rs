//! Wire protocol error types.

use thiserror::Error;

/// Wire protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Frame shorter than its header or declared body
    #[error("incomplete frame")]
    Incomplete,

    /// Size limit exceeded
    #[error("size limit exceeded: {0}")]
    Size(usize),

    /// Bytes left over after the declared body
    #[error("trailing bytes after frame body: {0}")]
    Trailing(usize),

    /// Body checksum mismatch
    #[error("frame checksum mismatch (expected {expected:#010x}, got {actual:#010x})")]
    Checksum {
        /// Checksum carried in the header
        expected: u32,
        /// Checksum computed over the received body
        actual: u32,
    },

    /// Packet could not be encoded as CBOR
    #[error("cbor encode failed: {0}")]
    Encode(String),

    /// Body is not a valid CBOR packet
    #[error("cbor decode failed: {0}")]
    Decode(String),
}
