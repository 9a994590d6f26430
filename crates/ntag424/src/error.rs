//! Error types for NTAG424 operations

use crate::status::StatusCode;

/// Result type for NTAG424 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for NTAG424 operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-related errors
    #[error(transparent)]
    Transport(#[from] ntag424_apdu_core::TransportError),

    /// Response-related errors (malformed responses)
    #[error(transparent)]
    Response(#[from] ntag424_apdu_core::ResponseError),

    /// The status word is not in the active command class's table
    #[error("unknown status word {sw:#06x}")]
    UnknownStatus {
        /// Raw status word as returned by the tag
        sw: u16,
    },

    /// The status word resolved to a known code outside the expected set
    #[error("unexpected status {actual:?}, expected one of {expected:?} (payload: {payload})")]
    UnexpectedStatus {
        /// Code the tag actually returned
        actual: StatusCode,
        /// Codes the operation would have accepted
        expected: Vec<StatusCode>,
        /// Hex rendering of the response payload, for diagnostics
        payload: String,
    },

    /// WriteData payload exceeds the per-frame limit
    #[error("write payload of {len} bytes exceeds the 248-byte frame limit")]
    WriteTooLong {
        /// Offending payload length
        len: usize,
    },

    /// ISO SelectFile name identifiers are limited to 16 bytes
    #[error("file name identifier of {len} bytes exceeds the 16-byte limit")]
    NameTooLong {
        /// Offending identifier length
        len: usize,
    },

    /// The echoed RndA did not match the rotated host challenge
    #[error("authentication failed: RndA echo does not match")]
    AuthenticationIntegrity,

    /// Response payload did not have the shape the operation requires
    #[error("malformed response payload: {0}")]
    Parse(&'static str),

    /// A sequence was resumed without the response it was waiting for
    #[error("command sequence resumed without a response")]
    MissingResponse,

    /// A sequence was resumed after producing its final result
    #[error("command sequence already finished")]
    SequenceExhausted,

    /// Ciphertext from the tag was not block-aligned
    #[error(transparent)]
    Unpad(#[from] cipher::block_padding::UnpadError),

    /// Plaintext handed to the cipher was not block-aligned
    #[error(transparent)]
    Pad(#[from] cipher::inout::PadError),
}
