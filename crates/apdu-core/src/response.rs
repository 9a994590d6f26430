//! APDU response handling
//!
//! Every response from the card terminates in a two-byte status word
//! (SW1, SW2); everything before it is the payload. This module provides the
//! [`StatusWord`] type and [`split_response`], which separates the two.

use std::fmt;

use thiserror::Error;

/// Status Word (SW1-SW2) from an APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create from a u16 value (SW1 | SW2)
    pub const fn from_u16(status: u16) -> Self {
        Self {
            sw1: (status >> 8) as u8,
            sw2: status as u8,
        }
    }

    /// Convert to a u16 value (SW1 | SW2)
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from(tuple: (u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

/// Error for APDU response processing
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Incomplete response (fewer than 2 bytes)
    #[error("incomplete response: {0} bytes")]
    Incomplete(usize),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(&'static str),
}

/// Split a raw APDU response into its status word and payload
///
/// # Errors
/// Returns [`ResponseError::Incomplete`] if the data is too short to contain
/// a status word.
pub fn split_response(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    let len = data.len();
    if len < 2 {
        return Err(ResponseError::Incomplete(len));
    }

    let status = StatusWord::new(data[len - 2], data[len - 1]);
    Ok((status, &data[..len - 2]))
}
