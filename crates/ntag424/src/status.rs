//! Status-word classification per command class
//!
//! The chip answers proprietary commands with 0x91xx status words and ISO
//! 7816 commands with the standard ISO set. Each class has its own table;
//! classification never mixes them.

use ntag424_apdu_core::split_response;
use tracing::trace;

use crate::constants::{CLA_ISO, CLA_PROPRIETARY};
use crate::error::{Error, Result};

/// Command class a frame (and its status words) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// The chip's proprietary command set (CLA = 0x90)
    Proprietary,
    /// The ISO 7816 command set (CLA = 0x00)
    Iso7816,
}

impl CommandClass {
    /// The CLA byte used by frames of this class
    pub const fn cla(self) -> u8 {
        match self {
            Self::Proprietary => CLA_PROPRIETARY,
            Self::Iso7816 => CLA_ISO,
        }
    }
}

/// Symbolic outcome of a command, resolved from a (class, status word) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Successful operation
    OperationOk,
    /// Chained command: more frames follow
    AdditionalFrame,
    /// Command code not supported
    IllegalCommandCode,
    /// CRC or MAC does not match, or invalid padding
    IntegrityError,
    /// Invalid key number specified
    NoSuchKey,
    /// Length of command string invalid
    LengthError,
    /// Current configuration / status does not allow the command
    PermissionDenied,
    /// Value of the parameter(s) invalid
    ParameterError,
    /// Currently not allowed to authenticate; keep trying until full delay
    /// is spent
    AuthenticationDelay,
    /// Current authentication status does not allow the requested command
    AuthenticationError,
    /// Attempt to read/write data from/to beyond the file's/record's limits
    BoundaryError,
    /// Previous command was not fully completed
    CommandAborted,
    /// Specified file number does not exist
    FileNotFound,
    /// Failure when reading or writing to non-volatile memory
    MemoryError,
    /// Wrong length of the Lc field
    WrongLength,
    /// Security status not satisfied
    SecStatusUnsatisfied,
    /// Conditions of use not satisfied
    CondUseNotSatisfied,
    /// Incorrect parameters in the command data field
    IncorrectCmdParams,
    /// Incorrect P1-P2 parameters
    IncorrectParamsP1P2,
    /// Lc inconsistent with P1-P2
    LcInconsistentP1P2,
    /// Wrong Le field; SW2 encodes the available length
    WrongLeField,
    /// Instruction not supported or invalid
    InvalidInstruction,
    /// Class not supported
    ClassNotSupported,
    /// Status word absent from the class's table
    Unknown(u16),
}

/// Resolve a status word against the table for the given command class
///
/// Words absent from the table map to [`StatusCode::Unknown`], with one
/// exception: SW1 = 0x6C with a nonzero SW2 is the short-response retry
/// convention and always resolves to [`StatusCode::WrongLeField`].
pub const fn classify(class: CommandClass, sw: u16) -> StatusCode {
    let code = match class {
        CommandClass::Proprietary => match sw {
            0x9100 => Some(StatusCode::OperationOk),
            0x911C => Some(StatusCode::IllegalCommandCode),
            0x911E => Some(StatusCode::IntegrityError),
            0x9140 => Some(StatusCode::NoSuchKey),
            0x917E => Some(StatusCode::LengthError),
            0x919D => Some(StatusCode::PermissionDenied),
            0x919E => Some(StatusCode::ParameterError),
            0x91AD => Some(StatusCode::AuthenticationDelay),
            0x91AE => Some(StatusCode::AuthenticationError),
            0x91AF => Some(StatusCode::AdditionalFrame),
            0x91BE => Some(StatusCode::BoundaryError),
            0x91CA => Some(StatusCode::CommandAborted),
            0x91EE => Some(StatusCode::MemoryError),
            0x91F0 => Some(StatusCode::FileNotFound),
            _ => None,
        },
        CommandClass::Iso7816 => match sw {
            0x9000 => Some(StatusCode::OperationOk),
            0x6700 => Some(StatusCode::WrongLength),
            0x6982 => Some(StatusCode::SecStatusUnsatisfied),
            0x6985 => Some(StatusCode::CondUseNotSatisfied),
            0x6A80 => Some(StatusCode::IncorrectCmdParams),
            0x6A82 => Some(StatusCode::FileNotFound),
            0x6A86 => Some(StatusCode::IncorrectParamsP1P2),
            0x6A87 => Some(StatusCode::LcInconsistentP1P2),
            0x6C00 => Some(StatusCode::WrongLeField),
            0x6D00 => Some(StatusCode::InvalidInstruction),
            0x6E00 => Some(StatusCode::ClassNotSupported),
            _ => None,
        },
    };

    match code {
        Some(code) => code,
        None if sw >> 8 == 0x6C && sw & 0xFF != 0 => StatusCode::WrongLeField,
        None => StatusCode::Unknown(sw),
    }
}

/// Split a raw response, classify its status word and validate it against
/// the caller's expected set
///
/// On success returns the resolved code and the payload. An unknown status
/// word and a known-but-unexpected one fail with distinct errors so callers
/// can tell a protocol surprise from a chip refusal.
pub fn decode_response<'a>(
    class: CommandClass,
    bytes: &'a [u8],
    expected: &[StatusCode],
) -> Result<(StatusCode, &'a [u8])> {
    let (status, payload) = split_response(bytes)?;
    let code = classify(class, status.to_u16());

    trace!(status = %status, code = ?code, payload_len = payload.len(), "decoded response");

    if !expected.contains(&code) {
        if let StatusCode::Unknown(sw) = code {
            return Err(Error::UnknownStatus { sw });
        }
        return Err(Error::UnexpectedStatus {
            actual: code,
            expected: expected.to_vec(),
            payload: hex::encode(payload),
        });
    }

    Ok((code, payload))
}
