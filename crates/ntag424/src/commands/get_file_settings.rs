//! GetFileSettings: read a file's security configuration

use bytes::Bytes;
use ntag424_apdu_core::Command;

use crate::constants::{CLA_PROPRIETARY, ins};
use crate::error::{Error, Result};
use crate::file_settings::FileSettings;
use crate::sequence::{CommandSequence, Step};
use crate::status::{CommandClass, StatusCode, decode_response};

/// The GetFileSettings command sequence, a single exchange
#[derive(Debug)]
pub struct GetFileSettings {
    file_no: u8,
    sent: bool,
}

impl GetFileSettings {
    /// Query the settings of `file_no`
    ///
    /// File numbers occupy 5 bits; higher bits are discarded.
    pub const fn new(file_no: u8) -> Self {
        Self {
            file_no: file_no & 0x1F,
            sent: false,
        }
    }
}

impl CommandSequence for GetFileSettings {
    type Output = FileSettings;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<FileSettings>> {
        match (self.sent, response) {
            (false, None) => {
                self.sent = true;
                Ok(Step::Send(
                    Command::new(CLA_PROPRIETARY, ins::GET_FILE_SETTINGS, 0x00, 0x00)
                        .with_data(Bytes::copy_from_slice(&[self.file_no]))
                        .with_le(0),
                ))
            }
            (true, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::OperationOk],
                )?;
                Ok(Step::Done(FileSettings::from_bytes(payload)?))
            }
            (false, Some(_)) => Err(Error::SequenceExhausted),
            (true, None) => Err(Error::MissingResponse),
        }
    }
}
