//! ReadData: read from a standard data file

use bytes::{Bytes, BytesMut};
use ntag424_apdu_core::Command;

use crate::commands::put_u24_le;
use crate::constants::{CLA_PROPRIETARY, ins};
use crate::error::{Error, Result};
use crate::sequence::{CommandSequence, Step};
use crate::status::{CommandClass, StatusCode, decode_response};

/// The ReadData command sequence, a single exchange
///
/// A zero length asks the chip for everything from the offset to the end of
/// the file.
#[derive(Debug)]
pub struct ReadData {
    file_no: u8,
    offset: u32,
    length: u32,
    sent: bool,
}

impl ReadData {
    /// Read `length` bytes from `file_no` starting at `offset`
    pub const fn new(file_no: u8, offset: u32, length: u32) -> Self {
        Self {
            file_no,
            offset,
            length,
            sent: false,
        }
    }
}

impl CommandSequence for ReadData {
    type Output = Bytes;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Bytes>> {
        match (self.sent, response) {
            (false, None) => {
                self.sent = true;
                let mut data = BytesMut::with_capacity(7);
                data.extend_from_slice(&[self.file_no]);
                put_u24_le(&mut data, self.offset);
                put_u24_le(&mut data, self.length);
                Ok(Step::Send(
                    Command::new(CLA_PROPRIETARY, ins::READ_DATA, 0x00, 0x00)
                        .with_data(data.freeze())
                        .with_le(0),
                ))
            }
            (true, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::OperationOk],
                )?;
                Ok(Step::Done(Bytes::copy_from_slice(payload)))
            }
            (false, Some(_)) => Err(Error::SequenceExhausted),
            (true, None) => Err(Error::MissingResponse),
        }
    }
}
