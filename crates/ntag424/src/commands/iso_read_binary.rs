//! ISO ReadBinary: read from the currently selected (or an addressed) EF

use bytes::Bytes;
use ntag424_apdu_core::Command;

use crate::constants::{CLA_ISO, ins};
use crate::error::{Error, Result};
use crate::sequence::{CommandSequence, Step};
use crate::status::{CommandClass, StatusCode, decode_response};

/// The ISO ReadBinary command sequence, a single exchange
///
/// Addressing depends on which parameters are given. With a file number, P1
/// carries bit 7 plus the 5-bit short identifier and P2 the low offset byte;
/// without one, P1/P2 together hold a 16-bit offset into the selected file.
/// Neither given means short identifier 0 at offset 0.
#[derive(Debug)]
pub struct IsoReadBinary {
    file_no: Option<u8>,
    offset: Option<u16>,
    length: Option<u8>,
    sent: bool,
}

impl IsoReadBinary {
    /// Read up to `length` bytes, addressed as described above
    pub const fn new(file_no: Option<u8>, offset: Option<u16>, length: Option<u8>) -> Self {
        Self {
            file_no,
            offset,
            length,
            sent: false,
        }
    }

    fn addressing(&self) -> (u8, u8) {
        match (self.file_no, self.offset) {
            (Some(file_no), offset) => (
                0b1000_0000 | (file_no & 0x1F),
                offset.unwrap_or(0) as u8,
            ),
            (None, Some(offset)) => ((offset >> 8) as u8, offset as u8),
            (None, None) => (0b1000_0000, 0x00),
        }
    }
}

impl CommandSequence for IsoReadBinary {
    type Output = Bytes;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Bytes>> {
        match (self.sent, response) {
            (false, None) => {
                self.sent = true;
                let (p1, p2) = self.addressing();
                Ok(Step::Send(
                    Command::new(CLA_ISO, ins::ISO_READ_BINARY, p1, p2)
                        .with_le(self.length.unwrap_or(0)),
                ))
            }
            (true, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Iso7816,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{run, testing::ScriptedTransport};
    use hex_literal::hex;

    fn first_frame(mut sequence: IsoReadBinary) -> Bytes {
        match sequence.resume(None).unwrap() {
            Step::Send(command) => command.to_bytes(),
            Step::Done(_) => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_addressed_by_file_number() {
        let frame = first_frame(IsoReadBinary::new(Some(0x02), Some(0x10), Some(32)));
        assert_eq!(frame.as_ref(), hex!("00B0821020"));
    }

    #[test]
    fn test_file_number_without_offset() {
        let frame = first_frame(IsoReadBinary::new(Some(0x01), None, None));
        assert_eq!(frame.as_ref(), hex!("00B0810000"));
    }

    #[test]
    fn test_sixteen_bit_offset_into_selected_file() {
        let frame = first_frame(IsoReadBinary::new(None, Some(0x0123), Some(16)));
        assert_eq!(frame.as_ref(), hex!("00B0012310"));
    }

    #[test]
    fn test_defaults_to_short_identifier_zero() {
        let frame = first_frame(IsoReadBinary::new(None, None, None));
        assert_eq!(frame.as_ref(), hex!("00B0800000"));
    }

    #[test]
    fn test_read_exchange() {
        let mut transport = ScriptedTransport::new([&hex!("D1010E 9000")]);
        let data = run(IsoReadBinary::new(None, None, Some(7)), &mut transport).unwrap();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_short_response_retry_status() {
        // 6CXX reports the actual available length.
        let mut transport = ScriptedTransport::new([&hex!("6C20")]);
        let err = run(IsoReadBinary::new(None, None, Some(64)), &mut transport).unwrap_err();
        match err {
            Error::UnexpectedStatus { actual, .. } => {
                assert_eq!(actual, StatusCode::WrongLeField);
            }
            other => panic!("wrong error: {other:?}"),
        }
    }
}
