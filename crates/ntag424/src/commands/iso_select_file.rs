//! ISO SelectFile: select an application, directory or elementary file

use bytes::Bytes;
use ntag424_apdu_core::Command;

use crate::constants::{CLA_ISO, ins};
use crate::error::{Error, Result};
use crate::sequence::{CommandSequence, Step};
use crate::status::{CommandClass, StatusCode, decode_response};

/// What to select, mapping onto the command's P1 selection-control values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Select MF, DF or EF by its 2-byte identifier (P1 = 0)
    ById(u16),
    /// Select a child DF by identifier (P1 = 1)
    ChildDf(u16),
    /// Select a child EF by identifier (P1 = 2)
    ChildEf(u16),
    /// Select the parent DF of the current DF; carries no identifier
    /// (P1 = 3)
    ParentDf,
    /// Select a DF by name, at most 16 bytes (P1 = 4)
    ByName(Bytes),
}

impl Selection {
    const fn control(&self) -> u8 {
        match self {
            Self::ById(_) => 0x00,
            Self::ChildDf(_) => 0x01,
            Self::ChildEf(_) => 0x02,
            Self::ParentDf => 0x03,
            Self::ByName(_) => 0x04,
        }
    }

    fn identifier(&self) -> Result<Bytes> {
        match self {
            Self::ById(id) | Self::ChildDf(id) | Self::ChildEf(id) => {
                Ok(Bytes::copy_from_slice(&id.to_be_bytes()))
            }
            Self::ParentDf => Ok(Bytes::new()),
            Self::ByName(name) => {
                if name.len() > 16 {
                    return Err(Error::NameTooLong { len: name.len() });
                }
                Ok(name.clone())
            }
        }
    }
}

/// The ISO SelectFile command sequence, a single exchange
///
/// The result is the FCI template payload, empty unless `return_template`
/// was requested.
#[derive(Debug)]
pub struct IsoSelectFile {
    selection: Selection,
    return_template: bool,
    sent: bool,
}

impl IsoSelectFile {
    /// Select `selection`, optionally asking for the FCI template back
    pub const fn new(selection: Selection, return_template: bool) -> Self {
        Self {
            selection,
            return_template,
            sent: false,
        }
    }
}

impl CommandSequence for IsoSelectFile {
    type Output = Bytes;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Bytes>> {
        match (self.sent, response) {
            (false, None) => {
                self.sent = true;
                let p2 = if self.return_template { 0x00 } else { 0x0C };
                Ok(Step::Send(
                    Command::new(CLA_ISO, ins::ISO_SELECT_FILE, self.selection.control(), p2)
                        .with_data(self.selection.identifier()?)
                        .with_le(0),
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
    use crate::constants::iso_ids;
    use crate::sequence::{run, testing::ScriptedTransport};
    use hex_literal::hex;

    fn first_frame(mut sequence: IsoSelectFile) -> Bytes {
        match sequence.resume(None).unwrap() {
            Step::Send(command) => command.to_bytes(),
            Step::Done(_) => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_select_by_id() {
        // Identifier is encoded high byte first.
        let frame = first_frame(IsoSelectFile::new(Selection::ById(0xE110), false));
        assert_eq!(frame.as_ref(), hex!("00A4000C02E11000"));
    }

    #[test]
    fn test_select_child_ef() {
        let frame = first_frame(IsoSelectFile::new(Selection::ChildEf(0xE104), false));
        assert_eq!(frame.as_ref(), hex!("00A4020C02E10400"));
    }

    #[test]
    fn test_select_parent_df_has_empty_body() {
        let frame = first_frame(IsoSelectFile::new(Selection::ParentDf, false));
        assert_eq!(frame.as_ref(), hex!("00A4030C0000"));
    }

    #[test]
    fn test_select_by_name() {
        let frame = first_frame(IsoSelectFile::new(
            Selection::ByName(Bytes::from_static(iso_ids::APP_DF_NAME)),
            false,
        ));
        assert_eq!(frame.as_ref(), hex!("00A4040C07D276000085010100"));
    }

    #[test]
    fn test_return_template_clears_p2() {
        let frame = first_frame(IsoSelectFile::new(Selection::ById(0x3F00), true));
        assert_eq!(frame.as_ref(), hex!("00A40000023F0000"));
    }

    #[test]
    fn test_oversized_name_rejected() {
        let mut sequence = IsoSelectFile::new(
            Selection::ByName(Bytes::copy_from_slice(&[0u8; 17])),
            false,
        );
        assert!(matches!(
            sequence.resume(None),
            Err(Error::NameTooLong { len: 17 })
        ));
    }

    #[test]
    fn test_select_exchange() {
        let mut transport = ScriptedTransport::new([&hex!("9000")]);
        let fci = run(
            IsoSelectFile::new(Selection::ById(0xE110), false),
            &mut transport,
        )
        .unwrap();
        assert!(fci.is_empty());
    }

    #[test]
    fn test_select_missing_file() {
        let mut transport = ScriptedTransport::new([&hex!("6A82")]);
        let err = run(
            IsoSelectFile::new(Selection::ById(0xAAAA), false),
            &mut transport,
        )
        .unwrap_err();
        match err {
            Error::UnexpectedStatus { actual, .. } => {
                assert_eq!(actual, StatusCode::FileNotFound);
            }
            other => panic!("wrong error: {other:?}"),
        }
    }
}
