//! GetVersion: hardware, software and production identification
//!
//! A three-exchange chained command. The first two frames each return a
//! 7-byte version record (hardware, then software) with an AdditionalFrame
//! status; the third returns the production record and completes the chain.

use ntag424_apdu_core::Command;

use crate::constants::{CLA_PROPRIETARY, ins};
use crate::error::{Error, Result};
use crate::sequence::{CommandSequence, Step};
use crate::status::{CommandClass, StatusCode, decode_response};

/// One 7-byte version record, shared by the hardware and software frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    /// Vendor identifier (0x04 for NXP)
    pub vendor_id: u8,
    /// Product type
    pub product_type: u8,
    /// Product sub-type; carries capacitance and backmodulation bits
    pub sub_type: u8,
    /// Major version
    pub major_version: u8,
    /// Minor version
    pub minor_version: u8,
    /// Storage size code
    pub storage_size: u8,
    /// Protocol type
    pub protocol: u8,
}

impl VersionInfo {
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes: &[u8; 7] = data
            .try_into()
            .map_err(|_| Error::Parse("version record is not 7 bytes"))?;
        Ok(Self {
            vendor_id: bytes[0],
            product_type: bytes[1],
            sub_type: bytes[2],
            major_version: bytes[3],
            minor_version: bytes[4],
            storage_size: bytes[5],
            protocol: bytes[6],
        })
    }

    /// 50 pF input capacitance (sub-type low nibble 2)
    pub const fn is_50pf(&self) -> bool {
        self.sub_type & 0xF == 2
    }

    /// Strong backmodulation (sub-type high nibble 0)
    pub const fn strong_backmod(&self) -> bool {
        self.sub_type >> 4 == 0
    }

    /// Standard backmodulation (sub-type high nibble 8)
    pub const fn standard_backmod(&self) -> bool {
        self.sub_type >> 4 == 8
    }
}

/// Production record from the final frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionInfo {
    /// 7-byte unique identifier
    pub uid: [u8; 7],
    /// Production batch number
    pub batch_no: [u8; 4],
    /// Calendar week of production (decimal)
    pub week: u8,
    /// Year of production (decimal, two digits)
    pub year: u8,
    /// Fabrication-key identifier, absent on most parts
    pub fab_key: Option<u8>,
}

impl ProductionInfo {
    /// Decode the final GetVersion payload
    ///
    /// Week and year are BCD: each nibble is one decimal digit, so 0x21
    /// means week 21. The byte between the batch number and the week field
    /// carries fabrication data this decoder does not model.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 14 {
            return Err(Error::Parse("production record truncated"));
        }
        let mut uid = [0u8; 7];
        uid.copy_from_slice(&data[0..7]);
        let mut batch_no = [0u8; 4];
        batch_no.copy_from_slice(&data[7..11]);
        Ok(Self {
            uid,
            batch_no,
            week: bcd(data[12]),
            year: bcd(data[13]),
            fab_key: data.get(14).copied(),
        })
    }
}

const fn bcd(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0xF)
}

/// Complete GetVersion result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Hardware version record
    pub hardware: VersionInfo,
    /// Software version record
    pub software: VersionInfo,
    /// Production record
    pub production: ProductionInfo,
}

#[derive(Debug)]
enum State {
    Start,
    AwaitHardware,
    AwaitSoftware {
        hardware: VersionInfo,
    },
    AwaitProduction {
        hardware: VersionInfo,
        software: VersionInfo,
    },
    Finished,
}

/// The GetVersion command sequence
#[derive(Debug)]
pub struct GetVersion {
    state: State,
}

impl GetVersion {
    /// Start a fresh version query
    pub const fn new() -> Self {
        Self {
            state: State::Start,
        }
    }
}

impl Default for GetVersion {
    fn default() -> Self {
        Self::new()
    }
}

const fn additional_frame() -> Command {
    Command::new(CLA_PROPRIETARY, ins::ADDITIONAL_FRAME, 0x00, 0x00).with_le(0)
}

impl CommandSequence for GetVersion {
    type Output = Version;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Version>> {
        match (std::mem::replace(&mut self.state, State::Finished), response) {
            (State::Start, None) => {
                self.state = State::AwaitHardware;
                Ok(Step::Send(
                    Command::new(CLA_PROPRIETARY, ins::GET_VERSION, 0x00, 0x00).with_le(0),
                ))
            }
            (State::AwaitHardware, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::AdditionalFrame],
                )?;
                self.state = State::AwaitSoftware {
                    hardware: VersionInfo::from_bytes(payload)?,
                };
                Ok(Step::Send(additional_frame()))
            }
            (State::AwaitSoftware { hardware }, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::AdditionalFrame],
                )?;
                self.state = State::AwaitProduction {
                    hardware,
                    software: VersionInfo::from_bytes(payload)?,
                };
                Ok(Step::Send(additional_frame()))
            }
            (State::AwaitProduction { hardware, software }, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::OperationOk],
                )?;
                Ok(Step::Done(Version {
                    hardware,
                    software,
                    production: ProductionInfo::from_bytes(payload)?,
                }))
            }
            (State::Finished, _) | (State::Start, Some(_)) => Err(Error::SequenceExhausted),
            (state, None) => {
                self.state = state;
                Err(Error::MissingResponse)
            }
        }
    }
}
