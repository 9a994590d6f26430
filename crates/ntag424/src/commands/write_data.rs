//! WriteData: build a write frame for a standard data file
//!
//! Unlike the other operations this one is not a sequence: it returns the
//! assembled frame and leaves the exchange (and its status handling) to the
//! caller, which typically batches writes with other traffic.

use bytes::BytesMut;
use ntag424_apdu_core::Command;

use crate::commands::put_u24_le;
use crate::constants::{CLA_PROPRIETARY, MAX_WRITE_LEN, ins};
use crate::error::{Error, Result};

/// Build a WriteData frame
///
/// Fails with [`Error::WriteTooLong`] when `data` exceeds the 248-byte
/// per-frame limit, before anything is assembled.
pub fn write_data(file_no: u8, data: &[u8], offset: u32) -> Result<Command> {
    if data.len() > MAX_WRITE_LEN {
        return Err(Error::WriteTooLong { len: data.len() });
    }

    let mut body = BytesMut::with_capacity(7 + data.len());
    body.extend_from_slice(&[file_no]);
    put_u24_le(&mut body, offset);
    put_u24_le(&mut body, data.len() as u32);
    body.extend_from_slice(data);

    Ok(
        Command::new(CLA_PROPRIETARY, ins::WRITE_DATA, 0x00, 0x00)
            .with_data(body.freeze())
            .with_le(0),
    )
}
