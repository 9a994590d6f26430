//! AES primitives used by the EV2First handshake
//!
//! The handshake only ever encrypts and decrypts exact multiples of the AES
//! block size, always under a zero IV and with padding disabled; the chip's
//! protocol supplies block-aligned material by construction.

use aes::Aes128;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use cmac::{Cmac, Mac};

use crate::error::Result;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const ZERO_IV: [u8; 16] = [0u8; 16];

/// AES-128-CBC encrypt block-aligned data under a zero IV, no padding
pub(crate) fn encrypt_aes(key: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = data.to_vec();
    let len = buf.len();
    Aes128CbcEnc::new(key.into(), &ZERO_IV.into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)?;
    Ok(buf)
}

/// AES-128-CBC decrypt block-aligned data under a zero IV, no padding
pub(crate) fn decrypt_aes(key: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = data.to_vec();
    Aes128CbcDec::new(key.into(), &ZERO_IV.into()).decrypt_padded_mut::<NoPadding>(&mut buf)?;
    Ok(buf)
}

/// Full 16-byte AES-CMAC over `data`
pub(crate) fn aes_cmac(key: &[u8; 16], data: &[u8]) -> [u8; 16] {
    let mut mac = <Cmac<Aes128> as Mac>::new(key.into());
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Truncate a full CMAC to the 8-byte form used by SDM secure messaging
///
/// The chip keeps every second byte of the 16-byte tag (indices 1, 3, ...,
/// 15). The EV2First handshake itself always uses the untruncated output;
/// this form only appears in post-handshake MACs.
pub fn truncate_mac(full: &[u8; 16]) -> [u8; 8] {
    [
        full[1], full[3], full[5], full[7], full[9], full[11], full[13], full[15],
    ]
}

/// Rotate a 16-byte value left by one byte (byte 0 moves to the end)
pub(crate) fn rotate_left(value: &[u8; 16]) -> [u8; 16] {
    let mut rotated = [0u8; 16];
    rotated[..15].copy_from_slice(&value[1..]);
    rotated[15] = value[0];
    rotated
}
