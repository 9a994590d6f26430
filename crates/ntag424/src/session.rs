//! EV2First session-key derivation
//!
//! A successful handshake yields a transient session described by the
//! transaction identifier, the exchanged capability blocks and two AES keys
//! derived by CMAC over the SV1/SV2 session vectors. The chip and the host
//! compute the same vectors from the two challenge nonces; only the derived
//! keys matter to later secure-messaging traffic.

use crate::crypto::aes_cmac;

/// Session state established by a completed EV2First handshake
///
/// The session is transient: it is created per handshake attempt and the two
/// derived keys are its only externally meaningful output. The caller is
/// responsible for retaining them for subsequent secure-messaging commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ev2Session {
    /// Key number the handshake authenticated against
    pub key_no: u8,
    /// Transaction identifier assigned by the chip
    pub ti: [u8; 4],
    /// Chip capability block
    pub pd_cap2: [u8; 6],
    /// Reader capability block echoed by the chip
    pub pcd_cap2: [u8; 6],
    /// Session vector the encryption key was derived from
    pub sv1: [u8; 32],
    /// Session vector the CMAC key was derived from
    pub sv2: [u8; 32],
    /// AES-128 session key for encryption
    pub encryption_session_key: [u8; 16],
    /// AES-128 session key for CMAC
    pub cmac_session_key: [u8; 16],
}

/// Build a 32-byte session vector from its 2-byte label and the nonces
///
/// Layout: label ‖ 00 01 00 80 ‖ RndA[0..2] ‖ (RndA[2..8] XOR RndB[0..6]) ‖
/// RndB[6..16] ‖ RndA[8..16].
fn session_vector(label: [u8; 2], rnd_a: &[u8; 16], rnd_b: &[u8; 16]) -> [u8; 32] {
    let mut sv = [0u8; 32];
    sv[0..2].copy_from_slice(&label);
    sv[2..6].copy_from_slice(&[0x00, 0x01, 0x00, 0x80]);
    sv[6..8].copy_from_slice(&rnd_a[0..2]);
    for i in 0..6 {
        sv[8 + i] = rnd_a[2 + i] ^ rnd_b[i];
    }
    sv[14..24].copy_from_slice(&rnd_b[6..16]);
    sv[24..32].copy_from_slice(&rnd_a[8..16]);
    sv
}

impl Ev2Session {
    /// Derive the session from the verified handshake material
    ///
    /// Both keys are the full, untruncated 16-byte CMAC of their session
    /// vector under the long-term key.
    pub(crate) fn derive(
        key_no: u8,
        key: &[u8; 16],
        rnd_a: &[u8; 16],
        rnd_b: &[u8; 16],
        ti: [u8; 4],
        pd_cap2: [u8; 6],
        pcd_cap2: [u8; 6],
    ) -> Self {
        let sv1 = session_vector([0xA5, 0x5A], rnd_a, rnd_b);
        let sv2 = session_vector([0x5A, 0xA5], rnd_a, rnd_b);

        Self {
            key_no,
            ti,
            pd_cap2,
            pcd_cap2,
            sv1,
            sv2,
            encryption_session_key: aes_cmac(key, &sv1),
            cmac_session_key: aes_cmac(key, &sv2),
        }
    }
}
