//! AuthenticateEV2First: mutual authentication and session establishment
//!
//! Two exchanges. The first sends the key number and receives the chip's
//! encrypted challenge RndB; the second answers with the encrypted host
//! challenge RndA concatenated with RndB rotated left one byte, and receives
//! the encrypted capabilities block. The chip proves knowledge of the key by
//! echoing the rotated RndA inside that block; the echo check is what makes
//! the authentication mutual and must never be skipped.

use bytes::Bytes;
use ntag424_apdu_core::Command;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::constants::{CLA_PROPRIETARY, ins};
use crate::crypto::{decrypt_aes, encrypt_aes, rotate_left};
use crate::error::{Error, Result};
use crate::sequence::{CommandSequence, Step};
use crate::session::Ev2Session;
use crate::status::{CommandClass, StatusCode, decode_response};

enum State {
    Start,
    AwaitChallenge,
    AwaitCapabilities {
        rnd_a: Zeroizing<[u8; 16]>,
        rnd_b: Zeroizing<[u8; 16]>,
    },
    Finished,
}

/// The AuthenticateEV2First command sequence
pub struct AuthenticateEv2First {
    key_no: u8,
    key: Zeroizing<[u8; 16]>,
    rnd_a: Option<[u8; 16]>,
    state: State,
}

impl AuthenticateEv2First {
    /// Authenticate against key slot `key_no` (low 6 bits significant) with
    /// the given long-term key
    pub fn new(key_no: u8, key: [u8; 16]) -> Self {
        Self {
            key_no: key_no & 0b0011_1111,
            key: Zeroizing::new(key),
            rnd_a: None,
            state: State::Start,
        }
    }

    /// Use a fixed host challenge instead of a random one
    ///
    /// Only useful for reproducing published handshake exchanges; a fixed
    /// nonce voids the replay protection.
    pub fn with_rnd_a(mut self, rnd_a: [u8; 16]) -> Self {
        self.rnd_a = Some(rnd_a);
        self
    }

    fn host_challenge(&self) -> [u8; 16] {
        match self.rnd_a {
            Some(rnd_a) => rnd_a,
            None => {
                let mut rnd_a = [0u8; 16];
                rand::rng().fill_bytes(&mut rnd_a);
                rnd_a
            }
        }
    }
}

fn sixteen(data: &[u8], what: &'static str) -> Result<Zeroizing<[u8; 16]>> {
    let bytes: [u8; 16] = data.try_into().map_err(|_| Error::Parse(what))?;
    Ok(Zeroizing::new(bytes))
}

impl std::fmt::Debug for AuthenticateEv2First {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key material stays out of debug output
        f.debug_struct("AuthenticateEv2First")
            .field("key_no", &self.key_no)
            .finish_non_exhaustive()
    }
}

impl CommandSequence for AuthenticateEv2First {
    type Output = Ev2Session;

    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Ev2Session>> {
        match (std::mem::replace(&mut self.state, State::Finished), response) {
            (State::Start, None) => {
                self.state = State::AwaitChallenge;
                // Key number plus a zero-length PCD capability field.
                Ok(Step::Send(
                    Command::new(CLA_PROPRIETARY, ins::AUTHENTICATE_FIRST, 0x00, 0x00)
                        .with_data(Bytes::copy_from_slice(&[self.key_no, 0x00]))
                        .with_le(0),
                ))
            }
            (State::AwaitChallenge, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::AdditionalFrame],
                )?;
                let rnd_b = sixteen(
                    &decrypt_aes(&self.key, payload)?,
                    "challenge is not 16 bytes",
                )?;
                let rnd_a = Zeroizing::new(self.host_challenge());

                let mut plain = Zeroizing::new([0u8; 32]);
                plain[..16].copy_from_slice(&*rnd_a);
                plain[16..].copy_from_slice(&rotate_left(&rnd_b));
                let ciphertext = encrypt_aes(&self.key, &*plain)?;

                self.state = State::AwaitCapabilities { rnd_a, rnd_b };
                Ok(Step::Send(
                    Command::new(CLA_PROPRIETARY, ins::ADDITIONAL_FRAME, 0x00, 0x00)
                        .with_data(Bytes::from(ciphertext))
                        .with_le(0),
                ))
            }
            (State::AwaitCapabilities { rnd_a, rnd_b }, Some(response)) => {
                let (_, payload) = decode_response(
                    CommandClass::Proprietary,
                    response,
                    &[StatusCode::OperationOk],
                )?;
                let capabilities = Zeroizing::new(decrypt_aes(&self.key, payload)?);
                if capabilities.len() != 32 {
                    return Err(Error::Parse("capabilities block is not 32 bytes"));
                }

                // TI(4) ‖ CheckRndA(16) ‖ PDcap2(6) ‖ PCDcap2(6)
                if capabilities[4..20] != rotate_left(&rnd_a) {
                    return Err(Error::AuthenticationIntegrity);
                }

                let mut ti = [0u8; 4];
                ti.copy_from_slice(&capabilities[0..4]);
                let mut pd_cap2 = [0u8; 6];
                pd_cap2.copy_from_slice(&capabilities[20..26]);
                let mut pcd_cap2 = [0u8; 6];
                pcd_cap2.copy_from_slice(&capabilities[26..32]);

                Ok(Step::Done(Ev2Session::derive(
                    self.key_no,
                    &self.key,
                    &rnd_a,
                    &rnd_b,
                    ti,
                    pd_cap2,
                    pcd_cap2,
                )))
            }
            (State::Finished, _) | (State::Start, Some(_)) => Err(Error::SequenceExhausted),
            (state, None) => {
                self.state = state;
                Err(Error::MissingResponse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{run, testing::ScriptedTransport};
    use hex_literal::hex;

    // Both fixtures replay the AN12196 §6.6 walkthrough against an all-zero
    // factory key.

    #[test]
    fn test_handshake_an12196() {
        let mut transport = ScriptedTransport::new([
            &hex!("A04C124213C186F22399D33AC2A3021591AF"),
            &hex!("3FA64DB5446D1F34CD6EA311167F5E4985B89690C04A05F17FA7AB2F081206639100"),
        ]);

        let session = run(
            AuthenticateEv2First::new(0x00, [0u8; 16])
                .with_rnd_a(hex!("13C5DB8A5930439FC3DEF9A4C675360F")),
            &mut transport,
        )
        .unwrap();

        assert_eq!(transport.commands[0].as_ref(), hex!("9071000002000000"));
        assert_eq!(
            transport.commands[1].as_ref(),
            hex!("90AF00002035C3E05A752E0144BAC0DE51C1F22C56B34408A23D8AEA266CAB947EA8E0118D00")
        );

        assert_eq!(session.key_no, 0x00);
        assert_eq!(session.ti, hex!("9D00C4DF"));
        assert_eq!(session.pd_cap2, [0u8; 6]);
        assert_eq!(session.pcd_cap2, [0u8; 6]);
        assert_eq!(
            session.sv1,
            hex!("A55A0001008013C56268A548D8FBBF237CCCAA20EC7E6E48C3DEF9A4C675360F")
        );
        assert_eq!(
            session.sv2,
            hex!("5AA50001008013C56268A548D8FBBF237CCCAA20EC7E6E48C3DEF9A4C675360F")
        );
        assert_eq!(
            session.encryption_session_key,
            hex!("1309C877509E5A215007FF0ED19CA564")
        );
        assert_eq!(
            session.cmac_session_key,
            hex!("4C6626F5E72EA694202139295C7A7FC7")
        );
    }

    #[test]
    fn test_handshake_an12196_second_exchange() {
        let mut transport = ScriptedTransport::new([
            &hex!("C1FC9EF6914A3E435D00AF8107A3770091AF"),
            &hex!("CAC5C282E0EEC0BD405A0CFB81006209FB36F73B0B060B7A5FD2E6BD38F64ED59100"),
        ]);

        let session = run(
            AuthenticateEv2First::new(0x00, [0u8; 16])
                .with_rnd_a(hex!("54826e57625b579adcec038dbfd3afdb")),
            &mut transport,
        )
        .unwrap();

        assert_eq!(transport.commands[0].as_ref(), hex!("9071000002000000"));
        assert_eq!(
            transport.commands[1].as_ref(),
            hex!("90AF0000205BF593F9964F3782854D76412F994BC38C21B555A165FC7B85F76DFB1D6395FF00")
        );

        assert_eq!(session.ti, hex!("9F42157C"));
        assert_eq!(
            session.encryption_session_key,
            hex!("C42316B610ECFE06A1E3D9A43840A65B")
        );
        assert_eq!(
            session.cmac_session_key,
            hex!("8BAC948E3204657E77D7242B9DA00F06")
        );
    }

    #[test]
    fn test_tampered_echo_fails_integrity() {
        // Flip one bit of the final ciphertext; decryption then yields a
        // CheckRndA that no longer matches the rotated host challenge.
        let mut tampered =
            hex!("3FA64DB5446D1F34CD6EA311167F5E4985B89690C04A05F17FA7AB2F081206639100");
        tampered[20] ^= 0x01;

        let mut transport =
            ScriptedTransport::new([&hex!("A04C124213C186F22399D33AC2A3021591AF"), &tampered]);

        let err = run(
            AuthenticateEv2First::new(0x00, [0u8; 16])
                .with_rnd_a(hex!("13C5DB8A5930439FC3DEF9A4C675360F")),
            &mut transport,
        )
        .unwrap_err();
        assert!(matches!(err, Error::AuthenticationIntegrity));
    }

    #[test]
    fn test_authentication_refused() {
        let mut transport = ScriptedTransport::new([&hex!("91AD")]);
        let err = run(
            AuthenticateEv2First::new(0x00, [0u8; 16]),
            &mut transport,
        )
        .unwrap_err();
        match err {
            Error::UnexpectedStatus { actual, .. } => {
                assert_eq!(actual, StatusCode::AuthenticationDelay);
            }
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[test]
    fn test_key_number_is_masked_to_six_bits() {
        let mut sequence = AuthenticateEv2First::new(0xC3, [0u8; 16]);
        match sequence.resume(None).unwrap() {
            Step::Send(command) => {
                assert_eq!(command.to_bytes().as_ref(), hex!("9071000002030000"));
            }
            Step::Done(_) => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_random_challenge_still_round_trips() {
        // Without an injected RndA the phase-2 frame is unpredictable, but a
        // chip simulated with the same key must still pass verification.
        let key = [0u8; 16];
        let rnd_b = hex!("B9E2FC789B64BF237CCCAA20EC7E6E48");

        let mut sequence = AuthenticateEv2First::new(0x00, key);
        let _ = sequence.resume(None).unwrap();

        let mut challenge = encrypt_aes(&key, &rnd_b).unwrap();
        challenge.extend_from_slice(&[0x91, 0xAF]);
        let phase2 = match sequence.resume(Some(&challenge)).unwrap() {
            Step::Send(command) => command,
            Step::Done(_) => panic!("expected the phase-2 frame"),
        };

        // Recover RndA the way the chip would and answer with the echo.
        let body = phase2.data.as_ref().expect("phase-2 frame carries data");
        let plain = decrypt_aes(&key, body).unwrap();
        let rnd_a: [u8; 16] = plain[..16].try_into().unwrap();
        assert_eq!(plain[16..], rotate_left(&rnd_b));

        let mut capabilities = Vec::new();
        capabilities.extend_from_slice(&hex!("9D00C4DF"));
        capabilities.extend_from_slice(&rotate_left(&rnd_a));
        capabilities.extend_from_slice(&[0u8; 12]);
        let mut response = encrypt_aes(&key, &capabilities).unwrap();
        response.extend_from_slice(&[0x91, 0x00]);

        let session = match sequence.resume(Some(&response)).unwrap() {
            Step::Done(session) => session,
            Step::Send(_) => panic!("expected completion"),
        };
        assert_eq!(session.ti, hex!("9D00C4DF"));
    }
}
