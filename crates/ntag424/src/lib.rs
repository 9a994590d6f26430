//! NTAG424 DNA command protocol
//!
//! This crate implements the command layer for NXP NTAG424 DNA contactless
//! tags: frame encoding for the chip's proprietary and ISO 7816 command sets,
//! status-word classification per command class, the EV2First mutual
//! authentication handshake with AES session-key derivation, and decoding of
//! the Secure Dynamic Messaging (SDM) file-settings block.
//!
//! Operations that need more than one exchange with the tag are modeled as
//! [`sequence::CommandSequence`] state machines. The caller (or the
//! [`sequence::run`] driver) owns the transport: a sequence yields one
//! outbound frame at a time and is resumed with the tag's response until it
//! produces its typed result.
//!
//! The physical transport is out of scope; anything implementing
//! [`ntag424_apdu_core::CardTransport`] can drive a sequence.

pub mod commands;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod file_settings;
pub mod sequence;
pub mod session;
pub mod status;

pub use commands::{
    AuthenticateEv2First, GetFileSettings, GetVersion, IsoReadBinary, IsoSelectFile, ReadData,
    Selection, Version, write_data,
};
pub use error::{Error, Result};
pub use file_settings::FileSettings;
pub use sequence::{CommandSequence, Step, run};
pub use session::Ev2Session;
pub use status::{CommandClass, StatusCode};
