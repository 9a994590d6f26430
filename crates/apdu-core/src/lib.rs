//! Core types for APDU command and response handling
//!
//! This crate provides the protocol-agnostic building blocks used to talk to
//! contactless cards over a half-duplex command/response transport: a
//! [`Command`] frame builder, response splitting into payload and
//! [`StatusWord`], and the [`CardTransport`] trait implemented by concrete
//! readers.
//!
//! It has no knowledge of any particular chip's command set; higher layers
//! supply instruction codes and interpret status words.

pub mod command;
pub mod response;
pub mod transport;

pub use command::Command;
pub use response::{ResponseError, StatusWord, split_response};
pub use transport::{CardTransport, TransportError};
