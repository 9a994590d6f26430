//! Transport traits for APDU communication with cards
//!
//! A transport is responsible for sending and receiving raw APDU bytes over a
//! half-duplex link. It has no knowledge of command structure or any chip's
//! protocol details, and carries at most one exchange in flight per session.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised by a card transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the card or reader was lost
    #[error("connection error")]
    Connection,

    /// Transmission failed
    #[error("transmission error")]
    Transmission,

    /// The underlying device reported an error
    #[error("device error: {0}")]
    Device(&'static str),
}

/// Trait for basic card transports
///
/// Implementations handle the low-level exchange with the card but never
/// interpret frame contents. Timeouts and retry policy belong to the
/// implementation or its caller, not to the protocol layer above.
pub trait CardTransport: fmt::Debug {
    /// Send raw APDU bytes to the card and return the response bytes
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode(command), "transmitting raw command");
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode(response), "received raw response");
            }
            Err(e) => {
                debug!(error = ?e, "transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of `transmit_raw`
    ///
    /// This is the method concrete implementations override.
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Check if the transport is connected to a physical card
    fn is_connected(&self) -> bool;

    /// End the session with the card
    ///
    /// Safe to call from cleanup paths regardless of session state.
    fn release(&mut self) -> Result<(), TransportError>;
}
