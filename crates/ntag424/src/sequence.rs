//! Suspending command sequences and their driver
//!
//! Tag operations take between one and three frame exchanges. Each operation
//! is a small state machine implementing [`CommandSequence`]: driving it
//! yields one outbound [`Command`] at a time, and resuming it with the tag's
//! response either yields the next frame or the operation's typed result.
//!
//! The caller owns control flow. Nothing here blocks; the transport call
//! happens between `resume` invocations, so the model works unchanged over a
//! blocking or an async reader. A suspended sequence holds no external
//! resources and can simply be dropped on transport failure.

use ntag424_apdu_core::{CardTransport, Command};
use tracing::trace;

use crate::error::Result;

/// One step of a command sequence
#[derive(Debug)]
pub enum Step<T> {
    /// Send this frame to the tag and resume with its response
    Send(Command),
    /// The operation completed with this result
    Done(T),
}

/// A multi-exchange tag operation, driven one frame at a time
pub trait CommandSequence {
    /// Final result type of the operation
    type Output;

    /// Advance the sequence
    ///
    /// The first call must pass `None`; every later call passes the raw
    /// response to the frame yielded by the previous step. Errors leave the
    /// sequence unusable.
    fn resume(&mut self, response: Option<&[u8]>) -> Result<Step<Self::Output>>;
}

/// Drive a sequence to completion over a transport
///
/// Repeatedly asks the sequence for its next step, performing one
/// `transmit_raw` round trip per yielded frame.
pub fn run<S, T>(mut sequence: S, transport: &mut T) -> Result<S::Output>
where
    S: CommandSequence,
    T: CardTransport,
{
    let mut response = None;
    loop {
        match sequence.resume(response.as_deref())? {
            Step::Send(command) => {
                trace!(frame = %hex::encode(command.to_bytes()), "sequence yielded frame");
                response = Some(transport.transmit_raw(&command.to_bytes())?);
            }
            Step::Done(result) => return Ok(result),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use bytes::Bytes;
    use ntag424_apdu_core::{CardTransport, TransportError};

    /// Transport that replays a scripted list of responses and records every
    /// command it was given.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTransport {
        pub(crate) responses: Vec<Bytes>,
        pub(crate) commands: Vec<Bytes>,
    }

    impl ScriptedTransport {
        pub(crate) fn new<const N: usize>(responses: [&[u8]; N]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|r| Bytes::copy_from_slice(r))
                    .collect(),
                commands: Vec::new(),
            }
        }
    }

    impl CardTransport for ScriptedTransport {
        fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
            self.commands.push(Bytes::copy_from_slice(command));
            if self.responses.is_empty() {
                return Err(TransportError::Transmission);
            }
            Ok(self.responses.remove(0))
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn release(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }
}
