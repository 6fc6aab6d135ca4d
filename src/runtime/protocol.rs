//! Runtime protocol capability set
//!
//! `RuntimeProtocol` is the seam between transports and the exchange
//! sequence. A transport implements the required methods (initialize,
//! send, poll, disconnect); the high-level exchanges driven by the tester
//! are provided on top of them and are identical for every transport.
//!
//! Every exchange is synchronous and half-duplex: one typed request, then
//! a bounded-poll wait for exactly one reply frame. More than one frame in
//! reply signals framing desynchronization and fails the exchange.

use std::path::Path;

use crate::config::Endianness;
use crate::error::{BenchwireError, Result};
use crate::measurements::Measurements;
use crate::protocol::{Message, MessageType, PollEvent, ServerStatus};

/// Transport-independent runtime protocol surface
///
/// There is no built-in deadline for a whole exchange: each poll is
/// bounded, but an unresponsive peer causes indefinite re-polling. A
/// caller that needs a hard timeout must stop driving the exchange itself.
pub trait RuntimeProtocol {
    // -------------------------------------------------------------------------
    // Transport surface (implemented per transport)
    // -------------------------------------------------------------------------

    /// Bind the listening socket and start accepting one peer
    fn initialize_server(&mut self) -> Result<()>;

    /// Connect to the remote runner
    fn initialize_client(&mut self) -> Result<()>;

    /// One bounded multiplexer wait; always yields at least one event
    fn wait_for_activity(&mut self) -> Vec<PollEvent>;

    /// Send one typed message as a single frame
    fn send_message(&mut self, message: &Message) -> Result<()>;

    /// Close every socket (listener and peer)
    fn disconnect(&mut self);

    /// Close only the peer socket, keeping the listener. Idempotent.
    fn disconnect_peer(&mut self);

    /// Wire byte order of this connection
    fn endianness(&self) -> Endianness;

    // -------------------------------------------------------------------------
    // Server-side acknowledgements
    // -------------------------------------------------------------------------

    /// Reply OK, optionally carrying a payload
    fn request_success(&mut self, payload: &[u8]) -> Result<()> {
        tracing::debug!("Sending OK");
        self.send_message(&Message::new(MessageType::Ok, payload.to_vec()))
    }

    /// Reply ERROR
    fn request_failure(&mut self) -> Result<()> {
        tracing::debug!("Sending ERROR");
        self.send_message(&Message::bodyless(MessageType::Error))
    }

    // -------------------------------------------------------------------------
    // Client-side exchanges
    // -------------------------------------------------------------------------

    /// Wait for the OK reply to a pending request
    ///
    /// Polls until exactly one reply frame arrives. Returns the reply
    /// payload (empty for a bodyless OK). Any ERROR reply, unexpected
    /// message type, extra frame, or disconnect aborts the exchange.
    fn receive_confirmation(&mut self) -> Result<Vec<u8>> {
        loop {
            for event in self.wait_for_activity() {
                match event.status {
                    ServerStatus::DataReady => {
                        let frames = event.frames.unwrap_or_default();
                        if frames.len() != 1 {
                            // framing desynchronization, unrecoverable
                            tracing::error!(
                                "Expected one reply frame, received {}",
                                frames.len()
                            );
                            return Err(BenchwireError::Protocol(format!(
                                "Received {} frames where one was expected",
                                frames.len()
                            )));
                        }

                        let message = Message::parse(&frames[0], self.endianness())?;
                        return match message.message_type {
                            MessageType::Ok => Ok(message.payload),
                            MessageType::Error => {
                                tracing::error!("Peer reported failure");
                                Err(BenchwireError::Protocol(
                                    "Peer replied ERROR".to_string(),
                                ))
                            }
                            other => {
                                tracing::error!("Unexpected reply: {:?}", other);
                                Err(BenchwireError::Protocol(format!(
                                    "Unexpected reply type {:?}",
                                    other
                                )))
                            }
                        };
                    }
                    ServerStatus::ClientDisconnected => {
                        tracing::error!("Peer disconnected during exchange");
                        return Err(BenchwireError::NotConnected);
                    }
                    ServerStatus::DataInvalid => {
                        return Err(BenchwireError::Decode(
                            "Received invalid packet".to_string(),
                        ));
                    }
                    ServerStatus::Nothing
                    | ServerStatus::ClientConnected
                    | ServerStatus::ClientIgnored => {}
                }
            }
        }
    }

    /// Upload the compiled model file as a single MODEL frame
    fn upload_model(&mut self, path: &Path) -> Result<()> {
        tracing::debug!("Uploading model from {}", path.display());
        let data = std::fs::read(path)?;
        self.send_message(&Message::new(MessageType::Model, data))?;
        self.receive_confirmation()?;
        Ok(())
    }

    /// Upload serialized input tensors as a single DATA frame
    fn upload_input(&mut self, data: &[u8]) -> Result<()> {
        tracing::debug!("Uploading input");
        self.send_message(&Message::new(MessageType::Data, data.to_vec()))?;
        self.receive_confirmation()?;
        Ok(())
    }

    /// Upload the model's input/output specification as an IOSPEC frame
    fn upload_io_specification(&mut self, path: &Path) -> Result<()> {
        tracing::debug!("Uploading io specification from {}", path.display());
        let data = std::fs::read(path)?;
        self.send_message(&Message::new(MessageType::IoSpec, data))?;
        self.receive_confirmation()?;
        Ok(())
    }

    /// Trigger inference on the uploaded input
    ///
    /// Awaits two sequential confirmations: an immediate acknowledgement
    /// that processing started, then a completion acknowledgement. The
    /// second is never awaited if the first fails.
    fn request_processing(&mut self) -> Result<()> {
        tracing::debug!("Requesting processing");
        self.send_message(&Message::bodyless(MessageType::Process))?;
        self.receive_confirmation()?;
        self.receive_confirmation()?;
        Ok(())
    }

    /// Download the inference result bytes
    fn download_output(&mut self) -> Result<Vec<u8>> {
        tracing::debug!("Downloading output");
        self.send_message(&Message::bodyless(MessageType::Output))?;
        self.receive_confirmation()
    }

    /// Download performance statistics and merge them into the caller's
    /// measurement record
    fn download_statistics(&mut self, measurements: &mut Measurements) -> Result<()> {
        tracing::debug!("Downloading statistics");
        self.send_message(&Message::bodyless(MessageType::Stats))?;
        let payload = self.receive_confirmation()?;
        if !payload.is_empty() {
            measurements.merge_json(&payload)?;
        }
        Ok(())
    }
}
