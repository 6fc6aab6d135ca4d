//! Runner serve loop
//!
//! The server role of the protocol: waits for tester commands and
//! dispatches them to a `ModelRuntime` collaborator. The runner never
//! interprets model or tensor bytes itself.

use crate::error::{BenchwireError, Result};
use crate::measurements::Measurements;
use crate::protocol::{Message, MessageType, ServerStatus};
use crate::runtime::RuntimeProtocol;

/// The inference-side collaborator driven by the runner
///
/// Implementations own the actual model execution; payloads reach them as
/// opaque byte slices in whatever format tester and runner agreed on
/// out-of-band.
pub trait ModelRuntime {
    /// Load the uploaded model bytes
    fn prepare_model(&mut self, model: &[u8]) -> Result<()>;

    /// Stage the uploaded input tensor bytes
    fn prepare_input(&mut self, input: &[u8]) -> Result<()>;

    /// Apply the uploaded input/output specification
    fn prepare_io_specification(&mut self, spec: &[u8]) -> Result<()>;

    /// Run inference on the staged input
    fn process_input(&mut self) -> Result<()>;

    /// Return the serialized inference result
    fn fetch_output(&mut self) -> Result<Vec<u8>>;

    /// Current performance statistics
    fn statistics(&mut self) -> Measurements;
}

/// Serves one tester over a runtime protocol
pub struct Runner<P: RuntimeProtocol, R: ModelRuntime> {
    protocol: P,
    runtime: R,
}

impl<P: RuntimeProtocol, R: ModelRuntime> Runner<P, R> {
    /// Couple a transport with a model runtime
    pub fn new(protocol: P, runtime: R) -> Self {
        Self { protocol, runtime }
    }

    /// Access the underlying protocol (e.g. to disconnect)
    pub fn protocol_mut(&mut self) -> &mut P {
        &mut self.protocol
    }

    /// Bind the listening socket
    pub fn initialize(&mut self) -> Result<()> {
        self.protocol.initialize_server()
    }

    /// Serve until the process is stopped
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.run_once();
        }
    }

    /// One poll cycle: wait for activity and dispatch every event
    ///
    /// Returns the statuses observed this cycle, in order.
    pub fn run_once(&mut self) -> Vec<ServerStatus> {
        let mut statuses = Vec::new();

        for event in self.protocol.wait_for_activity() {
            match event.status {
                ServerStatus::DataReady => {
                    statuses.push(ServerStatus::DataReady);

                    for frame in event.frames.unwrap_or_default() {
                        match self.handle_frame(&frame) {
                            Ok(()) => {}
                            Err(BenchwireError::Decode(msg)) => {
                                // desynchronized stream, no resync possible
                                tracing::error!("Undecodable frame, closing peer: {}", msg);
                                self.protocol.disconnect_peer();
                                statuses.push(ServerStatus::DataInvalid);
                                break;
                            }
                            Err(e) => {
                                tracing::error!("Failed to handle request: {}", e);
                            }
                        }
                    }
                }
                status => statuses.push(status),
            }
        }

        statuses
    }

    /// Decode one frame and execute the command it carries
    fn handle_frame(&mut self, frame: &[u8]) -> Result<()> {
        let message = Message::parse(frame, self.protocol.endianness())?;
        tracing::debug!("Handling {:?} request", message.message_type);

        match message.message_type {
            MessageType::Model => {
                let result = self.runtime.prepare_model(&message.payload);
                self.acknowledge(result)
            }
            MessageType::Data => {
                let result = self.runtime.prepare_input(&message.payload);
                self.acknowledge(result)
            }
            MessageType::IoSpec => {
                let result = self.runtime.prepare_io_specification(&message.payload);
                self.acknowledge(result)
            }
            MessageType::Process => {
                // first OK acknowledges the request, second confirms completion
                self.protocol.request_success(&[])?;
                let result = self.runtime.process_input();
                self.acknowledge(result)
            }
            MessageType::Output => match self.runtime.fetch_output() {
                Ok(output) => self.protocol.request_success(&output),
                Err(e) => {
                    tracing::warn!("No output available: {}", e);
                    self.protocol.request_failure()
                }
            },
            MessageType::Stats => {
                let stats = self.runtime.statistics();
                match stats.to_json_vec() {
                    Ok(json) => self.protocol.request_success(&json),
                    Err(e) => {
                        tracing::warn!("Failed to serialize statistics: {}", e);
                        self.protocol.request_failure()
                    }
                }
            }
            MessageType::Ok | MessageType::Error => {
                tracing::warn!(
                    "Unexpected {:?} outside a pending exchange",
                    message.message_type
                );
                Ok(())
            }
        }
    }

    /// Map a runtime result onto an OK or ERROR reply
    fn acknowledge(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => self.protocol.request_success(&[]),
            Err(e) => {
                tracing::warn!("Runtime rejected request: {}", e);
                self.protocol.request_failure()
            }
        }
    }
}
