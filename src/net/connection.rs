//! Connection Handler
//!
//! Owns one peer socket and its frame accumulation buffer. A connection is
//! bound to exactly one thread; once the peer disconnects it must be
//! dropped, never reused.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Endianness;
use crate::error::{BenchwireError, Result};
use crate::protocol::{encode_frame, FrameAccumulator, PollEvent, ServerStatus};

/// Pause between retries when a nonblocking write would block
const WRITE_RETRY_DELAY: Duration = Duration::from_millis(1);

/// A single logical peer-to-peer channel
pub struct Connection {
    /// The bound socket, in nonblocking mode
    stream: TcpStream,

    /// Bytes received but not yet assembled into complete frames
    accumulator: FrameAccumulator,

    /// Byte order of the wire format
    endianness: Endianness,

    /// Max bytes pulled per read attempt
    packet_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Take ownership of a connected socket
    ///
    /// Switches the socket to nonblocking mode and disables Nagle's
    /// algorithm for low latency.
    pub fn new(stream: TcpStream, endianness: Endianness, packet_size: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;

        Ok(Self {
            stream,
            accumulator: FrameAccumulator::new(endianness),
            endianness,
            packet_size,
            peer_addr,
        })
    }

    /// Send one payload as a length-prefixed frame
    ///
    /// Loops on partial writes until every byte is flushed or a write
    /// error occurs. On failure no assumption is made about how many
    /// bytes landed; the caller must treat the stream as broken.
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<()> {
        let packet = encode_frame(payload, self.endianness);

        let mut written = 0;
        while written < packet.len() {
            match self.stream.write(&packet[written..]) {
                Ok(0) => {
                    return Err(BenchwireError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "socket closed during write",
                    )));
                }
                Ok(n) => written += n,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(WRITE_RETRY_DELAY);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Write to {} failed: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Attempt one nonblocking read and assemble frames
    ///
    /// - no data pending yields `Nothing`
    /// - a zero-length read means the peer closed; the connection reports
    ///   `ClientDisconnected` and must not be used again
    /// - transport errors are folded into `ClientDisconnected` as well:
    ///   the channel is unusable either way
    pub fn try_receive(&mut self) -> PollEvent {
        let mut chunk = vec![0u8; self.packet_size];

        match self.stream.read(&mut chunk) {
            Ok(0) => {
                tracing::info!("Peer {} disconnected", self.peer_addr);
                PollEvent::from_status(ServerStatus::ClientDisconnected)
            }
            Ok(n) => {
                let (status, frames) = self.accumulator.feed(&chunk[..n]);
                PollEvent { status, frames }
            }
            Err(ref e)
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted =>
            {
                PollEvent::nothing()
            }
            Err(e) => {
                tracing::warn!("Read from {} failed: {}", self.peer_addr, e);
                PollEvent::from_status(ServerStatus::ClientDisconnected)
            }
        }
    }

    /// Number of buffered bytes awaiting frame completion
    pub fn pending(&self) -> usize {
        self.accumulator.pending()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
