//! Frame codec
//!
//! Resolves frame boundaries in a raw byte stream. Encoding prepends a
//! 4-byte length prefix; decoding accumulates partial reads until complete
//! frames can be sliced off. Both directions are independent of sockets.

use bytes::{Buf, BytesMut};

use crate::config::Endianness;
use crate::protocol::status::ServerStatus;

/// Size of the frame length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Encode one payload as a wire frame: `[4-byte length][payload]`
///
/// The prefix counts payload bytes only. No upper bound is enforced here:
/// whole model files travel as a single frame.
pub fn encode_frame(payload: &[u8], endianness: Endianness) -> Vec<u8> {
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&endianness.encode_u32(payload.len() as u32));
    frame.extend_from_slice(payload);
    frame
}

/// Accumulates received bytes and assembles complete frames
///
/// Partial frames are retained across calls and never discarded; a frame
/// split at any byte boundary decodes once the remainder arrives.
#[derive(Debug)]
pub struct FrameAccumulator {
    /// Bytes received but not yet assembled into complete frames
    buffer: BytesMut,

    /// Byte order of the length prefix
    endianness: Endianness,
}

impl FrameAccumulator {
    /// Create an empty accumulator
    pub fn new(endianness: Endianness) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            endianness,
        }
    }

    /// Number of buffered bytes not yet assembled into a frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Append incoming bytes and slice off every complete frame
    ///
    /// Returns `Nothing` while no frame is complete, or `DataReady` with
    /// all fully-decoded frames in arrival order. Never blocks.
    pub fn feed(&mut self, incoming: &[u8]) -> (ServerStatus, Option<Vec<Vec<u8>>>) {
        self.buffer.extend_from_slice(incoming);

        let mut frames = Vec::new();
        loop {
            if self.buffer.len() < LENGTH_PREFIX_SIZE {
                break;
            }

            let prefix = [
                self.buffer[0],
                self.buffer[1],
                self.buffer[2],
                self.buffer[3],
            ];
            let frame_len = self.endianness.decode_u32(prefix) as usize;

            if self.buffer.len() - LENGTH_PREFIX_SIZE < frame_len {
                break;
            }

            self.buffer.advance(LENGTH_PREFIX_SIZE);
            let payload = self.buffer.split_to(frame_len);
            frames.push(payload.to_vec());
        }

        if frames.is_empty() {
            (ServerStatus::Nothing, None)
        } else {
            (ServerStatus::DataReady, Some(frames))
        }
    }
}
