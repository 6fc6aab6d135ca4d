//! Message definitions
//!
//! Typed messages carried inside frames. The first two bytes of a protocol
//! frame's payload hold the message type; the rest is the message body.

use crate::config::Endianness;
use crate::error::{BenchwireError, Result};

/// Size of the message type field in bytes
pub const MESSAGE_TYPE_SIZE: usize = 2;

/// Message types
///
/// Transmitted as a 2-byte unsigned integer; the wire value equals the
/// declaration order and must stay stable across tester and runner builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MessageType {
    Ok = 0,
    Error = 1,
    Data = 2,
    Model = 3,
    Process = 4,
    Output = 5,
    Stats = 6,
    IoSpec = 7,
}

impl MessageType {
    /// Decode a message type from its wire value
    ///
    /// An unrecognized value is a fatal decode error, never silently
    /// ignored: it means the stream is desynchronized.
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 => Ok(MessageType::Ok),
            1 => Ok(MessageType::Error),
            2 => Ok(MessageType::Data),
            3 => Ok(MessageType::Model),
            4 => Ok(MessageType::Process),
            5 => Ok(MessageType::Output),
            6 => Ok(MessageType::Stats),
            7 => Ok(MessageType::IoSpec),
            other => Err(BenchwireError::Decode(format!(
                "Unknown message type: {}",
                other
            ))),
        }
    }

    /// Wire value of this message type
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Encode this type in the connection's byte order
    pub fn to_bytes(self, endianness: Endianness) -> [u8; MESSAGE_TYPE_SIZE] {
        endianness.encode_u16(self.as_u16())
    }
}

/// A typed protocol message: type tag plus opaque body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The message type
    pub message_type: MessageType,

    /// Message body (opaque to the protocol)
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message with a body
    pub fn new(message_type: MessageType, payload: Vec<u8>) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Create a bodyless message (PROCESS, OUTPUT, STATS requests, ERROR)
    pub fn bodyless(message_type: MessageType) -> Self {
        Self::new(message_type, Vec::new())
    }

    /// Encode as a frame payload: `[2-byte type][body]`
    pub fn to_bytes(&self, endianness: Endianness) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MESSAGE_TYPE_SIZE + self.payload.len());
        bytes.extend_from_slice(&self.message_type.to_bytes(endianness));
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse a decoded frame payload into a message
    pub fn parse(frame: &[u8], endianness: Endianness) -> Result<Self> {
        if frame.len() < MESSAGE_TYPE_SIZE {
            return Err(BenchwireError::Decode(format!(
                "Frame too short for message type: {} bytes",
                frame.len()
            )));
        }

        let raw = endianness.decode_u16([frame[0], frame[1]]);
        let message_type = MessageType::from_u16(raw)?;
        let payload = frame[MESSAGE_TYPE_SIZE..].to_vec();

        Ok(Self {
            message_type,
            payload,
        })
    }
}
