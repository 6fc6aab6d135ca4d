//! Configuration for benchwire
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::BenchwireError;

/// Byte order used for the 4-byte frame length prefix and the 2-byte
/// message type.
///
/// Both ends of a connection must agree on this out-of-band: the wire
/// format carries no magic bytes, so a mismatch silently misparses
/// lengths and message types rather than producing a detectable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Big-endian (network byte order)
    Big,

    /// Little-endian (default, matches most benchmark targets)
    #[default]
    Little,
}

impl Endianness {
    /// Encode a u32 in this byte order
    pub fn encode_u32(self, value: u32) -> [u8; 4] {
        match self {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    /// Decode a u32 from this byte order
    pub fn decode_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endianness::Big => u32::from_be_bytes(bytes),
            Endianness::Little => u32::from_le_bytes(bytes),
        }
    }

    /// Encode a u16 in this byte order
    pub fn encode_u16(self, value: u16) -> [u8; 2] {
        match self {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    /// Decode a u16 from this byte order
    pub fn decode_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endianness::Big => u16::from_be_bytes(bytes),
            Endianness::Little => u16::from_le_bytes(bytes),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Big => write!(f, "big"),
            Endianness::Little => write!(f, "little"),
        }
    }
}

impl FromStr for Endianness {
    type Err = BenchwireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "big" => Ok(Endianness::Big),
            "little" => Ok(Endianness::Little),
            other => Err(BenchwireError::Config(format!(
                "Unknown endianness '{}' (expected 'big' or 'little')",
                other
            ))),
        }
    }
}

/// Main configuration for a benchwire endpoint (tester or runner)
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Address of the target device (runner binds it, tester connects to it)
    pub host: String,

    /// TCP port of the target device
    pub port: u16,

    /// Byte order for length prefixes and message types (must match on
    /// both ends)
    pub endianness: Endianness,

    // -------------------------------------------------------------------------
    // Polling Configuration
    // -------------------------------------------------------------------------
    /// Max bytes pulled from the socket per read attempt
    pub packet_size: usize,

    /// Upper bound of one multiplexer wait (milliseconds)
    pub poll_timeout_ms: u64,

    /// Sleep between readiness probes within one wait (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 12345,
            endianness: Endianness::Little,
            packet_size: 4096,
            poll_timeout_ms: 1000,
            poll_interval_ms: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Socket address string ("host:port")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the target host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the target port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the wire byte order
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.config.endianness = endianness;
        self
    }

    /// Set the per-read packet size (in bytes)
    pub fn packet_size(mut self, size: usize) -> Self {
        self.config.packet_size = size;
        self
    }

    /// Set the multiplexer wait timeout (in milliseconds)
    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.config.poll_timeout_ms = ms;
        self
    }

    /// Set the readiness probe interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
