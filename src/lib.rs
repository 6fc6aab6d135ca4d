//! # benchwire
//!
//! Runtime communication protocol for benchmarking ML inference on remote
//! targets:
//! - Length-prefixed, typed-message wire format
//! - Single-peer TCP transport with bounded, poll-driven waits
//! - Synchronous half-duplex exchange sequence (model, input, process,
//!   output, statistics)
//! - Additive measurement records carried as JSON
//!
//! The tester (client) pushes a compiled model and input tensors to the
//! runner (server), triggers inference, and retrieves outputs and
//! performance statistics. Payloads are opaque: benchwire never parses
//! model formats or tensor contents.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────┐        ┌─────────────────────────┐
//! │     Tester (client)     │        │     Runner (server)     │
//! │  upload / process /     │        │  dispatch to            │
//! │  download exchanges     │        │  ModelRuntime           │
//! └───────────┬─────────────┘        └───────────┬─────────────┘
//!             │          RuntimeProtocol         │
//! ┌───────────▼──────────────────────────────────▼─────────────┐
//! │                     TcpProtocol                            │
//! │        (single peer, poll-driven readiness)                │
//! └───────────┬──────────────────────────────────┬─────────────┘
//!             │                                  │
//!      ┌──────▼──────┐                    ┌──────▼──────┐
//!      │ Connection  │                    │   Poller    │
//!      │ (buffering) │                    │ (bounded    │
//!      │             │                    │  waits)     │
//!      └──────┬──────┘                    └─────────────┘
//!             │
//!      ┌──────▼──────┐
//!      │   Framing   │
//!      │   Codec     │
//!      └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod measurements;
pub mod net;
pub mod protocol;
pub mod runtime;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, Endianness};
pub use error::{BenchwireError, Result};
pub use measurements::Measurements;
pub use protocol::{Message, MessageType, PollEvent, ServerStatus};
pub use runtime::{ModelRuntime, Runner, RuntimeProtocol, TcpProtocol};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of benchwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
