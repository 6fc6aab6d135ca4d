//! Protocol Module
//!
//! Defines the wire format exchanged between tester and runner.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Length (4)   │         Payload             │
//! └──────────────┴─────────────────────────────┘
//! ```
//! The length prefix counts payload bytes only and uses the connection's
//! configured endianness. A zero-length frame is a valid bodyless
//! acknowledgement.
//!
//! ## Message Payload
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Type (2)     │           Body              │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Message Types
//! - 0: OK      - confirmation, body optional
//! - 1: ERROR   - failure, bodyless
//! - 2: DATA    - input tensor upload, body = raw tensor bytes
//! - 3: MODEL   - model upload, body = raw model file bytes
//! - 4: PROCESS - trigger inference, bodyless
//! - 5: OUTPUT  - request inference result
//! - 6: STATS   - request statistics, reply body = UTF-8 JSON
//! - 7: IOSPEC  - input/output specification upload, body = JSON

mod framing;
mod message;
mod status;

pub use framing::{encode_frame, FrameAccumulator, LENGTH_PREFIX_SIZE};
pub use message::{Message, MessageType, MESSAGE_TYPE_SIZE};
pub use status::{PollEvent, ServerStatus};
