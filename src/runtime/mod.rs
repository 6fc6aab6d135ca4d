//! Runtime Protocol Module
//!
//! The exchange sequence between tester and runner, layered on top of the
//! framing and connection primitives:
//!
//! ```text
//! upload model -> upload input -> request processing
//!              -> download output -> download statistics
//! ```

mod protocol;
mod runner;
mod tcp;

pub use protocol::RuntimeProtocol;
pub use runner::{ModelRuntime, Runner};
pub use tcp::TcpProtocol;
