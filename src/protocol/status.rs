//! Poll cycle results
//!
//! Transient outcomes of one I/O readiness round. Never persisted.

/// Outcome of a single readiness round on the server or client socket set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// No complete frame arrived within the wait
    Nothing,

    /// One or more complete frames were decoded
    DataReady,

    /// A new peer was accepted on the listening socket
    ClientConnected,

    /// A second peer attempted to connect while one is active; rejected
    ClientIgnored,

    /// The peer closed the connection (or a transport error occurred)
    ClientDisconnected,

    /// A received frame could not be decoded into a valid message
    DataInvalid,
}

/// One event yielded by a multiplexer wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEvent {
    /// Readiness outcome
    pub status: ServerStatus,

    /// Fully decoded frames, present only with `DataReady`
    pub frames: Option<Vec<Vec<u8>>>,
}

impl PollEvent {
    /// Event carrying a bare status
    pub fn from_status(status: ServerStatus) -> Self {
        Self {
            status,
            frames: None,
        }
    }

    /// The idle event returned when a wait times out
    pub fn nothing() -> Self {
        Self::from_status(ServerStatus::Nothing)
    }

    /// Event carrying decoded frames
    pub fn data_ready(frames: Vec<Vec<u8>>) -> Self {
        Self {
            status: ServerStatus::DataReady,
            frames: Some(frames),
        }
    }
}
