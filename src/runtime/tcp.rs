//! TCP transport
//!
//! The socket-based `RuntimeProtocol` implementation. The server role
//! binds a listening socket and accepts at most one peer at a time; the
//! client role connects and drives exchanges over the single connection.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use crate::config::{Config, Endianness};
use crate::error::{BenchwireError, Result};
use crate::net::{Connection, Poller};
use crate::protocol::{Message, PollEvent, ServerStatus};
use crate::runtime::RuntimeProtocol;

/// Runtime protocol over TCP sockets
pub struct TcpProtocol {
    config: Config,
    poller: Poller,

    /// Listening socket, present only in the server role
    listener: Option<TcpListener>,

    /// The single active peer
    connection: Option<Connection>,
}

impl TcpProtocol {
    /// Create an unconnected endpoint from configuration
    pub fn new(config: Config) -> Self {
        let poller = Poller::new(
            Duration::from_millis(config.poll_timeout_ms),
            Duration::from_millis(config.poll_interval_ms),
        );

        Self {
            config,
            poller,
            listener: None,
            connection: None,
        }
    }

    /// Address the listening socket is bound to (server role only)
    ///
    /// Useful when the configured port is 0 and the OS picked one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// True while a peer is bound
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// One accept attempt on the listening socket
    ///
    /// A second peer while one is bound is rejected outright: its socket
    /// is dropped with no handshake and the active session is unaffected.
    fn probe_accept(&mut self) -> Option<PollEvent> {
        let listener = self.listener.as_ref()?;

        match listener.accept() {
            Ok((stream, addr)) => {
                if self.connection.is_some() {
                    tracing::debug!("Connection already established, rejecting {}", addr);
                    drop(stream);
                    return Some(PollEvent::from_status(ServerStatus::ClientIgnored));
                }

                match Connection::new(stream, self.config.endianness, self.config.packet_size) {
                    Ok(connection) => {
                        tracing::info!("Connected client {}", addr);
                        self.connection = Some(connection);
                        Some(PollEvent::from_status(ServerStatus::ClientConnected))
                    }
                    Err(e) => {
                        tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                        Some(PollEvent::from_status(ServerStatus::ClientIgnored))
                    }
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                tracing::warn!("Accept failed: {}", e);
                None
            }
        }
    }

    /// One read attempt on the peer socket
    fn probe_receive(&mut self) -> Option<PollEvent> {
        let event = self.connection.as_mut()?.try_receive();

        match event.status {
            ServerStatus::Nothing => None,
            ServerStatus::ClientDisconnected => {
                self.release_peer();
                Some(event)
            }
            _ => Some(event),
        }
    }

    /// Drop the peer slot. No-op when no peer is bound.
    fn release_peer(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::debug!("Releasing connection to {}", connection.peer_addr());
        }
    }
}

impl RuntimeProtocol for TcpProtocol {
    fn initialize_server(&mut self) -> Result<()> {
        let listener = TcpListener::bind(self.config.addr())?;
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);
        self.listener = Some(listener);
        Ok(())
    }

    fn initialize_client(&mut self) -> Result<()> {
        let stream = TcpStream::connect(self.config.addr())?;
        tracing::info!("Connected to {}", self.config.addr());
        self.connection = Some(Connection::new(
            stream,
            self.config.endianness,
            self.config.packet_size,
        )?);
        Ok(())
    }

    fn wait_for_activity(&mut self) -> Vec<PollEvent> {
        let poller = self.poller;
        poller.wait(|| {
            let mut events = Vec::new();
            if let Some(event) = self.probe_accept() {
                events.push(event);
            }
            if let Some(event) = self.probe_receive() {
                events.push(event);
            }
            events
        })
    }

    fn send_message(&mut self, message: &Message) -> Result<()> {
        let payload = message.to_bytes(self.config.endianness);

        match self.connection.as_mut() {
            Some(connection) => connection.send_frame(&payload),
            None => Err(BenchwireError::NotConnected),
        }
    }

    fn disconnect(&mut self) {
        self.release_peer();
        if self.listener.take().is_some() {
            tracing::debug!("Closed listening socket");
        }
    }

    fn disconnect_peer(&mut self) {
        self.release_peer();
    }

    fn endianness(&self) -> Endianness {
        self.config.endianness
    }
}
