//! Readiness polling
//!
//! Bounded wait over the registered socket set. Sockets run in nonblocking
//! mode, so readiness is discovered by probing: each round attempts an
//! accept on the listening socket and a read on the peer socket, and the
//! transport's probe closure dispatches whichever succeeded.

use std::time::{Duration, Instant};

use crate::protocol::PollEvent;

/// Drives probe rounds under a bounded timeout
///
/// A wait suspends only between rounds, for `interval` at a time, so a
/// caller loop remains responsive to cancellation between polls.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    /// Upper bound of one wait
    timeout: Duration,

    /// Sleep between probe rounds
    interval: Duration,
}

impl Poller {
    /// Create a poller with the given wait timeout and probe interval
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Run probe rounds until an event fires or the timeout elapses
    ///
    /// Always yields at least one event: on timeout a single `Nothing`
    /// result is returned so higher layers can poll in a bounded loop
    /// without busy-spinning.
    pub fn wait<F>(&self, mut probe: F) -> Vec<PollEvent>
    where
        F: FnMut() -> Vec<PollEvent>,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            let events = probe();
            if !events.is_empty() {
                return events;
            }

            let now = Instant::now();
            if now >= deadline {
                return vec![PollEvent::nothing()];
            }

            std::thread::sleep(self.interval.min(deadline - now));
        }
    }
}
