//! Keep-alive Pool
//!
//! Idle connections parked by `Transport::release`, keyed by endpoint.
//!
//! ## Rules
//! - Checkout hands out the most recently parked stream whose idle deadline
//!   has not passed; expired streams are closed on the way.
//! - Checkin beyond `pool_size` closes the least recently parked stream.
//! - An idle timeout of zero, or one too large to represent, never expires.

use std::collections::{HashMap, VecDeque};
use std::io::{self, BufReader};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::stream::Stream;
use crate::config::Endpoint;

/// A stream waiting in the pool
pub(crate) struct IdleStream {
    pub(crate) reader: BufReader<Stream>,
    pub(crate) reused: u32,
}

struct Parked {
    stream: IdleStream,
    expires_at: Option<Instant>,
}

impl Parked {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    fn close(self) {
        if let Err(e) = self.stream.reader.get_ref().shutdown() {
            tracing::debug!(error = %e, "error closing pooled connection");
        }
    }
}

/// Shared pool of idle connections
///
/// Share it between clients with `Arc`; each client that connects to an
/// endpoint first looks here for a stream to reuse.
#[derive(Default)]
pub struct ConnectionPool {
    idle: Mutex<HashMap<Endpoint, VecDeque<Parked>>>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of idle streams currently parked for `endpoint`
    pub fn idle_count(&self, endpoint: &Endpoint) -> usize {
        self.idle.lock().get(endpoint).map_or(0, VecDeque::len)
    }

    /// Close every parked stream
    pub fn clear(&self) {
        let drained: Vec<Parked> = self
            .idle
            .lock()
            .drain()
            .flat_map(|(_, queue)| queue)
            .collect();
        for parked in drained {
            parked.close();
        }
    }

    pub(crate) fn checkout(&self, endpoint: &Endpoint) -> Option<IdleStream> {
        let now = Instant::now();
        let mut expired = Vec::new();
        let found = {
            let mut idle = self.idle.lock();
            let queue = idle.get_mut(endpoint)?;
            let mut found = None;
            while let Some(parked) = queue.pop_back() {
                if parked.expired(now) {
                    expired.push(parked);
                } else {
                    found = Some(parked.stream);
                    break;
                }
            }
            found
        };

        if !expired.is_empty() {
            tracing::debug!(%endpoint, count = expired.len(), "evicting expired idle connections");
        }
        for parked in expired {
            parked.close();
        }
        found
    }

    pub(crate) fn checkin(
        &self,
        endpoint: Endpoint,
        stream: IdleStream,
        idle_timeout: Duration,
        pool_size: usize,
    ) -> io::Result<()> {
        if pool_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "pool size must be at least 1",
            ));
        }

        // Zero, or a timeout past the end of the clock, never expires.
        let expires_at = if idle_timeout.is_zero() {
            None
        } else {
            Instant::now().checked_add(idle_timeout)
        };

        let mut overflow = Vec::new();
        {
            let mut idle = self.idle.lock();
            let queue = idle.entry(endpoint.clone()).or_default();
            queue.push_back(Parked { stream, expires_at });
            while queue.len() > pool_size {
                if let Some(oldest) = queue.pop_front() {
                    overflow.push(oldest);
                }
            }
        }

        tracing::debug!(%endpoint, evicted = overflow.len(), "connection parked");
        for parked in overflow {
            parked.close();
        }
        Ok(())
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.clear();
    }
}
