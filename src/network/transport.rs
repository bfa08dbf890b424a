//! Transport abstraction
//!
//! The byte stream the client talks through. `StreamTransport` is the
//! TCP/Unix implementation; anything else (test doubles, proxies) plugs in
//! through the same trait.

use std::io;
use std::time::Duration;

use crate::config::{ClientConfig, DEFAULT_MAX_LINE_LEN};

/// Duplex stream with blocking-with-timeout semantics
pub trait Transport: Send {
    /// Write the whole buffer; returns the number of bytes written.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Read one line, without its terminator.
    fn receive_line(&mut self) -> io::Result<Vec<u8>>;

    /// Read exactly `n` bytes.
    fn receive_exact(&mut self, n: usize) -> io::Result<Vec<u8>>;

    /// Apply per-call timeouts to subsequent sends and receives.
    fn set_timeouts(&mut self, send: Option<Duration>, read: Option<Duration>) -> io::Result<()>;

    /// Close the underlying stream.
    fn close(self: Box<Self>) -> io::Result<()>;

    /// Hand the stream to the keep-alive pool instead of closing it.
    fn release(self: Box<Self>, idle_timeout: Duration, pool_size: usize) -> io::Result<()>;

    /// How many times this stream was taken out of the pool.
    fn reused_count(&self) -> io::Result<u32>;
}

/// Socket options applied when a stream is opened or taken from the pool
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    pub connect_timeout: Option<Duration>,
    pub send_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,

    /// Longest line `receive_line` accepts, terminator included
    pub max_line_len: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            send_timeout: None,
            read_timeout: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl From<&ClientConfig> for ConnectOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            send_timeout: config.send_timeout,
            read_timeout: config.read_timeout,
            max_line_len: config.max_line_len,
        }
    }
}
