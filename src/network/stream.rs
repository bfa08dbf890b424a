//! Stream Transport
//!
//! TCP or Unix-socket connection with buffered reads, direct writes and an
//! optional keep-alive pool behind it.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;

use super::pool::{ConnectionPool, IdleStream};
use super::transport::{ConnectOptions, Transport};
use crate::config::Endpoint;

/// Raw socket under a `StreamTransport`
#[derive(Debug)]
pub(crate) enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Stream {
    fn open(endpoint: &Endpoint, connect_timeout: Option<Duration>) -> io::Result<Self> {
        match endpoint {
            Endpoint::Tcp { host, port } => {
                let stream = connect_tcp(host, *port, connect_timeout)?;
                // No Nagle delay on small command writes.
                stream.set_nodelay(true)?;
                Ok(Stream::Tcp(stream))
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => Ok(Stream::Unix(UnixStream::connect(path)?)),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix sockets are not supported on this platform",
            )),
        }
    }

    fn set_timeouts(&self, send: Option<Duration>, read: Option<Duration>) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => {
                s.set_write_timeout(send)?;
                s.set_read_timeout(read)
            }
            #[cfg(unix)]
            Stream::Unix(s) => {
                s.set_write_timeout(send)?;
                s.set_read_timeout(read)
            }
        }
    }

    pub(crate) fn shutdown(&self) -> io::Result<()> {
        let result = match self {
            Stream::Tcp(s) => s.shutdown(Shutdown::Both),
            #[cfg(unix)]
            Stream::Unix(s) => s.shutdown(Shutdown::Both),
        };
        match result {
            // Peer already hung up; nothing left to close.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Stream::Unix(s) => s.flush(),
        }
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{}:{} resolved to no addresses", host, port),
        )
    }))
}

// =============================================================================
// StreamTransport
// =============================================================================

/// Socket-backed transport
pub struct StreamTransport {
    /// Buffered reader; writes go straight to the inner stream
    reader: BufReader<Stream>,

    /// Where this stream is connected, also the pool key
    endpoint: Endpoint,

    /// Pool to park the stream in on `release`
    pool: Option<Arc<ConnectionPool>>,

    /// Times this stream came out of the pool
    reused: u32,

    /// Longest reply line accepted
    max_line_len: usize,
}

impl StreamTransport {
    /// Open a connection, reusing an idle pooled stream for the same endpoint
    /// when one is available.
    pub fn connect(
        endpoint: &Endpoint,
        options: &ConnectOptions,
        pool: Option<Arc<ConnectionPool>>,
    ) -> io::Result<Self> {
        if let Some(idle) = pool.as_ref().and_then(|p| p.checkout(endpoint)) {
            idle.reader
                .get_ref()
                .set_timeouts(options.send_timeout, options.read_timeout)?;
            tracing::debug!(%endpoint, reused = idle.reused + 1, "reusing pooled connection");
            return Ok(Self {
                reader: idle.reader,
                endpoint: endpoint.clone(),
                pool,
                reused: idle.reused + 1,
                max_line_len: options.max_line_len,
            });
        }

        let stream = Stream::open(endpoint, options.connect_timeout)?;
        stream.set_timeouts(options.send_timeout, options.read_timeout)?;
        tracing::debug!(%endpoint, "connected");

        Ok(Self {
            reader: BufReader::new(stream),
            endpoint: endpoint.clone(),
            pool,
            reused: 0,
            max_line_len: options.max_line_len,
        })
    }

    /// Endpoint this transport is connected to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Transport for StreamTransport {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let stream = self.reader.get_mut();
        stream.write_all(buf)?;
        stream.flush()?;
        Ok(buf.len())
    }

    fn receive_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::with_capacity(64);
        let limit = self.max_line_len as u64;
        let n = self.reader.by_ref().take(limit).read_until(b'\n', &mut line)?;
        if line.last() != Some(&b'\n') && n as u64 == limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("reply line longer than {} bytes", self.max_line_len),
            ));
        }
        if n == 0 || line.last() != Some(&b'\n') {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before end of line",
            ));
        }
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(line)
    }

    fn receive_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut data = vec![0u8; n];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    fn set_timeouts(&mut self, send: Option<Duration>, read: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_timeouts(send, read)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        tracing::debug!(endpoint = %self.endpoint, "closing connection");
        self.reader.get_ref().shutdown()
    }

    fn release(self: Box<Self>, idle_timeout: Duration, pool_size: usize) -> io::Result<()> {
        let this = *self;
        let pool = match this.pool {
            Some(pool) => pool,
            None => {
                tracing::debug!(endpoint = %this.endpoint, "no pool attached, closing");
                return this.reader.get_ref().shutdown();
            }
        };
        if !this.reader.buffer().is_empty() {
            // Unread reply bytes would be misread by the next user.
            tracing::warn!(endpoint = %this.endpoint, "unread data on released connection, closing");
            return this.reader.get_ref().shutdown();
        }

        pool.checkin(
            this.endpoint,
            IdleStream {
                reader: this.reader,
                reused: this.reused,
            },
            idle_timeout,
            pool_size,
        )
    }

    fn reused_count(&self) -> io::Result<u32> {
        Ok(self.reused)
    }
}
