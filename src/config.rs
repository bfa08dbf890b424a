//! Configuration for memtext
//!
//! Centralized client configuration with sensible defaults, plus the
//! endpoint type accepted by `connect`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::McError;

/// Default per-phase socket timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default idle time a released connection may sit in the pool
pub const DEFAULT_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of idle connections kept per endpoint
pub const DEFAULT_POOL_SIZE: usize = 30;

/// Default largest value accepted from a `VALUE` header (memcached's item size limit)
pub const DEFAULT_MAX_VALUE_LEN: usize = 1024 * 1024;

/// Default longest reply line, terminator included
pub const DEFAULT_MAX_LINE_LEN: usize = 8 * 1024;

/// Main configuration for a memtext client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Connect timeout (TCP only; Unix sockets connect without one)
    pub connect_timeout: Option<Duration>,

    /// Timeout for each blocking send
    pub send_timeout: Option<Duration>,

    /// Timeout for each blocking receive
    pub read_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Keep-alive Pool
    // -------------------------------------------------------------------------
    /// Idle timeout used by `set_keepalive()` (zero = never expire)
    pub keepalive_timeout: Duration,

    /// Pool size used by `set_keepalive()`
    pub pool_size: usize,

    // -------------------------------------------------------------------------
    // Reply Limits
    // -------------------------------------------------------------------------
    /// Largest value length a `VALUE` header may announce
    pub max_value_len: usize,

    /// Longest reply line read before the connection is dropped
    pub max_line_len: usize,

    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------
    /// How keys are escaped on the wire
    pub key_codec: KeyCodecKind,
}

/// Key escaping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCodecKind {
    /// Percent-escape every byte outside `[A-Za-z0-9-_.~]`
    #[default]
    Percent,

    /// Send keys as-is; the caller guarantees they are protocol-safe
    Raw,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_TIMEOUT),
            send_timeout: Some(DEFAULT_TIMEOUT),
            read_timeout: Some(DEFAULT_TIMEOUT),
            keepalive_timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            key_codec: KeyCodecKind::Percent,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Checks the values a builder cannot reject on its own.
    pub fn validate(&self) -> Result<(), McError> {
        if self.pool_size == 0 {
            return Err(McError::Config("pool_size must be at least 1".to_string()));
        }
        if self.max_line_len == 0 {
            return Err(McError::Config("max_line_len must be at least 1".to_string()));
        }
        for (name, timeout) in [
            ("connect_timeout", self.connect_timeout),
            ("send_timeout", self.send_timeout),
            ("read_timeout", self.read_timeout),
        ] {
            if timeout == Some(Duration::ZERO) {
                return Err(McError::Config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the same timeout for connect, send and read
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self.config.send_timeout = Some(timeout);
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout (`None` blocks indefinitely)
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the send timeout (`None` blocks indefinitely)
    pub fn send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.send_timeout = timeout;
        self
    }

    /// Set the read timeout (`None` blocks indefinitely)
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the default idle timeout for pooled connections
    pub fn keepalive_timeout(mut self, timeout: Duration) -> Self {
        self.config.keepalive_timeout = timeout;
        self
    }

    /// Set the default number of idle connections per endpoint
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the largest value length accepted in replies
    pub fn max_value_len(mut self, len: usize) -> Self {
        self.config.max_value_len = len;
        self
    }

    /// Set the longest reply line accepted
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    /// Set the key escaping strategy
    pub fn key_codec(mut self, kind: KeyCodecKind) -> Self {
        self.config.key_codec = kind;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// Where a memcached server listens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `host:port`, resolved at connect time
    Tcp { host: String, port: u16 },

    /// Path of a Unix domain socket
    Unix(PathBuf),
}

impl Endpoint {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Endpoint::Tcp {
            host: host.into(),
            port,
        }
    }

    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Endpoint::Unix(path.into())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } if host.contains(':') => write!(f, "[{}]:{}", host, port),
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

impl FromStr for Endpoint {
    type Err = McError;

    /// Accepts `host:port`, `[v6addr]:port` or `unix:/path/to/socket`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(McError::InvalidAddress(s.to_string()));
            }
            return Ok(Endpoint::unix(path));
        }

        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| McError::InvalidAddress(s.to_string()))?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(McError::InvalidAddress(s.to_string()));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| McError::InvalidAddress(s.to_string()))?;

        Ok(Endpoint::tcp(host, port))
    }
}
