//! Client Facade
//!
//! One `Client` owns at most one connection and runs one request at a time
//! on it: encode, send, then read exactly the reply that belongs to the
//! command.
//!
//! ## Lifecycle
//! - Constructed without a transport; every operation fails with
//!   `McError::NotInitialized` and does no I/O.
//! - `connect` attaches a transport.
//! - `close`, `set_keepalive` and any transport or framing error detach
//!   it again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::{ClientConfig, Endpoint};
use crate::error::{McError, Result};
use crate::network::{ConnectOptions, ConnectionPool, StreamTransport, Transport};
use crate::protocol::{self, encode_command, Command, Item, KeyCodec, Status, StoreVerb};

/// Blocking memcached text-protocol client over a single connection
pub struct Client {
    config: ClientConfig,
    pool: Arc<ConnectionPool>,
    codec: Arc<dyn KeyCodec>,
    transport: Option<Box<dyn Transport>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Client with the default configuration and a private pool
    pub fn new() -> Self {
        let config = ClientConfig::default();
        Self {
            codec: config.key_codec.codec(),
            config,
            pool: Arc::new(ConnectionPool::new()),
            transport: None,
        }
    }

    /// Client with a custom configuration and a private pool
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_pool(config, Arc::new(ConnectionPool::new()))
    }

    /// Client sharing `pool` with other clients
    pub fn with_pool(config: ClientConfig, pool: Arc<ConnectionPool>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec: config.key_codec.codec(),
            config,
            pool,
            transport: None,
        })
    }

    /// Replace the key codec
    pub fn set_key_codec(&mut self, codec: Arc<dyn KeyCodec>) {
        self.codec = codec;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Connect to `endpoint`, reusing a pooled stream when one is idle.
    ///
    /// On failure the previous state is left untouched. On success a
    /// previously attached transport is closed.
    pub fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        let options = ConnectOptions::from(&self.config);
        let transport = StreamTransport::connect(endpoint, &options, Some(Arc::clone(&self.pool)))?;
        self.attach(Box::new(transport));
        Ok(())
    }

    /// Attach an already-connected transport
    pub fn attach(&mut self, transport: Box<dyn Transport>) {
        if let Some(old) = self.transport.replace(transport) {
            if let Err(e) = old.close() {
                debug!(error = %e, "error closing replaced transport");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Close the connection. The client returns to the not-initialized state.
    pub fn close(&mut self) -> Result<()> {
        let transport = self.transport.take().ok_or(McError::NotInitialized)?;
        transport.close()?;
        Ok(())
    }

    /// Release the connection to the pool with the configured idle timeout
    /// and pool size.
    pub fn set_keepalive(&mut self) -> Result<()> {
        self.set_keepalive_with(self.config.keepalive_timeout, self.config.pool_size)
    }

    /// Release the connection to the pool. The client is detached either way.
    pub fn set_keepalive_with(&mut self, idle_timeout: Duration, pool_size: usize) -> Result<()> {
        let transport = self.transport.take().ok_or(McError::NotInitialized)?;
        debug!(?idle_timeout, pool_size, "releasing connection to pool");
        transport.release(idle_timeout, pool_size)?;
        Ok(())
    }

    /// Times the current connection was reused from the pool
    pub fn reused_count(&self) -> Result<u32> {
        let transport = self.transport.as_deref().ok_or(McError::NotInitialized)?;
        Ok(transport.reused_count()?)
    }

    /// Apply one timeout to send and read on the live connection
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.set_timeouts(Some(timeout), Some(timeout), Some(timeout))
    }

    /// Set per-phase timeouts. The connect timeout applies to the next connect.
    pub fn set_timeouts(
        &mut self,
        connect: Option<Duration>,
        send: Option<Duration>,
        read: Option<Duration>,
    ) -> Result<()> {
        let transport = self.transport.as_deref_mut().ok_or(McError::NotInitialized)?;
        transport.set_timeouts(send, read)?;
        self.config.connect_timeout = connect;
        self.config.send_timeout = send;
        self.config.read_timeout = read;
        Ok(())
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Fetch one key. `Ok(None)` is a miss.
    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Item>> {
        let codec = Arc::clone(&self.codec);
        let max_value_len = self.config.max_value_len;
        let command = Command::Get {
            keys: vec![codec.escape(key.as_ref())],
        };
        self.execute(&command, |t| protocol::read_value(t, max_value_len))
    }

    /// Fetch several keys in one round trip. Misses are absent from the map.
    pub fn get_multi<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<HashMap<Vec<u8>, Item>> {
        self.fetch_multi(keys, false)
    }

    /// Like `get`, with the CAS unique filled in.
    pub fn gets(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Item>> {
        let codec = Arc::clone(&self.codec);
        let max_value_len = self.config.max_value_len;
        let command = Command::Gets {
            keys: vec![codec.escape(key.as_ref())],
        };
        self.execute(&command, |t| protocol::read_value(t, max_value_len))
    }

    /// Like `get_multi`, with CAS uniques filled in.
    pub fn gets_multi<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<HashMap<Vec<u8>, Item>> {
        self.fetch_multi(keys, true)
    }

    fn fetch_multi<K: AsRef<[u8]>>(
        &mut self,
        keys: &[K],
        with_cas: bool,
    ) -> Result<HashMap<Vec<u8>, Item>> {
        if self.transport.is_none() {
            return Err(McError::NotInitialized);
        }
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let codec = Arc::clone(&self.codec);
        let max_value_len = self.config.max_value_len;
        let escaped = keys.iter().map(|k| codec.escape(k.as_ref())).collect();
        let command = if with_cas {
            Command::Gets { keys: escaped }
        } else {
            Command::Get { keys: escaped }
        };
        self.execute(&command, |t| protocol::read_values(t, codec.as_ref(), max_value_len))
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Store unconditionally.
    pub fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        self.store(StoreVerb::Set, key, value, exptime, flags)
    }

    /// Store only if the key does not exist.
    pub fn add(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        self.store(StoreVerb::Add, key, value, exptime, flags)
    }

    /// Store only if the key already exists.
    pub fn replace(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        self.store(StoreVerb::Replace, key, value, exptime, flags)
    }

    pub fn append(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        self.store(StoreVerb::Append, key, value, exptime, flags)
    }

    pub fn prepend(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        self.store(StoreVerb::Prepend, key, value, exptime, flags)
    }

    /// Run any storage verb. Succeeds only on `STORED`; any other reply
    /// (`NOT_STORED` included) comes back as `McError::Protocol`.
    pub fn store(
        &mut self,
        verb: StoreVerb,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Store {
            verb,
            key: codec.escape(key.as_ref()),
            flags,
            exptime,
            value: value.as_ref(),
        };
        self.execute(&command, |t| protocol::expect_status(t, Status::Stored))
    }

    /// Store only if nobody changed the item since `gets` returned `cas_unique`.
    pub fn cas(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        cas_unique: u64,
        exptime: u32,
        flags: u32,
    ) -> Result<()> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Cas {
            key: codec.escape(key.as_ref()),
            flags,
            exptime,
            value: value.as_ref(),
            cas_unique,
        };
        self.execute(&command, |t| protocol::expect_status(t, Status::Stored))
    }

    // =========================================================================
    // Other Item Commands
    // =========================================================================

    /// Delete a key, optionally with the legacy hold time.
    pub fn delete(&mut self, key: impl AsRef<[u8]>, time: Option<u32>) -> Result<()> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Delete {
            key: codec.escape(key.as_ref()),
            time,
        };
        self.execute(&command, |t| protocol::expect_status(t, Status::Deleted))
    }

    /// Increment a counter; returns the new value.
    ///
    /// The reply is parsed as a `u64`, the width of memcached counters. A
    /// digit line beyond that range comes back as `McError::Protocol`.
    pub fn incr(&mut self, key: impl AsRef<[u8]>, delta: u64) -> Result<u64> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Incr {
            key: codec.escape(key.as_ref()),
            delta,
        };
        self.execute(&command, |t| protocol::read_counter(t))
    }

    /// Decrement a counter; returns the new value. Same range as `incr`.
    pub fn decr(&mut self, key: impl AsRef<[u8]>, delta: u64) -> Result<u64> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Decr {
            key: codec.escape(key.as_ref()),
            delta,
        };
        self.execute(&command, |t| protocol::read_counter(t))
    }

    /// Update the expiration time of an existing item.
    pub fn touch(&mut self, key: impl AsRef<[u8]>, exptime: u32) -> Result<()> {
        let codec = Arc::clone(&self.codec);
        let command = Command::Touch {
            key: codec.escape(key.as_ref()),
            exptime,
        };
        self.execute(&command, |t| protocol::expect_status(t, Status::Touched))
    }

    // =========================================================================
    // Server Commands
    // =========================================================================

    /// Invalidate all items, now or after `time` seconds.
    pub fn flush_all(&mut self, time: Option<u32>) -> Result<()> {
        self.execute(&Command::FlushAll { time }, |t| {
            protocol::expect_status(t, Status::Ok)
        })
    }

    /// Raw stats lines in server order, `END` excluded.
    pub fn stats(&mut self, args: Option<&str>) -> Result<Vec<String>> {
        self.execute(&Command::Stats { args }, |t| protocol::read_stat_lines(t))
    }

    /// Server version string.
    pub fn version(&mut self) -> Result<String> {
        self.execute(&Command::Version, |t| protocol::read_version(t))
    }

    pub fn verbosity(&mut self, level: u32) -> Result<()> {
        self.execute(&Command::Verbosity { level }, |t| {
            protocol::expect_status(t, Status::Ok)
        })
    }

    /// Ask the server to close the connection. No reply is read; call
    /// `close` afterwards to drop the local end.
    pub fn quit(&mut self) -> Result<()> {
        self.execute(&Command::Quit, |_| Ok(()))
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    /// Send `command`, then run `read` against the same transport.
    ///
    /// A transport or framing error tears the connection down: its framing
    /// can no longer be trusted.
    fn execute<R, F>(&mut self, command: &Command<'_>, read: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Transport) -> Result<R>,
    {
        let transport = self.transport.as_deref_mut().ok_or(McError::NotInitialized)?;
        let buf = encode_command(command);
        trace!(verb = command.verb(), bytes = buf.len(), "sending command");

        let result = match transport.send(&buf) {
            Ok(_) => read(transport),
            Err(e) => Err(McError::Io(e)),
        };

        if let Err(ref e) = result {
            if e.breaks_framing() {
                self.teardown(e);
            } else {
                trace!(verb = command.verb(), error = %e, "command failed");
            }
        }
        result
    }

    fn teardown(&mut self, cause: &McError) {
        if let Some(transport) = self.transport.take() {
            warn!(error = %cause, "connection out of frame, closing");
            if let Err(e) = transport.close() {
                debug!(error = %e, "error closing failed transport");
            }
        }
    }
}
