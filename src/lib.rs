//! # memtext
//!
//! A blocking client for the memcached text protocol:
//! - Exact command encoding for every retrieval, storage and admin verb
//! - Length-framed value parsing, so values may hold any bytes
//! - Multi-key fetches drained to `END` before returning
//! - Percent-escaped keys, unescaped again in multi-get results
//! - Keep-alive pool for reusing idle connections
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Client (facade)                        │
//! │            not initialized  ⇄  connected                     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ Command                          │ reply lines / data
//!            ▼                                  ▲
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │ Command Encoder │                │ Response Parser │
//!   └────────┬────────┘                └────────┬────────┘
//!            │ bytes                            │
//!            ▼                                  │
//!   ┌──────────────────────────────────────────────────────┐
//!   │         Transport (TCP / Unix, keep-alive pool)       │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memtext::{Client, Endpoint};
//!
//! fn example() -> memtext::Result<()> {
//!     let mut client = Client::new();
//!     client.connect(&"127.0.0.1:11211".parse::<Endpoint>()?)?;
//!     client.set("dog", "32", 0, 0)?;
//!     let item = client.get("dog")?;
//!     assert_eq!(item.map(|i| i.value), Some("32".into()));
//!     client.set_keepalive()?;
//!     Ok(())
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod network;
pub mod protocol;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{McError, Result};
pub use config::{ClientConfig, Endpoint, KeyCodecKind};
pub use client::Client;
pub use network::{ConnectionPool, Transport};
pub use protocol::{Item, KeyCodec, StoreVerb};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memtext
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
