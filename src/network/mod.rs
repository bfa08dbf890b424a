//! Network Module
//!
//! Transport plumbing under the client.
//!
//! ## Architecture
//! - `Transport` trait: send / receive line / receive exact / close / release
//! - `StreamTransport`: buffered TCP or Unix socket
//! - `ConnectionPool`: idle streams kept alive between clients

mod pool;
mod stream;
mod transport;

pub use pool::ConnectionPool;
pub use stream::StreamTransport;
pub use transport::{ConnectOptions, Transport};
