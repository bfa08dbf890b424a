//! Protocol Module
//!
//! Encoding of requests and parsing of replies for the memcached text
//! protocol.
//!
//! ## Framing
//! ```text
//! request:  <verb> <args...>\r\n[<data>\r\n]
//! reply:    <line>\r\n
//!           VALUE <key> <flags> <bytes>\r\n<data>\r\n ... END\r\n
//! ```
//!
//! Data blocks are length-framed: the parser never scans them for `\r\n`,
//! so values may contain any bytes.

mod codec;
mod command;
mod key;
mod parser;
mod response;

pub use codec::{encode_command, encode_command_into, CRLF};
pub use command::{Command, StoreVerb};
pub use key::{KeyCodec, PercentCodec, RawCodec};
pub use parser::{
    expect_status, parse_stat_line, read_counter, read_stat_lines, read_value, read_values,
    read_version,
};
pub use response::{Item, Reply, Status, ValueHeader};
