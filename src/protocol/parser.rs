//! Response parser
//!
//! One reader per command family. Each consumes exactly the reply that
//! belongs to the command just sent, so the connection stays framed for the
//! next request. Transport failures are returned as soon as they happen.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::{trace, warn};

use super::key::KeyCodec;
use super::response::{Item, Reply, Status, ValueHeader};
use crate::error::{McError, Result};
use crate::network::Transport;

/// Length of the `\r\n` that trails every data block
const DATA_TRAILER: usize = 2;

// =============================================================================
// Value Fetches
// =============================================================================

/// Reply to a single-key get/gets: `END` (miss) or one value block then `END`.
///
/// A value longer than `max_value_len`, or anything but `END` after the
/// value, is `McError::Framing`: unread reply bytes may remain.
pub fn read_value<T>(transport: &mut T, max_value_len: usize) -> Result<Option<Item>>
where
    T: Transport + ?Sized,
{
    let line = transport.receive_line()?;
    let header = match Reply::classify(&line) {
        Reply::Terminator => {
            trace!("miss");
            return Ok(None);
        }
        Reply::ValueHeader(header) => header,
        _ => return Err(McError::reply(&line)),
    };
    let item = read_data_block(transport, &header, &line, max_value_len)?;

    let line = transport.receive_line()?;
    match Reply::classify(&line) {
        Reply::Terminator => Ok(Some(item)),
        _ => Err(McError::framing(&line)),
    }
}

/// Reply to a multi-key get/gets: value blocks until `END`.
///
/// Lines that are not value headers are skipped. The map is keyed by the
/// unescaped key; keys the server did not return are simply absent.
pub fn read_values<T>(
    transport: &mut T,
    codec: &dyn KeyCodec,
    max_value_len: usize,
) -> Result<HashMap<Vec<u8>, Item>>
where
    T: Transport + ?Sized,
{
    let mut items = HashMap::new();
    loop {
        let line = transport.receive_line()?;
        match Reply::classify(&line) {
            Reply::Terminator => break,
            Reply::ValueHeader(header) => {
                let item = read_data_block(transport, &header, &line, max_value_len)?;
                let key = codec.unescape(header.key).into_owned();
                items.insert(key, item);
            }
            _ => {
                warn!(line = %String::from_utf8_lossy(&line), "skipping unexpected line in value stream");
            }
        }
    }
    trace!(hits = items.len(), "multi fetch drained");
    Ok(items)
}

/// Reads `len` data bytes plus the trailing CRLF in one fixed-size frame.
///
/// The length is checked against `max_value_len` before anything is
/// allocated; `line` is the header, returned as the error on rejection.
fn read_data_block<T>(
    transport: &mut T,
    header: &ValueHeader<'_>,
    line: &[u8],
    max_value_len: usize,
) -> Result<Item>
where
    T: Transport + ?Sized,
{
    if header.len > max_value_len {
        warn!(len = header.len, max_value_len, "value length over limit");
        return Err(McError::framing(line));
    }
    let frame = header
        .len
        .checked_add(DATA_TRAILER)
        .ok_or_else(|| McError::framing(line))?;
    let mut data = transport.receive_exact(frame)?;
    data.truncate(header.len);
    Ok(Item {
        value: Bytes::from(data),
        flags: header.flags,
        cas: header.cas,
    })
}

// =============================================================================
// Single-line Replies
// =============================================================================

/// Succeeds iff the reply line is exactly `expected`; any other line is the error.
pub fn expect_status<T>(transport: &mut T, expected: Status) -> Result<()>
where
    T: Transport + ?Sized,
{
    let line = transport.receive_line()?;
    match Reply::classify(&line) {
        Reply::Status(status) if status == expected => Ok(()),
        _ => Err(McError::reply(&line)),
    }
}

/// Reply to incr/decr: the new counter value.
///
/// Counters are 64-bit on the server; a digit line that does not fit a
/// `u64` is returned as a protocol error with the line verbatim.
pub fn read_counter<T>(transport: &mut T) -> Result<u64>
where
    T: Transport + ?Sized,
{
    let line = transport.receive_line()?;
    match Reply::classify(&line) {
        Reply::Numeric(value) => Ok(value),
        _ => Err(McError::reply(&line)),
    }
}

/// Reply to `version`: the text after `VERSION `.
pub fn read_version<T>(transport: &mut T) -> Result<String>
where
    T: Transport + ?Sized,
{
    let line = transport.receive_line()?;
    match Reply::classify(&line) {
        Reply::Version(version) => Ok(String::from_utf8_lossy(version).into_owned()),
        _ => Err(McError::reply(&line)),
    }
}

// =============================================================================
// Line Collections
// =============================================================================

/// Reply to `stats`: every line up to `END`, in order.
///
/// A line containing `ERROR` ends the read with that line as the error and
/// discards what was collected.
pub fn read_stat_lines<T>(transport: &mut T) -> Result<Vec<String>>
where
    T: Transport + ?Sized,
{
    let mut lines = Vec::new();
    loop {
        let line = transport.receive_line()?;
        if let Reply::Terminator = Reply::classify(&line) {
            return Ok(lines);
        }
        if contains(&line, b"ERROR") {
            return Err(McError::reply(&line));
        }
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// `STAT <name> <value>` split into its two fields
pub fn parse_stat_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("STAT ")?;
    rest.split_once(' ')
}

