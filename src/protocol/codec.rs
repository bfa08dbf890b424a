//! Command encoder
//!
//! Builds the exact bytes for each request.
//!
//! ## Wire Format
//!
//! ```text
//! get <key>*\r\n
//! gets <key>*\r\n
//! <set|add|replace|append|prepend> <key> <flags> <exptime> <bytes>\r\n<data>\r\n
//! cas <key> <flags> <exptime> <bytes> <cas unique>\r\n<data>\r\n
//! delete <key> [<time>]\r\n
//! <incr|decr> <key> <delta>\r\n
//! touch <key> <exptime>\r\n
//! flush_all [<time>]\r\n
//! stats [<args>]\r\n
//! version\r\n
//! verbosity <level>\r\n
//! quit\r\n
//! ```
//!
//! Numbers are written in decimal. Ranges are not checked here; the server
//! rejects what it does not like and that surfaces as a protocol error.

use bytes::{BufMut, BytesMut};

use super::Command;

/// Line terminator for every request and reply line
pub const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command into a fresh buffer
pub fn encode_command(command: &Command<'_>) -> BytesMut {
    let mut out = BytesMut::with_capacity(command.encoded_len_hint());
    encode_command_into(command, &mut out);
    out
}

/// Encode a command, appending to `out`
pub fn encode_command_into(command: &Command<'_>, out: &mut BytesMut) {
    out.put_slice(command.verb().as_bytes());

    match command {
        Command::Get { keys } | Command::Gets { keys } => {
            for key in keys {
                out.put_u8(b' ');
                out.put_slice(key);
            }
            out.put_slice(CRLF);
        }
        Command::Store {
            key,
            flags,
            exptime,
            value,
            ..
        } => {
            put_storage_header(out, key, *flags, *exptime, value.len());
            out.put_slice(CRLF);
            out.put_slice(value);
            out.put_slice(CRLF);
        }
        Command::Cas {
            key,
            flags,
            exptime,
            value,
            cas_unique,
        } => {
            put_storage_header(out, key, *flags, *exptime, value.len());
            out.put_u8(b' ');
            put_decimal(out, *cas_unique);
            out.put_slice(CRLF);
            out.put_slice(value);
            out.put_slice(CRLF);
        }
        Command::Delete { key, time } => {
            out.put_u8(b' ');
            out.put_slice(key);
            if let Some(time) = time {
                out.put_u8(b' ');
                put_decimal(out, u64::from(*time));
            }
            out.put_slice(CRLF);
        }
        Command::Incr { key, delta } | Command::Decr { key, delta } => {
            out.put_u8(b' ');
            out.put_slice(key);
            out.put_u8(b' ');
            put_decimal(out, *delta);
            out.put_slice(CRLF);
        }
        Command::Touch { key, exptime } => {
            out.put_u8(b' ');
            out.put_slice(key);
            out.put_u8(b' ');
            put_decimal(out, u64::from(*exptime));
            out.put_slice(CRLF);
        }
        Command::FlushAll { time } => {
            if let Some(time) = time {
                out.put_u8(b' ');
                put_decimal(out, u64::from(*time));
            }
            out.put_slice(CRLF);
        }
        Command::Stats { args } => {
            if let Some(args) = args {
                out.put_u8(b' ');
                out.put_slice(args.as_bytes());
            }
            out.put_slice(CRLF);
        }
        Command::Verbosity { level } => {
            out.put_u8(b' ');
            put_decimal(out, u64::from(*level));
            out.put_slice(CRLF);
        }
        Command::Version | Command::Quit => out.put_slice(CRLF),
    }
}

/// ` <key> <flags> <exptime> <bytes>` shared by the storage verbs and cas
fn put_storage_header(out: &mut BytesMut, key: &[u8], flags: u32, exptime: u32, len: usize) {
    out.put_u8(b' ');
    out.put_slice(key);
    out.put_u8(b' ');
    put_decimal(out, u64::from(flags));
    out.put_u8(b' ');
    put_decimal(out, u64::from(exptime));
    out.put_u8(b' ');
    put_decimal(out, len as u64);
}

fn put_decimal(out: &mut BytesMut, mut value: u64) {
    // Digits land in a stack buffer in reverse, then get copied out in order.
    let mut buf = [0u8; 20];
    let mut len = 0;
    if value == 0 {
        buf[0] = b'0';
        len = 1;
    } else {
        while value > 0 {
            buf[len] = b'0' + (value % 10) as u8;
            value /= 10;
            len += 1;
        }
    }
    buf[..len].reverse();
    out.put_slice(&buf[..len]);
}
