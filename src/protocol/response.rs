//! Reply definitions
//!
//! Every reply line is classified once into a `Reply`, and the parser then
//! decides what that classification means for the command that was sent.
//!
//! Reply lines:
//! - `VALUE <key> <flags> <bytes> [<cas unique>]` - value header, data follows
//! - `END` - terminator for value and stats sequences
//! - `STORED` / `NOT_STORED` / `EXISTS` / `NOT_FOUND` / `DELETED` / `TOUCHED` / `OK`
//! - `<digits>` - incr/decr result
//! - `VERSION <text>`
//! - `ERROR` / `CLIENT_ERROR <msg>` / `SERVER_ERROR <msg>`

use bytes::Bytes;

/// A stored value as returned by get/gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Raw value bytes, exactly as many as the header announced
    pub value: Bytes,

    /// Client flags stored alongside the value
    pub flags: u32,

    /// CAS unique, present only for `gets`
    pub cas: Option<u64>,
}

/// Parsed `VALUE` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueHeader<'a> {
    /// Key as it appeared on the wire (still escaped)
    pub key: &'a [u8],
    pub flags: u32,
    pub len: usize,
    pub cas: Option<u64>,
}

/// Classified reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    /// `END`
    Terminator,

    /// `VALUE ...`
    ValueHeader(ValueHeader<'a>),

    /// One of the known single-token status words
    Status(Status),

    /// All-digit line
    Numeric(u64),

    /// Payload of `VERSION <text>`
    Version(&'a [u8]),

    /// `ERROR`, `CLIENT_ERROR ...` or `SERVER_ERROR ...`, whole line
    Error(&'a [u8]),

    /// Anything else (stats lines, unknown tokens)
    Raw(&'a [u8]),
}

/// Known status tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    Touched,
    Ok,
}

impl Status {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Status::Stored => b"STORED",
            Status::NotStored => b"NOT_STORED",
            Status::Exists => b"EXISTS",
            Status::NotFound => b"NOT_FOUND",
            Status::Deleted => b"DELETED",
            Status::Touched => b"TOUCHED",
            Status::Ok => b"OK",
        }
    }

    fn from_line(line: &[u8]) -> Option<Self> {
        let status = match line {
            b"STORED" => Status::Stored,
            b"NOT_STORED" => Status::NotStored,
            b"EXISTS" => Status::Exists,
            b"NOT_FOUND" => Status::NotFound,
            b"DELETED" => Status::Deleted,
            b"TOUCHED" => Status::Touched,
            b"OK" => Status::Ok,
            _ => return None,
        };
        Some(status)
    }
}

impl<'a> Reply<'a> {
    /// Classify one reply line (terminator already stripped)
    pub fn classify(line: &'a [u8]) -> Self {
        if line == b"END" {
            return Reply::Terminator;
        }
        if let Some(status) = Status::from_line(line) {
            return Reply::Status(status);
        }
        if line == b"ERROR"
            || line.starts_with(b"CLIENT_ERROR ")
            || line.starts_with(b"SERVER_ERROR ")
        {
            return Reply::Error(line);
        }
        if let Some(version) = line.strip_prefix(b"VERSION ") {
            return Reply::Version(version);
        }
        if line.starts_with(b"VALUE ") {
            if let Some(header) = parse_value_header(line) {
                return Reply::ValueHeader(header);
            }
            return Reply::Raw(line);
        }
        if let Some(n) = parse_digits(line) {
            return Reply::Numeric(n);
        }
        Reply::Raw(line)
    }
}

/// `VALUE <key> <flags> <bytes> [<cas>]`, single spaces, no trailing tokens
fn parse_value_header(line: &[u8]) -> Option<ValueHeader<'_>> {
    let mut parts = line.split(|&b| b == b' ');
    if parts.next()? != b"VALUE" {
        return None;
    }
    let key = parts.next().filter(|k| !k.is_empty())?;
    let flags = u32::try_from(parse_digits(parts.next()?)?).ok()?;
    let len = usize::try_from(parse_digits(parts.next()?)?).ok()?;
    let cas = match parts.next() {
        Some(token) => Some(parse_digits(token)?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(ValueHeader {
        key,
        flags,
        len,
        cas,
    })
}

/// `^[0-9]+$` as u64; None on empty, non-digit or overflow
pub(crate) fn parse_digits(data: &[u8]) -> Option<u64> {
    if data.is_empty() {
        return None;
    }
    data.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}
