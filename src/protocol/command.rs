//! Command definitions
//!
//! Represents one request line (plus payload) sent to the server. Keys held
//! here are already escaped; a command is built per call and dropped once
//! encoded.

use std::borrow::Cow;

/// Storage verbs sharing the `<verb> <key> <flags> <exptime> <bytes>` layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreVerb {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
}

impl StoreVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreVerb::Set => "set",
            StoreVerb::Add => "add",
            StoreVerb::Replace => "replace",
            StoreVerb::Append => "append",
            StoreVerb::Prepend => "prepend",
        }
    }
}

/// A request ready for encoding
#[derive(Debug, Clone)]
pub enum Command<'a> {
    /// `get <k1> [<k2> ...]`
    Get { keys: Vec<Cow<'a, [u8]>> },

    /// `gets <k1> [<k2> ...]`, replies carry CAS uniques
    Gets { keys: Vec<Cow<'a, [u8]>> },

    /// set/add/replace/append/prepend
    Store {
        verb: StoreVerb,
        key: Cow<'a, [u8]>,
        flags: u32,
        exptime: u32,
        value: &'a [u8],
    },

    /// Check-and-set against a CAS unique from `gets`
    Cas {
        key: Cow<'a, [u8]>,
        flags: u32,
        exptime: u32,
        value: &'a [u8],
        cas_unique: u64,
    },

    Delete { key: Cow<'a, [u8]>, time: Option<u32> },

    Incr { key: Cow<'a, [u8]>, delta: u64 },

    Decr { key: Cow<'a, [u8]>, delta: u64 },

    Touch { key: Cow<'a, [u8]>, exptime: u32 },

    FlushAll { time: Option<u32> },

    Stats { args: Option<&'a str> },

    Version,

    Verbosity { level: u32 },

    Quit,
}

impl Command<'_> {
    /// The verb as written on the wire
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Gets { .. } => "gets",
            Command::Store { verb, .. } => verb.as_str(),
            Command::Cas { .. } => "cas",
            Command::Delete { .. } => "delete",
            Command::Incr { .. } => "incr",
            Command::Decr { .. } => "decr",
            Command::Touch { .. } => "touch",
            Command::FlushAll { .. } => "flush_all",
            Command::Stats { .. } => "stats",
            Command::Version => "version",
            Command::Verbosity { .. } => "verbosity",
            Command::Quit => "quit",
        }
    }

    /// Upper bound of the encoded size, used to presize buffers
    pub fn encoded_len_hint(&self) -> usize {
        // verb + separators + a few decimal fields
        const OVERHEAD: usize = 64;
        match self {
            Command::Get { keys } | Command::Gets { keys } => {
                OVERHEAD + keys.iter().map(|k| k.len() + 1).sum::<usize>()
            }
            Command::Store { key, value, .. } | Command::Cas { key, value, .. } => {
                OVERHEAD + key.len() + value.len()
            }
            Command::Delete { key, .. }
            | Command::Incr { key, .. }
            | Command::Decr { key, .. }
            | Command::Touch { key, .. } => OVERHEAD + key.len(),
            Command::Stats { args } => OVERHEAD + args.map_or(0, str::len),
            _ => OVERHEAD,
        }
    }
}
