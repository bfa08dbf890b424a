//! Key codec
//!
//! Keys travel inside whitespace-delimited command lines, so anything that
//! could split or terminate a line must be escaped before encoding and
//! reversed when keys come back in `VALUE` headers.

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::KeyCodecKind;

/// Reversible mapping between caller keys and protocol-safe tokens
pub trait KeyCodec: Send + Sync {
    /// Turn an arbitrary key into a token without spaces or control bytes.
    fn escape<'a>(&self, key: &'a [u8]) -> Cow<'a, [u8]>;

    /// Inverse of `escape`.
    fn unescape<'a>(&self, token: &'a [u8]) -> Cow<'a, [u8]>;
}

/// Percent-style escaping (`%XX` for every byte outside `[A-Za-z0-9-_.~]`)
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentCodec;

impl KeyCodec for PercentCodec {
    fn escape<'a>(&self, key: &'a [u8]) -> Cow<'a, [u8]> {
        match urlencoding::encode_binary(key) {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
            Cow::Owned(s) => Cow::Owned(s.into_bytes()),
        }
    }

    fn unescape<'a>(&self, token: &'a [u8]) -> Cow<'a, [u8]> {
        urlencoding::decode_binary(token)
    }
}

/// Identity codec for callers whose keys are already protocol-safe
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl KeyCodec for RawCodec {
    fn escape<'a>(&self, key: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(key)
    }

    fn unescape<'a>(&self, token: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(token)
    }
}

impl KeyCodecKind {
    /// Instantiate the codec this kind names
    pub fn codec(self) -> Arc<dyn KeyCodec> {
        match self {
            KeyCodecKind::Percent => Arc::new(PercentCodec),
            KeyCodecKind::Raw => Arc::new(RawCodec),
        }
    }
}
