//! Codec Tests
//!
//! Exact wire bytes produced for each command.

use std::borrow::Cow;

use memtext::protocol::{encode_command, Command, StoreVerb};

fn key(k: &[u8]) -> Cow<'_, [u8]> {
    Cow::Borrowed(k)
}

// =============================================================================
// Retrieval Commands
// =============================================================================

#[test]
fn test_encode_get_single() {
    let cmd = Command::Get { keys: vec![key(b"dog")] };
    assert_eq!(&encode_command(&cmd)[..], b"get dog\r\n");
}

#[test]
fn test_encode_get_multi() {
    let cmd = Command::Get {
        keys: vec![key(b"a"), key(b"b"), key(b"c")],
    };
    assert_eq!(&encode_command(&cmd)[..], b"get a b c\r\n");
}

#[test]
fn test_encode_gets() {
    let cmd = Command::Gets {
        keys: vec![key(b"a"), key(b"b")],
    };
    assert_eq!(&encode_command(&cmd)[..], b"gets a b\r\n");
}

// =============================================================================
// Storage Commands
// =============================================================================

#[test]
fn test_encode_set_defaults() {
    let cmd = Command::Store {
        verb: StoreVerb::Set,
        key: key(b"k"),
        flags: 0,
        exptime: 0,
        value: b"v",
    };
    assert_eq!(&encode_command(&cmd)[..], b"set k 0 0 1\r\nv\r\n");
}

#[test]
fn test_encode_every_store_verb() {
    let cases = [
        (StoreVerb::Set, "set"),
        (StoreVerb::Add, "add"),
        (StoreVerb::Replace, "replace"),
        (StoreVerb::Append, "append"),
        (StoreVerb::Prepend, "prepend"),
    ];
    for (verb, name) in cases {
        let cmd = Command::Store {
            verb,
            key: key(b"key"),
            flags: 7,
            exptime: 300,
            value: b"hello",
        };
        let expected = format!("{} key 7 300 5\r\nhello\r\n", name);
        assert_eq!(&encode_command(&cmd)[..], expected.as_bytes());
    }
}

#[test]
fn test_encode_value_with_crlf_uses_byte_length() {
    let cmd = Command::Store {
        verb: StoreVerb::Set,
        key: key(b"k"),
        flags: 0,
        exptime: 0,
        value: b"a\r\nb",
    };
    assert_eq!(&encode_command(&cmd)[..], b"set k 0 0 4\r\na\r\nb\r\n");
}

#[test]
fn test_encode_empty_value() {
    let cmd = Command::Store {
        verb: StoreVerb::Set,
        key: key(b"k"),
        flags: 0,
        exptime: 0,
        value: b"",
    };
    assert_eq!(&encode_command(&cmd)[..], b"set k 0 0 0\r\n\r\n");
}

#[test]
fn test_encode_large_numbers() {
    let cmd = Command::Store {
        verb: StoreVerb::Set,
        key: key(b"k"),
        flags: u32::MAX,
        exptime: 2_592_000,
        value: b"x",
    };
    assert_eq!(
        &encode_command(&cmd)[..],
        b"set k 4294967295 2592000 1\r\nx\r\n"
    );
}

#[test]
fn test_encode_cas() {
    let cmd = Command::Cas {
        key: key(b"k"),
        flags: 1,
        exptime: 2,
        value: b"abc",
        cas_unique: 12345678901,
    };
    assert_eq!(&encode_command(&cmd)[..], b"cas k 1 2 3 12345678901\r\nabc\r\n");
}

// =============================================================================
// Other Commands
// =============================================================================

#[test]
fn test_encode_delete() {
    let cmd = Command::Delete { key: key(b"k"), time: None };
    assert_eq!(&encode_command(&cmd)[..], b"delete k\r\n");

    let cmd = Command::Delete { key: key(b"k"), time: Some(10) };
    assert_eq!(&encode_command(&cmd)[..], b"delete k 10\r\n");
}

#[test]
fn test_encode_incr_decr() {
    let cmd = Command::Incr { key: key(b"ctr"), delta: 5 };
    assert_eq!(&encode_command(&cmd)[..], b"incr ctr 5\r\n");

    let cmd = Command::Decr { key: key(b"ctr"), delta: u64::MAX };
    assert_eq!(&encode_command(&cmd)[..], b"decr ctr 18446744073709551615\r\n");
}

#[test]
fn test_encode_touch() {
    let cmd = Command::Touch { key: key(b"k"), exptime: 0 };
    assert_eq!(&encode_command(&cmd)[..], b"touch k 0\r\n");
}

#[test]
fn test_encode_flush_all() {
    assert_eq!(&encode_command(&Command::FlushAll { time: None })[..], b"flush_all\r\n");
    assert_eq!(
        &encode_command(&Command::FlushAll { time: Some(30) })[..],
        b"flush_all 30\r\n"
    );
}

#[test]
fn test_encode_stats() {
    assert_eq!(&encode_command(&Command::Stats { args: None })[..], b"stats\r\n");
    assert_eq!(
        &encode_command(&Command::Stats { args: Some("slabs") })[..],
        b"stats slabs\r\n"
    );
}

#[test]
fn test_encode_version_quit_verbosity() {
    assert_eq!(&encode_command(&Command::Version)[..], b"version\r\n");
    assert_eq!(&encode_command(&Command::Quit)[..], b"quit\r\n");
    assert_eq!(
        &encode_command(&Command::Verbosity { level: 1 })[..],
        b"verbosity 1\r\n"
    );
}

#[test]
fn test_verb_names() {
    assert_eq!(Command::Get { keys: vec![] }.verb(), "get");
    assert_eq!(Command::FlushAll { time: None }.verb(), "flush_all");
    assert_eq!(
        Command::Store {
            verb: StoreVerb::Prepend,
            key: key(b"k"),
            flags: 0,
            exptime: 0,
            value: b"",
        }
        .verb(),
        "prepend"
    );
}
