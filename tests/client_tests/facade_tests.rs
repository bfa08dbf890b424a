//! Facade Tests
//!
//! What each client operation writes, and how it maps the scripted reply.

use std::sync::{Arc, Mutex};

use memtext::{Client, ClientConfig, KeyCodecKind, McError, StoreVerb};

use crate::support::{ScriptLog, ScriptedTransport};

fn client_with(reply: &[u8]) -> (Client, Arc<Mutex<ScriptLog>>) {
    let (t, log) = ScriptedTransport::new(reply);
    let mut client = Client::new();
    client.attach(Box::new(t));
    (client, log)
}

fn sent(log: &Arc<Mutex<ScriptLog>>) -> String {
    String::from_utf8(log.lock().unwrap().sent.clone()).unwrap()
}

// =============================================================================
// Retrieval
// =============================================================================

#[test]
fn test_get_hit() {
    let (mut client, log) = client_with(b"VALUE dog 0 2\r\n32\r\nEND\r\n");
    let item = client.get("dog").unwrap().unwrap();
    assert_eq!(&item.value[..], b"32");
    assert_eq!(item.flags, 0);
    assert_eq!(sent(&log), "get dog\r\n");
}

#[test]
fn test_get_miss_is_not_an_error() {
    let (mut client, _log) = client_with(b"END\r\n");
    assert!(client.get("dog").unwrap().is_none());
    assert!(client.is_connected());
}

#[test]
fn test_get_escapes_key() {
    let (mut client, log) = client_with(b"END\r\n");
    client.get("a key\r\n").unwrap();
    assert_eq!(sent(&log), "get a%20key%0D%0A\r\n");
}

#[test]
fn test_raw_codec_sends_keys_verbatim() {
    let config = ClientConfig::builder().key_codec(KeyCodecKind::Raw).build();
    let mut client = Client::with_config(config).unwrap();
    let (t, log) = ScriptedTransport::new(b"END\r\n");
    client.attach(Box::new(t));

    client.get("a%20b").unwrap();
    assert_eq!(sent(&log), "get a%20b\r\n");
}

#[test]
fn test_get_multi_empty_keys_skips_transport() {
    let (mut client, log) = client_with(b"");
    let items = client.get_multi::<&str>(&[]).unwrap();
    assert!(items.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log.sends, 0);
    assert_eq!(log.receives, 0);
}

#[test]
fn test_get_multi_returns_only_hits_under_original_keys() {
    let (mut client, log) = client_with(
        b"VALUE a%20b 1 3\r\none\r\nVALUE c 2 3\r\ntwo\r\nEND\r\n",
    );
    let items = client.get_multi(&["a b", "missing", "c"]).unwrap();

    assert_eq!(sent(&log), "get a%20b missing c\r\n");
    assert_eq!(items.len(), 2);
    assert_eq!(&items[&b"a b".to_vec()].value[..], b"one");
    assert_eq!(items[&b"c".to_vec()].flags, 2);
    assert!(!items.contains_key(&b"missing".to_vec()));
}

#[test]
fn test_gets_returns_cas() {
    let (mut client, log) = client_with(b"VALUE k 0 1 42\r\nx\r\nEND\r\n");
    let item = client.gets("k").unwrap().unwrap();
    assert_eq!(item.cas, Some(42));
    assert_eq!(sent(&log), "gets k\r\n");
}

#[test]
fn test_gets_multi() {
    let (mut client, log) = client_with(b"VALUE a 0 1 7\r\nx\r\nEND\r\n");
    let items = client.gets_multi(&["a", "b"]).unwrap();
    assert_eq!(items[&b"a".to_vec()].cas, Some(7));
    assert_eq!(sent(&log), "gets a b\r\n");
}

// =============================================================================
// Storage
// =============================================================================

#[test]
fn test_set_wire_format() {
    let (mut client, log) = client_with(b"STORED\r\n");
    client.set("k", "v", 0, 0).unwrap();
    assert_eq!(sent(&log), "set k 0 0 1\r\nv\r\n");
}

#[test]
fn test_store_verbs_with_flags_and_exptime() {
    let (mut client, log) = client_with(b"STORED\r\nSTORED\r\nSTORED\r\nSTORED\r\n");
    client.add("k", "abc", 60, 9).unwrap();
    client.replace("k", "abc", 60, 9).unwrap();
    client.append("k", "d", 0, 0).unwrap();
    client.store(StoreVerb::Prepend, "k", "z", 0, 0).unwrap();
    assert_eq!(
        sent(&log),
        "add k 9 60 3\r\nabc\r\nreplace k 9 60 3\r\nabc\r\nappend k 0 0 1\r\nd\r\nprepend k 0 0 1\r\nz\r\n"
    );
}

#[test]
fn test_store_rejection_returns_line_verbatim() {
    let (mut client, _log) = client_with(b"NOT_STORED\r\n");
    match client.add("k", "v", 0, 0) {
        Err(McError::Protocol(line)) => assert_eq!(line, "NOT_STORED"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_binary_value() {
    let value: Vec<u8> = (0..=255).collect();
    let (mut client, log) = client_with(b"STORED\r\n");
    client.set("bin", &value, 0, 0).unwrap();

    let mut expected = b"set bin 0 0 256\r\n".to_vec();
    expected.extend_from_slice(&value);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(log.lock().unwrap().sent, expected);
}

#[test]
fn test_cas_exists() {
    let (mut client, log) = client_with(b"EXISTS\r\n");
    match client.cas("k", "v", 99, 0, 0) {
        Err(McError::Protocol(line)) => assert_eq!(line, "EXISTS"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(sent(&log), "cas k 0 0 1 99\r\nv\r\n");
}

// =============================================================================
// Other Commands
// =============================================================================

#[test]
fn test_delete() {
    let (mut client, log) = client_with(b"DELETED\r\nNOT_FOUND\r\n");
    client.delete("k", None).unwrap();
    assert!(matches!(client.delete("k", Some(5)), Err(McError::Protocol(ref l)) if l == "NOT_FOUND"));
    assert_eq!(sent(&log), "delete k\r\ndelete k 5\r\n");
}

#[test]
fn test_incr_decr() {
    let (mut client, log) = client_with(b"15\r\n3\r\n");
    assert_eq!(client.incr("ctr", 5).unwrap(), 15);
    assert_eq!(client.decr("ctr", 12).unwrap(), 3);
    assert_eq!(sent(&log), "incr ctr 5\r\ndecr ctr 12\r\n");
}

#[test]
fn test_incr_missing_is_protocol_error() {
    let (mut client, _log) = client_with(b"NOT_FOUND\r\n");
    assert!(matches!(client.incr("ctr", 5), Err(McError::Protocol(ref l)) if l == "NOT_FOUND"));
}

#[test]
fn test_touch() {
    let (mut client, log) = client_with(b"TOUCHED\r\n");
    client.touch("k", 30).unwrap();
    assert_eq!(sent(&log), "touch k 30\r\n");
}

#[test]
fn test_flush_all_and_verbosity() {
    let (mut client, log) = client_with(b"OK\r\nOK\r\nOK\r\n");
    client.flush_all(None).unwrap();
    client.flush_all(Some(10)).unwrap();
    client.verbosity(1).unwrap();
    assert_eq!(sent(&log), "flush_all\r\nflush_all 10\r\nverbosity 1\r\n");
}

#[test]
fn test_stats() {
    let (mut client, log) = client_with(b"STAT pid 1\r\nSTAT threads 4\r\nEND\r\n");
    assert_eq!(client.stats(None).unwrap(), vec!["STAT pid 1", "STAT threads 4"]);
    assert_eq!(sent(&log), "stats\r\n");
}

#[test]
fn test_stats_error() {
    let (mut client, log) = client_with(b"ERROR\r\n");
    assert!(matches!(client.stats(Some("bogus")), Err(McError::Protocol(ref l)) if l == "ERROR"));
    assert_eq!(sent(&log), "stats bogus\r\n");
    assert!(client.is_connected());
}

#[test]
fn test_version() {
    let (mut client, log) = client_with(b"VERSION 1.6.21\r\n");
    assert_eq!(client.version().unwrap(), "1.6.21");
    assert_eq!(sent(&log), "version\r\n");
}

#[test]
fn test_quit_reads_nothing() {
    let (mut client, log) = client_with(b"");
    client.quit().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.sent, b"quit\r\n");
    assert_eq!(log.receives, 0);
}

#[test]
fn test_responses_stay_framed_across_commands() {
    let (mut client, _log) = client_with(
        b"VALUE a 0 5\r\nEND\r\n\r\nEND\r\nVALUE b 0 1\r\nx\r\nEND\r\nSTORED\r\n",
    );
    let a = client.get("a").unwrap().unwrap();
    assert_eq!(&a.value[..], b"END\r\n");
    let items = client.get_multi(&["b"]).unwrap();
    assert_eq!(items.len(), 1);
    client.set("c", "v", 0, 0).unwrap();
}
