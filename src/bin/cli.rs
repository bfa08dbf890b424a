//! memtext CLI Client
//!
//! Command-line interface for talking to a memcached server.

use std::collections::HashMap;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use memtext::protocol::parse_stat_line;
use memtext::{Client, ClientConfig, Endpoint, Item};
use tracing_subscriber::{fmt, EnvFilter};

/// memtext CLI
#[derive(Parser, Debug)]
#[command(name = "memtext-cli")]
#[command(about = "CLI for memcached servers speaking the text protocol")]
#[command(version)]
struct Args {
    /// Server address (host:port or unix:/path)
    #[arg(short, long, default_value = "127.0.0.1:11211")]
    server: String,

    /// Connect/send/read timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one or more keys
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Fetch one or more keys with their CAS uniques
    Gets {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store a value unconditionally
    Set(StoreArgs),

    /// Store a value only if the key is absent
    Add(StoreArgs),

    /// Store a value only if the key exists
    Replace(StoreArgs),

    /// Append to an existing value
    Append(StoreArgs),

    /// Prepend to an existing value
    Prepend(StoreArgs),

    /// Delete a key
    Delete {
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        delta: u64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        delta: u64,
    },

    /// Update a key's expiration time
    Touch {
        key: String,
        exptime: u32,
    },

    /// Invalidate all items
    Flush {
        /// Delay in seconds
        #[arg(long)]
        delay: Option<u32>,
    },

    /// Print server statistics
    Stats {
        /// Stats group, e.g. "slabs" or "items"
        group: Option<String>,
    },

    /// Print the server version
    Version,

    /// Set server logging verbosity
    Verbosity {
        level: u32,
    },
}

#[derive(clap::Args, Debug)]
struct StoreArgs {
    key: String,
    value: String,

    /// Expiration time in seconds (0 = never)
    #[arg(short, long, default_value = "0")]
    exptime: u32,

    /// Opaque client flags
    #[arg(short, long, default_value = "0")]
    flags: u32,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,memtext=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> memtext::Result<()> {
    let endpoint: Endpoint = args.server.parse()?;
    let config = ClientConfig::builder()
        .timeout(Duration::from_millis(args.timeout_ms))
        .build();

    let mut client = Client::with_config(config)?;
    client.connect(&endpoint)?;
    tracing::debug!(%endpoint, "connected");

    let result = dispatch(&mut client, args.command);

    // Best effort: the connection may already be gone after an I/O error.
    if client.is_connected() {
        let _ = client.close();
    }
    result
}

fn dispatch(client: &mut Client, command: Commands) -> memtext::Result<()> {
    let status = match command {
        Commands::Get { keys } => {
            let items = client.get_multi(&keys)?;
            print_items(&keys, &items);
            return Ok(());
        }
        Commands::Gets { keys } => {
            let items = client.gets_multi(&keys)?;
            print_items(&keys, &items);
            return Ok(());
        }
        Commands::Set(a) => {
            client.set(&a.key, &a.value, a.exptime, a.flags)?;
            "STORED"
        }
        Commands::Add(a) => {
            client.add(&a.key, &a.value, a.exptime, a.flags)?;
            "STORED"
        }
        Commands::Replace(a) => {
            client.replace(&a.key, &a.value, a.exptime, a.flags)?;
            "STORED"
        }
        Commands::Append(a) => {
            client.append(&a.key, &a.value, a.exptime, a.flags)?;
            "STORED"
        }
        Commands::Prepend(a) => {
            client.prepend(&a.key, &a.value, a.exptime, a.flags)?;
            "STORED"
        }
        Commands::Delete { key } => {
            client.delete(&key, None)?;
            "DELETED"
        }
        Commands::Incr { key, delta } => {
            println!("{}", client.incr(&key, delta)?);
            return Ok(());
        }
        Commands::Decr { key, delta } => {
            println!("{}", client.decr(&key, delta)?);
            return Ok(());
        }
        Commands::Touch { key, exptime } => {
            client.touch(&key, exptime)?;
            "TOUCHED"
        }
        Commands::Flush { delay } => {
            client.flush_all(delay)?;
            "OK"
        }
        Commands::Stats { group } => {
            for line in client.stats(group.as_deref())? {
                match parse_stat_line(&line) {
                    Some((name, value)) => println!("{:<32} {}", name, value),
                    None => println!("{}", line),
                }
            }
            return Ok(());
        }
        Commands::Version => {
            println!("{}", client.version()?);
            return Ok(());
        }
        Commands::Verbosity { level } => {
            client.verbosity(level)?;
            "OK"
        }
    };
    println!("{}", status);
    Ok(())
}

fn print_items(keys: &[String], items: &HashMap<Vec<u8>, Item>) {
    // Requested order, misses included.
    for key in keys {
        match items.get(key.as_bytes()) {
            Some(item) => {
                let value = String::from_utf8_lossy(&item.value);
                match item.cas {
                    Some(cas) => println!("{} (flags={}, cas={}): {}", key, item.flags, cas, value),
                    None => println!("{} (flags={}): {}", key, item.flags, value),
                }
            }
            None => println!("{}: <miss>", key),
        }
    }
}
