//! confkv CLI
//!
//! File-level operations over both persistence formats. All I/O lives
//! here, at the boundary outside the format core.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use confkv::{ConfigText, KeyStore, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// confkv CLI
#[derive(Parser, Debug)]
#[command(name = "confkv-cli")]
#[command(about = "Inspect and edit confkv configuration text and keystore files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operate on configuration text files
    #[command(subcommand)]
    Config(ConfigCmd),

    /// Operate on binary keystore files
    #[command(subcommand)]
    Store(StoreCmd),
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// Parse a file and print all entries
    List {
        /// Configuration text file
        file: PathBuf,
    },

    /// Print the value for a key
    Get {
        /// Configuration text file
        file: PathBuf,

        /// The key to read
        key: String,
    },

    /// Set a key and rewrite the file in place
    Set {
        /// Configuration text file (created if missing)
        file: PathBuf,

        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum StoreCmd {
    /// Decode a blob and print keys, hashes, and payload sizes
    List {
        /// Keystore blob file
        file: PathBuf,
    },

    /// Print the stored string value for a key
    Get {
        /// Keystore blob file
        file: PathBuf,

        /// The key to read
        key: String,
    },

    /// Store a string value and write the blob back
    Set {
        /// Keystore blob file (created if missing)
        file: PathBuf,

        /// The key to set
        key: String,

        /// The value to store
        value: String,
    },

    /// Delete a key and write the blob back
    Del {
        /// Keystore blob file
        file: PathBuf,

        /// The key to delete
        key: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,confkv=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Config(cmd) => run_config(cmd),
        Commands::Store(cmd) => run_store(cmd),
    }
}

fn run_config(cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::List { file } => {
            let mut table = ConfigText::new();
            table.parse(&fs::read_to_string(&file)?)?;
            for entry in table.iter() {
                println!("{} = {}", entry.key(), entry.value());
            }
        }
        ConfigCmd::Get { file, key } => {
            let mut table = ConfigText::new();
            table.parse(&fs::read_to_string(&file)?)?;
            let value = table.peek(&key).ok_or(confkv::ConfKvError::KeyNotFound)?;
            println!("{value}");
        }
        ConfigCmd::Set { file, key, value } => {
            let source = read_text_or_empty(&file)?;
            let mut table = ConfigText::new();
            table.set(&key, Some(&value), true)?;
            let rewritten = table.rewrite(&source)?;
            fs::write(&file, rewritten)?;
            tracing::info!(key = %key, file = %file.display(), "configuration updated");
        }
    }
    Ok(())
}

fn run_store(cmd: StoreCmd) -> Result<()> {
    match cmd {
        StoreCmd::List { file } => {
            let store = KeyStore::from_bytes(&fs::read(&file)?)?;
            for entry in store.iter() {
                println!(
                    "{}  hash={:#010x}  {} bytes",
                    entry.key(),
                    entry.hash(),
                    entry.data().len()
                );
            }
        }
        StoreCmd::Get { file, key } => {
            let store = KeyStore::from_bytes(&fs::read(&file)?)?;
            let value: String = store.get_required(&key)?;
            println!("{value}");
        }
        StoreCmd::Set { file, key, value } => {
            let mut store = read_store_or_empty(&file)?;
            store.set(&key, Some(&value))?;
            fs::write(&file, store.to_bytes())?;
            tracing::info!(key = %key, file = %file.display(), "keystore updated");
        }
        StoreCmd::Del { file, key } => {
            let mut store = KeyStore::from_bytes(&fs::read(&file)?)?;
            if !store.remove(&key) {
                return Err(confkv::ConfKvError::KeyNotFound);
            }
            fs::write(&file, store.to_bytes())?;
            tracing::info!(key = %key, file = %file.display(), "keystore entry deleted");
        }
    }
    Ok(())
}

fn read_text_or_empty(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

fn read_store_or_empty(path: &Path) -> Result<KeyStore> {
    if path.exists() {
        KeyStore::from_bytes(&fs::read(path)?)
    } else {
        Ok(KeyStore::new())
    }
}
