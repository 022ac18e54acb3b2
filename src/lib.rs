//! # confkv
//!
//! Two small persistence formats with strict round-trip guarantees:
//! - **ConfigText** — human-editable `key = value;` text, parsed into an
//!   ordered table with per-entry dirty tracking and regenerated with
//!   minimal diff
//! - **KeyStore** — compact binary key/value blob with hash-verified keys
//!   for tamper-resistant persisted state
//!
//! ## Architecture Overview
//!
//! ```text
//!        text file                         binary blob
//!            │                                 │
//! ┌──────────▼──────────┐          ┌───────────▼───────────┐
//! │     ConfigText      │          │       KeyStore        │
//! │  (parse / rewrite)  │          │ (to_bytes/from_bytes) │
//! └──────────┬──────────┘          └───────────┬───────────┘
//!            │                                 │
//!    ┌───────▼────────┐               ┌────────▼───────┐
//!    │  ConfigEntry   │               │  KeyStoreEntry │
//!    │ (value, dirty) │               │ (hash, payload)│
//!    └───────┬────────┘               └────────┬───────┘
//!            │                                 │
//!            └──────────────┬──────────────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │   EntryTable    │
//!                  │ (chunk growth)  │
//!                  └─────────────────┘
//! ```
//!
//! Both tables are synchronous, in-memory, and single-threaded by
//! contract; persisting their output is the caller's job. Neither
//! performs I/O.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod hash;

pub mod config;
pub mod entry_table;
pub mod keystore;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{ConfigEntry, ConfigText, ParseOptions};
pub use entry_table::EntryTable;
pub use error::{ConfKvError, Result};
pub use hash::key_hash;
pub use keystore::{KeyStore, KeyStoreEntry, MAX_ENTRIES, MAX_KEY_LEN};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of confkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
