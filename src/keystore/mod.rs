//! KeyStore Module
//!
//! Compact binary key/value container for tamper-resistant persisted
//! state. Keys are looked up by a cached 32-bit hash instead of string
//! comparison, and the same hash is persisted per entry so corruption of
//! the key bytes is caught on decode.
//!
//! ## Blob Format
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ EntryCount: u16 (2)                                        │
//! ├────────────────────────────────────────────────────────────┤
//! │ Entry 0..EntryCount                                        │
//! │ ┌──────────┬────────────┬─────────┬─────────────┬────────┐ │
//! │ │ Hash (4) │ KeyLen (1) │ Key     │ DataLen (4) │ Data   │ │
//! │ └──────────┴────────────┴─────────┴─────────────┴────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//! All integers little-endian, unconditionally; keys are ASCII. An empty
//! store is exactly the 2-byte zero count. Blobs may be embedded at a
//! non-zero offset inside a larger buffer — the decoder reports the end
//! offset for the parent's cursor.

mod codec;
mod entry;
mod table;

pub use codec::{decode_value, encode_value};
pub use entry::{KeyStoreEntry, MAX_KEY_LEN};
pub use table::{KeyStore, MAX_ENTRIES};
