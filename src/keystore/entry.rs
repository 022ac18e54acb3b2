//! KeyStore entry and per-entry binary codec
//!
//! ## Entry Layout
//! ```text
//! ┌──────────┬─────────────┬───────────┬──────────────┬────────────┐
//! │ Hash (4) │ KeyLen (1)  │ Key bytes │ DataLen (4)  │ Data bytes │
//! └──────────┴─────────────┴───────────┴──────────────┴────────────┘
//! ```
//! All integers little-endian; the key is ASCII. The stored hash must
//! equal the hash recomputed from the key bytes — a mismatch on decode is
//! corruption, never silently accepted.

use crate::error::{ConfKvError, Result};
use crate::hash::{key_hash, key_hash_bytes};

/// Maximum key length in bytes (single-byte length prefix)
pub const MAX_KEY_LEN: usize = 255;

/// A single keystore entry: a key, its cached hash, and an opaque payload
#[derive(Debug, Clone)]
pub struct KeyStoreEntry {
    /// Key text, ASCII, at most [`MAX_KEY_LEN`] bytes
    key: String,

    /// Cached hash of `key` — the wire-format lookup key
    hash: u32,

    /// Opaque payload; empty represents the null/default value
    data: Vec<u8>,
}

impl KeyStoreEntry {
    /// Create an entry, validating the key
    pub fn new(key: &str, data: Vec<u8>) -> Result<Self> {
        validate_key(key)?;
        Ok(Self {
            key: key.to_string(),
            hash: key_hash(key),
            data,
        })
    }

    /// The entry's key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cached hash of the key
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The opaque payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the payload
    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Number of bytes this entry occupies on the wire
    pub fn encoded_len(&self) -> usize {
        4 + 1 + self.key.len() + 4 + self.data.len()
    }

    /// Append this entry's wire bytes to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.hash.to_le_bytes());
        buf.push(self.key.len() as u8);
        buf.extend_from_slice(self.key.as_bytes());
        buf.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.data);
    }

    /// Decode one entry starting at `start`
    ///
    /// Returns the entry and the offset of the first byte after it. The
    /// stored hash is checked against the hash of the decoded key bytes;
    /// a mismatch fails with [`ConfKvError::HashMismatch`].
    pub fn decode_from(bytes: &[u8], start: usize) -> Result<(Self, usize)> {
        let mut pos = start;

        let hash_bytes: [u8; 4] = take(bytes, &mut pos, 4)?.try_into().unwrap();
        let stored = u32::from_le_bytes(hash_bytes);

        let key_len = take(bytes, &mut pos, 1)?[0] as usize;
        let key_bytes = take(bytes, &mut pos, key_len)?;

        let computed = key_hash_bytes(key_bytes);
        if computed != stored {
            return Err(ConfKvError::HashMismatch {
                key: String::from_utf8_lossy(key_bytes).into_owned(),
                stored,
                computed,
            });
        }

        let key = std::str::from_utf8(key_bytes)
            .map_err(|_| ConfKvError::InvalidKey("keystore key bytes are not ASCII".to_string()))?
            .to_string();
        validate_key(&key)?;

        let len_bytes: [u8; 4] = take(bytes, &mut pos, 4)?.try_into().unwrap();
        let data_len = u32::from_le_bytes(len_bytes) as usize;
        let data = take(bytes, &mut pos, data_len)?.to_vec();

        Ok((
            Self {
                key,
                hash: stored,
                data,
            },
            pos,
        ))
    }
}

/// Validate a keystore key: non-empty, ASCII, at most [`MAX_KEY_LEN`] bytes
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ConfKvError::InvalidKey(
            "keystore keys must not be empty".to_string(),
        ));
    }
    if !key.is_ascii() {
        return Err(ConfKvError::InvalidKey(format!(
            "keystore keys must be ASCII, got {key:?}"
        )));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(ConfKvError::InvalidKey(format!(
            "keystore keys are limited to {MAX_KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    Ok(())
}

/// Read `count` bytes at `*pos`, advancing the cursor
///
/// Short reads fail with [`ConfKvError::Truncated`] carrying the offset
/// and the number of missing bytes.
pub(crate) fn take<'a>(bytes: &'a [u8], pos: &mut usize, count: usize) -> Result<&'a [u8]> {
    let available = bytes.len().saturating_sub(*pos);
    if available < count {
        return Err(ConfKvError::Truncated {
            offset: *pos,
            needed: count - available,
        });
    }
    let slice = &bytes[*pos..*pos + count];
    *pos += count;
    Ok(slice)
}
