//! KeyStore container
//!
//! Ordered table of hash-keyed entries with O(n) lookup over cached
//! hashes, serializable to and from a single contiguous blob. At this
//! scale (hard cap 65535 entries, typical counts far lower) a secondary
//! index buys nothing.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::entry_table::EntryTable;
use crate::error::{ConfKvError, Result};
use crate::hash::key_hash;

use super::codec;
use super::entry::{take, validate_key, KeyStoreEntry};

/// Hard capacity ceiling — the wire format counts entries in a u16
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Ordered table of keystore entries, serializable to a single blob
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    entries: EntryTable<KeyStoreEntry>,
}

impl KeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: EntryTable::new(),
        }
    }

    /// Create an empty store whose backing storage grows by `chunk_size`
    /// entries at a time
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            entries: EntryTable::with_chunk_size(chunk_size),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Index of the entry for `key` — linear scan over cached hashes
    ///
    /// Scans from the end toward the start, so if a duplicate hash ever
    /// existed the last-inserted entry wins deterministically.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        let hash = key_hash(key);
        self.entries.iter().rposition(|entry| entry.hash() == hash)
    }

    /// True if `key` has an entry
    pub fn contains(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Borrow the raw payload for `key`
    pub fn payload(&self, key: &str) -> Option<&[u8]> {
        self.index_of(key)
            .and_then(|idx| self.entries.get(idx))
            .map(KeyStoreEntry::data)
    }

    /// Decode the value for `key`, or `T::default()` if the key is absent
    /// or its payload is empty
    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.payload(key) {
            Some(data) if !data.is_empty() => codec::decode_value(data),
            _ => Ok(T::default()),
        }
    }

    /// Decode the value for `key`, failing with
    /// [`ConfKvError::KeyNotFound`] if the key is absent
    pub fn get_required<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let data = self.payload(key).ok_or(ConfKvError::KeyNotFound)?;
        codec::decode_value(data)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Encode `value` and insert or overwrite the entry for `key`
    ///
    /// `None` stores the empty payload, representing the null/default
    /// value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: Option<&T>) -> Result<()> {
        let data = match value {
            Some(value) => codec::encode_value(value)?,
            None => Vec::new(),
        };
        self.set_payload(key, data)
    }

    /// Decode the existing value for `key`, or insert `default` (encoded)
    /// and return it
    ///
    /// Get-or-insert is atomic: no state where the key exists without a
    /// value is observable. An empty stored payload counts as no value and
    /// is replaced by `default`.
    pub fn get_or_insert<T>(&mut self, key: &str, default: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let has_value = matches!(self.payload(key), Some(data) if !data.is_empty());
        if has_value {
            return self.get_required(key);
        }
        let encoded = codec::encode_value(&default)?;
        self.set_payload(key, encoded)?;
        Ok(default)
    }

    /// Insert or overwrite the raw payload for `key`
    ///
    /// Overwrites in place when the key exists; appends otherwise.
    /// Appending past [`MAX_ENTRIES`] fails with
    /// [`ConfKvError::CapacityExceeded`].
    pub fn set_payload(&mut self, key: &str, data: Vec<u8>) -> Result<()> {
        validate_key(key)?;

        if let Some(idx) = self.index_of(key) {
            if let Some(entry) = self.entries.get_mut(idx) {
                entry.set_data(data);
            }
            return Ok(());
        }

        if self.entries.len() >= MAX_ENTRIES {
            return Err(ConfKvError::CapacityExceeded { max: MAX_ENTRIES });
        }
        self.entries.push(KeyStoreEntry::new(key, data)?);
        Ok(())
    }

    /// Delete the entry for `key`, returning whether one existed
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index_of(key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &KeyStoreEntry> {
        self.entries.iter()
    }

    // =========================================================================
    // Blob Encoding/Decoding
    // =========================================================================

    /// Serialize the whole store into one contiguous blob
    ///
    /// An empty store encodes as exactly the 2-byte zero count. Entries
    /// are emitted in current table order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let total = 2 + self
            .entries
            .iter()
            .map(KeyStoreEntry::encoded_len)
            .sum::<usize>();
        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for entry in self.entries.iter() {
            entry.encode_into(&mut buf);
        }
        buf
    }

    /// Reconstruct a store from a blob occupying the whole buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::decode_from(bytes, 0)?.0)
    }

    /// Decode a blob embedded at `start` inside a larger buffer
    ///
    /// Returns the store and the offset of the first byte after the blob,
    /// so a parent format can keep its own cursor across concatenated
    /// records. Every entry's stored hash is verified against its key
    /// bytes.
    pub fn decode_from(bytes: &[u8], start: usize) -> Result<(Self, usize)> {
        if start > bytes.len() {
            return Err(ConfKvError::StartOutOfRange {
                index: start,
                len: bytes.len(),
            });
        }

        let mut pos = start;
        let count_bytes: [u8; 2] = take(bytes, &mut pos, 2)?.try_into().unwrap();
        let count = u16::from_le_bytes(count_bytes) as usize;

        // The count is known up front, so one growth step covers the blob
        let mut entries = EntryTable::with_chunk_size(count.max(1));
        for _ in 0..count {
            let (entry, next) = KeyStoreEntry::decode_from(bytes, pos)?;
            pos = next;
            entries.push(entry);
        }

        tracing::trace!(
            entries = count,
            bytes = pos - start,
            "decoded keystore blob"
        );

        Ok((Self { entries }, pos))
    }
}
