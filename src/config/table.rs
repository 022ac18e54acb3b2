//! Configuration table
//!
//! The mutable, ordered key/value table behind the configuration text
//! format. Entry order is first-insertion order; lookup goes through the
//! cached key hash. The table is the authority during rewrite: values set
//! here win over values found in the source text.

use std::fmt::Display;
use std::str::FromStr;

use crate::entry_table::EntryTable;
use crate::error::{ConfKvError, Result};
use crate::hash::key_hash;

use super::entry::ConfigEntry;

/// Ordered table of configuration entries with per-entry dirty tracking
#[derive(Debug, Clone, Default)]
pub struct ConfigText {
    pub(crate) entries: EntryTable<ConfigEntry>,
}

impl ConfigText {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: EntryTable::new(),
        }
    }

    /// Create an empty table whose backing storage grows by `chunk_size`
    /// entries at a time
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            entries: EntryTable::with_chunk_size(chunk_size),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Read the value for `key` without touching its dirty flag
    pub fn peek(&self, key: &str) -> Option<&str> {
        let hash = key_hash(key);
        self.position(hash)
            .and_then(|idx| self.entries.get(idx))
            .map(ConfigEntry::value)
    }

    /// Read the value for `key`, clearing the entry's dirty flag when
    /// `clear_dirty` is set
    ///
    /// Callers that persist the value themselves read through this
    /// accessor so the read also marks the entry clean; [`peek`](Self::peek)
    /// never does.
    pub fn get(&mut self, key: &str, clear_dirty: bool) -> Option<&str> {
        let hash = key_hash(key);
        let idx = self.position(hash)?;
        let entry = self.entries.get_mut(idx)?;
        if clear_dirty {
            entry.dirty = false;
        }
        Some(&entry.value)
    }

    /// True if `key` has an entry
    pub fn contains(&self, key: &str) -> bool {
        self.position(key_hash(key)).is_some()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set, create, or delete the entry for `key`.
    ///
    /// `None` deletes the entry if one exists. A new entry is created with
    /// its dirty flag equal to `track_dirty`; an existing entry follows the
    /// dirty discipline of [`ConfigEntry`]: unchanged values never set the
    /// flag, differing values set it when tracking is requested, and
    /// suppressed tracking marks the entry clean.
    ///
    /// An empty key is rejected with [`ConfKvError::InvalidKey`].
    pub fn set(&mut self, key: &str, value: Option<&str>, track_dirty: bool) -> Result<()> {
        if key.is_empty() {
            return Err(ConfKvError::InvalidKey(
                "configuration keys must not be empty".to_string(),
            ));
        }

        let hash = key_hash(key);
        match (self.position(hash), value) {
            (Some(idx), Some(value)) => {
                if let Some(entry) = self.entries.get_mut(idx) {
                    entry.set_value(value, track_dirty);
                }
            }
            (Some(idx), None) => {
                self.entries.remove(idx);
            }
            (None, Some(value)) => {
                self.entries.push(ConfigEntry::new(key, value, track_dirty));
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Get the value for `key` parsed as `T`, installing `fallback` when
    /// the key is missing.
    ///
    /// A missing key inserts `fallback` (in its string form) marked dirty
    /// and returns it. A stored value that does not parse as `T` is
    /// replaced by `fallback` the same way, after a logged warning; the
    /// `strict-values` feature turns that case into a [`ConfKvError::Syntax`]
    /// error instead.
    pub fn force_get<T>(&mut self, key: &str, fallback: T) -> Result<T>
    where
        T: FromStr + Display,
    {
        let parsed = self.peek(key).map(|raw| raw.parse::<T>());
        match parsed {
            Some(Ok(value)) => Ok(value),
            Some(Err(_)) => self.recover_value(key, fallback),
            None => {
                let text = fallback.to_string();
                self.set(key, Some(&text), true)?;
                Ok(fallback)
            }
        }
    }

    #[cfg(not(feature = "strict-values"))]
    fn recover_value<T>(&mut self, key: &str, fallback: T) -> Result<T>
    where
        T: FromStr + Display,
    {
        tracing::warn!(key, "replacing unparsable configuration value with fallback");
        let text = fallback.to_string();
        self.set(key, Some(&text), true)?;
        Ok(fallback)
    }

    #[cfg(feature = "strict-values")]
    fn recover_value<T>(&mut self, key: &str, _fallback: T) -> Result<T>
    where
        T: FromStr + Display,
    {
        Err(ConfKvError::Syntax {
            message: format!("value for key \"{key}\" does not parse as the requested type"),
            offset: 0,
        })
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

    /// True if the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry changed since it was last written out
    pub fn is_dirty(&self) -> bool {
        self.entries.iter().any(ConfigEntry::is_dirty)
    }

    /// Iterate entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.iter()
    }

    /// Index of the entry whose key hashes to `hash`
    pub(crate) fn position(&self, hash: u32) -> Option<usize> {
        self.entries.iter().position(|entry| entry.hash == hash)
    }
}
