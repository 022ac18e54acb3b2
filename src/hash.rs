//! Key hashing
//!
//! A single stable 32-bit hash is used everywhere a key is compared: the
//! in-memory lookup paths of both tables and the hash field persisted in
//! the keystore wire format. The two must never diverge, or decoded blobs
//! would fail their integrity check.

/// Hash a key for lookup and for the keystore wire format
///
/// CRC32 (IEEE, as computed by `crc32fast`) — stable across platforms and
/// well-distributed for short ASCII keys.
pub fn key_hash(key: &str) -> u32 {
    key_hash_bytes(key.as_bytes())
}

/// Hash raw key bytes, used by the decode path before the key is known to
/// be valid text
pub(crate) fn key_hash_bytes(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
