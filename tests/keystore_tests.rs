//! KeyStore Tests
//!
//! Tests for container semantics, the blob wire format, and corruption
//! detection.

use confkv::{key_hash, ConfKvError, KeyStore, MAX_ENTRIES};
use serde::{Deserialize, Serialize};

// =============================================================================
// Container Tests
// =============================================================================

#[test]
fn test_set_get_string() {
    let mut store = KeyStore::new();
    store.set("greeting", Some(&"hello".to_string())).unwrap();

    let value: String = store.get("greeting").unwrap();
    assert_eq!(value, "hello");
}

#[test]
fn test_set_get_numeric() {
    let mut store = KeyStore::new();
    store.set("count", Some(&42i32)).unwrap();
    store.set("enabled", Some(&true)).unwrap();

    assert_eq!(store.get::<i32>("count").unwrap(), 42);
    assert!(store.get::<bool>("enabled").unwrap());
}

#[test]
fn test_set_get_derived_struct() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Profile {
        name: String,
        level: u32,
    }

    let profile = Profile {
        name: "player one".to_string(),
        level: 9,
    };

    let mut store = KeyStore::new();
    store.set("profile", Some(&profile)).unwrap();

    let decoded: Profile = store.get_required("profile").unwrap();
    assert_eq!(decoded, profile);
}

#[test]
fn test_get_missing_returns_default() {
    let store = KeyStore::new();
    assert_eq!(store.get::<i32>("absent").unwrap(), 0);
    assert_eq!(store.get::<String>("absent").unwrap(), "");
}

#[test]
fn test_set_none_stores_empty_payload() {
    let mut store = KeyStore::new();
    store.set::<String>("k", None).unwrap();

    assert!(store.contains("k"));
    assert_eq!(store.payload("k"), Some(&[][..]));
    assert_eq!(store.get::<String>("k").unwrap(), "");
}

#[test]
fn test_get_required_missing_key() {
    let store = KeyStore::new();
    let err = store.get_required::<String>("absent").unwrap_err();
    assert!(matches!(err, ConfKvError::KeyNotFound));
}

#[test]
fn test_get_or_insert() {
    let mut store = KeyStore::new();

    // Absent key: default is inserted and returned
    let value: i32 = store.get_or_insert("counter", 10).unwrap();
    assert_eq!(value, 10);
    assert!(store.contains("counter"));

    // Present key: stored value wins, default is discarded
    let value: i32 = store.get_or_insert("counter", 99).unwrap();
    assert_eq!(value, 10);

    // Empty payload counts as no value
    store.set::<i32>("empty", None).unwrap();
    let value: i32 = store.get_or_insert("empty", 5).unwrap();
    assert_eq!(value, 5);
    assert_eq!(store.get::<i32>("empty").unwrap(), 5);
}

#[test]
fn test_remove() {
    let mut store = KeyStore::new();
    store.set("k", Some(&1i32)).unwrap();

    assert!(store.remove("k"));
    assert!(!store.contains("k"));
    assert!(!store.remove("k"));
}

#[test]
fn test_overwrite_keeps_position_and_len() {
    let mut store = KeyStore::new();
    store.set_payload("a", vec![1]).unwrap();
    store.set_payload("b", vec![2]).unwrap();
    store.set_payload("c", vec![3]).unwrap();

    store.set_payload("b", vec![9, 9]).unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.index_of("b"), Some(1));
    assert_eq!(store.payload("b"), Some(&[9, 9][..]));
}

#[test]
fn test_invalid_keys_rejected() {
    let mut store = KeyStore::new();

    let err = store.set_payload("", vec![]).unwrap_err();
    assert!(matches!(err, ConfKvError::InvalidKey(_)));

    let err = store.set_payload("café", vec![]).unwrap_err();
    assert!(matches!(err, ConfKvError::InvalidKey(_)));

    let err = store.set_payload(&"x".repeat(256), vec![]).unwrap_err();
    assert!(matches!(err, ConfKvError::InvalidKey(_)));

    // 255 bytes is the limit, not 254
    store.set_payload(&"x".repeat(255), vec![]).unwrap();
}

#[test]
fn test_key_hash_stability() {
    // CRC32 check value — must never change, the wire format depends on it
    assert_eq!(key_hash("123456789"), 0xCBF4_3926);
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_empty_store_encodes_to_count_only() {
    let store = KeyStore::new();
    assert_eq!(store.to_bytes(), vec![0x00, 0x00]);

    let decoded = KeyStore::from_bytes(&[0x00, 0x00]).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_wire_format_single_entry() {
    let mut store = KeyStore::new();
    store.set_payload("a", vec![0xAA]).unwrap();

    let blob = store.to_bytes();

    // [count u16][hash u32][key_len u8][key][data_len u32][data]
    assert_eq!(blob.len(), 13);
    assert_eq!(&blob[0..2], &1u16.to_le_bytes());
    assert_eq!(&blob[2..6], &key_hash("a").to_le_bytes());
    assert_eq!(blob[6], 1);
    assert_eq!(&blob[7..8], b"a");
    assert_eq!(&blob[8..12], &1u32.to_le_bytes());
    assert_eq!(blob[12], 0xAA);
}

#[test]
fn test_three_entry_round_trip() {
    let mut store = KeyStore::new();
    store.set_payload("a", vec![0xAA]).unwrap();
    store.set_payload("bb", vec![]).unwrap();
    store.set_payload("ccc", vec![1, 2, 3]).unwrap();

    let blob = store.to_bytes();
    assert_eq!(&blob[0..2], &3u16.to_le_bytes());

    let decoded = KeyStore::from_bytes(&blob).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.payload("a"), Some(&[0xAA][..]));
    assert_eq!(decoded.payload("bb"), Some(&[][..]));
    assert_eq!(decoded.payload("ccc"), Some(&[1, 2, 3][..]));
}

#[test]
fn test_typed_round_trip() {
    let mut store = KeyStore::new();
    store.set("name", Some(&"saved game".to_string())).unwrap();
    store.set("score", Some(&123_456i64)).unwrap();
    store.set::<String>("cleared", None).unwrap();

    let decoded = KeyStore::from_bytes(&store.to_bytes()).unwrap();

    assert_eq!(decoded.len(), store.len());
    assert_eq!(decoded.get::<String>("name").unwrap(), "saved game");
    assert_eq!(decoded.get::<i64>("score").unwrap(), 123_456);
    for entry in store.iter() {
        assert_eq!(decoded.payload(entry.key()), Some(entry.data()));
    }
}

// =============================================================================
// Corruption and Truncation Tests
// =============================================================================

#[test]
fn test_hash_mismatch_on_corrupted_key_byte() {
    let mut store = KeyStore::new();
    store.set_payload("abc", vec![1, 2, 3]).unwrap();

    let mut blob = store.to_bytes();
    // First key byte lives after [count u16][hash u32][key_len u8]
    blob[7] ^= 0x01;

    let err = KeyStore::from_bytes(&blob).unwrap_err();
    assert!(matches!(err, ConfKvError::HashMismatch { .. }));
}

#[test]
fn test_truncated_blobs() {
    let mut store = KeyStore::new();
    store.set_payload("abc", vec![1, 2, 3]).unwrap();
    let blob = store.to_bytes();

    // Inside the count field
    let err = KeyStore::from_bytes(&blob[..1]).unwrap_err();
    assert!(matches!(err, ConfKvError::Truncated { .. }));

    // Inside the first entry's hash field
    let err = KeyStore::from_bytes(&blob[..5]).unwrap_err();
    assert!(matches!(err, ConfKvError::Truncated { .. }));

    // Inside the payload
    let err = KeyStore::from_bytes(&blob[..blob.len() - 1]).unwrap_err();
    assert!(matches!(err, ConfKvError::Truncated { .. }));

    // Count promises an entry that never arrives
    let err = KeyStore::from_bytes(&[0x01, 0x00]).unwrap_err();
    assert!(matches!(err, ConfKvError::Truncated { .. }));
}

#[test]
fn test_decode_embedded_at_offset() {
    let mut store = KeyStore::new();
    store.set_payload("inner", vec![7, 7]).unwrap();
    let blob = store.to_bytes();

    let mut buf = vec![0xFF; 4];
    buf.extend_from_slice(&blob);
    buf.extend_from_slice(&[0xEE; 3]);

    let (decoded, end) = KeyStore::decode_from(&buf, 4).unwrap();

    assert_eq!(end, 4 + blob.len());
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded.payload("inner"), Some(&[7, 7][..]));
}

#[test]
fn test_start_index_out_of_range() {
    let blob = KeyStore::new().to_bytes();
    let err = KeyStore::decode_from(&blob, blob.len() + 1).unwrap_err();
    assert!(matches!(err, ConfKvError::StartOutOfRange { .. }));
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_capacity_boundary() {
    // Build a near-full blob directly; inserting entries one by one would
    // scan the table per insert. 4-hex-digit suffixes keep every key's
    // difference inside one 32-bit window, which CRC32 always distinguishes.
    let almost_full = (MAX_ENTRIES - 1) as u16;
    let mut blob = Vec::with_capacity(2 + almost_full as usize * 14);
    blob.extend_from_slice(&almost_full.to_le_bytes());
    for i in 0..almost_full {
        let key = format!("k{i:04x}");
        blob.extend_from_slice(&key_hash(&key).to_le_bytes());
        blob.push(key.len() as u8);
        blob.extend_from_slice(key.as_bytes());
        blob.extend_from_slice(&0u32.to_le_bytes());
    }

    let mut store = KeyStore::from_bytes(&blob).unwrap();
    assert_eq!(store.len(), MAX_ENTRIES - 1);

    // Entry 65535 fits
    store.set_payload("kfffe", vec![]).unwrap();
    assert_eq!(store.len(), MAX_ENTRIES);

    // Entry 65536 does not
    let err = store.set_payload("kffff", vec![]).unwrap_err();
    assert!(matches!(err, ConfKvError::CapacityExceeded { .. }));
    assert_eq!(store.len(), MAX_ENTRIES);

    // Overwriting at the cap still works
    store.set_payload("kfffe", vec![1]).unwrap();
    assert_eq!(store.len(), MAX_ENTRIES);
}
