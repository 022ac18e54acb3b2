//! Value codec
//!
//! Turns typed values into the opaque byte payloads the keystore persists
//! and back. bincode keeps payloads compact; anything serde can derive is
//! storable.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfKvError, Result};

/// Encode a value into payload bytes
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ConfKvError::Serialization(e.to_string()))
}

/// Decode payload bytes back into a value
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| ConfKvError::Serialization(e.to_string()))
}
