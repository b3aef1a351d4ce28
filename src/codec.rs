//! Value codec
//!
//! Conversion between records and the bytes stored under each key.
//!
//! ## Stored Value Format
//! ```text
//! ┌────────────────────────────────────────┬──────┐
//! │ UTF-8 text (payload or minified JSON)  │ 0x00 │
//! └────────────────────────────────────────┴──────┘
//! ```
//!
//! The trailing zero byte is part of the on-disk format. Existing readers
//! treat values as terminated strings read straight out of the memory map,
//! so every writer appends it and every reader stops at it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Value terminator
pub const TERMINATOR: u8 = 0;

// =============================================================================
// Text Encoding/Decoding
// =============================================================================

/// Encode a text payload as stored bytes
///
/// Format: text bytes + one terminator byte
pub fn encode_text(payload: &str) -> Result<Vec<u8>> {
    if payload.as_bytes().contains(&TERMINATOR) {
        return Err(CacheError::InvalidPayload(
            "payload contains a zero byte".to_string(),
        ));
    }

    let mut value = Vec::with_capacity(payload.len() + 1);
    value.extend_from_slice(payload.as_bytes());
    value.push(TERMINATOR);
    Ok(value)
}

/// Bytes of a stored value up to (not including) the first terminator.
///
/// A value with no terminator is taken whole.
pub fn terminated(value: &[u8]) -> &[u8] {
    let end = value
        .iter()
        .position(|&b| b == TERMINATOR)
        .unwrap_or(value.len());
    &value[..end]
}

/// Decode stored bytes back to text
pub fn decode_text(value: &[u8]) -> Result<&str> {
    std::str::from_utf8(terminated(value))
        .map_err(|e| CacheError::Decode(format!("stored value is not UTF-8: {}", e)))
}

// =============================================================================
// JSON Encoding/Decoding
// =============================================================================

/// Serialize a record to its minified JSON text
pub fn to_json_text<T: Serialize + ?Sized>(record: &T) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

/// Encode a record as stored bytes (minified JSON + terminator)
pub fn encode_json<T: Serialize + ?Sized>(record: &T) -> Result<Vec<u8>> {
    encode_text(&to_json_text(record)?)
}

/// Decode a record from stored bytes
pub fn decode_json<T: DeserializeOwned>(value: &[u8]) -> Result<T> {
    let text = decode_text(value)?;
    serde_json::from_str(text).map_err(|e| CacheError::Decode(e.to_string()))
}
