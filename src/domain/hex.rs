//! Hex string handling at the transport boundary
//!
//! Every selector, topic, hash and payload that crosses the crate boundary as a
//! string goes through this module, so there is exactly one place where casing
//! and the `0x` marker are normalized.

use crate::error::ConfigurationError;

/// Strip an optional `0x`/`0X` marker and surrounding whitespace
pub fn strip_prefix(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Normalize a hex string to lowercase with a `0x` marker
pub fn normalize(value: &str) -> String {
    format!("0x{}", strip_prefix(value).to_ascii_lowercase())
}

/// Case-insensitive comparison of two hex strings, marker optional on either side
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    strip_prefix(a).eq_ignore_ascii_case(strip_prefix(b))
}

/// Encode bytes as a lowercase `0x` string
pub fn encode_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string with or without marker
pub fn decode(value: &str) -> Result<Vec<u8>, ConfigurationError> {
    hex::decode(strip_prefix(value)).map_err(|_| ConfigurationError::InvalidHex {
        value: value.to_string(),
    })
}

/// Check that the leading bytes of `data` equal `prefix`, both given as hex strings
pub fn starts_with_ignore_case(data: &str, prefix: &str) -> bool {
    let data = strip_prefix(data);
    let prefix = strip_prefix(prefix);
    data
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
