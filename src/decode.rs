//! Payload decoding for request and response bodies.
//!
//! Burp stores raw HTTP messages as base64. The decoded bytes are usually
//! text, but binary bodies are common, so turning bytes into a `String`
//! never fails: every byte that is not part of a valid UTF-8 sequence is
//! rendered as a visible `\xNN` escape. Only a broken base64 layer is an
//! error.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use std::fmt::Write as _;

/// Standard alphabet, padding required, non-zero trailing bits in the
/// last symbol accepted.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decodes a base64 payload into printable text.
///
/// ASCII whitespace inside the payload is ignored so that line-wrapped
/// exports decode the same as single-line ones. An empty payload decodes
/// to an empty string.
///
/// # Errors
/// Returns the underlying [`base64::DecodeError`] when the payload contains
/// characters outside the standard alphabet or has invalid padding.
///
/// # Example
/// ```rust
/// use burpconv::decode::decode_payload;
///
/// assert_eq!(decode_payload("R0VUIC8gSFRUUC8xLjE=").unwrap(), "GET / HTTP/1.1");
/// ```
pub fn decode_payload(payload: &str) -> Result<String, base64::DecodeError> {
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Ok(String::new());
    }

    let bytes = PAYLOAD_ENGINE.decode(&compact)?;
    let (text, invalid) = escape_invalid_utf8(&bytes);
    if invalid > 0 {
        tracing::warn!(invalid_bytes = invalid, "payload is not valid UTF-8, escaping");
    }
    Ok(text)
}

/// Converts bytes to a `String`, replacing each invalid UTF-8 byte with `\xNN`.
///
/// Returns the text together with the number of bytes that were escaped.
pub fn escape_invalid_utf8(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut invalid = 0;

    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        for byte in chunk.invalid() {
            // Writing to a String cannot fail.
            let _ = write!(text, "\\x{byte:02x}");
            invalid += 1;
        }
    }

    (text, invalid)
}
