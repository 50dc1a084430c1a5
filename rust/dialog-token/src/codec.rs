//! Compact three-segment serialization.
//!
//! ```text
//! base64url(header_json) "." base64url(payload_json) "." base64url(signature)
//! ```
//!
//! Segments use the URL-safe alphabet without padding. Decoding is purely
//! structural: it never looks at the signature or the time window.

use crate::{Header, Payload, TokenError};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

/// Segment separator.
pub const SEPARATOR: char = '.';

/// Encodes bytes as an unpadded base64url segment.
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes an unpadded base64url segment.
///
/// # Errors
///
/// Fails on padding, characters outside the URL-safe alphabet, or
/// non-canonical trailing bits.
pub fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|err| TokenError::malformed(format!("{name} is not base64url: {err}")))
}

/// Serializes `value` as JSON and encodes it as a segment.
///
/// # Errors
///
/// Fails if JSON serialization fails.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(encode_segment(&serde_json::to_vec(value)?))
}

/// Decodes a segment and parses its JSON into `T`.
///
/// # Errors
///
/// Fails if the segment is not base64url or the JSON does not have the
/// shape of `T`.
pub fn decode_json<T: DeserializeOwned>(name: &str, segment: &str) -> Result<T, TokenError> {
    let bytes = decode_segment(name, segment)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| TokenError::malformed(format!("{name} has the wrong shape: {err}")))
}

/// The bytes a signature covers: `header_segment "." payload_segment`.
///
/// # Errors
///
/// Fails if either structure cannot be serialized.
pub fn encode_signing_input(header: &Header, payload: &Payload) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{}{SEPARATOR}{}",
        encode_json(header)?,
        encode_json(payload)?
    ))
}

/// The full compact form, given an externally produced signature.
///
/// # Errors
///
/// Fails if either structure cannot be serialized.
pub fn encode(
    header: &Header,
    payload: &Payload,
    signature: &[u8],
) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{}{SEPARATOR}{}",
        encode_signing_input(header, payload)?,
        encode_segment(signature)
    ))
}

/// Splits a compact token into exactly three non-empty segments.
///
/// # Errors
///
/// Fails on any other segment count or on an empty segment.
pub fn split(token: &str) -> Result<[&str; 3], TokenError> {
    let segments: Vec<&str> = token.split(SEPARATOR).collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(TokenError::malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };
    for (name, segment) in [("header", header), ("payload", payload), ("signature", signature)] {
        if segment.is_empty() {
            return Err(TokenError::malformed(format!("{name} segment is empty")));
        }
    }
    Ok([*header, *payload, *signature])
}
