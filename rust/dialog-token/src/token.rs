//! Token data model: header, payload, and the decoded token.

use crate::{Capability, Timestamp, TokenError, codec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// Value of the `typ` header.
pub const TOKEN_TYPE: &str = "JWT";

/// Signature algorithms a token may declare.
///
/// This is a closed set: any other `alg` value fails to decode, so a forged
/// header can never route around verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Ed25519.
    EdDSA,
    /// ECDSA over P-256 with SHA-256.
    ES256,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RS256,
}

impl Algorithm {
    /// The `alg` header value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EdDSA => "EdDSA",
            Self::ES256 => "ES256",
            Self::RS256 => "RS256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdDSA" => Ok(Self::EdDSA),
            "ES256" => Ok(Self::ES256),
            "RS256" => Ok(Self::RS256),
            other => Err(TokenError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Token header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    #[serde(rename = "alg")]
    algorithm: Algorithm,

    #[serde(rename = "typ")]
    token_type: TokenType,
}

impl Header {
    /// A header for `algorithm`.
    #[must_use]
    pub const fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            token_type: TokenType,
        }
    }

    /// Getter for the `alg` field.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Getter for the `typ` field.
    #[must_use]
    pub const fn token_type(&self) -> &'static str {
        TOKEN_TYPE
    }

    /// Parses a decoded header segment.
    ///
    /// The algorithm is checked after the shape so an unknown `alg` is
    /// reported as [`TokenError::UnsupportedAlgorithm`].
    pub(crate) fn decode(segment: &str) -> Result<Self, TokenError> {
        #[derive(Deserialize)]
        struct RawHeader {
            alg: String,
            typ: String,
        }

        let raw: RawHeader = codec::decode_json("header", segment)?;
        if raw.typ != TOKEN_TYPE {
            return Err(TokenError::malformed(format!(
                "header typ must be {TOKEN_TYPE:?}, found {:?}",
                raw.typ
            )));
        }
        Ok(Self::new(raw.alg.parse()?))
    }
}

/// The constant `typ` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TokenType;

impl Serialize for TokenType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(TOKEN_TYPE)
    }
}

/// Token claims.
///
/// Field names are fixed for interoperability. `exp` is always written
/// (`null` when the token never expires); `nbf`, `nnc` and `fct` are
/// omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "iss")]
    pub(crate) issuer: String,

    #[serde(rename = "aud")]
    pub(crate) audience: String,

    #[serde(rename = "exp", default)]
    pub(crate) expiration: Option<Timestamp>,

    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub(crate) not_before: Option<Timestamp>,

    #[serde(rename = "nnc", default, skip_serializing_if = "Option::is_none")]
    pub(crate) nonce: Option<String>,

    #[serde(rename = "fct", default, skip_serializing_if = "Option::is_none")]
    pub(crate) facts: Option<Map<String, Value>>,

    #[serde(rename = "att")]
    pub(crate) capabilities: Vec<Capability>,

    #[serde(rename = "prf", default)]
    pub(crate) proofs: Vec<String>,
}

impl Payload {
    /// Getter for the `iss` field.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Getter for the `aud` field.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Getter for the `exp` field. `None` means the token never expires.
    #[must_use]
    pub const fn expiration(&self) -> Option<Timestamp> {
        self.expiration
    }

    /// Getter for the `nbf` field. `None` means valid immediately.
    #[must_use]
    pub const fn not_before(&self) -> Option<Timestamp> {
        self.not_before
    }

    /// Getter for the `nnc` field.
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Getter for the `fct` field.
    #[must_use]
    pub const fn facts(&self) -> Option<&Map<String, Value>> {
        self.facts.as_ref()
    }

    /// Getter for the `att` field.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Getter for the `prf` field.
    #[must_use]
    pub fn proofs(&self) -> &[String] {
        &self.proofs
    }

    /// `true` when `nbf` and `exp` are both set and `nbf > exp`.
    #[must_use]
    pub fn has_empty_window(&self) -> bool {
        matches!(
            (self.not_before, self.expiration),
            (Some(not_before), Some(expiration)) if not_before > expiration
        )
    }
}

/// A structurally decoded token.
///
/// Keeps the literal encoded string so the signing input is always the
/// exact bytes that were signed, never a re-serialization. Decoding a token
/// does not make it trusted; see [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    header: Header,
    payload: Payload,
    signature: Vec<u8>,
    encoded: String,
    signing_input_len: usize,
}

impl Token {
    /// Decodes a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedToken`] when the string does not have
    /// three non-empty base64url segments or the header/payload JSON has the
    /// wrong shape, and [`TokenError::UnsupportedAlgorithm`] for an unknown
    /// `alg`.
    pub fn decode(encoded: &str) -> Result<Self, TokenError> {
        let [header_segment, payload_segment, signature_segment] = codec::split(encoded)?;
        let header = Header::decode(header_segment)?;
        let payload = codec::decode_json("payload", payload_segment)?;
        let signature = codec::decode_segment("signature", signature_segment)?;

        Ok(Self {
            header,
            payload,
            signature,
            encoded: encoded.to_owned(),
            signing_input_len: header_segment.len() + 1 + payload_segment.len(),
        })
    }

    /// Getter for the header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Getter for the payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Declared algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.header.algorithm()
    }

    /// Shorthand for the payload's issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        self.payload.issuer()
    }

    /// Shorthand for the payload's audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        self.payload.audience()
    }

    /// The exact bytes the signature covers.
    #[must_use]
    pub fn signing_input(&self) -> &[u8] {
        &self.encoded.as_bytes()[..self.signing_input_len]
    }

    /// The literal header segment.
    #[must_use]
    pub fn header_segment(&self) -> &str {
        self.segments().0
    }

    /// The literal payload segment.
    #[must_use]
    pub fn payload_segment(&self) -> &str {
        self.segments().1
    }

    /// The literal signature segment.
    #[must_use]
    pub fn signature_segment(&self) -> &str {
        &self.encoded[self.signing_input_len + 1..]
    }

    /// The token exactly as decoded.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    fn segments(&self) -> (&str, &str) {
        let signed = &self.encoded[..self.signing_input_len];
        signed.split_once(codec::SEPARATOR).unwrap_or((signed, ""))
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Decodes a compact token without validating it.
///
/// # Errors
///
/// See [`Token::decode`].
pub fn parse_token(encoded: &str) -> Result<Token, TokenError> {
    Token::decode(encoded)
}
