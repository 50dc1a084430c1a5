//! Error types for key handling and resolution.

use dialog_token::Algorithm;
use thiserror::Error;

/// Errors that can occur when parsing a `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DidKeyError {
    /// The DID does not start with `did:key:`.
    #[error("invalid did header")]
    InvalidDidHeader,

    /// The base58 prefix 'z' is missing.
    #[error("missing base58 prefix 'z'")]
    MissingBase58Prefix,

    /// The base58 encoding is invalid.
    #[error("invalid base58 encoding")]
    InvalidBase58,

    /// The multicodec prefix names a key type that is not supported.
    #[error("unsupported multicodec key type")]
    UnsupportedKeyType,

    /// The key bytes are invalid for their key type.
    #[error("invalid key bytes")]
    InvalidKey,
}

/// Error type for [`crate::DidKeyResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The DID could not be parsed as a supported did:key.
    #[error("invalid did:key: {0}")]
    InvalidDid(#[from] DidKeyError),

    /// The DID names a key for a different algorithm than the token declares.
    #[error("did:key holds a {found} key, token declares {expected}")]
    AlgorithmMismatch {
        /// Algorithm declared by the token.
        expected: Algorithm,
        /// Algorithm of the key in the DID.
        found: Algorithm,
    },
}

/// Errors from creating signing keys.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Random number generation failed.
    #[error("RNG error: {0}")]
    Rng(getrandom::Error),

    /// The secret key bytes are invalid.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(#[source] signature::Error),

    /// RSA key generation or encoding failed.
    #[error("RSA key error: {0}")]
    Rsa(#[from] rsa::Error),

    /// The public half could not be expressed as a did:key.
    #[error(transparent)]
    Did(#[from] DidKeyError),
}
