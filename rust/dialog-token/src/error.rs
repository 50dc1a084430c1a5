//! Error taxonomy for token decoding, building and validation.
//!
//! Hard failures ([`TokenError`], [`BuildError`], [`ValidateError`]) are
//! returned as `Err`. Semantic validation failures are not errors in the
//! `Result` sense: they are reported as a [`ValidationFailure`] inside a
//! [`ValidationResult`](crate::ValidationResult).
//!
//! Every error and failure maps onto a flat [`ErrorCode`] so service layers
//! can translate them without matching on payloads.

use crate::{AttenuationClause, Timestamp};
use serde::Serialize;

/// Flat classification of every failure the crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Structural
    /// The token string is not a structurally valid token.
    MalformedToken,
    /// An embedded proof string is not a structurally valid token.
    MalformedProof,
    /// The header names an algorithm outside the supported set.
    UnsupportedAlgorithm,

    // Cryptographic
    /// Key resolution or signature verification failed.
    SignatureInvalid,

    // Temporal
    /// `nbf` is later than `exp`.
    InvalidTimeWindow,
    /// The token is past its expiration.
    TokenExpired,
    /// The token is not valid yet.
    TokenNotYetValid,

    // Delegation
    /// A proof's audience is not the delegating token's issuer.
    ChainBroken,
    /// A delegated capability exceeds what the proof granted.
    AttenuationViolation,
    /// The proof chain exceeds the configured depth.
    ChainTooDeep,
    /// The proof chain re-introduces an issuer.
    CyclicDelegation,

    // Programmer errors
    /// The builder is missing required claims or could not sign.
    IncompleteToken,
    /// Validation options are out of range.
    InvalidOptions,
}

/// Structural decode failure.
///
/// Returned by [`parse_token`](crate::parse_token) when the input is not a
/// token at all. Decoding never inspects signatures or time windows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Wrong segment count, bad base64url, or a header/payload that does
    /// not have the expected shape.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The `alg` header is not one of the supported algorithms.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl TokenError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken(message.into())
    }

    /// Classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedToken(_) => ErrorCode::MalformedToken,
            Self::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
        }
    }
}

/// Failure to finish a token from a [`TokenBuilder`](crate::TokenBuilder).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No issuer was set.
    #[error("Token has no issuer")]
    MissingIssuer,

    /// No audience was set.
    #[error("Token has no audience")]
    MissingAudience,

    /// Header or payload could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The builder's issuer is not the signer's DID.
    #[error("Issuer mismatch: builder has {expected}, signer is {found}")]
    IssuerMismatch {
        /// Issuer recorded on the builder.
        expected: String,
        /// DID of the signer.
        found: String,
    },

    /// The external signer reported an error.
    #[error("Signing failed: {0}")]
    Signing(#[source] signature::Error),

    /// Random nonce generation failed.
    #[error("Nonce generation failed: {0}")]
    Nonce(getrandom::Error),
}

impl BuildError {
    /// Classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::IncompleteToken
    }
}

/// Hard failure of a validation call.
///
/// Semantic failures are never reported this way; see
/// [`ValidationResult`](crate::ValidationResult).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidateError {
    /// Options are out of their accepted range.
    #[error("Invalid validation options: {0}")]
    InvalidOptions(String),

    /// The top-level token could not be decoded.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ValidateError {
    /// Classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidOptions(_) => ErrorCode::InvalidOptions,
            Self::Token(err) => err.code(),
        }
    }
}

/// Reason a structurally valid token failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// A proof string could not be decoded.
    #[error("Proof[{index}] is malformed: {reason}")]
    MalformedProof {
        /// Position of the proof in the delegating token's `prf`.
        index: usize,
        /// Decoder message.
        reason: String,
    },

    /// A proof names an algorithm outside the supported set.
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The `alg` value found.
        algorithm: String,
    },

    /// Key resolution or signature verification failed.
    #[error("Invalid signature from {issuer}: {reason}")]
    SignatureInvalid {
        /// Issuer whose signature was checked.
        issuer: String,
        /// Collaborator message.
        reason: String,
    },

    /// `nbf` is later than `exp`.
    #[error("Time window is empty: nbf {not_before} is after exp {expiration}")]
    InvalidTimeWindow {
        /// The token's `nbf`.
        not_before: Timestamp,
        /// The token's `exp`.
        expiration: Timestamp,
    },

    /// The token expired.
    #[error("Token expired at {expiration}")]
    TokenExpired {
        /// The token's `exp`.
        expiration: Timestamp,
    },

    /// The token is not valid yet.
    #[error("Token not valid before {not_before}")]
    TokenNotYetValid {
        /// The token's `nbf`.
        not_before: Timestamp,
    },

    /// The proof was not addressed to the delegating issuer.
    #[error("Chain broken: issuer {issuer} is not the audience of its proof ({audience})")]
    ChainBroken {
        /// Issuer of the delegating token.
        issuer: String,
        /// Audience of the proof.
        audience: String,
    },

    /// A capability is broader than anything the proof granted.
    #[error("Capability[{capability}] exceeds its proof: {clause}")]
    AttenuationViolation {
        /// Position of the offending capability in the delegating token.
        capability: usize,
        /// The clause that failed against the closest parent capability.
        clause: AttenuationClause,
    },

    /// The proof chain is deeper than allowed.
    #[error("Proof chain exceeds maximum depth of {max}")]
    ChainTooDeep {
        /// Configured maximum.
        max: usize,
    },

    /// An issuer appears twice on one delegation path.
    #[error("Cyclic delegation through {issuer}")]
    CyclicDelegation {
        /// The repeated issuer.
        issuer: String,
    },
}

impl ValidationFailure {
    /// Classification of this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedProof { .. } => ErrorCode::MalformedProof,
            Self::UnsupportedAlgorithm { .. } => ErrorCode::UnsupportedAlgorithm,
            Self::SignatureInvalid { .. } => ErrorCode::SignatureInvalid,
            Self::InvalidTimeWindow { .. } => ErrorCode::InvalidTimeWindow,
            Self::TokenExpired { .. } => ErrorCode::TokenExpired,
            Self::TokenNotYetValid { .. } => ErrorCode::TokenNotYetValid,
            Self::ChainBroken { .. } => ErrorCode::ChainBroken,
            Self::AttenuationViolation { .. } => ErrorCode::AttenuationViolation,
            Self::ChainTooDeep { .. } => ErrorCode::ChainTooDeep,
            Self::CyclicDelegation { .. } => ErrorCode::CyclicDelegation,
        }
    }

    /// Failure for a proof that did not decode.
    pub(crate) fn from_proof_error(index: usize, err: TokenError) -> Self {
        match err {
            TokenError::UnsupportedAlgorithm(algorithm) => Self::UnsupportedAlgorithm { algorithm },
            TokenError::MalformedToken(reason) => Self::MalformedProof { index, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::CyclicDelegation).unwrap();
        assert_eq!(json, "\"CYCLIC_DELEGATION\"");
    }

    #[test]
    fn signing_errors_keep_their_source() {
        use std::error::Error as _;

        let err = BuildError::Signing(signature::Error::new());
        assert!(err.source().is_some());
        assert_eq!(err.code(), ErrorCode::IncompleteToken);
    }

    #[test]
    fn undecodable_proof_keeps_its_index() {
        let failure =
            ValidationFailure::from_proof_error(3, TokenError::malformed("expected 3 segments"));
        assert_eq!(failure.code(), ErrorCode::MalformedProof);
        assert!(failure.to_string().contains("Proof[3]"));
    }

    #[test]
    fn unsupported_proof_algorithm_is_not_reported_as_malformed() {
        let failure = ValidationFailure::from_proof_error(
            0,
            TokenError::UnsupportedAlgorithm("none".into()),
        );
        assert_eq!(failure.code(), ErrorCode::UnsupportedAlgorithm);
    }
}
