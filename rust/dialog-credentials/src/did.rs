//! `did:key` identifiers.
//!
//! A `did:key` is `did:key:z` followed by the base58btc encoding of a
//! multicodec-prefixed public key. Supported key types:
//!
//! | key type   | multicodec | key bytes                |
//! |------------|------------|--------------------------|
//! | Ed25519    | `0xed`     | 32 raw bytes             |
//! | P-256      | `0x1200`   | compressed SEC1 point    |
//! | RSA        | `0x1205`   | PKCS#1 DER public key    |

use crate::error::DidKeyError;
use dialog_token::{Algorithm, PublicKey};
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use std::{fmt, str::FromStr};

const DID_KEY_PREFIX: &str = "did:key:";

/// Varint encoding of `0xed` (ed25519-pub).
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Varint encoding of `0x1200` (p256-pub).
const P256_MULTICODEC: [u8; 2] = [0x80, 0x24];

/// Varint encoding of `0x1205` (rsa-pub).
const RSA_MULTICODEC: [u8; 2] = [0x85, 0x24];

/// A parsed `did:key` with validated key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidKey {
    algorithm: Algorithm,
    key: Vec<u8>,
}

impl DidKey {
    /// The did:key of an Ed25519 public key.
    #[must_use]
    pub fn ed25519(key: &ed25519_dalek::VerifyingKey) -> Self {
        Self {
            algorithm: Algorithm::EdDSA,
            key: key.to_bytes().to_vec(),
        }
    }

    /// The did:key of a P-256 public key.
    #[must_use]
    pub fn p256(key: &p256::ecdsa::VerifyingKey) -> Self {
        Self {
            algorithm: Algorithm::ES256,
            key: key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// The did:key of an RSA public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be DER encoded.
    pub fn rsa(key: &rsa::RsaPublicKey) -> Result<Self, DidKeyError> {
        let der = key
            .to_pkcs1_der()
            .map_err(|_| DidKeyError::InvalidKey)?;
        Ok(Self {
            algorithm: Algorithm::RS256,
            key: der.as_bytes().to_vec(),
        })
    }

    /// The signature algorithm this key verifies.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key bytes, without the multicodec prefix.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// The key in the form [`dialog_token::Verifier`]s consume.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.algorithm, self.key.as_slice())
    }

    const fn multicodec(&self) -> [u8; 2] {
        match self.algorithm {
            Algorithm::EdDSA => ED25519_MULTICODEC,
            Algorithm::ES256 => P256_MULTICODEC,
            Algorithm::RS256 => RSA_MULTICODEC,
        }
    }
}

impl fmt::Display for DidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw_bytes = Vec::with_capacity(2 + self.key.len());
        raw_bytes.extend_from_slice(&self.multicodec());
        raw_bytes.extend_from_slice(&self.key);
        write!(f, "{DID_KEY_PREFIX}z{}", bs58::encode(raw_bytes).into_string())
    }
}

impl FromStr for DidKey {
    type Err = DidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b58 = s
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or(DidKeyError::InvalidDidHeader)?
            .strip_prefix('z')
            .ok_or(DidKeyError::MissingBase58Prefix)?;
        let raw_bytes = bs58::decode(b58)
            .into_vec()
            .map_err(|_| DidKeyError::InvalidBase58)?;
        let (prefix, key) = raw_bytes
            .split_first_chunk::<2>()
            .ok_or(DidKeyError::UnsupportedKeyType)?;

        let algorithm = match *prefix {
            ED25519_MULTICODEC => {
                let bytes: &[u8; 32] = key.try_into().map_err(|_| DidKeyError::InvalidKey)?;
                ed25519_dalek::VerifyingKey::from_bytes(bytes)
                    .map_err(|_| DidKeyError::InvalidKey)?;
                Algorithm::EdDSA
            }
            P256_MULTICODEC => {
                p256::ecdsa::VerifyingKey::from_sec1_bytes(key)
                    .map_err(|_| DidKeyError::InvalidKey)?;
                Algorithm::ES256
            }
            RSA_MULTICODEC => {
                rsa::RsaPublicKey::from_pkcs1_der(key).map_err(|_| DidKeyError::InvalidKey)?;
                Algorithm::RS256
            }
            _ => return Err(DidKeyError::UnsupportedKeyType),
        };

        Ok(Self {
            algorithm,
            key: key.to_vec(),
        })
    }
}
