//! Collaborators the core consumes but never implements itself.
//!
//! Key resolution, signature verification and signing are injected by the
//! caller. They may be backed by a local keystore, a DID resolver on the
//! network, or hardware, so every call is asynchronous. The core never
//! retries them: a failed verification is not transient.
//!
//! Returned futures are [`ConditionalSend`], so a validator over native
//! collaborators can be driven from a multi-threaded runtime.

use crate::{Algorithm, ConditionalSend};
use std::{fmt, future::Future};

/// Public key material for one algorithm.
///
/// The bytes are opaque to the core; their format is agreed between the
/// [`Resolver`] and the [`Verifier`] that receive them.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: Algorithm,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wraps key bytes for `algorithm`.
    #[must_use]
    pub fn new(algorithm: Algorithm, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            bytes: bytes.into(),
        }
    }

    /// Algorithm this key verifies.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Resolves an issuer identifier to its public key.
pub trait Resolver {
    /// Error for identifiers that cannot be resolved.
    type Error: std::error::Error;

    /// Looks up the key `did` signs with under `algorithm`.
    ///
    /// Implementations must fail rather than return a key for a different
    /// algorithm.
    fn resolve(
        &self,
        did: &str,
        algorithm: Algorithm,
    ) -> impl Future<Output = Result<PublicKey, Self::Error>> + ConditionalSend;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    type Error = R::Error;

    fn resolve(
        &self,
        did: &str,
        algorithm: Algorithm,
    ) -> impl Future<Output = Result<PublicKey, Self::Error>> + ConditionalSend {
        (**self).resolve(did, algorithm)
    }
}

/// Verifies signatures, one entry point per supported algorithm.
pub trait Verifier {
    /// Verifies an Ed25519 signature.
    fn verify_eddsa(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend;

    /// Verifies an ECDSA P-256 / SHA-256 signature.
    fn verify_es256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend;

    /// Verifies an RSASSA-PKCS1-v1_5 / SHA-256 signature.
    fn verify_rs256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend;
}

impl<V: Verifier + ?Sized> Verifier for &V {
    fn verify_eddsa(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend {
        (**self).verify_eddsa(key, payload, signature)
    }

    fn verify_es256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend {
        (**self).verify_es256(key, payload, signature)
    }

    fn verify_rs256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + ConditionalSend {
        (**self).verify_rs256(key, payload, signature)
    }
}

/// Produces signatures for tokens, identified by a DID.
pub trait Signer {
    /// Algorithm of the produced signatures.
    fn algorithm(&self) -> Algorithm;

    /// Identifier written as `iss`.
    fn did(&self) -> String;

    /// Signs `payload`, returning raw signature bytes.
    fn sign(
        &self,
        payload: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, signature::Error>> + ConditionalSend;
}

/// Error from [`Unchecked`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("No key resolver configured")]
pub struct NoResolver;

/// Stand-in collaborator for validators that skip signatures.
///
/// Resolves nothing and verifies nothing, so a validator built with it
/// still fails closed if signature checks are turned on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl Resolver for Unchecked {
    type Error = NoResolver;

    async fn resolve(&self, _did: &str, _algorithm: Algorithm) -> Result<PublicKey, Self::Error> {
        Err(NoResolver)
    }
}

impl Verifier for Unchecked {
    async fn verify_eddsa(
        &self,
        _key: &PublicKey,
        _payload: &[u8],
        _signature: &[u8],
    ) -> Result<(), signature::Error> {
        Err(signature::Error::new())
    }

    async fn verify_es256(
        &self,
        _key: &PublicKey,
        _payload: &[u8],
        _signature: &[u8],
    ) -> Result<(), signature::Error> {
        Err(signature::Error::new())
    }

    async fn verify_rs256(
        &self,
        _key: &PublicKey,
        _payload: &[u8],
        _signature: &[u8],
    ) -> Result<(), signature::Error> {
        Err(signature::Error::new())
    }
}
