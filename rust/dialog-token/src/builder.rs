//! Token builder.
//!
//! The builder only accumulates claims. Signatures come from outside, either
//! as raw bytes handed to [`TokenBuilder::build`] or from a [`Signer`] via
//! [`TokenBuilder::sign`], since key material may live in hardware or on a
//! remote service.
//!
//! Use a fresh builder per token; a builder is an owned value and is never
//! shared between writers.

use crate::{
    Algorithm, BuildError, Capability, Header, Payload, Signer, Timestamp, codec,
    codec::encode_segment,
};
use serde_json::{Map, Value};

/// Number of random bytes in a generated nonce.
const NONCE_LENGTH: usize = 12;

/// Accumulates claims for a single token.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    algorithm: Algorithm,
    issuer: Option<String>,
    audience: Option<String>,
    expiration: Option<Timestamp>,
    not_before: Option<Timestamp>,
    nonce: Option<String>,
    facts: Option<Map<String, Value>>,
    capabilities: Vec<Capability>,
    proofs: Vec<String>,
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBuilder {
    /// A blank builder declaring [`Algorithm::EdDSA`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            algorithm: Algorithm::EdDSA,
            issuer: None,
            audience: None,
            expiration: None,
            not_before: None,
            nonce: None,
            facts: None,
            capabilities: Vec::new(),
            proofs: Vec::new(),
        }
    }

    /// Sets the `alg` header. [`TokenBuilder::sign`] overrides it with the
    /// signer's algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets `iss`.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets `aud`.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets `exp`. `None` records a token that never expires, which is also
    /// what a builder that never calls this produces.
    #[must_use]
    pub fn expiration(mut self, expiration: Option<Timestamp>) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets `nbf`.
    ///
    /// An `nbf` later than `exp` is accepted here and rejected at
    /// validation time.
    #[must_use]
    pub fn not_before(mut self, not_before: Timestamp) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Sets `nnc`.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets `nnc` to fresh random bytes, base64url encoded.
    ///
    /// # Errors
    ///
    /// Fails if the platform RNG is unavailable.
    pub fn random_nonce(self) -> Result<Self, BuildError> {
        let mut bytes = [0u8; NONCE_LENGTH];
        getrandom::getrandom(&mut bytes).map_err(BuildError::Nonce)?;
        Ok(self.nonce(encode_segment(&bytes)))
    }

    /// Adds an entry to `fct`.
    #[must_use]
    pub fn fact(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.facts
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Appends a capability to `att`.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Appends several capabilities to `att`.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Appends an encoded parent token to `prf`.
    #[must_use]
    pub fn proof(mut self, encoded: impl Into<String>) -> Self {
        self.proofs.push(encoded.into());
        self
    }

    /// The header that will be written.
    #[must_use]
    pub const fn header(&self) -> Header {
        Header::new(self.algorithm)
    }

    /// A snapshot of the payload accumulated so far.
    ///
    /// # Errors
    ///
    /// Fails if the issuer or audience has not been set.
    pub fn payload(&self) -> Result<Payload, BuildError> {
        Ok(Payload {
            issuer: self.issuer.clone().ok_or(BuildError::MissingIssuer)?,
            audience: self.audience.clone().ok_or(BuildError::MissingAudience)?,
            expiration: self.expiration,
            not_before: self.not_before,
            nonce: self.nonce.clone(),
            facts: self.facts.clone(),
            capabilities: self.capabilities.clone(),
            proofs: self.proofs.clone(),
        })
    }

    /// The exact bytes an external signer must sign.
    ///
    /// # Errors
    ///
    /// Fails if the payload is incomplete or cannot be serialized.
    pub fn signing_input(&self) -> Result<String, BuildError> {
        Ok(codec::encode_signing_input(&self.header(), &self.payload()?)?)
    }

    /// Finishes the token with an externally computed signature.
    ///
    /// # Errors
    ///
    /// Fails if the payload is incomplete or cannot be serialized.
    pub fn build(self, signature: &[u8]) -> Result<String, BuildError> {
        Ok(codec::encode(&self.header(), &self.payload()?, signature)?)
    }

    /// Signs with `signer` and finishes the token.
    ///
    /// Adopts the signer's algorithm, and its DID as issuer when no issuer
    /// was set.
    ///
    /// # Errors
    ///
    /// Fails if a different issuer was set, the payload is incomplete, or
    /// the signer fails.
    pub async fn sign<S: Signer>(mut self, signer: &S) -> Result<String, BuildError> {
        let did = signer.did();
        let issuer = self.issuer.get_or_insert_with(|| did.clone());
        if *issuer != did {
            return Err(BuildError::IssuerMismatch {
                expected: issuer.clone(),
                found: did,
            });
        }
        self.algorithm = signer.algorithm();

        let input = self.signing_input()?;
        let signature = signer
            .sign(input.as_bytes())
            .await
            .map_err(BuildError::Signing)?;
        Ok(format!(
            "{input}{}{}",
            codec::SEPARATOR,
            encode_segment(&signature)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;
    use testresult::TestResult;

    struct FixedSigner;

    impl Signer for FixedSigner {
        fn algorithm(&self) -> Algorithm {
            Algorithm::RS256
        }

        fn did(&self) -> String {
            "did:example:signer".into()
        }

        async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
            Ok(payload.iter().rev().copied().collect())
        }
    }

    fn base() -> TokenBuilder {
        TokenBuilder::new()
            .audience("did:example:bob")
            .capability(Capability::new("storage://example.com", "storage/read"))
    }

    #[test]
    fn issuer_and_audience_are_required() {
        assert!(matches!(
            base().build(&[1]),
            Err(BuildError::MissingIssuer)
        ));
        assert!(matches!(
            TokenBuilder::new().issuer("did:example:alice").build(&[1]),
            Err(BuildError::MissingAudience)
        ));
    }

    #[test]
    fn build_appends_signature_to_signing_input() -> TestResult {
        let builder = base().issuer("did:example:alice");
        let input = builder.signing_input()?;
        let encoded = builder.build(&[0xde, 0xad])?;
        assert_eq!(encoded, format!("{input}.3q0"));
        Ok(())
    }

    #[test]
    fn inverted_window_is_not_a_build_error() -> TestResult {
        let encoded = base()
            .issuer("did:example:alice")
            .expiration(Some(Timestamp::from_unix(10)))
            .not_before(Timestamp::from_unix(20))
            .build(&[1])?;
        assert!(Token::decode(&encoded)?.payload().has_empty_window());
        Ok(())
    }

    #[test]
    fn random_nonces_differ() -> TestResult {
        let first = base().random_nonce()?.nonce.unwrap_or_default();
        let second = base().random_nonce()?.nonce.unwrap_or_default();
        assert_eq!(first.len(), 16);
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn sign_adopts_signer_identity_and_algorithm() -> TestResult {
        let encoded = base().sign(&FixedSigner).await?;
        let token = Token::decode(&encoded)?;

        assert_eq!(token.issuer(), "did:example:signer");
        assert_eq!(token.algorithm(), Algorithm::RS256);
        let expected: Vec<u8> = token.signing_input().iter().rev().copied().collect();
        assert_eq!(token.signature(), expected.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn sign_rejects_a_foreign_issuer() {
        let result = base().issuer("did:example:alice").sign(&FixedSigner).await;
        assert!(matches!(result, Err(BuildError::IssuerMismatch { .. })));
    }
}
