//! did:key resolver.

use crate::{DidKey, error::ResolveError};
use dialog_token::{Algorithm, PublicKey, Resolver};

/// Resolves `did:key` issuers to their embedded public keys.
///
/// Needs no network or storage, since the key is the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct DidKeyResolver;

impl Resolver for DidKeyResolver {
    type Error = ResolveError;

    async fn resolve(&self, did: &str, algorithm: Algorithm) -> Result<PublicKey, Self::Error> {
        let key: DidKey = did.parse()?;
        if key.algorithm() != algorithm {
            tracing::debug!(%did, expected = %algorithm, found = %key.algorithm(), "algorithm mismatch");
            return Err(ResolveError::AlgorithmMismatch {
                expected: algorithm,
                found: key.algorithm(),
            });
        }
        Ok(key.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DidKeyError;
    use testresult::TestResult;

    fn ed25519_did() -> String {
        DidKey::ed25519(&ed25519_dalek::SigningKey::from_bytes(&[3; 32]).verifying_key())
            .to_string()
    }

    #[tokio::test]
    async fn resolves_keys_for_their_own_algorithm() -> TestResult {
        let key = DidKeyResolver.resolve(&ed25519_did(), Algorithm::EdDSA).await?;
        assert_eq!(key.algorithm(), Algorithm::EdDSA);
        assert_eq!(key.as_bytes().len(), 32);
        Ok(())
    }

    #[tokio::test]
    async fn refuses_algorithm_confusion() {
        let result = DidKeyResolver.resolve(&ed25519_did(), Algorithm::ES256).await;
        assert_eq!(
            result.map(|key| key.algorithm()),
            Err(ResolveError::AlgorithmMismatch {
                expected: Algorithm::ES256,
                found: Algorithm::EdDSA,
            })
        );
    }

    #[tokio::test]
    async fn refuses_other_did_methods() {
        let result = DidKeyResolver
            .resolve("did:web:example.com", Algorithm::EdDSA)
            .await;
        assert!(matches!(
            result,
            Err(ResolveError::InvalidDid(DidKeyError::InvalidDidHeader))
        ));
    }
}
