//! Ed25519 signer.

use crate::{DidKey, error::KeyError};
use dialog_token::{Algorithm, Signer};

/// An Ed25519 `did:key` signer.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    did: DidKey,
    key: ed25519_dalek::SigningKey,
}

impl From<ed25519_dalek::SigningKey> for Ed25519Signer {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        let did = DidKey::ed25519(&key.verifying_key());
        Self { did, key }
    }
}

impl Ed25519Signer {
    /// Generate a new Ed25519 keypair from the platform RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails.
    pub fn generate() -> Result<Self, KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(KeyError::Rng)?;
        Ok(Self::from_seed(&seed))
    }

    /// Import a keypair from its 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        ed25519_dalek::SigningKey::from_bytes(seed).into()
    }

    /// Get the associated DID.
    #[must_use]
    pub const fn did_key(&self) -> &DidKey {
        &self.did
    }
}

impl Signer for Ed25519Signer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    fn did(&self) -> String {
        self.did.to_string()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
        use signature::Signer as _;
        let signature = self.key.try_sign(payload)?;
        Ok(signature.to_bytes().to_vec())
    }
}
