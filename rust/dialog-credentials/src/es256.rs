//! ECDSA P-256 signer.

use crate::{DidKey, error::KeyError};
use dialog_token::{Algorithm, Signer};

/// A P-256 `did:key` signer producing ES256 signatures.
#[derive(Debug, Clone)]
pub struct Es256Signer {
    did: DidKey,
    key: p256::ecdsa::SigningKey,
}

impl From<p256::ecdsa::SigningKey> for Es256Signer {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        let did = DidKey::p256(key.verifying_key());
        Self { did, key }
    }
}

impl Es256Signer {
    /// Generate a new P-256 keypair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng).into()
    }

    /// Import a keypair from its 32-byte secret scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if the scalar is zero or not below the curve order.
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        let key = p256::ecdsa::SigningKey::from_slice(secret).map_err(KeyError::InvalidSecretKey)?;
        Ok(key.into())
    }

    /// Get the associated DID.
    #[must_use]
    pub const fn did_key(&self) -> &DidKey {
        &self.did
    }
}

impl Signer for Es256Signer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ES256
    }

    fn did(&self) -> String {
        self.did.to_string()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
        use signature::Signer as _;
        let signature: p256::ecdsa::Signature = self.key.try_sign(payload)?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_bytes().to_vec())
    }
}
