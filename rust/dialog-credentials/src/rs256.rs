//! RSASSA-PKCS1-v1_5 signer.

use crate::{DidKey, error::KeyError};
use dialog_token::{Algorithm, Signer};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

/// An RSA `did:key` signer producing RS256 signatures.
#[derive(Debug, Clone)]
pub struct Rs256Signer {
    did: DidKey,
    key: rsa::pkcs1v15::SigningKey<Sha256>,
}

impl Rs256Signer {
    /// Wrap an RSA private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be expressed as a did:key.
    pub fn new(key: rsa::RsaPrivateKey) -> Result<Self, KeyError> {
        let did = DidKey::rsa(&key.to_public_key())?;
        Ok(Self {
            did,
            key: rsa::pkcs1v15::SigningKey::new(key),
        })
    }

    /// Generate a new RSA keypair of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R, bits: usize) -> Result<Self, KeyError> {
        Self::new(rsa::RsaPrivateKey::new(rng, bits)?)
    }

    /// Get the associated DID.
    #[must_use]
    pub const fn did_key(&self) -> &DidKey {
        &self.did
    }
}

impl Signer for Rs256Signer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    fn did(&self) -> String {
        self.did.to_string()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, signature::Error> {
        use signature::{SignatureEncoding as _, Signer as _};
        let signature = self.key.try_sign(payload)?;
        Ok(signature.to_vec())
    }
}
