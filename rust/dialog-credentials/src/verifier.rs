//! Native signature verification.
//!
//! Key bytes are interpreted as [`crate::DidKey`] stores them: raw Ed25519
//! keys, SEC1 P-256 points and PKCS#1 DER RSA keys. Signatures use the
//! compact JWS encodings: 64-byte Ed25519 signatures, 64-byte `r || s`
//! ECDSA signatures and raw PKCS#1 v1.5 RSA signatures.
//!
//! ECDSA signatures must be in low-S form; the `n - s` twin of a valid
//! signature is rejected.

use dialog_token::{PublicKey, Verifier};
use rsa::pkcs1::DecodeRsaPublicKey;
use sha2::Sha256;
use signature::Verifier as _;

/// Verifies signatures with pure-Rust implementations of each algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeVerifier;

fn invalid_key<E>(_: E) -> signature::Error {
    signature::Error::new()
}

impl Verifier for NativeVerifier {
    async fn verify_eddsa(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), signature::Error> {
        let bytes: &[u8; 32] = key.as_bytes().try_into().map_err(invalid_key)?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(bytes)?;
        let signature = ed25519_dalek::Signature::from_slice(signature)?;
        key.verify(payload, &signature)
    }

    async fn verify_es256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), signature::Error> {
        let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())?;
        let signature = p256::ecdsa::Signature::from_slice(signature)?;
        if signature.normalize_s().is_some() {
            return Err(signature::Error::new());
        }
        key.verify(payload, &signature)
    }

    async fn verify_rs256(
        &self,
        key: &PublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), signature::Error> {
        let key = rsa::RsaPublicKey::from_pkcs1_der(key.as_bytes()).map_err(invalid_key)?;
        let key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key);
        let signature = rsa::pkcs1v15::Signature::try_from(signature)?;
        key.verify(payload, &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_token::Algorithm;
    use signature::Signer as _;
    use testresult::TestResult;

    #[tokio::test]
    async fn eddsa_signatures_verify_over_the_exact_bytes() -> TestResult {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&[5; 32]);
        let key = PublicKey::new(Algorithm::EdDSA, signing_key.verifying_key().to_bytes());
        let signature = signing_key.sign(b"header.payload").to_bytes();

        NativeVerifier
            .verify_eddsa(&key, b"header.payload", &signature)
            .await?;
        assert!(
            NativeVerifier
                .verify_eddsa(&key, b"header.payloaD", &signature)
                .await
                .is_err()
        );
        Ok(())
    }

    #[tokio::test]
    async fn es256_uses_fixed_width_signatures() -> TestResult {
        let signing_key = p256::ecdsa::SigningKey::from_slice(&[6; 32])?;
        let key = PublicKey::new(
            Algorithm::ES256,
            signing_key.verifying_key().to_encoded_point(true).as_bytes(),
        );
        let signature: p256::ecdsa::Signature = signing_key.sign(b"header.payload");
        let signature = signature.normalize_s().unwrap_or(signature);

        NativeVerifier
            .verify_es256(&key, b"header.payload", &signature.to_bytes())
            .await?;
        assert!(
            NativeVerifier
                .verify_es256(&key, b"header.payload", signature.to_der().as_bytes())
                .await
                .is_err()
        );
        Ok(())
    }

    #[tokio::test]
    async fn es256_rejects_high_s_signatures() -> TestResult {
        let signing_key = p256::ecdsa::SigningKey::from_slice(&[6; 32])?;
        let key = PublicKey::new(
            Algorithm::ES256,
            signing_key.verifying_key().to_encoded_point(true).as_bytes(),
        );
        let signature: p256::ecdsa::Signature = signing_key.sign(b"header.payload");
        let low = signature.normalize_s().unwrap_or(signature);
        let (r, s) = low.split_scalars();
        let high = p256::ecdsa::Signature::from_scalars(r, -s)?;

        assert!(high.normalize_s().is_some());
        NativeVerifier
            .verify_es256(&key, b"header.payload", &low.to_bytes())
            .await?;
        assert!(
            NativeVerifier
                .verify_es256(&key, b"header.payload", &high.to_bytes())
                .await
                .is_err()
        );
        Ok(())
    }

    #[tokio::test]
    async fn garbage_keys_fail_verification() {
        let key = PublicKey::new(Algorithm::RS256, [1, 2, 3]);
        assert!(
            NativeVerifier
                .verify_rs256(&key, b"payload", &[0; 128])
                .await
                .is_err()
        );
        let key = PublicKey::new(Algorithm::EdDSA, [1; 31]);
        assert!(
            NativeVerifier
                .verify_eddsa(&key, b"payload", &[0; 64])
                .await
                .is_err()
        );
    }
}
