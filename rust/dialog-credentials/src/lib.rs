//! Concrete keys and signatures for `dialog-token`.
//!
//! This crate provides the collaborators that `dialog-token` consumes but
//! does not implement:
//!
//! - [`DidKeyResolver`], a [`Resolver`] for `did:key` issuers
//! - [`NativeVerifier`], a [`Verifier`] for EdDSA, ES256 and RS256
//! - [`Ed25519Signer`], [`Es256Signer`] and [`Rs256Signer`], [`Signer`]s
//!   identified by their `did:key`
//!
//! [`Resolver`]: dialog_token::Resolver
//! [`Verifier`]: dialog_token::Verifier
//! [`Signer`]: dialog_token::Signer

pub mod did;
pub mod error;

mod ed25519;
mod es256;
mod resolver;
mod rs256;
mod verifier;

pub use did::DidKey;
pub use ed25519::Ed25519Signer;
pub use error::{DidKeyError, KeyError, ResolveError};
pub use es256::Es256Signer;
pub use resolver::DidKeyResolver;
pub use rs256::Rs256Signer;
pub use verifier::NativeVerifier;
