//! Delegable, self-certifying capability tokens.
//!
//! A token grants its audience a set of capabilities (resource, action and
//! caveats) on behalf of its issuer, and carries the parent tokens that
//! entitle the issuer to grant them. Anyone holding a token can re-delegate
//! a narrower subset by issuing a child token that embeds it as a proof.
//!
//! # Overview
//!
//! - [`TokenBuilder`] assembles claims and produces the compact
//!   `header.payload.signature` form, signed externally or by a [`Signer`].
//! - [`Token::decode`] parses that form without judging it.
//! - [`Validator`] checks the time window, the signatures and the
//!   delegation chain. Key resolution and signature verification are
//!   injected as a [`Resolver`] and a [`Verifier`].
//! - [`Attenuator`] decides whether one capability is a subset of another,
//!   with a pluggable [`ScopePolicy`] for resource containment.
//!
//! # Example
//!
//! ```ignore
//! use dialog_token::{Capability, SignatureCheck, Timestamp, TokenBuilder, ValidationOptions, Validator};
//!
//! let root = TokenBuilder::new()
//!     .audience(alice.did())
//!     .capability(Capability::new("storage://example.com/photos", "storage/read"))
//!     .sign(&root_signer)
//!     .await?;
//!
//! let options = ValidationOptions::new(Timestamp::now(), SignatureCheck::Verify);
//! let result = Validator::new(resolver, verifier)
//!     .validate_encoded(&root, &options)
//!     .await?;
//! assert!(result.valid);
//! ```

pub mod attenuation;
pub mod builder;
pub mod capability;
pub mod codec;
pub mod config;
pub mod error;
pub mod principal;
pub mod scope;
pub mod sync;
pub mod time;
pub mod token;
pub mod validate;

#[cfg(test)]
mod testing;

pub use attenuation::*;
pub use builder::*;
pub use capability::*;
pub use config::*;
pub use error::*;
pub use principal::*;
pub use scope::*;
pub use sync::{ConditionalSend, ConditionalSync};
pub use time::*;
pub use token::*;
pub use validate::*;
