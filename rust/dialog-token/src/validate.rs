//! Token validation.
//!
//! A [`Validator`] checks, cheapest first and stopping at the first
//! failure:
//!
//! 1. the token's time window,
//! 2. its signature (unless [`SignatureCheck::Skip`] is chosen explicitly),
//! 3. its delegation chain.
//!
//! The chain walk decodes each proof and checks its window and signature.
//! It then checks that the proof was addressed to the delegating issuer,
//! that every delegated capability attenuates one of the proof's, and then
//! recurses into the proof's own proofs. Proofs embed parents by value, so
//! nothing in the wire format stops a forged cycle or an unbounded chain.
//! Both are checked explicitly.

use crate::{
    Algorithm, Attenuator, ErrorCode, Payload, ScopePolicy, TimeContext, Timestamp, Token,
    UrlScope, ValidateError, ValidationFailure, is_token_expired, is_token_not_yet_valid,
    principal::{Resolver, Unchecked, Verifier},
    sync::{ConditionalSync, MaybeBoxFuture, boxed},
};
use futures::future::join_all;
use tracing::{debug, warn};

/// Default bound on proof-chain depth.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Largest accepted `max_chain_depth`.
pub const MAX_CHAIN_DEPTH_LIMIT: usize = 64;

/// Whether signatures are verified.
///
/// Deliberately has no default: skipping must be spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// Resolve each issuer's key and verify every signature in the chain.
    Verify,
    /// Trust signatures, e.g. when another layer already verified them.
    Skip,
}

/// Parameters of a validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Clock and drift tolerance applied to every token in the chain.
    pub time: TimeContext,

    /// Signature policy applied to every token in the chain.
    pub signatures: SignatureCheck,

    /// Deepest proof accepted; the validated token is depth 0.
    pub max_chain_depth: usize,
}

impl ValidationOptions {
    /// Options at `now`, with no drift tolerance and the default depth.
    #[must_use]
    pub const fn new(now: Timestamp, signatures: SignatureCheck) -> Self {
        Self {
            time: TimeContext::at(now),
            signatures,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Sets the clock drift tolerance in seconds.
    #[must_use]
    pub const fn with_clock_drift_tolerance(mut self, seconds: u64) -> Self {
        self.time = self.time.with_clock_drift_tolerance(seconds);
        self
    }

    /// Sets the maximum proof-chain depth.
    #[must_use]
    pub const fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    fn check(&self) -> Result<(), ValidateError> {
        if self.max_chain_depth == 0 || self.max_chain_depth > MAX_CHAIN_DEPTH_LIMIT {
            return Err(ValidateError::InvalidOptions(format!(
                "max_chain_depth must be between 1 and {MAX_CHAIN_DEPTH_LIMIT}, got {}",
                self.max_chain_depth
            )));
        }
        Ok(())
    }
}

/// Outcome of validating a structurally valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the token is valid.
    pub valid: bool,

    /// Why it is not, when `valid` is false.
    pub reason: Option<ValidationFailure>,

    /// On success, the depth reached through the first proof at each hop
    /// (0 for a root token). On failure, the depth the failure was found at.
    pub chain_depth: usize,
}

impl ValidationResult {
    const fn accepted(chain_depth: usize) -> Self {
        Self {
            valid: true,
            reason: None,
            chain_depth,
        }
    }

    fn rejected(rejection: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(rejection.reason),
            chain_depth: rejection.depth,
        }
    }

    /// Classification of the failure, if any.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        self.reason.as_ref().map(ValidationFailure::code)
    }

    /// Converts to a `Result` carrying the chain depth.
    ///
    /// # Errors
    ///
    /// Returns the failure reason when the token is not valid.
    pub fn into_result(self) -> Result<usize, ValidationFailure> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(self.chain_depth),
        }
    }
}

/// A failure and where in the chain it happened.
#[derive(Debug)]
struct Rejection {
    reason: ValidationFailure,
    depth: usize,
}

/// Validates tokens and their delegation chains.
///
/// Holds the injected key [`Resolver`] and signature [`Verifier`], and the
/// [`ScopePolicy`] used for resource containment. A validator holds no
/// mutable state and can be shared by concurrent callers.
#[derive(Debug, Clone)]
pub struct Validator<R, V, P = UrlScope> {
    resolver: R,
    verifier: V,
    attenuator: Attenuator<P>,
}

impl Validator<Unchecked, Unchecked> {
    /// A validator with no key material, for [`SignatureCheck::Skip`].
    ///
    /// With [`SignatureCheck::Verify`] every token fails with
    /// [`ValidationFailure::SignatureInvalid`].
    #[must_use]
    pub fn unchecked() -> Self {
        Self::new(Unchecked, Unchecked)
    }
}

impl<R, V> Validator<R, V> {
    /// A validator using `resolver` and `verifier` and [`UrlScope`].
    pub fn new(resolver: R, verifier: V) -> Self {
        Self {
            resolver,
            verifier,
            attenuator: Attenuator::default(),
        }
    }
}

impl<R, V, P> Validator<R, V, P> {
    /// Replaces the resource containment policy.
    pub fn with_scope_policy<Q: ScopePolicy>(self, scope: Q) -> Validator<R, V, Q> {
        Validator {
            resolver: self.resolver,
            verifier: self.verifier,
            attenuator: Attenuator::new(scope),
        }
    }
}

impl<R, V, P> Validator<R, V, P>
where
    R: Resolver + ConditionalSync,
    V: Verifier + ConditionalSync,
    P: ScopePolicy + ConditionalSync,
{
    /// Decodes and validates an encoded token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Token`] if the string is not a token at
    /// all, and [`ValidateError::InvalidOptions`] for out-of-range options.
    pub async fn validate_encoded(
        &self,
        encoded: &str,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, ValidateError> {
        let token = Token::decode(encoded)?;
        self.validate_token(&token, options).await
    }

    /// Validates a decoded token.
    ///
    /// Semantic failures are reported in the returned
    /// [`ValidationResult`], never as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidOptions`] for out-of-range options.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(issuer = %token.issuer(), audience = %token.audience())
    )]
    pub async fn validate_token(
        &self,
        token: &Token,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, ValidateError> {
        options.check()?;

        let result = match self.check_token(token, options).await {
            Ok(depth) => ValidationResult::accepted(depth),
            Err(rejection) => {
                debug!(
                    code = ?rejection.reason.code(),
                    depth = rejection.depth,
                    "token rejected: {}",
                    rejection.reason
                );
                ValidationResult::rejected(rejection)
            }
        };
        Ok(result)
    }

    /// Verifies a single token's signature over its literal signing input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailure::SignatureInvalid`] if the issuer's key
    /// cannot be resolved for the token's algorithm or the signature does
    /// not verify.
    pub async fn verify_signature(&self, token: &Token) -> Result<(), ValidationFailure> {
        let algorithm = token.algorithm();
        let invalid = |reason: String| {
            warn!(issuer = %token.issuer(), %algorithm, %reason, "signature check failed");
            ValidationFailure::SignatureInvalid {
                issuer: token.issuer().to_owned(),
                reason,
            }
        };

        let key = self
            .resolver
            .resolve(token.issuer(), algorithm)
            .await
            .map_err(|err| invalid(format!("key resolution failed: {err}")))?;
        if key.algorithm() != algorithm {
            return Err(invalid(format!(
                "resolved a {} key for a {algorithm} token",
                key.algorithm()
            )));
        }

        let payload = token.signing_input();
        let signature = token.signature();
        let verified = match algorithm {
            Algorithm::EdDSA => self.verifier.verify_eddsa(&key, payload, signature).await,
            Algorithm::ES256 => self.verifier.verify_es256(&key, payload, signature).await,
            Algorithm::RS256 => self.verifier.verify_rs256(&key, payload, signature).await,
        };
        verified.map_err(|err| invalid(format!("signature verification failed: {err}")))
    }

    async fn check_token(
        &self,
        token: &Token,
        options: &ValidationOptions,
    ) -> Result<usize, Rejection> {
        let at_root = |reason| Rejection { reason, depth: 0 };

        check_window(token.payload(), &options.time).map_err(at_root)?;
        if options.signatures == SignatureCheck::Verify {
            self.verify_signature(token).await.map_err(at_root)?;
        }

        let lineage = vec![token.issuer().to_owned()];
        self.check_proofs(token, 0, &lineage, options).await
    }

    /// Checks every proof of `child`, concurrently.
    ///
    /// Results are inspected in `prf` order, so the reported failure and
    /// depth do not depend on completion order.
    fn check_proofs<'a>(
        &'a self,
        child: &'a Token,
        depth: usize,
        lineage: &'a [String],
        options: &'a ValidationOptions,
    ) -> MaybeBoxFuture<'a, Result<usize, Rejection>> {
        boxed(async move {
            let checks = child
                .payload()
                .proofs()
                .iter()
                .enumerate()
                .map(|(index, proof)| {
                    self.check_proof(child, index, proof, depth + 1, lineage, options)
                });

            let mut reached = None;
            for outcome in join_all(checks).await {
                let proof_depth = outcome?;
                reached.get_or_insert(proof_depth);
            }
            Ok(reached.unwrap_or(depth))
        })
    }

    async fn check_proof(
        &self,
        child: &Token,
        index: usize,
        encoded: &str,
        depth: usize,
        lineage: &[String],
        options: &ValidationOptions,
    ) -> Result<usize, Rejection> {
        let reject = move |reason| Rejection { reason, depth };

        if depth > options.max_chain_depth {
            return Err(reject(ValidationFailure::ChainTooDeep {
                max: options.max_chain_depth,
            }));
        }

        let parent = Token::decode(encoded)
            .map_err(|err| reject(ValidationFailure::from_proof_error(index, err)))?;
        debug!(depth, index, issuer = %parent.issuer(), "checking proof");

        if lineage.iter().any(|seen| seen == parent.issuer()) {
            return Err(reject(ValidationFailure::CyclicDelegation {
                issuer: parent.issuer().to_owned(),
            }));
        }

        check_window(parent.payload(), &options.time).map_err(reject)?;
        if options.signatures == SignatureCheck::Verify {
            self.verify_signature(&parent).await.map_err(reject)?;
        }

        if parent.audience() != child.issuer() {
            return Err(reject(ValidationFailure::ChainBroken {
                issuer: child.issuer().to_owned(),
                audience: parent.audience().to_owned(),
            }));
        }
        self.check_attenuation(child, &parent).map_err(reject)?;

        let mut lineage = lineage.to_vec();
        lineage.push(parent.issuer().to_owned());
        self.check_proofs(&parent, depth, &lineage, options).await
    }

    fn check_attenuation(&self, child: &Token, parent: &Token) -> Result<(), ValidationFailure> {
        let granted = parent.payload().capabilities();
        for (index, capability) in child.payload().capabilities().iter().enumerate() {
            self.attenuator
                .check_any(capability, granted)
                .into_result()
                .map_err(|clause| ValidationFailure::AttenuationViolation {
                    capability: index,
                    clause,
                })?;
        }
        Ok(())
    }
}

fn check_window(payload: &Payload, time: &TimeContext) -> Result<(), ValidationFailure> {
    if let (Some(not_before), Some(expiration)) = (payload.not_before(), payload.expiration()) {
        if not_before > expiration {
            return Err(ValidationFailure::InvalidTimeWindow {
                not_before,
                expiration,
            });
        }
    }
    if let Some(expiration) = payload
        .expiration()
        .filter(|_| is_token_expired(payload, time))
    {
        return Err(ValidationFailure::TokenExpired { expiration });
    }
    if let Some(not_before) = payload
        .not_before()
        .filter(|_| is_token_not_yet_valid(payload, time))
    {
        return Err(ValidationFailure::TokenNotYetValid { not_before });
    }
    Ok(())
}

/// Validates `token` with the given collaborators and [`UrlScope`].
///
/// # Errors
///
/// See [`Validator::validate_token`].
pub async fn validate_token<R, V>(
    token: &Token,
    options: &ValidationOptions,
    resolver: &R,
    verifier: &V,
) -> Result<ValidationResult, ValidateError>
where
    R: Resolver + ConditionalSync,
    V: Verifier + ConditionalSync,
{
    Validator::new(resolver, verifier)
        .validate_token(token, options)
        .await
}
