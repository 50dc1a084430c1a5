//! Serializable validator settings.
//!
//! Services usually read validation settings from a config file rather than
//! hard-coding them. [`ValidatorConfig`] is that file's shape. It turns into
//! [`ValidationOptions`] once the current time is known.

use crate::{
    SignatureCheck, Timestamp, ValidationOptions,
    validate::DEFAULT_MAX_CHAIN_DEPTH,
};
use serde::{Deserialize, Serialize};

/// Validator settings as stored in configuration.
///
/// `verify_signature` has no default, so a config that forgets it fails to
/// load instead of silently choosing a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Whether to verify signatures along the chain.
    pub verify_signature: bool,

    /// Seconds of clock skew tolerated on `exp` and `nbf`.
    #[serde(default)]
    pub clock_drift_tolerance: u64,

    /// Deepest proof accepted.
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,
}

const fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

impl ValidatorConfig {
    /// The signature policy this config selects.
    #[must_use]
    pub const fn signature_check(&self) -> SignatureCheck {
        if self.verify_signature {
            SignatureCheck::Verify
        } else {
            SignatureCheck::Skip
        }
    }

    /// Options for a validation performed at `now`.
    ///
    /// Range checks on the depth happen when the options are used.
    #[must_use]
    pub const fn options_at(&self, now: Timestamp) -> ValidationOptions {
        ValidationOptions::new(now, self.signature_check())
            .with_clock_drift_tolerance(self.clock_drift_tolerance)
            .with_max_chain_depth(self.max_chain_depth)
    }

    /// Options for a validation performed now.
    #[must_use]
    pub fn options_now(&self) -> ValidationOptions {
        self.options_at(Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TimeContext, ValidateError, Validator};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn defaults_apply_to_optional_fields() -> TestResult {
        let config: ValidatorConfig = serde_json::from_value(json!({ "verify_signature": true }))?;
        assert_eq!(
            config,
            ValidatorConfig {
                verify_signature: true,
                clock_drift_tolerance: 0,
                max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            }
        );
        Ok(())
    }

    #[test]
    fn signature_policy_must_be_explicit() {
        let missing = serde_json::from_value::<ValidatorConfig>(json!({ "max_chain_depth": 4 }));
        assert!(missing.is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let typo = serde_json::from_value::<ValidatorConfig>(json!({
            "verify_signature": false,
            "clock_drift": 30,
        }));
        assert!(typo.is_err());
    }

    #[test]
    fn options_carry_every_setting() -> TestResult {
        let config: ValidatorConfig = serde_json::from_value(json!({
            "verify_signature": false,
            "clock_drift_tolerance": 30,
            "max_chain_depth": 3,
        }))?;
        let now = Timestamp::from_unix(1_000);
        assert_eq!(
            config.options_at(now),
            ValidationOptions {
                time: TimeContext::at(now).with_clock_drift_tolerance(30),
                signatures: SignatureCheck::Skip,
                max_chain_depth: 3,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_depth_fails_on_use() -> TestResult {
        let config: ValidatorConfig = serde_json::from_value(json!({
            "verify_signature": false,
            "max_chain_depth": 0,
        }))?;
        let token = crate::TokenBuilder::new()
            .issuer("did:example:alice")
            .audience("did:example:bob")
            .build(&[1])?;

        let result = Validator::unchecked()
            .validate_encoded(&token, &config.options_now())
            .await;
        assert!(matches!(result, Err(ValidateError::InvalidOptions(_))));
        Ok(())
    }
}
