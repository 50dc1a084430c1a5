//! Capability attenuation.
//!
//! A delegated capability must be no broader than one it received. A child
//! attenuates a parent when all three clauses hold:
//!
//! 1. the child's resource lies within the parent's ([`ScopePolicy`]),
//! 2. the parent's action permits the child's action,
//! 3. every parent caveat is implied by a child caveat of the same key.
//!
//! The child may add caveats; it may not drop or loosen any.

use crate::{Capability, ScopePolicy, UrlScope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The attenuation clause a comparison failed on.
///
/// Ordered by how far a comparison got before failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttenuationClause {
    /// The child's resource is outside the parent's.
    ResourceOutOfScope,
    /// The parent does not grant the child's action.
    ActionNotPermitted,
    /// A parent caveat is missing or loosened on the child.
    CaveatViolation,
}

impl AttenuationClause {
    /// Snake-case name, as used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceOutOfScope => "resource_out_of_scope",
            Self::ActionNotPermitted => "action_not_permitted",
            Self::CaveatViolation => "caveat_violation",
        }
    }
}

impl fmt::Display for AttenuationClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an attenuation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttenuationOutcome {
    /// Whether the child is within the parent's grant.
    pub valid: bool,

    /// The failing clause, when `valid` is false.
    pub reason: Option<AttenuationClause>,
}

impl AttenuationOutcome {
    const GRANTED: Self = Self {
        valid: true,
        reason: None,
    };

    const fn denied(clause: AttenuationClause) -> Self {
        Self {
            valid: false,
            reason: Some(clause),
        }
    }

    /// Converts to a `Result`, with the failing clause as the error.
    ///
    /// # Errors
    ///
    /// Returns the failing clause when the outcome is not valid.
    pub fn into_result(self) -> Result<(), AttenuationClause> {
        match self.reason {
            Some(clause) => Err(clause),
            None => Ok(()),
        }
    }
}

/// Checks capabilities against their parents under a [`ScopePolicy`].
#[derive(Debug, Clone, Default)]
pub struct Attenuator<P = UrlScope> {
    scope: P,
}

impl<P: ScopePolicy> Attenuator<P> {
    /// An attenuator using `scope` for resource containment.
    pub const fn new(scope: P) -> Self {
        Self { scope }
    }

    /// Checks `child` against a single `parent`.
    pub fn check(&self, child: &Capability, parent: &Capability) -> AttenuationOutcome {
        if !self.scope.contains(parent.resource(), child.resource()) {
            return AttenuationOutcome::denied(AttenuationClause::ResourceOutOfScope);
        }
        if !parent.permits_action(child.action()) {
            return AttenuationOutcome::denied(AttenuationClause::ActionNotPermitted);
        }
        let caveats_hold = parent.caveats().iter().all(|required| {
            child
                .caveat_value(required.key())
                .is_some_and(|value| required.is_implied_by(value))
        });
        if !caveats_hold {
            return AttenuationOutcome::denied(AttenuationClause::CaveatViolation);
        }
        AttenuationOutcome::GRANTED
    }

    /// Checks `child` against a set of parents, succeeding if any grants it.
    ///
    /// When none does, the reported clause is the one from the comparison
    /// that got furthest, taking the earliest parent on ties. An empty
    /// parent set reports [`AttenuationClause::ResourceOutOfScope`].
    pub fn check_any(&self, child: &Capability, parents: &[Capability]) -> AttenuationOutcome {
        let mut closest: Option<AttenuationClause> = None;
        for parent in parents {
            match self.check(child, parent).reason {
                None => return AttenuationOutcome::GRANTED,
                Some(clause) => {
                    if closest.is_none_or(|best| clause > best) {
                        closest = Some(clause);
                    }
                }
            }
        }
        AttenuationOutcome::denied(closest.unwrap_or(AttenuationClause::ResourceOutOfScope))
    }
}

/// Checks `child` against `parent` using [`UrlScope`] containment.
pub fn validate_capability_attenuation(
    child: &Capability,
    parent: &Capability,
) -> AttenuationOutcome {
    Attenuator::<UrlScope>::default().check(child, parent)
}
