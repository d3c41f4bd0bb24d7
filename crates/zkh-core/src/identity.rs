//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the policy stack.
//! Each identifier is a distinct type — you cannot pass an [`AgreementId`]
//! where a [`ClauseId`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`ClauseId`], [`ValidatorId`],
//! [`JurisdictionId`]) are validated non-empty at construction time and
//! reject invalid values at deserialization. [`AgreementId`] is UUID-based
//! and always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// An agreement version number. Versions start at 1 and are bumped only by
/// the regulatory update propagator.
pub type AgreementVersion = u32;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AgreementId
// ---------------------------------------------------------------------------

/// A globally unique, opaque identifier for an agreement.
///
/// Identifies the agreement across all of its versions; pair with an
/// [`AgreementVersion`](crate::AgreementVersion) to address one immutable
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(Uuid);

impl AgreementId {
    /// Create a new random agreement identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an agreement identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AgreementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgreementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AgreementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// ClauseId
// ---------------------------------------------------------------------------

/// A clause identifier, unique within its agreement (e.g.
/// `hipaa-phi-access`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClauseId(String);

impl ClauseId {
    /// Create a clause identifier, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidClauseId`] if the string is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidClauseId);
        }
        Ok(Self(trimmed))
    }

    /// Access the clause identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(ClauseId);

impl std::fmt::Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ValidatorId
// ---------------------------------------------------------------------------

/// Identifier of a jurisdiction's regulatory authority (e.g. `us_hhs`,
/// `health_canada`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ValidatorId(String);

impl ValidatorId {
    /// Create a validator identifier, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValidatorId`] if the string is
    /// empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidValidatorId);
        }
        Ok(Self(trimmed))
    }

    /// Access the validator identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(ValidatorId);

impl std::fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// JurisdictionId
// ---------------------------------------------------------------------------

/// A jurisdiction identifier: an ISO 3166-1 country code or a regulatory
/// framework code (e.g. `US`, `CA`, `US-HIPAA`, `EU-GDPR`).
///
/// # Validation
///
/// Must be a non-empty string. No further format restrictions are imposed
/// because framework naming varies across regulatory regimes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JurisdictionId(String);

impl JurisdictionId {
    /// Create a jurisdiction identifier, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJurisdictionId`] if the string is
    /// empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidJurisdictionId);
        }
        Ok(Self(trimmed))
    }

    /// Access the jurisdiction identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(JurisdictionId);

impl std::fmt::Display for JurisdictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
