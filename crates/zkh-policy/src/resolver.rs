//! # Jurisdiction Resolver
//!
//! Maps (action, location) to the governing regulatory [`Validator`].
//! Cross-jurisdiction detection lives on
//! [`CrossJurisdictionScenario`](zkh_core::CrossJurisdictionScenario),
//! whose `jurisdictions()` gives the distinct set in actor/subject/data
//! order.
//!
//! ## Unambiguous by Construction
//!
//! Resolution is a pure lookup. The registry rejects a second validator
//! for an already-governed (action, location) pair at registration time,
//! so a lookup can never face two candidates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkh_core::{JurisdictionId, ValidationError, ValidatorId};

/// A jurisdiction's designated regulatory authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    /// Stable validator identifier (e.g. `us_hhs`).
    pub validator_id: ValidatorId,
    /// Display name (e.g. `US Department of Health & Human Services`).
    pub name: String,
    /// The jurisdiction the validator belongs to.
    pub country: JurisdictionId,
    /// The actions this validator governs.
    pub actions: Vec<String>,
}

/// No validator governs the requested (action, location) pair.
#[derive(Error, Debug)]
#[error("no validator governs action \"{action}\" in \"{location}\"")]
pub struct NoValidatorError {
    /// The requested action.
    pub action: String,
    /// The requested location.
    pub location: String,
}

/// Registry of validators with an (action, location) index.
#[derive(Debug, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<ValidatorId, Validator>,
    /// (action, location) → validator. Populated at registration; the
    /// uniqueness check here is what keeps `resolve` unambiguous.
    by_action_location: HashMap<(String, String), ValidatorId>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for every action it governs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmbiguousValidator`] if any of the
    /// validator's (action, location) pairs is already governed by a
    /// different validator. Nothing is registered on failure.
    pub fn register(&mut self, validator: Validator) -> Result<(), ValidationError> {
        for action in &validator.actions {
            let key = (
                action.clone(),
                validator.country.as_str().to_string(),
            );
            if let Some(existing) = self.by_action_location.get(&key) {
                if existing != &validator.validator_id {
                    return Err(ValidationError::AmbiguousValidator {
                        action: action.clone(),
                        location: validator.country.as_str().to_string(),
                        existing: existing.as_str().to_string(),
                    });
                }
            }
        }
        for action in &validator.actions {
            self.by_action_location.insert(
                (action.clone(), validator.country.as_str().to_string()),
                validator.validator_id.clone(),
            );
        }
        self.validators
            .insert(validator.validator_id.clone(), validator);
        Ok(())
    }

    /// Resolve the validator governing an (action, location) pair.
    pub fn resolve(
        &self,
        action: &str,
        location: &JurisdictionId,
    ) -> Result<&Validator, NoValidatorError> {
        let key = (action.to_string(), location.as_str().to_string());
        self.by_action_location
            .get(&key)
            .and_then(|id| self.validators.get(id))
            .ok_or_else(|| NoValidatorError {
                action: action.to_string(),
                location: location.as_str().to_string(),
            })
    }

    /// Look up a validator by identifier.
    pub fn get(&self, validator_id: &ValidatorId) -> Option<&Validator> {
        self.validators.get(validator_id)
    }
}
