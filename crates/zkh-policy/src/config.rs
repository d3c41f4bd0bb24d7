//! # Policy Configuration
//!
//! Serde-loadable configuration bundling validators, roles, and
//! jurisdiction rule sets, with the deployment defaults the platform
//! ships with (IN, CA, US, GB).
//!
//! Configuration is loaded once at startup and compiled into an immutable
//! [`PolicyEngine`]; changing policy means loading a new configuration
//! and rebuilding, never mutating a live engine.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkh_core::{JurisdictionId, ValidationError, ValidatorId};
use zkh_oracle::{AgreementStore, CrossJurisdictionChecker};

use crate::engine::PolicyEngine;
use crate::resolver::{Validator, ValidatorRegistry};
use crate::role::{Capability, RoleConfig, RoleRegistry};
use crate::rules::{ActionRule, JurisdictionRules, RuleSet};

/// Errors loading or saving policy configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The complete policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Regulatory validators.
    pub validators: Vec<Validator>,
    /// Role definitions.
    pub roles: Vec<RoleConfig>,
    /// Per-jurisdiction rule sets.
    pub jurisdictions: Vec<JurisdictionRules>,
}

impl PolicyConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save this configuration to a JSON file, pretty-printed for
    /// operator review.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Compile this configuration into a policy engine.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmbiguousValidator`] when two validators
    /// claim the same (action, location) pair.
    pub fn build_engine(
        self,
        store: Arc<AgreementStore>,
        checker: Arc<CrossJurisdictionChecker>,
    ) -> Result<PolicyEngine, ValidationError> {
        let mut validators = ValidatorRegistry::new();
        for validator in self.validators {
            validators.register(validator)?;
        }
        let mut roles = RoleRegistry::new();
        for role in self.roles {
            roles.insert(role);
        }
        let mut rules = RuleSet::new();
        for jurisdiction in self.jurisdictions {
            rules.insert(jurisdiction);
        }
        Ok(PolicyEngine::new(roles, validators, rules, store, checker))
    }
}

impl Default for PolicyConfig {
    /// The shipped deployment defaults: MCI (IN), Health Canada (CA),
    /// US HHS (US), and NHS (GB), with the standard clinical roles.
    fn default() -> Self {
        Self {
            validators: default_validators(),
            roles: default_roles(),
            jurisdictions: default_jurisdictions(),
        }
    }
}

fn jid(s: &str) -> JurisdictionId {
    // Literals below are non-empty; construction cannot fail.
    JurisdictionId::new(s).unwrap_or_else(|_| unreachable!("non-empty literal"))
}

fn vid(s: &str) -> ValidatorId {
    ValidatorId::new(s).unwrap_or_else(|_| unreachable!("non-empty literal"))
}

/// The standard clinical action set a national health validator governs.
fn clinical_actions() -> Vec<String> {
    ["prescribe", "diagnose", "refer", "issue_certificate"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_validators() -> Vec<Validator> {
    vec![
        Validator {
            validator_id: vid("mci_validator"),
            name: "Medical Council of India".to_string(),
            country: jid("IN"),
            actions: vec![
                "prescribe".to_string(),
                "diagnose".to_string(),
                "refer".to_string(),
                "issue_certificate".to_string(),
            ],
        },
        Validator {
            validator_id: vid("health_canada"),
            name: "Health Canada".to_string(),
            country: jid("CA"),
            actions: clinical_actions(),
        },
        Validator {
            validator_id: vid("us_hhs"),
            name: "US Department of Health & Human Services".to_string(),
            country: jid("US"),
            actions: clinical_actions(),
        },
        Validator {
            validator_id: vid("nhs_validator"),
            name: "National Health Service UK".to_string(),
            country: jid("GB"),
            actions: clinical_actions(),
        },
    ]
}

fn default_roles() -> Vec<RoleConfig> {
    vec![
        RoleConfig {
            name: "general_doctor".to_string(),
            strength: 5,
            capabilities: vec![
                Capability::any_resource("prescribe"),
                Capability::any_resource("diagnose"),
                Capability::any_resource("refer"),
            ],
            can_delegate: false,
            requires_mfa: true,
        },
        RoleConfig {
            name: "specialist".to_string(),
            strength: 8,
            capabilities: vec![
                Capability::any_resource("prescribe"),
                Capability::any_resource("diagnose"),
                Capability::any_resource("refer"),
                Capability::any_resource("issue_certificate"),
                Capability::any_resource("treatment:*"),
            ],
            can_delegate: true,
            requires_mfa: true,
        },
        RoleConfig {
            name: "nurse".to_string(),
            strength: 3,
            capabilities: vec![
                Capability::any_resource("record_vitals"),
                Capability::any_resource("administer_medication"),
            ],
            can_delegate: false,
            requires_mfa: true,
        },
        RoleConfig {
            name: "admin".to_string(),
            strength: 2,
            capabilities: vec![
                Capability::any_resource("view_records"),
                Capability::any_resource("schedule_appointment"),
            ],
            can_delegate: false,
            requires_mfa: true,
        },
        RoleConfig {
            name: "researcher".to_string(),
            strength: 4,
            capabilities: vec![
                Capability {
                    action: "access_anonymized_data".to_string(),
                    resource_type: "anonymized_data".to_string(),
                },
                Capability::any_resource("run_analytics"),
            ],
            can_delegate: false,
            requires_mfa: true,
        },
    ]
}

/// One national rule set. The clinical actions share a shape across the
/// shipped jurisdictions; only the validator differs.
fn national_rules(jurisdiction: &str, regulatory_body: &str, validator: &str) -> JurisdictionRules {
    let doctor_roles = vec!["general_doctor".to_string(), "specialist".to_string()];
    let mut action_rules = std::collections::BTreeMap::new();
    action_rules.insert(
        "prescribe".to_string(),
        ActionRule {
            required_roles: doctor_roles.clone(),
            minimum_role_strength: 5,
            requires_validator: true,
            validator_id: None,
            audit_required: true,
            retention_days: 365,
        },
    );
    action_rules.insert(
        "diagnose".to_string(),
        ActionRule {
            required_roles: doctor_roles.clone(),
            minimum_role_strength: 5,
            requires_validator: true,
            validator_id: None,
            audit_required: true,
            retention_days: 730,
        },
    );
    action_rules.insert(
        "refer".to_string(),
        ActionRule {
            required_roles: doctor_roles,
            minimum_role_strength: 5,
            requires_validator: true,
            validator_id: None,
            audit_required: true,
            retention_days: 365,
        },
    );
    action_rules.insert(
        "issue_certificate".to_string(),
        ActionRule {
            required_roles: vec!["specialist".to_string()],
            minimum_role_strength: 8,
            requires_validator: true,
            validator_id: None,
            audit_required: true,
            retention_days: 1825,
        },
    );

    let validator_mapping = action_rules
        .keys()
        .map(|action| (action.clone(), vid(validator)))
        .collect();

    JurisdictionRules {
        jurisdiction: jid(jurisdiction),
        regulatory_body: regulatory_body.to_string(),
        action_rules,
        validator_mapping,
    }
}

fn default_jurisdictions() -> Vec<JurisdictionRules> {
    let mut india = national_rules("IN", "Medical Council of India", "mci_validator");
    // India additionally defines nurse-recordable vitals with no
    // validator requirement.
    india.action_rules.insert(
        "record_vitals".to_string(),
        ActionRule {
            required_roles: vec![
                "nurse".to_string(),
                "general_doctor".to_string(),
                "specialist".to_string(),
            ],
            minimum_role_strength: 3,
            requires_validator: false,
            validator_id: None,
            audit_required: true,
            retention_days: 365,
        },
    );

    vec![
        india,
        national_rules("CA", "Health Canada", "health_canada"),
        national_rules("US", "Department of Health & Human Services", "us_hhs"),
        national_rules("GB", "National Health Service", "nhs_validator"),
    ]
}
