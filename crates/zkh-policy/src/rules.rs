//! # Jurisdiction Action Rules
//!
//! Per-(jurisdiction, action) requirements layered on top of the role
//! capability check: which roles may perform the action there, the
//! minimum role strength, whether a regulatory validator must sign off,
//! and the audit obligations.
//!
//! Rules are static reference data loaded from configuration. A location
//! with no rules, or an action undefined for its location, denies the
//! request (fail-closed).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use zkh_core::{JurisdictionId, ValidatorId};

/// Requirements for one action within one jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRule {
    /// Roles allowed to perform the action here.
    pub required_roles: Vec<String>,
    /// Minimum role strength demanded by the action.
    #[serde(default)]
    pub minimum_role_strength: u8,
    /// Whether a regulatory validator must govern the action.
    #[serde(default)]
    pub requires_validator: bool,
    /// Explicit validator override; when absent the jurisdiction's
    /// validator mapping (or the resolver) supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_id: Option<ValidatorId>,
    /// Whether an audit record must accompany the decision.
    #[serde(default)]
    pub audit_required: bool,
    /// Retention period for the audit record, in days.
    #[serde(default)]
    pub retention_days: u32,
}

impl ActionRule {
    /// Whether the rule admits the given role name.
    pub fn admits_role(&self, role: &str) -> bool {
        self.required_roles.iter().any(|r| r == role || r == "*")
    }
}

/// The regulatory framework for one jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionRules {
    /// The jurisdiction these rules govern.
    pub jurisdiction: JurisdictionId,
    /// Name of the regulatory body (operator-facing).
    pub regulatory_body: String,
    /// Requirements per action.
    pub action_rules: BTreeMap<String, ActionRule>,
    /// Fallback action → validator mapping for rules without an explicit
    /// validator override.
    #[serde(default)]
    pub validator_mapping: BTreeMap<String, ValidatorId>,
}

impl JurisdictionRules {
    /// The validator an action rule designates: explicit override first,
    /// jurisdiction mapping second.
    pub fn validator_for(&self, action: &str) -> Option<&ValidatorId> {
        self.action_rules
            .get(action)
            .and_then(|rule| rule.validator_id.as_ref())
            .or_else(|| self.validator_mapping.get(action))
    }
}

/// All jurisdiction rule sets, keyed by jurisdiction code.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: HashMap<String, JurisdictionRules>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rules for a jurisdiction.
    pub fn insert(&mut self, rules: JurisdictionRules) {
        self.rules
            .insert(rules.jurisdiction.as_str().to_string(), rules);
    }

    /// Look up the rules for a jurisdiction.
    pub fn get(&self, jurisdiction: &JurisdictionId) -> Option<&JurisdictionRules> {
        self.rules.get(jurisdiction.as_str())
    }

    /// Look up one action rule.
    pub fn action_rule(&self, jurisdiction: &JurisdictionId, action: &str) -> Option<&ActionRule> {
        self.get(jurisdiction)?.action_rules.get(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jid(s: &str) -> JurisdictionId {
        JurisdictionId::new(s).unwrap()
    }

    fn vid(s: &str) -> ValidatorId {
        ValidatorId::new(s).unwrap()
    }

    fn sample_rules() -> JurisdictionRules {
        let mut action_rules = BTreeMap::new();
        action_rules.insert(
            "prescribe".to_string(),
            ActionRule {
                required_roles: vec!["general_doctor".to_string(), "specialist".to_string()],
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
                validator_id: Some(vid("us_hhs")),
                audit_required: true,
                retention_days: 1825,
            },
        );
        let mut validator_mapping = BTreeMap::new();
        validator_mapping.insert("prescribe".to_string(), vid("us_hhs"));

        JurisdictionRules {
            jurisdiction: jid("US"),
            regulatory_body: "Department of Health & Human Services".to_string(),
            action_rules,
            validator_mapping,
        }
    }

    #[test]
    fn admits_listed_roles_only() {
        let rules = sample_rules();
        let rule = &rules.action_rules["prescribe"];
        assert!(rule.admits_role("specialist"));
        assert!(rule.admits_role("general_doctor"));
        assert!(!rule.admits_role("nurse"));
    }

    #[test]
    fn wildcard_role_admits_everyone() {
        let rule = ActionRule {
            required_roles: vec!["*".to_string()],
            minimum_role_strength: 0,
            requires_validator: false,
            validator_id: None,
            audit_required: false,
            retention_days: 0,
        };
        assert!(rule.admits_role("anyone"));
    }

    #[test]
    fn validator_override_beats_mapping() {
        let rules = sample_rules();
        assert_eq!(rules.validator_for("issue_certificate"), Some(&vid("us_hhs")));
        // prescribe has no override; the mapping supplies it.
        assert_eq!(rules.validator_for("prescribe"), Some(&vid("us_hhs")));
        assert_eq!(rules.validator_for("record_vitals"), None);
    }

    #[test]
    fn ruleset_lookup() {
        let mut set = RuleSet::new();
        set.insert(sample_rules());
        assert!(set.get(&jid("US")).is_some());
        assert!(set.get(&jid("FR")).is_none());
        assert!(set.action_rule(&jid("US"), "prescribe").is_some());
        assert!(set.action_rule(&jid("US"), "dance").is_none());
    }

    #[test]
    fn rules_deserialize_from_config_json() {
        let json = serde_json::json!({
            "jurisdiction": "IN",
            "regulatory_body": "Medical Council of India",
            "action_rules": {
                "diagnose": {
                    "required_roles": ["general_doctor", "specialist"],
                    "minimum_role_strength": 5,
                    "requires_validator": true,
                    "audit_required": true,
                    "retention_days": 730
                }
            },
            "validator_mapping": {"diagnose": "mci_validator"}
        });
        let rules: JurisdictionRules = serde_json::from_value(json).unwrap();
        assert_eq!(rules.validator_for("diagnose"), Some(&vid("mci_validator")));
    }
}
