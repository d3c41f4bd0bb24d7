//! # Role Registry
//!
//! Role-based capabilities with a strength hierarchy. A capability pairs
//! an action pattern with a resource-type pattern; both support the `*`
//! wildcard and the `prefix:*` form (`treatment:*` matches
//! `treatment:update`).
//!
//! Unknown roles hold no capabilities — an undefined role is denied
//! everything, never granted a default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One (action, resource-type) grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Action pattern: exact, `*`, or `prefix:*`.
    pub action: String,
    /// Resource-type pattern: exact, `*`, or `prefix:*`.
    #[serde(default = "wildcard")]
    pub resource_type: String,
}

/// Default resource pattern: any resource type.
fn wildcard() -> String {
    "*".to_string()
}

impl Capability {
    /// Grant an action on any resource type.
    pub fn any_resource(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource_type: wildcard(),
        }
    }

    /// Whether this capability covers the requested action and resource.
    pub fn covers(&self, action: &str, resource_type: &str) -> bool {
        pattern_matches(&self.action, action) && pattern_matches(&self.resource_type, resource_type)
    }
}

/// Match a capability pattern against a concrete value.
fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" || pattern == value {
        return true;
    }
    match pattern.strip_suffix(":*") {
        Some(prefix) => value
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(':')),
        None => false,
    }
}

/// Permissions and attributes for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Role name (e.g. `specialist`, `nurse`).
    pub name: String,
    /// Hierarchical strength — higher means more authority. Compared
    /// against per-action minimums.
    pub strength: u8,
    /// The role's capabilities.
    pub capabilities: Vec<Capability>,
    /// Whether the role may delegate its permissions.
    #[serde(default)]
    pub can_delegate: bool,
    /// Whether the role requires multi-factor authentication upstream.
    #[serde(default)]
    pub requires_mfa: bool,
}

/// Registry of role configurations, built once at startup.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: HashMap<String, RoleConfig>,
}

impl RoleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role configuration.
    pub fn insert(&mut self, role: RoleConfig) {
        self.roles.insert(role.name.clone(), role);
    }

    /// Look up a role configuration.
    pub fn get(&self, role: &str) -> Option<&RoleConfig> {
        self.roles.get(role)
    }

    /// Whether the role may perform the action on the resource type.
    /// Unknown roles are denied.
    pub fn permits(&self, role: &str, action: &str, resource_type: &str) -> bool {
        self.roles
            .get(role)
            .map_or(false, |config| {
                config
                    .capabilities
                    .iter()
                    .any(|cap| cap.covers(action, resource_type))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoleRegistry {
        let mut registry = RoleRegistry::new();
        registry.insert(RoleConfig {
            name: "specialist".to_string(),
            strength: 8,
            capabilities: vec![
                Capability::any_resource("prescribe"),
                Capability::any_resource("diagnose"),
                Capability::any_resource("treatment:*"),
                Capability {
                    action: "read".to_string(),
                    resource_type: "medical_record".to_string(),
                },
            ],
            can_delegate: true,
            requires_mfa: true,
        });
        registry.insert(RoleConfig {
            name: "nurse".to_string(),
            strength: 3,
            capabilities: vec![Capability::any_resource("record_vitals")],
            can_delegate: false,
            requires_mfa: true,
        });
        registry
    }

    #[test]
    fn exact_action_match() {
        let registry = registry();
        assert!(registry.permits("specialist", "prescribe", "prescription"));
        assert!(!registry.permits("nurse", "prescribe", "prescription"));
    }

    #[test]
    fn unknown_role_denied() {
        let registry = registry();
        assert!(!registry.permits("visitor", "prescribe", "prescription"));
    }

    #[test]
    fn prefix_wildcard_matches_namespaced_actions() {
        let registry = registry();
        assert!(registry.permits("specialist", "treatment:update", "treatment_plan"));
        assert!(registry.permits("specialist", "treatment:close", "treatment_plan"));
        // The bare prefix is not covered by `prefix:*`.
        assert!(!registry.permits("specialist", "treatment", "treatment_plan"));
        // Nor is a merely similar action name.
        assert!(!registry.permits("specialist", "treatments:update", "treatment_plan"));
    }

    #[test]
    fn resource_restriction_enforced() {
        let registry = registry();
        assert!(registry.permits("specialist", "read", "medical_record"));
        assert!(!registry.permits("specialist", "read", "billing"));
    }

    #[test]
    fn full_wildcard_capability() {
        let mut registry = RoleRegistry::new();
        registry.insert(RoleConfig {
            name: "platform_admin".to_string(),
            strength: 10,
            capabilities: vec![Capability::any_resource("*")],
            can_delegate: true,
            requires_mfa: true,
        });
        assert!(registry.permits("platform_admin", "anything", "any_resource"));
    }

    #[test]
    fn capability_deserializes_with_default_resource() {
        let cap: Capability = serde_json::from_value(serde_json::json!({
            "action": "diagnose"
        }))
        .unwrap();
        assert_eq!(cap.resource_type, "*");
    }
}
