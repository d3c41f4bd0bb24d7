//! # Request Contexts
//!
//! [`Context`] carries the ephemeral per-request facts a decision is
//! evaluated against: who is acting, on what, where, and the named facts
//! (consent, age, auth method) preconditions are matched against.
//!
//! Contexts are constructed fresh per decision and never persisted as part
//! of policy or agreement state. Identity fields arrive pre-verified from
//! the upstream gateway — the engine trusts them and performs no identity
//! verification itself.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clause::Fact;
use crate::identity::JurisdictionId;

/// The locations spanned by a cross-jurisdiction request.
///
/// A request is cross-jurisdictional iff the distinct set of these
/// locations has cardinality greater than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossJurisdictionScenario {
    /// Where the actor (e.g. the practitioner) is located.
    pub actor_location: JurisdictionId,
    /// Where the subject (e.g. the patient) is located.
    pub subject_location: JurisdictionId,
    /// Where the data resides.
    pub data_location: JurisdictionId,
    /// Categories of data involved in the transfer (e.g. `PHI`, `PII`).
    #[serde(default)]
    pub data_categories: Vec<String>,
}

impl CrossJurisdictionScenario {
    /// Distinct jurisdictions involved, in order actor, subject, data.
    pub fn jurisdictions(&self) -> Vec<JurisdictionId> {
        let mut out = Vec::with_capacity(3);
        for j in [
            &self.actor_location,
            &self.subject_location,
            &self.data_location,
        ] {
            if !out.contains(j) {
                out.push(j.clone());
            }
        }
        out
    }

    /// Whether more than one jurisdiction is involved.
    pub fn is_cross_jurisdictional(&self) -> bool {
        self.jurisdictions().len() > 1
    }
}

/// Per-request evaluation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Request identifier for audit correlation.
    pub request_id: String,
    /// Pre-verified actor identifier.
    pub actor_id: String,
    /// Pre-verified actor role (e.g. `specialist`, `nurse`).
    pub actor_role: String,
    /// The requested action (e.g. `prescribe`, `diagnose`).
    pub action: String,
    /// Where the request is being made.
    pub location: JurisdictionId,
    /// Resource being acted on.
    pub resource_id: String,
    /// Resource type (e.g. `prescription`, `medical_record`).
    pub resource_type: String,
    /// Owner of the resource (typically the patient).
    pub owner_id: String,
    /// Whether this request is flagged as a medical emergency.
    #[serde(default)]
    pub emergency: bool,
    /// Named facts matched against clause preconditions.
    #[serde(default)]
    pub facts: BTreeMap<String, Fact>,
    /// Present when the request spans jurisdictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_jurisdiction: Option<CrossJurisdictionScenario>,
    /// When the request was made.
    pub timestamp: DateTime<Utc>,
    /// Evaluation deadline. When exceeded the engine fails closed with an
    /// unavailable decision. Process-local, never serialized.
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl Context {
    /// Construct a context with the required identity and resource fields.
    /// Facts, emergency flag, scenario, and deadline are added with the
    /// `with_*` builders.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: impl Into<String>,
        actor_id: impl Into<String>,
        actor_role: impl Into<String>,
        action: impl Into<String>,
        location: JurisdictionId,
        resource_id: impl Into<String>,
        resource_type: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            actor_id: actor_id.into(),
            actor_role: actor_role.into(),
            action: action.into(),
            location,
            resource_id: resource_id.into(),
            resource_type: resource_type.into(),
            owner_id: owner_id.into(),
            emergency: false,
            facts: BTreeMap::new(),
            cross_jurisdiction: None,
            timestamp: Utc::now(),
            deadline: None,
        }
    }

    /// Add a named fact.
    pub fn with_fact(mut self, name: impl Into<String>, fact: Fact) -> Self {
        self.facts.insert(name.into(), fact);
        self
    }

    /// Flag the request as a medical emergency.
    pub fn with_emergency(mut self, emergency: bool) -> Self {
        self.emergency = emergency;
        self
    }

    /// Attach a cross-jurisdiction scenario.
    pub fn with_cross_jurisdiction(mut self, scenario: CrossJurisdictionScenario) -> Self {
        self.cross_jurisdiction = Some(scenario);
        self
    }

    /// Attach an evaluation deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the evaluation deadline has passed.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() > d)
    }

    /// Look up a fact by precondition name.
    ///
    /// `actor_claim` falls back to the pre-verified actor role when no
    /// explicit fact was supplied, matching how gateways populate
    /// role-membership preconditions.
    pub fn fact(&self, name: &str) -> Option<Fact> {
        if let Some(fact) = self.facts.get(name) {
            return Some(fact.clone());
        }
        if name == "actor_claim" {
            return Some(Fact::Text(self.actor_role.clone()));
        }
        None
    }
}
