//! # Regulatory Update Propagation
//!
//! Applies jurisdiction-wide rule changes to every active agreement in
//! the affected jurisdiction. Runs administratively, never on the request
//! path.
//!
//! ## Versioning
//!
//! Propagation never mutates a live agreement: each affected agreement
//! gets a new version (new content hash, status `Active`) and the prior
//! version becomes `Superseded`, preserving the tamper-evidence invariant
//! across the update. Removals deactivate clauses instead of deleting
//! them, so decisions logged against old versions stay reproducible.
//!
//! ## Idempotence
//!
//! Re-applying an already-applied identical update is a no-op: the
//! candidate clause list hashes identically to the current version, so no
//! new version is published and the agreement is not reported as
//! affected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkh_core::{
    content_digest, Agreement, AgreementId, AgreementStatus, Clause, ClauseId, JurisdictionId,
};

use crate::store::{AgreementStore, StoreError};

/// The kind of regulatory change being propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// A new clause is appended to affected agreements.
    Addition,
    /// An existing clause is replaced in affected agreements.
    Modification,
    /// An existing clause is deactivated in affected agreements.
    Removal,
}

/// A jurisdiction-wide regulatory change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryUpdate {
    /// Stable identifier of the update, for audit correlation.
    pub update_id: String,
    /// Jurisdiction whose active agreements are affected.
    pub jurisdiction: JurisdictionId,
    /// What kind of change this is.
    pub update_type: UpdateType,
    /// The clause content for `addition` and `modification`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause: Option<Clause>,
    /// The clause to deactivate for `removal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_id: Option<ClauseId>,
    /// Operator-facing description of the change.
    pub description: String,
    /// When the change takes effect.
    pub effective_date: DateTime<Utc>,
}

/// Errors applying a regulatory update.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// `addition`/`modification` updates must carry clause content.
    #[error("{0:?} update must carry clause content")]
    MissingClause(UpdateType),

    /// `removal` updates must name the clause to deactivate.
    #[error("removal update must carry a clause_id")]
    MissingClauseId,

    /// The underlying store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies regulatory updates against an agreement store.
#[derive(Debug, Clone)]
pub struct UpdatePropagator {
    store: std::sync::Arc<AgreementStore>,
}

impl UpdatePropagator {
    /// Create a propagator over the given store.
    pub fn new(store: std::sync::Arc<AgreementStore>) -> Self {
        Self { store }
    }

    /// Apply an update to every active agreement in its jurisdiction.
    ///
    /// Returns the identifiers of the agreements that actually changed
    /// (deduplicated; unchanged agreements are skipped for idempotence).
    pub fn apply(&self, update: &RegulatoryUpdate) -> Result<Vec<AgreementId>, UpdateError> {
        // Validate the update shape before touching any agreement.
        match update.update_type {
            UpdateType::Addition | UpdateType::Modification => {
                if update.clause.is_none() {
                    return Err(UpdateError::MissingClause(update.update_type));
                }
            }
            UpdateType::Removal => {
                if update.clause_id.is_none() {
                    return Err(UpdateError::MissingClauseId);
                }
            }
        }

        let mut affected = Vec::new();
        for current in self.store.active_in_jurisdiction(&update.jurisdiction) {
            let candidate = transform_clauses(&current, update);
            let candidate_hash = candidate
                .as_ref()
                .map(|clauses| content_digest(clauses))
                .transpose()
                .map_err(StoreError::from)?;

            let Some((clauses, hash)) = candidate.zip(candidate_hash) else {
                // Nothing to change in this agreement (e.g. modification
                // of a clause it does not carry).
                continue;
            };

            if hash == current.content_hash {
                tracing::debug!(
                    agreement_id = %current.agreement_id,
                    update_id = %update.update_id,
                    "update already applied, skipping"
                );
                continue;
            }

            let new_version = Agreement {
                agreement_id: current.agreement_id,
                version: current.version + 1,
                name: current.name.clone(),
                description: current.description.clone(),
                jurisdiction: current.jurisdiction.clone(),
                clauses,
                content_hash: hash,
                status: AgreementStatus::Active,
                created_at: Utc::now(),
            };
            self.store.publish_version(new_version)?;
            affected.push(current.agreement_id);

            tracing::info!(
                agreement_id = %current.agreement_id,
                update_id = %update.update_id,
                new_version = current.version + 1,
                "regulatory update propagated"
            );
        }

        Ok(affected)
    }
}

/// Produce the candidate clause list for one agreement, or `None` when the
/// update does not apply to it.
fn transform_clauses(current: &Agreement, update: &RegulatoryUpdate) -> Option<Vec<Clause>> {
    match update.update_type {
        UpdateType::Addition => {
            let clause = update.clause.as_ref()?;
            if current.clause(&clause.clause_id).is_some() {
                // The clause already exists; re-applied additions are
                // handled by the hash comparison upstream.
                return Some(current.clauses.clone());
            }
            let mut clauses = current.clauses.clone();
            clauses.push(clause.clone());
            Some(clauses)
        }
        UpdateType::Modification => {
            let replacement = update.clause.as_ref()?;
            current.clause(&replacement.clause_id)?;
            Some(
                current
                    .clauses
                    .iter()
                    .map(|c| {
                        if c.clause_id == replacement.clause_id {
                            replacement.clone()
                        } else {
                            c.clone()
                        }
                    })
                    .collect(),
            )
        }
        UpdateType::Removal => {
            let clause_id = update.clause_id.as_ref()?;
            current.clause(clause_id)?;
            Some(
                current
                    .clauses
                    .iter()
                    .map(|c| {
                        if &c.clause_id == clause_id {
                            let mut deactivated = c.clone();
                            deactivated.active = false;
                            deactivated
                        } else {
                            c.clone()
                        }
                    })
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use zkh_core::{ClauseType, Precondition};

    fn jid(s: &str) -> JurisdictionId {
        JurisdictionId::new(s).unwrap()
    }

    fn new_clause(id: &str) -> Clause {
        let mut preconditions = BTreeMap::new();
        preconditions.insert("breach_notified".to_string(), Precondition::Flag(true));
        Clause {
            clause_id: ClauseId::new(id).unwrap(),
            title: "Breach Notification".to_string(),
            clause_type: ClauseType::Security,
            description: "Requires breach notification within 72 hours".to_string(),
            preconditions,
            execute: BTreeMap::new(),
            active: true,
        }
    }

    fn addition(jurisdiction: &str, clause: Clause) -> RegulatoryUpdate {
        RegulatoryUpdate {
            update_id: "upd-1".to_string(),
            jurisdiction: jid(jurisdiction),
            update_type: UpdateType::Addition,
            clause: Some(clause),
            clause_id: None,
            description: "add breach notification".to_string(),
            effective_date: Utc::now(),
        }
    }

    fn setup() -> (Arc<AgreementStore>, UpdatePropagator, AgreementId) {
        let store = Arc::new(AgreementStore::new());
        let (id, _) = store
            .create("HIPAA", "US rules", jid("US-HIPAA"), templates::hipaa())
            .unwrap();
        let propagator = UpdatePropagator::new(Arc::clone(&store));
        (store, propagator, id)
    }

    // ── Addition ────────────────────────────────────────────────────

    #[test]
    fn addition_publishes_new_version() {
        let (store, propagator, id) = setup();
        let old_hash = store.get(id).unwrap().content_hash;

        let affected = propagator
            .apply(&addition("US-HIPAA", new_clause("hipaa-breach-notification")))
            .unwrap();
        assert_eq!(affected, vec![id]);

        let latest = store.get(id).unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.status, AgreementStatus::Active);
        assert_ne!(latest.content_hash, old_hash);
        assert!(latest
            .clause(&ClauseId::new("hipaa-breach-notification").unwrap())
            .is_some());
    }

    #[test]
    fn old_version_becomes_superseded_and_stays_readable() {
        let (store, propagator, id) = setup();
        let old_hash = store.get(id).unwrap().content_hash;

        propagator
            .apply(&addition("US-HIPAA", new_clause("hipaa-breach-notification")))
            .unwrap();

        let v1 = store.get_version(id, 1).unwrap();
        assert_eq!(v1.status, AgreementStatus::Superseded);
        assert_eq!(v1.content_hash, old_hash, "historical hash unchanged");
        assert!(v1.verify_integrity());
    }

    #[test]
    fn update_only_affects_named_jurisdiction() {
        let (store, propagator, _) = setup();
        let (gdpr_id, _) = store
            .create("GDPR", "EU rules", jid("EU-GDPR"), templates::gdpr())
            .unwrap();

        propagator
            .apply(&addition("US-HIPAA", new_clause("hipaa-breach-notification")))
            .unwrap();

        assert_eq!(store.get(gdpr_id).unwrap().version, 1);
    }

    // ── Idempotence ─────────────────────────────────────────────────

    #[test]
    fn reapplying_identical_update_is_noop() {
        let (store, propagator, id) = setup();
        let update = addition("US-HIPAA", new_clause("hipaa-breach-notification"));

        let first = propagator.apply(&update).unwrap();
        assert_eq!(first, vec![id]);
        let hash_after_first = store.get(id).unwrap().content_hash;

        let second = propagator.apply(&update).unwrap();
        assert!(second.is_empty(), "no agreements affected on re-apply");
        let latest = store.get(id).unwrap();
        assert_eq!(latest.version, 2, "no extra version published");
        assert_eq!(latest.content_hash, hash_after_first);
    }

    // ── Modification ────────────────────────────────────────────────

    #[test]
    fn modification_replaces_matching_clause() {
        let (store, propagator, id) = setup();

        let mut replacement = templates::hipaa()
            .into_iter()
            .find(|c| c.clause_id.as_str() == "hipaa-minimum-necessary")
            .unwrap();
        replacement
            .preconditions
            .insert("justification_recorded".to_string(), Precondition::Flag(true));

        let update = RegulatoryUpdate {
            update_id: "upd-2".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Modification,
            clause: Some(replacement),
            clause_id: None,
            description: "tighten minimum-necessary".to_string(),
            effective_date: Utc::now(),
        };

        let affected = propagator.apply(&update).unwrap();
        assert_eq!(affected, vec![id]);

        let latest = store.get(id).unwrap();
        assert_eq!(latest.version, 2);
        let modified = latest
            .clause(&ClauseId::new("hipaa-minimum-necessary").unwrap())
            .unwrap();
        assert!(modified.preconditions.contains_key("justification_recorded"));
    }

    #[test]
    fn modification_of_absent_clause_skips_agreement() {
        let (store, propagator, id) = setup();
        let update = RegulatoryUpdate {
            update_id: "upd-3".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Modification,
            clause: Some(new_clause("not-in-agreement")),
            clause_id: None,
            description: "modify missing clause".to_string(),
            effective_date: Utc::now(),
        };
        let affected = propagator.apply(&update).unwrap();
        assert!(affected.is_empty());
        assert_eq!(store.get(id).unwrap().version, 1);
    }

    // ── Removal ─────────────────────────────────────────────────────

    #[test]
    fn removal_deactivates_without_deleting() {
        let (store, propagator, id) = setup();
        let update = RegulatoryUpdate {
            update_id: "upd-4".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Removal,
            clause: None,
            clause_id: Some(ClauseId::new("hipaa-minimum-necessary").unwrap()),
            description: "withdraw minimum-necessary".to_string(),
            effective_date: Utc::now(),
        };

        let affected = propagator.apply(&update).unwrap();
        assert_eq!(affected, vec![id]);

        let latest = store.get(id).unwrap();
        assert_eq!(latest.clauses.len(), 2, "clause retained, not deleted");
        let removed = latest
            .clause(&ClauseId::new("hipaa-minimum-necessary").unwrap())
            .unwrap();
        assert!(!removed.active);

        // The clause is still active in the superseded version.
        let v1 = store.get_version(id, 1).unwrap();
        assert!(
            v1.clause(&ClauseId::new("hipaa-minimum-necessary").unwrap())
                .unwrap()
                .active
        );
    }

    #[test]
    fn removal_is_idempotent() {
        let (store, propagator, id) = setup();
        let update = RegulatoryUpdate {
            update_id: "upd-5".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Removal,
            clause: None,
            clause_id: Some(ClauseId::new("hipaa-phi-access").unwrap()),
            description: "withdraw phi access clause".to_string(),
            effective_date: Utc::now(),
        };
        assert_eq!(propagator.apply(&update).unwrap(), vec![id]);
        assert!(propagator.apply(&update).unwrap().is_empty());
        assert_eq!(store.get(id).unwrap().version, 2);
    }

    // ── Shape validation ────────────────────────────────────────────

    #[test]
    fn addition_without_clause_rejected() {
        let (_, propagator, _) = setup();
        let update = RegulatoryUpdate {
            update_id: "upd-6".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Addition,
            clause: None,
            clause_id: None,
            description: "malformed".to_string(),
            effective_date: Utc::now(),
        };
        assert!(matches!(
            propagator.apply(&update),
            Err(UpdateError::MissingClause(UpdateType::Addition))
        ));
    }

    #[test]
    fn removal_without_clause_id_rejected() {
        let (_, propagator, _) = setup();
        let update = RegulatoryUpdate {
            update_id: "upd-7".to_string(),
            jurisdiction: jid("US-HIPAA"),
            update_type: UpdateType::Removal,
            clause: None,
            clause_id: None,
            description: "malformed".to_string(),
            effective_date: Utc::now(),
        };
        assert!(matches!(
            propagator.apply(&update),
            Err(UpdateError::MissingClauseId)
        ));
    }

    #[test]
    fn unknown_jurisdiction_affects_nothing() {
        let (_, propagator, _) = setup();
        let affected = propagator
            .apply(&addition("UK-NHS", new_clause("nhs-clause")))
            .unwrap();
        assert!(affected.is_empty());
    }
}
