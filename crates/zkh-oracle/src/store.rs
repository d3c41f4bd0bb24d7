//! # Versioned Agreement Store
//!
//! [`AgreementStore`] holds every version of every agreement. Versions are
//! append-only: a regulatory update publishes a new version and marks the
//! prior one superseded in a single write-lock critical section, so a
//! reader never observes clause content and a content hash from different
//! versions.
//!
//! Reads take the shared lock and clone the requested version out —
//! evaluation then proceeds without holding any lock, keeping the hot
//! path free of contention.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;

use zkh_core::{
    Agreement, AgreementBuildError, AgreementId, AgreementStatus, AgreementVersion,
    CanonicalizationError, Clause, ClauseId, ContentDigest, JurisdictionId, ValidationError,
};

/// Errors from agreement store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No agreement exists with the given identifier.
    #[error("agreement not found: {0}")]
    AgreementNotFound(AgreementId),

    /// The agreement exists but the requested version does not.
    #[error("version {version} of agreement {agreement_id} not found")]
    VersionNotFound {
        /// The agreement identifier.
        agreement_id: AgreementId,
        /// The missing version.
        version: AgreementVersion,
    },

    /// The agreement exists but carries no clause with the given ID.
    #[error("clause \"{clause_id}\" not found in agreement {agreement_id}")]
    ClauseNotFound {
        /// The agreement identifier.
        agreement_id: AgreementId,
        /// The missing clause identifier.
        clause_id: ClauseId,
    },

    /// The agreement's latest version is not in a state that allows the
    /// requested transition.
    #[error("agreement {agreement_id} is {status}, cannot {operation}")]
    InvalidStatus {
        /// The agreement identifier.
        agreement_id: AgreementId,
        /// The current status.
        status: AgreementStatus,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Malformed agreement input, rejected before persistence.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Clause content could not be canonicalized for hashing.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl From<AgreementBuildError> for StoreError {
    fn from(err: AgreementBuildError) -> Self {
        match err {
            AgreementBuildError::Validation(e) => Self::Validation(e),
            AgreementBuildError::Canonicalization(e) => Self::Canonicalization(e),
        }
    }
}

/// Thread-safe versioned agreement storage.
///
/// Many concurrent readers; writers (create, publish, retire) serialize on
/// the write lock.
#[derive(Debug, Default)]
pub struct AgreementStore {
    /// Versions per agreement, in ascending version order, append-only.
    inner: RwLock<HashMap<AgreementId, Vec<Agreement>>>,
}

impl AgreementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and activate a new agreement.
    ///
    /// The draft is assembled, validated (non-empty clause list, unique
    /// clause IDs), hashed, activated, and published in one critical
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for malformed input; nothing is
    /// persisted on failure.
    pub fn create(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        jurisdiction: JurisdictionId,
        clauses: Vec<Clause>,
    ) -> Result<(AgreementId, ContentDigest), StoreError> {
        let mut agreement = Agreement::draft(
            AgreementId::new(),
            name,
            description,
            jurisdiction,
            clauses,
            Utc::now(),
        )?;
        // Draft → Active happens before publication; the store never
        // exposes the draft state.
        agreement.status = AgreementStatus::Active;

        let id = agreement.agreement_id;
        let hash = agreement.content_hash;

        let mut inner = self.inner.write();
        inner.insert(id, vec![agreement]);

        tracing::info!(agreement_id = %id, content_hash = %hash, "agreement created");
        Ok((id, hash))
    }

    /// Fetch the latest version of an agreement.
    pub fn get(&self, agreement_id: AgreementId) -> Result<Agreement, StoreError> {
        let inner = self.inner.read();
        inner
            .get(&agreement_id)
            .and_then(|versions| versions.last())
            .cloned()
            .ok_or(StoreError::AgreementNotFound(agreement_id))
    }

    /// Fetch one specific historical version of an agreement, for audit
    /// replay of past decisions.
    pub fn get_version(
        &self,
        agreement_id: AgreementId,
        version: AgreementVersion,
    ) -> Result<Agreement, StoreError> {
        let inner = self.inner.read();
        let versions = inner
            .get(&agreement_id)
            .ok_or(StoreError::AgreementNotFound(agreement_id))?;
        versions
            .iter()
            .find(|a| a.version == version)
            .cloned()
            .ok_or(StoreError::VersionNotFound {
                agreement_id,
                version,
            })
    }

    /// Fetch a clause from the latest version of an agreement.
    pub fn get_clause(
        &self,
        agreement_id: AgreementId,
        clause_id: &ClauseId,
    ) -> Result<Clause, StoreError> {
        let agreement = self.get(agreement_id)?;
        agreement
            .clause(clause_id)
            .cloned()
            .ok_or_else(|| StoreError::ClauseNotFound {
                agreement_id,
                clause_id: clause_id.clone(),
            })
    }

    /// List the latest version of every agreement, optionally filtered by
    /// jurisdiction.
    pub fn list(&self, jurisdiction: Option<&JurisdictionId>) -> Vec<Agreement> {
        let inner = self.inner.read();
        let mut out: Vec<Agreement> = inner
            .values()
            .filter_map(|versions| versions.last())
            .filter(|a| jurisdiction.map_or(true, |j| &a.jurisdiction == j))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out
    }

    /// Latest versions of all agreements currently active in a
    /// jurisdiction. This is the set a regulatory update propagates over.
    pub fn active_in_jurisdiction(&self, jurisdiction: &JurisdictionId) -> Vec<Agreement> {
        let inner = self.inner.read();
        inner
            .values()
            .filter_map(|versions| versions.last())
            .filter(|a| &a.jurisdiction == jurisdiction && a.status.is_selectable())
            .cloned()
            .collect()
    }

    /// Publish a new version of an existing agreement, superseding the
    /// current latest. Used by the regulatory update propagator.
    ///
    /// The supersede-and-append happens under one write guard: readers see
    /// either the old latest (Active) or the new latest, never an
    /// intermediate state.
    pub(crate) fn publish_version(&self, new_version: Agreement) -> Result<(), StoreError> {
        let agreement_id = new_version.agreement_id;
        let mut inner = self.inner.write();
        let versions = inner
            .get_mut(&agreement_id)
            .ok_or(StoreError::AgreementNotFound(agreement_id))?;
        // Infallible after the map lookup: versions vectors are created
        // non-empty and are append-only.
        let Some(current) = versions.last_mut() else {
            return Err(StoreError::AgreementNotFound(agreement_id));
        };
        if !current.status.can_transition(AgreementStatus::Superseded) {
            return Err(StoreError::InvalidStatus {
                agreement_id,
                status: current.status,
                operation: "supersede",
            });
        }
        current.status = AgreementStatus::Superseded;
        versions.push(new_version);
        Ok(())
    }

    /// Administratively retire an agreement. Only a superseded version can
    /// be retired; retiring skips no lifecycle states.
    pub fn retire(&self, agreement_id: AgreementId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let versions = inner
            .get_mut(&agreement_id)
            .ok_or(StoreError::AgreementNotFound(agreement_id))?;
        let Some(current) = versions.last_mut() else {
            return Err(StoreError::AgreementNotFound(agreement_id));
        };
        if !current.status.can_transition(AgreementStatus::Retired) {
            return Err(StoreError::InvalidStatus {
                agreement_id,
                status: current.status,
                operation: "retire",
            });
        }
        current.status = AgreementStatus::Retired;
        tracing::info!(agreement_id = %agreement_id, "agreement retired");
        Ok(())
    }

    /// Recompute the latest version's content hash and compare it to the
    /// stored value (Agreement Integrity Protection).
    pub fn verify_integrity(&self, agreement_id: AgreementId) -> Result<bool, StoreError> {
        Ok(self.get(agreement_id)?.verify_integrity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use std::sync::Arc;

    fn jid(s: &str) -> JurisdictionId {
        JurisdictionId::new(s).unwrap()
    }

    fn seeded_store() -> (AgreementStore, AgreementId) {
        let store = AgreementStore::new();
        let (id, _) = store
            .create(
                "HIPAA Compliance",
                "US PHI access rules",
                jid("US-HIPAA"),
                templates::hipaa(),
            )
            .unwrap();
        (store, id)
    }

    #[test]
    fn create_returns_id_and_hash() {
        let store = AgreementStore::new();
        let (id, hash) = store
            .create("HIPAA", "US PHI rules", jid("US-HIPAA"), templates::hipaa())
            .unwrap();
        let agreement = store.get(id).unwrap();
        assert_eq!(agreement.version, 1);
        assert_eq!(agreement.status, AgreementStatus::Active);
        assert_eq!(agreement.content_hash, hash);
    }

    #[test]
    fn create_rejects_empty_clauses() {
        let store = AgreementStore::new();
        let result = store.create("Empty", "no clauses", jid("US-HIPAA"), vec![]);
        assert!(matches!(
            result,
            Err(StoreError::Validation(ValidationError::EmptyClauses))
        ));
    }

    #[test]
    fn create_rejects_duplicate_clause_ids() {
        let store = AgreementStore::new();
        let mut clauses = templates::hipaa();
        clauses.push(clauses[0].clone());
        let result = store.create("Dup", "duplicate clause", jid("US-HIPAA"), clauses);
        assert!(matches!(
            result,
            Err(StoreError::Validation(ValidationError::DuplicateClauseId(_)))
        ));
    }

    #[test]
    fn get_unknown_agreement_fails() {
        let store = AgreementStore::new();
        assert!(matches!(
            store.get(AgreementId::new()),
            Err(StoreError::AgreementNotFound(_))
        ));
    }

    #[test]
    fn get_clause_by_id() {
        let (store, id) = seeded_store();
        let clause = store
            .get_clause(id, &ClauseId::new("hipaa-phi-access").unwrap())
            .unwrap();
        assert_eq!(clause.clause_id.as_str(), "hipaa-phi-access");
    }

    #[test]
    fn get_missing_clause_fails() {
        let (store, id) = seeded_store();
        let result = store.get_clause(id, &ClauseId::new("no-such-clause").unwrap());
        assert!(matches!(result, Err(StoreError::ClauseNotFound { .. })));
    }

    #[test]
    fn list_filters_by_jurisdiction() {
        let (store, _) = seeded_store();
        store
            .create("GDPR", "EU rules", jid("EU-GDPR"), templates::gdpr())
            .unwrap();

        assert_eq!(store.list(None).len(), 2);
        let filtered = store.list(Some(&jid("EU-GDPR")));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].jurisdiction, jid("EU-GDPR"));
        assert!(store.list(Some(&jid("UK-NHS"))).is_empty());
    }

    #[test]
    fn identical_content_identical_hash_across_agreements() {
        let store = AgreementStore::new();
        let (_, hash_a) = store
            .create("A", "first", jid("US-HIPAA"), templates::hipaa())
            .unwrap();
        let (_, hash_b) = store
            .create("B", "second", jid("US-HIPAA"), templates::hipaa())
            .unwrap();
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn verify_integrity_on_stored_agreement() {
        let (store, id) = seeded_store();
        assert!(store.verify_integrity(id).unwrap());
    }

    #[test]
    fn retire_requires_superseded() {
        let (store, id) = seeded_store();
        // Active → Retired skips Superseded and must fail.
        assert!(matches!(
            store.retire(id),
            Err(StoreError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn concurrent_readers_see_consistent_versions() {
        let (store, id) = seeded_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let agreement = store.get(id).unwrap();
                        // Hash must always match the clause content read in
                        // the same snapshot — no torn reads.
                        assert!(agreement.verify_integrity());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
