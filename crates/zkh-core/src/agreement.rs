//! # Agreements
//!
//! [`Agreement`] is a versioned, hashable bundle of clauses scoped to a
//! jurisdiction. Agreements are immutable once published: regulatory
//! updates create a new version with a new content hash rather than
//! mutating in place.
//!
//! ## Tamper-Evidence Invariant
//!
//! `content_hash` is SHA-256 over the canonical encoding of the ordered
//! clause list. The hash changes if and only if clause content changes:
//! identical clauses in identical order always produce identical hashes,
//! and any differing clause field produces a different hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::clause::Clause;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::{CanonicalizationError, ValidationError};
use crate::identity::{AgreementId, AgreementVersion, ClauseId, JurisdictionId};

// ---------------------------------------------------------------------------
// AgreementStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of one agreement version.
///
/// ```text
/// Draft → Active → Superseded → Retired
/// ```
///
/// No transition skips states. Superseded versions remain readable for
/// audit but are never selected for new decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    /// Created but not yet in force.
    Draft,
    /// In force; selected for new decisions.
    Active,
    /// Replaced by a newer version; readable for audit only.
    Superseded,
    /// Administratively withdrawn; readable for audit only.
    Retired,
}

impl AgreementStatus {
    /// Whether the transition to `next` is legal.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Active)
                | (Self::Active, Self::Superseded)
                | (Self::Superseded, Self::Retired)
        )
    }

    /// Whether an agreement in this state may be selected for new
    /// decisions. Only `Active` qualifies — everything else is
    /// audit-read-only.
    pub fn is_selectable(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Superseded => "superseded",
            Self::Retired => "retired",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

/// One immutable version of a legally-scoped agreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    /// Identifier shared by all versions of this agreement.
    pub agreement_id: AgreementId,
    /// Version number, starting at 1.
    pub version: AgreementVersion,
    /// Display name.
    pub name: String,
    /// Description for operators.
    pub description: String,
    /// Governing jurisdiction code (e.g. `US-HIPAA`).
    pub jurisdiction: JurisdictionId,
    /// Ordered clause list. Order is significant for evaluation and
    /// hashing; clauses are otherwise independent.
    pub clauses: Vec<Clause>,
    /// SHA-256 digest over the canonicalized clause list.
    pub content_hash: ContentDigest,
    /// Lifecycle state of this version.
    pub status: AgreementStatus,
    /// Creation time of this version.
    pub created_at: DateTime<Utc>,
}

/// A reference to one specific agreement version, recorded in decisions so
/// audits replay against the exact content that was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementVersionRef {
    /// The agreement identifier.
    pub agreement_id: AgreementId,
    /// The version that was consulted.
    pub version: AgreementVersion,
}

impl Agreement {
    /// Assemble a new draft agreement, validating the clause set and
    /// computing its content hash.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty clause list or duplicate
    /// clause IDs; canonicalization failures surface as
    /// [`ValidationError`]-independent [`CanonicalizationError`] via the
    /// caller. This constructor produces `Draft` status — activation is
    /// the store's job.
    pub fn draft(
        agreement_id: AgreementId,
        name: impl Into<String>,
        description: impl Into<String>,
        jurisdiction: JurisdictionId,
        clauses: Vec<Clause>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AgreementBuildError> {
        validate_clauses(&clauses)?;
        let content_hash = content_digest(&clauses)?;
        Ok(Self {
            agreement_id,
            version: 1,
            name: name.into(),
            description: description.into(),
            jurisdiction,
            clauses,
            content_hash,
            status: AgreementStatus::Draft,
            created_at,
        })
    }

    /// Look up a clause by identifier.
    pub fn clause(&self, clause_id: &ClauseId) -> Option<&Clause> {
        self.clauses.iter().find(|c| &c.clause_id == clause_id)
    }

    /// Recompute the clause-content digest and compare it to the stored
    /// hash. `false` means the agreement content no longer matches what
    /// was hashed at publication — tampering or corruption.
    pub fn verify_integrity(&self) -> bool {
        match content_digest(&self.clauses) {
            Ok(digest) => digest == self.content_hash,
            Err(err) => {
                tracing::warn!(
                    agreement_id = %self.agreement_id,
                    error = %err,
                    "integrity check could not canonicalize clauses"
                );
                false
            }
        }
    }
}

/// Errors assembling an agreement version.
#[derive(Debug, thiserror::Error)]
pub enum AgreementBuildError {
    /// The clause set is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The clause set could not be canonicalized for hashing.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}

/// Validate a clause set: non-empty, with unique clause IDs.
pub fn validate_clauses(clauses: &[Clause]) -> Result<(), ValidationError> {
    if clauses.is_empty() {
        return Err(ValidationError::EmptyClauses);
    }
    let mut seen = std::collections::HashSet::new();
    for clause in clauses {
        if !seen.insert(clause.clause_id.as_str()) {
            return Err(ValidationError::DuplicateClauseId(
                clause.clause_id.as_str().to_string(),
            ));
        }
    }
    Ok(())
}

/// Compute the content digest over an ordered clause list.
pub fn content_digest(clauses: &[Clause]) -> Result<ContentDigest, CanonicalizationError> {
    let canonical = CanonicalBytes::new(&clauses)?;
    Ok(sha256_digest(&canonical))
}
