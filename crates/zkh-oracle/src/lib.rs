//! # zkh-oracle — Oracle Agreement Layer
//!
//! The Oracle layer validates requests against versioned, legally-scoped
//! agreement clauses encoding jurisdiction-specific compliance rules
//! (HIPAA, GDPR, telemedicine statutes, cross-border transfer rules).
//!
//! - **Store** ([`store`]): versioned agreement storage. Agreements are
//!   immutable once published; updates publish a new version with a new
//!   content hash. Readers never observe a half-written agreement.
//!
//! - **Evaluator** ([`evaluator`]): pure, side-effect-free clause
//!   precondition evaluation. Missing facts fail closed; execute
//!   directives are reported for the audit sink, never applied here.
//!
//! - **Checker** ([`checker`]): bilateral/multilateral cross-jurisdiction
//!   compliance. No registered agreement between two jurisdictions means
//!   non-compliant — never permissive.
//!
//! - **Updates** ([`update`]): regulatory update propagation. Applies
//!   jurisdiction-wide clause changes by publishing new agreement
//!   versions; re-applying an identical update is a no-op.
//!
//! - **Templates** ([`templates`]): ready-made HIPAA, GDPR, and
//!   telemedicine clause sets for seeding and tests.

pub mod checker;
pub mod evaluator;
pub mod store;
pub mod templates;
pub mod update;

// Re-export primary types.
pub use checker::{CrossJurisdictionChecker, CrossJurisdictionReport};
pub use evaluator::{evaluate_clause, ClauseEvaluation};
pub use store::{AgreementStore, StoreError};
pub use update::{RegulatoryUpdate, UpdateError, UpdatePropagator, UpdateType};
