//! # zkh-core — Foundational Types for the ZK Health Policy Stack
//!
//! Domain primitives shared by every crate in the workspace:
//!
//! - **Identifiers** ([`identity`]): validated newtypes for agreements,
//!   clauses, validators, and jurisdictions. You cannot pass a
//!   [`ClauseId`] where a [`ValidatorId`] is expected.
//!
//! - **Canonical serialization** ([`canonical`]): the sole construction
//!   path for bytes used in digest computation. Two agreements with
//!   identical clause content in identical order always canonicalize to
//!   identical bytes.
//!
//! - **Content digests** ([`digest`]): SHA-256 digests over canonical
//!   bytes, used for tamper-evident agreement hashing.
//!
//! - **Clause model** ([`clause`]): the closed precondition and execute
//!   vocabulary. Preconditions are a tagged variant type, not an open
//!   string-keyed map — a new precondition kind is a code change, never a
//!   silent reinterpretation.
//!
//! - **Agreements** ([`agreement`]): versioned, hashable clause bundles
//!   with the `Draft → Active → Superseded → Retired` lifecycle.
//!
//! - **Contexts** ([`context`]): the ephemeral per-request facts a
//!   decision is evaluated against. Never persisted.

pub mod agreement;
pub mod canonical;
pub mod clause;
pub mod context;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types.
pub use agreement::{
    content_digest, validate_clauses, Agreement, AgreementBuildError, AgreementStatus,
    AgreementVersionRef,
};
pub use canonical::CanonicalBytes;
pub use clause::{
    Clause, ClauseType, Fact, Precondition, EMERGENCY_OVERRIDE_KEY, NUMERIC_PREFIX,
};
pub use context::{Context, CrossJurisdictionScenario};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{AgreementId, AgreementVersion, ClauseId, JurisdictionId, ValidatorId};
