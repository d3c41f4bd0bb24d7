//! # Clause Model
//!
//! The clause vocabulary: [`ClauseType`], [`Precondition`], [`Fact`], and
//! [`Clause`] itself. Clauses are pure data — the oracle evaluator
//! interprets them, never the clause itself.
//!
//! ## Closed Precondition Vocabulary
//!
//! Preconditions are a tagged variant type rather than an open
//! string-keyed map. Every `match` on [`Precondition`] is exhaustive, so a
//! new precondition kind is a compile error until every evaluation path
//! handles it. On the wire the variants stay untagged, preserving the
//! agreement JSON shape regulators already author:
//!
//! ```json
//! {
//!   "patient_consent": true,
//!   "minimum_age": 18,
//!   "actor_claim": ["doctor", "nurse", "admin"]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::ClauseId;

/// Precondition key carrying emergency-override semantics: when mapped to
/// `true` and the request context is flagged as an emergency, the clause's
/// remaining preconditions are short-circuited to valid (recorded in the
/// evaluation notes for audit).
pub const EMERGENCY_OVERRIDE_KEY: &str = "emergency_override";

/// Prefix stripped from a numeric precondition name to find the context
/// fact it compares against: `minimum_age` reads the fact `age`.
pub const NUMERIC_PREFIX: &str = "minimum_";

// ---------------------------------------------------------------------------
// ClauseType
// ---------------------------------------------------------------------------

/// The legal category of a clause.
///
/// `Transfer`, `Storage`, and `DataAccess` are the jurisdictional-transfer
/// categories consulted during cross-jurisdiction compliance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    /// Regulatory compliance requirement (HIPAA, GDPR, ...).
    Compliance,
    /// Statutory or contractual obligation.
    Legal,
    /// Clinical practice requirement.
    Medical,
    /// Patient or practitioner safety requirement.
    Safety,
    /// Data access control requirement.
    DataAccess,
    /// Consent capture or verification requirement.
    Consent,
    /// Data residency / storage requirement.
    Storage,
    /// Cross-border data transfer requirement.
    Transfer,
    /// Data processing requirement.
    Processing,
    /// Technical security requirement.
    Security,
}

impl ClauseType {
    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Legal => "legal",
            Self::Medical => "medical",
            Self::Safety => "safety",
            Self::DataAccess => "data_access",
            Self::Consent => "consent",
            Self::Storage => "storage",
            Self::Transfer => "transfer",
            Self::Processing => "processing",
            Self::Security => "security",
        }
    }

    /// Whether clauses of this type govern cross-jurisdiction movement of
    /// data and are therefore consulted by the compliance checker.
    pub fn is_transfer_kind(self) -> bool {
        matches!(self, Self::Transfer | Self::Storage | Self::DataAccess)
    }
}

impl std::fmt::Display for ClauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Precondition
// ---------------------------------------------------------------------------

/// A named condition that must hold against the request context for a
/// clause to be valid.
///
/// Serialized untagged: a JSON boolean is a [`Flag`](Self::Flag), an
/// integer is a [`Threshold`](Self::Threshold), and an array of strings is
/// a [`Membership`](Self::Membership) test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precondition {
    /// A boolean context fact must be present and equal the expected value.
    Flag(bool),
    /// A numeric context fact must be present and `>=` the threshold.
    Threshold(u64),
    /// A text context fact must be present and a member of the set.
    Membership(Vec<String>),
}

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// A single context fact supplied with a request, matched against
/// preconditions by name.
///
/// Untagged like [`Precondition`], so request JSON stays flat:
/// `{"patient_consent": true, "age": 34, "auth_method": "two_factor"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    /// A boolean fact (consent flags, verification outcomes).
    Bool(bool),
    /// A numeric fact (age, record counts).
    Number(u64),
    /// A text fact (auth method, actor claim).
    Text(String),
}

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

/// A named rule within an agreement: preconditions that must hold, and
/// execute directives to report to the audit sink on success.
///
/// Clauses are immutable data. The `active` flag is flipped to `false` by
/// `removal` regulatory updates instead of deleting the clause, so
/// historical decisions stay reproducible against the agreement version
/// that was active at decision time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Identifier, unique within the owning agreement.
    pub clause_id: ClauseId,
    /// Short human-readable title.
    pub title: String,
    /// Legal category.
    #[serde(rename = "type")]
    pub clause_type: ClauseType,
    /// Longer description for operators and auditors.
    pub description: String,
    /// Named preconditions, all of which must hold (logical AND).
    #[serde(default)]
    pub preconditions: BTreeMap<String, Precondition>,
    /// Side-effect directives reported (never applied) on successful
    /// validation, e.g. `log_access`, `notify_patient`, `encrypt_data`.
    #[serde(default)]
    pub execute: BTreeMap<String, serde_json::Value>,
    /// Whether the clause participates in new decisions.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Clauses are active unless a removal update has deactivated them.
fn default_active() -> bool {
    true
}

impl Clause {
    /// Whether this clause declares the emergency-override precondition
    /// with value `true`.
    pub fn has_emergency_override(&self) -> bool {
        matches!(
            self.preconditions.get(EMERGENCY_OVERRIDE_KEY),
            Some(Precondition::Flag(true))
        )
    }
}
