//! # Error Hierarchy
//!
//! Structured error types for the policy stack, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Decision-path callers collapse these into denied decisions with a
//! specific reason string; administrative callers receive them directly.

use thiserror::Error;

/// Validation errors for agreement and clause input.
///
/// These are creation-time errors: malformed input is rejected before it
/// is ever persisted, so the store only holds well-formed agreements.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Jurisdiction identifier is empty or whitespace-only.
    #[error("invalid jurisdiction ID: must be non-empty")]
    InvalidJurisdictionId,

    /// Clause identifier is empty or whitespace-only.
    #[error("invalid clause ID: must be non-empty")]
    InvalidClauseId,

    /// Validator identifier is empty or whitespace-only.
    #[error("invalid validator ID: must be non-empty")]
    InvalidValidatorId,

    /// An agreement must carry at least one clause.
    #[error("agreement must contain at least one clause")]
    EmptyClauses,

    /// Clause identifiers must be unique within an agreement.
    #[error("duplicate clause ID within agreement: \"{0}\"")]
    DuplicateClauseId(String),

    /// A second validator was registered for an already-governed
    /// (action, location) pair. Resolution must never be ambiguous.
    #[error(
        "validator \"{existing}\" already governs action \"{action}\" in \"{location}\""
    )]
    AmbiguousValidator {
        /// The action being registered.
        action: String,
        /// The location being registered.
        location: String,
        /// The validator that already governs the pair.
        existing: String,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Thresholds and counts must be integers.
    #[error("float values are not permitted in canonical clause content: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
