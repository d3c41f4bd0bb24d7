//! GDPR template — EU lawful processing and data subject rights.

use serde_json::json;
use zkh_core::{Clause, ClauseType, Precondition};

use super::clause;

/// Lawful processing and right-to-access clauses for an `EU-GDPR`
/// agreement.
pub fn gdpr() -> Vec<Clause> {
    vec![
        clause(
            "gdpr-data-processing",
            "Lawful Data Processing",
            ClauseType::Processing,
            "Ensures data processing follows GDPR principles",
            vec![
                ("explicit_consent", Precondition::Flag(true)),
                ("purpose_specified", Precondition::Flag(true)),
                ("data_minimization", Precondition::Flag(true)),
            ],
            vec![
                ("record_processing", json!(true)),
                ("notify_subject", json!(true)),
            ],
        ),
        clause(
            "gdpr-right-to-access",
            "Right to Access",
            ClauseType::DataAccess,
            "Implements the data subject's right to access their data",
            vec![
                ("identity_verified", Precondition::Flag(true)),
                ("request_validated", Precondition::Flag(true)),
            ],
            vec![
                ("provide_data_copy", json!(true)),
                ("include_processing_info", json!(true)),
                ("respond_within_days", json!(30)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdpr_has_expected_clauses() {
        let clauses = gdpr();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].clause_id.as_str(), "gdpr-data-processing");
        assert_eq!(clauses[1].clause_id.as_str(), "gdpr-right-to-access");
    }

    #[test]
    fn right_to_access_is_transfer_kind() {
        // The data_access clause participates in cross-jurisdiction checks.
        assert!(gdpr()[1].clause_type.is_transfer_kind());
    }
}
