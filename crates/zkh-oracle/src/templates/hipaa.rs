//! HIPAA template — US Protected Health Information access rules.

use serde_json::json;
use zkh_core::{Clause, ClauseType, Precondition};

use super::clause;

/// PHI access control and minimum-necessary clauses for a `US-HIPAA`
/// agreement.
pub fn hipaa() -> Vec<Clause> {
    vec![
        clause(
            "hipaa-phi-access",
            "PHI Access Control",
            ClauseType::Compliance,
            "Controls access to Protected Health Information (PHI)",
            vec![
                (
                    "actor_claim",
                    Precondition::Membership(vec![
                        "doctor".to_string(),
                        "nurse".to_string(),
                        "admin".to_string(),
                        "specialist".to_string(),
                    ]),
                ),
                ("patient_consent", Precondition::Flag(true)),
                ("emergency_override", Precondition::Flag(false)),
            ],
            vec![
                ("log_access", json!(true)),
                ("restrict_fields", json!(["ssn", "financial"])),
                ("audit_trail", json!(true)),
            ],
        ),
        clause(
            "hipaa-minimum-necessary",
            "Minimum Necessary Rule",
            ClauseType::Compliance,
            "Ensures only minimum necessary PHI is accessed",
            vec![
                ("purpose_specified", Precondition::Flag(true)),
                ("scope_limited", Precondition::Flag(true)),
            ],
            vec![("filter_data", json!(true)), ("log_purpose", json!(true))],
        ),
    ]
}
