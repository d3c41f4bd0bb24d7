//! Telemedicine template — cross-border remote practice rules.

use serde_json::json;
use zkh_core::{Clause, ClauseType, Precondition};

use super::clause;

/// Jurisdictional compliance, prescription issuance, and emergency
/// protocol clauses for a telemedicine agreement.
pub fn telemedicine() -> Vec<Clause> {
    vec![
        clause(
            "telemedicine-jurisdiction",
            "Jurisdictional Compliance",
            ClauseType::Legal,
            "Ensures telemedicine practice complies with local laws",
            vec![
                ("doctor_licensed_in_jurisdiction", Precondition::Flag(true)),
                ("patient_location_verified", Precondition::Flag(true)),
                ("service_allowed_in_jurisdiction", Precondition::Flag(true)),
            ],
            vec![
                ("log_jurisdictional_check", json!(true)),
                ("apply_local_regulations", json!(true)),
            ],
        ),
        clause(
            "telemedicine-prescription",
            "Prescription Issuance",
            ClauseType::Medical,
            "Controls electronic prescription issuance",
            vec![
                ("valid_consultation", Precondition::Flag(true)),
                ("doctor_prescription_rights", Precondition::Flag(true)),
                ("medication_allowed_for_telemedicine", Precondition::Flag(true)),
                ("patient_identity_verified", Precondition::Flag(true)),
            ],
            vec![
                ("generate_secure_prescription", json!(true)),
                ("log_prescription_details", json!(true)),
                ("notify_pharmacy", json!(true)),
            ],
        ),
        clause(
            "telemedicine-emergency-protocol",
            "Emergency Protocol",
            ClauseType::Safety,
            "Defines actions in case of medical emergency during teleconsultation",
            vec![
                ("patient_location_known", Precondition::Flag(true)),
                ("emergency_override", Precondition::Flag(true)),
            ],
            vec![
                ("notify_emergency_services", json!(true)),
                ("provide_patient_data", json!(true)),
                ("document_incident", json!(true)),
            ],
        ),
        clause(
            "telemedicine-data-transfer",
            "Cross-Border Consultation Data",
            ClauseType::Transfer,
            "Governs movement of consultation records across jurisdictions",
            vec![
                ("patient_consent", Precondition::Flag(true)),
                ("transfer_encrypted", Precondition::Flag(true)),
            ],
            vec![
                ("encrypt_data", json!(true)),
                ("log_transfer", json!(true)),
            ],
        ),
    ]
}
