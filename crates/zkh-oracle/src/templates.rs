//! # Framework Agreement Templates
//!
//! Ready-made clause sets for the regulatory frameworks the platform ships
//! with: HIPAA PHI access, GDPR lawful processing, and telemedicine
//! practice rules. Used to seed deployments and as realistic fixtures in
//! tests.
//!
//! Each template returns plain clause data; creating the agreement (and
//! thereby hashing and activating it) is the store's job.

mod gdpr;
mod hipaa;
mod telemedicine;

pub use gdpr::gdpr;
pub use hipaa::hipaa;
pub use telemedicine::telemedicine;

use std::collections::BTreeMap;

use zkh_core::{Clause, ClauseId, ClauseType, Precondition};

/// Build a clause from template content. Template identifiers are
/// compile-time constants, so the `ClauseId` constructor cannot fail.
pub(crate) fn clause(
    id: &'static str,
    title: &str,
    clause_type: ClauseType,
    description: &str,
    preconditions: Vec<(&str, Precondition)>,
    execute: Vec<(&str, serde_json::Value)>,
) -> Clause {
    let clause_id = ClauseId::new(id).unwrap_or_else(|_| {
        // Template ids are non-empty literals; this branch is unreachable.
        unreachable!("template clause id is a non-empty literal")
    });
    Clause {
        clause_id,
        title: title.to_string(),
        clause_type,
        description: description.to_string(),
        preconditions: preconditions
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        execute: execute
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
        active: true,
    }
}
