//! # Cross-Jurisdiction Compliance Checker
//!
//! Validates requests that span jurisdictions against registered
//! bilateral (or generic multilateral) agreements.
//!
//! ## Non-Permissiveness
//!
//! If no agreement is registered between two jurisdictions the result is
//! non-compliant with reason `no valid agreement between <A> and <B>`.
//! This never defaults to permissive, regardless of other clause
//! outcomes.
//!
//! ## Per-Jurisdiction Checks
//!
//! Each jurisdiction in the scenario is checked independently against the
//! governing agreement's clauses restricted to the jurisdictional-transfer
//! types (`transfer`, `storage`, `data_access`), with the context's
//! location substituted. Overall compliance is the AND of every
//! per-jurisdiction result.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use zkh_core::{
    AgreementId, AgreementVersionRef, Context, CrossJurisdictionScenario, JurisdictionId,
};

use crate::evaluator::evaluate_clause;
use crate::store::AgreementStore;

/// The outcome of a cross-jurisdiction compliance check.
#[derive(Debug, Clone, Serialize)]
pub struct CrossJurisdictionReport {
    /// AND of every per-jurisdiction result.
    pub compliant: bool,
    /// Distinct jurisdictions involved, in actor/subject/data order.
    pub jurisdictions: Vec<JurisdictionId>,
    /// Independent result per jurisdiction.
    pub jurisdiction_results: BTreeMap<String, bool>,
    /// Populated when non-compliant (missing agreement or failing clause).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Exact agreement versions consulted, for audit replay.
    pub agreements: Vec<AgreementVersionRef>,
}

impl CrossJurisdictionReport {
    /// A trivially compliant report for a scenario confined to one
    /// jurisdiction.
    fn single_jurisdiction(jurisdiction: JurisdictionId) -> Self {
        let mut jurisdiction_results = BTreeMap::new();
        jurisdiction_results.insert(jurisdiction.as_str().to_string(), true);
        Self {
            compliant: true,
            jurisdictions: vec![jurisdiction],
            jurisdiction_results,
            reason: None,
            agreements: Vec::new(),
        }
    }

    fn missing_agreement(
        jurisdictions: Vec<JurisdictionId>,
        a: &JurisdictionId,
        b: &JurisdictionId,
    ) -> Self {
        let jurisdiction_results = jurisdictions
            .iter()
            .map(|j| (j.as_str().to_string(), false))
            .collect();
        Self {
            compliant: false,
            jurisdictions,
            jurisdiction_results,
            reason: Some(format!("no valid agreement between {a} and {b}")),
            agreements: Vec::new(),
        }
    }
}

/// Normalize an unordered jurisdiction pair into a stable map key.
fn pair_key(a: &JurisdictionId, b: &JurisdictionId) -> (String, String) {
    let (x, y) = (a.as_str().to_string(), b.as_str().to_string());
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Registry of bilateral agreements plus the checking logic.
#[derive(Debug)]
pub struct CrossJurisdictionChecker {
    store: Arc<AgreementStore>,
    /// Normalized jurisdiction pair → governing agreement.
    pairs: RwLock<HashMap<(String, String), AgreementId>>,
    /// Generic multilateral agreement consulted when no pair-specific
    /// agreement exists.
    generic: RwLock<Option<AgreementId>>,
}

impl CrossJurisdictionChecker {
    /// Create a checker backed by the given store.
    pub fn new(store: Arc<AgreementStore>) -> Self {
        Self {
            store,
            pairs: RwLock::new(HashMap::new()),
            generic: RwLock::new(None),
        }
    }

    /// Register the agreement governing a jurisdiction pair. The pair is
    /// unordered: registering (CA, US) also covers (US, CA).
    pub fn register_pair(
        &self,
        a: &JurisdictionId,
        b: &JurisdictionId,
        agreement_id: AgreementId,
    ) {
        self.pairs.write().insert(pair_key(a, b), agreement_id);
        tracing::info!(
            jurisdiction_a = %a,
            jurisdiction_b = %b,
            agreement_id = %agreement_id,
            "bilateral agreement registered"
        );
    }

    /// Register a generic multilateral fallback agreement.
    pub fn set_generic(&self, agreement_id: AgreementId) {
        *self.generic.write() = Some(agreement_id);
    }

    /// The agreement governing a pair: pair-specific first, generic
    /// fallback second.
    pub fn agreement_for(
        &self,
        a: &JurisdictionId,
        b: &JurisdictionId,
    ) -> Option<AgreementId> {
        if let Some(id) = self.pairs.read().get(&pair_key(a, b)) {
            return Some(*id);
        }
        *self.generic.read()
    }

    /// Check a cross-jurisdiction scenario.
    ///
    /// The context supplies the request facts that transfer clauses are
    /// evaluated against; its location is substituted per jurisdiction.
    pub fn check(
        &self,
        scenario: &CrossJurisdictionScenario,
        ctx: &Context,
    ) -> CrossJurisdictionReport {
        let jurisdictions = scenario.jurisdictions();
        if jurisdictions.len() < 2 {
            return CrossJurisdictionReport::single_jurisdiction(
                jurisdictions
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| scenario.actor_location.clone()),
            );
        }

        // Every distinct pair must be governed by an agreement.
        let mut consulted: Vec<AgreementVersionRef> = Vec::new();
        let mut pair_agreements = Vec::new();
        for (i, a) in jurisdictions.iter().enumerate() {
            for b in &jurisdictions[i + 1..] {
                match self.agreement_for(a, b) {
                    Some(id) => pair_agreements.push(id),
                    None => {
                        tracing::warn!(
                            jurisdiction_a = %a,
                            jurisdiction_b = %b,
                            "no agreement registered for jurisdiction pair"
                        );
                        return CrossJurisdictionReport::missing_agreement(
                            jurisdictions.clone(),
                            a,
                            b,
                        );
                    }
                }
            }
        }
        pair_agreements.dedup();

        // Check each jurisdiction independently against the transfer
        // clauses of every governing agreement.
        let mut jurisdiction_results = BTreeMap::new();
        let mut first_failure: Option<String> = None;
        let mut compliant = true;

        for jurisdiction in &jurisdictions {
            let mut local_ctx = ctx.clone();
            local_ctx.location = jurisdiction.clone();

            let mut passes = true;
            for agreement_id in &pair_agreements {
                let agreement = match self.store.get(*agreement_id) {
                    Ok(a) if a.status.is_selectable() => a,
                    Ok(a) => {
                        // Superseded or retired agreements are never
                        // consulted for new checks — fail closed.
                        tracing::warn!(
                            agreement_id = %agreement_id,
                            status = %a.status,
                            "registered cross-jurisdiction agreement is not active"
                        );
                        passes = false;
                        first_failure.get_or_insert_with(|| {
                            format!("agreement {agreement_id} is {}", a.status)
                        });
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(
                            agreement_id = %agreement_id,
                            error = %err,
                            "cross-jurisdiction agreement unavailable"
                        );
                        passes = false;
                        first_failure
                            .get_or_insert_with(|| "agreement unavailable".to_string());
                        continue;
                    }
                };

                let version_ref = AgreementVersionRef {
                    agreement_id: agreement.agreement_id,
                    version: agreement.version,
                };
                if !consulted.contains(&version_ref) {
                    consulted.push(version_ref);
                }

                for clause in agreement
                    .clauses
                    .iter()
                    .filter(|c| c.active && c.clause_type.is_transfer_kind())
                {
                    let eval = evaluate_clause(clause, &local_ctx);
                    if !eval.valid {
                        passes = false;
                        first_failure.get_or_insert_with(|| {
                            format!(
                                "clause '{}' failed for jurisdiction {jurisdiction}",
                                clause.clause_id
                            )
                        });
                    }
                }
            }

            jurisdiction_results.insert(jurisdiction.as_str().to_string(), passes);
            compliant &= passes;
        }

        CrossJurisdictionReport {
            compliant,
            jurisdictions,
            jurisdiction_results,
            reason: if compliant { None } else { first_failure },
            agreements: consulted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use zkh_core::Fact;

    fn jid(s: &str) -> JurisdictionId {
        JurisdictionId::new(s).unwrap()
    }

    fn ctx() -> Context {
        Context::new(
            "req-1",
            "doctor-1",
            "specialist",
            "diagnose",
            jid("CA"),
            "record-1",
            "medical_record",
            "patient-1",
        )
    }

    fn scenario(actor: &str, subject: &str, data: &str) -> CrossJurisdictionScenario {
        CrossJurisdictionScenario {
            actor_location: jid(actor),
            subject_location: jid(subject),
            data_location: jid(data),
            data_categories: vec!["PHI".to_string()],
        }
    }

    fn checker_with_pair(a: &str, b: &str) -> (CrossJurisdictionChecker, AgreementId) {
        let store = Arc::new(AgreementStore::new());
        let (id, _) = store
            .create(
                "Cross-Border Telemedicine",
                "bilateral transfer rules",
                jid("MULTI"),
                templates::telemedicine(),
            )
            .unwrap();
        let checker = CrossJurisdictionChecker::new(store);
        checker.register_pair(&jid(a), &jid(b), id);
        (checker, id)
    }

    /// Context facts that satisfy the telemedicine transfer clause.
    fn transfer_facts(ctx: Context) -> Context {
        ctx.with_fact("patient_consent", Fact::Bool(true))
            .with_fact("transfer_encrypted", Fact::Bool(true))
    }

    #[test]
    fn missing_pair_agreement_is_non_compliant() {
        let store = Arc::new(AgreementStore::new());
        let checker = CrossJurisdictionChecker::new(store);

        let report = checker.check(&scenario("CA", "US", "US"), &ctx());
        assert!(!report.compliant);
        assert_eq!(
            report.reason.as_deref(),
            Some("no valid agreement between CA and US")
        );
        assert!(report.jurisdiction_results.values().all(|v| !v));
    }

    #[test]
    fn missing_agreement_overrides_everything() {
        // Even a context that would satisfy every clause is non-compliant
        // without a registered agreement.
        let store = Arc::new(AgreementStore::new());
        let checker = CrossJurisdictionChecker::new(store);
        let report = checker.check(&scenario("CA", "US", "US"), &transfer_facts(ctx()));
        assert!(!report.compliant);
    }

    #[test]
    fn registered_pair_with_satisfied_clauses_is_compliant() {
        let (checker, id) = checker_with_pair("CA", "US");
        let report = checker.check(&scenario("CA", "US", "US"), &transfer_facts(ctx()));
        assert!(report.compliant, "reason: {:?}", report.reason);
        assert_eq!(report.jurisdiction_results.len(), 2);
        assert!(report.jurisdiction_results.values().all(|v| *v));
        assert_eq!(report.agreements[0].agreement_id, id);
        assert_eq!(report.agreements[0].version, 1);
    }

    #[test]
    fn pair_registration_is_unordered() {
        let (checker, _) = checker_with_pair("CA", "US");
        // Scenario pairs (US, CA) — reversed relative to registration.
        let report = checker.check(&scenario("US", "CA", "CA"), &transfer_facts(ctx()));
        assert!(report.compliant);
    }

    #[test]
    fn failing_transfer_clause_fails_the_jurisdiction() {
        let (checker, _) = checker_with_pair("CA", "US");
        // patient_consent missing → transfer clause fails, fail-closed.
        let report = checker.check(&scenario("CA", "US", "US"), &ctx());
        assert!(!report.compliant);
        assert!(report.reason.is_some());
    }

    #[test]
    fn generic_agreement_used_as_fallback() {
        let store = Arc::new(AgreementStore::new());
        let (id, _) = store
            .create("Generic", "multilateral", jid("MULTI"), templates::telemedicine())
            .unwrap();
        let checker = CrossJurisdictionChecker::new(store);
        checker.set_generic(id);

        let report = checker.check(&scenario("GB", "IN", "IN"), &transfer_facts(ctx()));
        assert!(report.compliant);
    }

    #[test]
    fn pair_specific_takes_precedence_over_generic() {
        let store = Arc::new(AgreementStore::new());
        let (pair_id, _) = store
            .create("Pair", "bilateral", jid("MULTI"), templates::telemedicine())
            .unwrap();
        let (generic_id, _) = store
            .create("Generic", "multilateral", jid("MULTI"), templates::telemedicine())
            .unwrap();
        let checker = CrossJurisdictionChecker::new(store);
        checker.register_pair(&jid("CA"), &jid("US"), pair_id);
        checker.set_generic(generic_id);

        assert_eq!(checker.agreement_for(&jid("US"), &jid("CA")), Some(pair_id));
        assert_eq!(checker.agreement_for(&jid("GB"), &jid("IN")), Some(generic_id));
    }

    #[test]
    fn single_jurisdiction_scenario_is_trivially_compliant() {
        let store = Arc::new(AgreementStore::new());
        let checker = CrossJurisdictionChecker::new(store);
        let report = checker.check(&scenario("US", "US", "US"), &ctx());
        assert!(report.compliant);
        assert_eq!(report.jurisdictions.len(), 1);
    }

    #[test]
    fn three_way_scenario_requires_all_pairs() {
        let (checker, _) = checker_with_pair("CA", "US");
        // (CA, GB) and (US, GB) are unregistered.
        let report = checker.check(&scenario("CA", "US", "GB"), &transfer_facts(ctx()));
        assert!(!report.compliant);
        let reason = report.reason.unwrap();
        assert!(reason.contains("no valid agreement between"), "{reason}");
    }

    #[test]
    fn non_transfer_clauses_are_ignored() {
        // An agreement whose only clauses are non-transfer types imposes
        // no cross-jurisdiction requirements.
        let store = Arc::new(AgreementStore::new());
        let (id, _) = store
            .create("HIPAA", "compliance only", jid("US-HIPAA"), templates::hipaa())
            .unwrap();
        let checker = CrossJurisdictionChecker::new(store);
        checker.register_pair(&jid("CA"), &jid("US"), id);

        // hipaa() carries compliance clauses only (no transfer kinds), so
        // the unsatisfied consent precondition is never consulted here.
        let report = checker.check(&scenario("CA", "US", "US"), &ctx());
        assert!(report.compliant);
    }
}
