//! # Policy Decision Engine
//!
//! Combines the role capability check, per-jurisdiction action rules,
//! validator resolution, oracle clause evaluation, and cross-jurisdiction
//! compliance into a single [`Decision`].
//!
//! ## Ordering
//!
//! 1. Deadline check — an expired deadline denies immediately
//!    (fail-closed, dependency never consulted).
//! 2. Role capability check — denies with `action not permitted for role`
//!    and evaluates no clauses, so clause existence is never leaked to
//!    unauthorized actors.
//! 3. Jurisdiction action rules — action defined, role admitted, strength
//!    sufficient.
//! 4. Validator resolution when the rule demands one.
//! 5. Oracle clause evaluation — every referenced clause is evaluated (no
//!    early abort) so the caller gets a complete audit trail.
//! 6. Cross-jurisdiction check — a failure here overrides an otherwise
//!    allowed decision.
//!
//! Every denial carries a specific reason; the engine never panics out to
//! the caller on the decision path.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use zkh_core::{
    AgreementId, AgreementVersionRef, ClauseId, Context, JurisdictionId, ValidatorId,
};
use zkh_oracle::{
    evaluate_clause, AgreementStore, CrossJurisdictionChecker, CrossJurisdictionReport,
};

use crate::cache::{CachedDecision, DecisionCache};
use crate::resolver::{NoValidatorError, Validator, ValidatorRegistry};
use crate::role::RoleRegistry;
use crate::rules::RuleSet;

/// Reason used when the role capability check fails.
pub const REASON_ROLE_DENIED: &str = "action not permitted for role";
/// Reason used when no validator governs the (action, location) pair.
pub const REASON_NO_VALIDATOR: &str = "no validator for jurisdiction";
/// Reason used when the clause store cannot supply a selectable agreement.
pub const REASON_AGREEMENT_UNAVAILABLE: &str = "agreement unavailable";
/// Reason used when the evaluation deadline passed.
pub const REASON_DEADLINE: &str = "evaluation deadline exceeded";

/// The oracle clause set a request asks to be validated against.
#[derive(Debug, Clone, Serialize)]
pub struct OracleReference {
    /// The agreement holding the clauses.
    pub agreement_id: AgreementId,
    /// The clauses to validate.
    pub clause_ids: Vec<ClauseId>,
}

/// Audit metadata attached to a decision when the matched action rule
/// demands it. Handed to the external audit sink together with the full
/// decision; the engine itself writes nothing.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// Request identifier for correlation.
    pub request_id: String,
    /// The acting principal.
    pub actor_id: String,
    /// The actor's role.
    pub actor_role: String,
    /// The requested action.
    pub action: String,
    /// The resource acted on.
    pub resource_id: String,
    /// The resource type.
    pub resource_type: String,
    /// Where the request was made.
    pub location: String,
    /// The decision outcome.
    pub allowed: bool,
    /// The validator that governed the action, if any.
    pub validator_id: Option<ValidatorId>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// How long the audit sink must retain this record, in days.
    pub retention_days: u32,
}

/// The outcome of a policy validation.
///
/// Ephemeral — created per request and discarded — but fully serializable
/// so the caller can log it for audit.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Whether the request is permitted.
    pub allowed: bool,
    /// Specific, operator-readable reason. Never "unknown error".
    pub reason: String,
    /// The validator selected for the action, if one governs it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_id: Option<ValidatorId>,
    /// The selected validator's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_name: Option<String>,
    /// The exact agreement version the clauses were read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<AgreementVersionRef>,
    /// Per-clause outcomes. Empty when the role check short-circuited.
    pub clause_validations: BTreeMap<String, bool>,
    /// Evaluation notes (override applications, failure details).
    pub notes: Vec<String>,
    /// Execute directives from valid clauses, for the audit sink.
    pub directives: BTreeMap<String, serde_json::Value>,
    /// Cross-jurisdiction sub-result, when the request spanned
    /// jurisdictions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_jurisdiction: Option<CrossJurisdictionReport>,
    /// Audit metadata when the action rule requires it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditRecord>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// Whether this decision was served from the cache.
    pub cached: bool,
}

impl Decision {
    /// A denial with the given reason and no evaluation detail.
    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            validator_id: None,
            validator_name: None,
            agreement: None,
            clause_validations: BTreeMap::new(),
            notes: Vec::new(),
            directives: BTreeMap::new(),
            cross_jurisdiction: None,
            audit: None,
            decided_at: Utc::now(),
            cached: false,
        }
    }
}

/// The policy decision engine. Stateless per request: safe to share
/// behind an `Arc` and call concurrently.
#[derive(Debug)]
pub struct PolicyEngine {
    roles: RoleRegistry,
    validators: ValidatorRegistry,
    rules: RuleSet,
    store: Arc<AgreementStore>,
    checker: Arc<CrossJurisdictionChecker>,
    cache: DecisionCache,
}

impl PolicyEngine {
    /// Assemble an engine from its registries and collaborators.
    pub fn new(
        roles: RoleRegistry,
        validators: ValidatorRegistry,
        rules: RuleSet,
        store: Arc<AgreementStore>,
        checker: Arc<CrossJurisdictionChecker>,
    ) -> Self {
        Self {
            roles,
            validators,
            rules,
            store,
            checker,
            cache: DecisionCache::default(),
        }
    }

    /// The agreement store this engine reads from.
    pub fn store(&self) -> &Arc<AgreementStore> {
        &self.store
    }

    /// The cross-jurisdiction checker this engine delegates to.
    pub fn checker(&self) -> &Arc<CrossJurisdictionChecker> {
        &self.checker
    }

    /// Validate a request context, optionally against an oracle clause
    /// set.
    pub fn validate(&self, ctx: &Context, oracle: Option<&OracleReference>) -> Decision {
        // Fail closed before consulting any dependency.
        if ctx.deadline_exceeded() {
            tracing::warn!(request_id = %ctx.request_id, "evaluation deadline exceeded");
            return Decision::denied(REASON_DEADLINE);
        }

        // Only base decisions are cacheable: clause and cross-jurisdiction
        // outcomes can be invalidated by regulatory updates.
        let cacheable = oracle.is_none() && ctx.cross_jurisdiction.is_none();
        let cache_key = DecisionCache::key(ctx);
        if cacheable {
            if let Some(hit) = self.cache.get(&cache_key) {
                let validator_name = hit
                    .validator_id
                    .as_ref()
                    .and_then(|id| self.validators.get(id))
                    .map(|v| v.name.clone());
                let mut decision = Decision::denied(format!("{} (cached)", hit.reason));
                decision.allowed = hit.allowed;
                decision.validator_id = hit.validator_id;
                decision.validator_name = validator_name;
                decision.cached = true;
                return decision;
            }
        }

        let decision = self.validate_uncached(ctx, oracle);

        if cacheable {
            self.cache.insert(
                cache_key,
                CachedDecision {
                    allowed: decision.allowed,
                    reason: decision.reason.clone(),
                    validator_id: decision.validator_id.clone(),
                },
            );
        }
        decision
    }

    fn validate_uncached(&self, ctx: &Context, oracle: Option<&OracleReference>) -> Decision {
        // 1. Role capability check. Short-circuits before any clause work
        //    so unauthorized actors learn nothing about clause sets.
        if !self
            .roles
            .permits(&ctx.actor_role, &ctx.action, &ctx.resource_type)
        {
            tracing::debug!(
                role = %ctx.actor_role,
                action = %ctx.action,
                "role capability check denied"
            );
            return Decision::denied(REASON_ROLE_DENIED);
        }

        // 2. Jurisdiction action rules.
        let Some(jurisdiction_rules) = self.rules.get(&ctx.location) else {
            return Decision::denied(format!(
                "no rules defined for jurisdiction {}",
                ctx.location
            ));
        };
        let Some(rule) = jurisdiction_rules.action_rules.get(&ctx.action) else {
            return Decision::denied(format!(
                "action {} not defined for jurisdiction {}",
                ctx.action, ctx.location
            ));
        };
        if !rule.admits_role(&ctx.actor_role) {
            return Decision::denied(format!(
                "role {} not authorized for {} in {}",
                ctx.actor_role, ctx.action, ctx.location
            ));
        }
        if let Some(role_config) = self.roles.get(&ctx.actor_role) {
            if role_config.strength < rule.minimum_role_strength {
                return Decision::denied(format!(
                    "role {} has insufficient strength for {}",
                    ctx.actor_role, ctx.action
                ));
            }
        }

        // 3. Validator resolution.
        let mut validator_id = None;
        let mut validator_name = None;
        if rule.requires_validator {
            let resolved = self
                .validators
                .resolve(&ctx.action, &ctx.location)
                .ok()
                .or_else(|| {
                    jurisdiction_rules
                        .validator_for(&ctx.action)
                        .and_then(|id| self.validators.get(id))
                });
            let Some(validator) = resolved else {
                tracing::warn!(
                    action = %ctx.action,
                    location = %ctx.location,
                    "no validator governs action"
                );
                return Decision::denied(REASON_NO_VALIDATOR);
            };
            validator_id = Some(validator.validator_id.clone());
            validator_name = Some(validator.name.clone());
        }

        let mut decision = Decision::denied("action allowed");
        decision.allowed = true;
        decision.validator_id = validator_id;
        decision.validator_name = validator_name;
        // From here on the decision is allowed unless a clause or the
        // cross-jurisdiction check pulls it back down.

        // 4. Oracle clause evaluation.
        if let Some(oracle) = oracle {
            match self.store.get(oracle.agreement_id) {
                Ok(agreement) if agreement.status.is_selectable() => {
                    decision.agreement = Some(AgreementVersionRef {
                        agreement_id: agreement.agreement_id,
                        version: agreement.version,
                    });

                    let mut first_failure: Option<String> = None;
                    for clause_id in &oracle.clause_ids {
                        match agreement.clause(clause_id) {
                            Some(clause) => {
                                let eval = evaluate_clause(clause, ctx);
                                if !eval.valid {
                                    first_failure.get_or_insert_with(|| {
                                        format!("clause '{clause_id}' failed validation")
                                    });
                                }
                                decision
                                    .clause_validations
                                    .insert(clause_id.as_str().to_string(), eval.valid);
                                decision.notes.extend(eval.notes);
                                decision.directives.extend(eval.directives);
                            }
                            None => {
                                // Unknown clause reference fails closed.
                                first_failure.get_or_insert_with(|| {
                                    format!("clause '{clause_id}' failed validation")
                                });
                                decision
                                    .clause_validations
                                    .insert(clause_id.as_str().to_string(), false);
                                decision
                                    .notes
                                    .push(format!("clause '{clause_id}' not found in agreement"));
                            }
                        }
                    }

                    if let Some(reason) = first_failure {
                        decision.allowed = false;
                        decision.reason = reason;
                        decision.directives.clear();
                    }
                }
                Ok(agreement) => {
                    tracing::warn!(
                        agreement_id = %oracle.agreement_id,
                        status = %agreement.status,
                        "referenced agreement is not selectable"
                    );
                    return Decision::denied(REASON_AGREEMENT_UNAVAILABLE);
                }
                Err(err) => {
                    tracing::warn!(
                        agreement_id = %oracle.agreement_id,
                        error = %err,
                        "clause store lookup failed"
                    );
                    return Decision::denied(REASON_AGREEMENT_UNAVAILABLE);
                }
            }
        }

        // 5. Cross-jurisdiction compliance overrides an otherwise allowed
        //    decision. Emergency override is scoped to individual clauses
        //    and never bypasses this check.
        if let Some(scenario) = &ctx.cross_jurisdiction {
            let report = self.checker.check(scenario, ctx);
            if !report.compliant {
                decision.allowed = false;
                decision.reason = report
                    .reason
                    .clone()
                    .unwrap_or_else(|| "cross-jurisdiction compliance failed".to_string());
            }
            decision.cross_jurisdiction = Some(report);
        }

        // 6. Audit metadata for the external sink.
        if rule.audit_required {
            decision.audit = Some(AuditRecord {
                request_id: ctx.request_id.clone(),
                actor_id: ctx.actor_id.clone(),
                actor_role: ctx.actor_role.clone(),
                action: ctx.action.clone(),
                resource_id: ctx.resource_id.clone(),
                resource_type: ctx.resource_type.clone(),
                location: ctx.location.as_str().to_string(),
                allowed: decision.allowed,
                validator_id: decision.validator_id.clone(),
                decided_at: decision.decided_at,
                retention_days: rule.retention_days,
            });
        }

        decision
    }

    /// All actions defined for a location, mapped to whether the role may
    /// perform them there.
    pub fn allowed_actions(&self, role: &str, location: &JurisdictionId) -> BTreeMap<String, bool> {
        let mut out = BTreeMap::new();
        let Some(jurisdiction_rules) = self.rules.get(location) else {
            return out;
        };
        for (action, rule) in &jurisdiction_rules.action_rules {
            let strength_ok = self
                .roles
                .get(role)
                .map_or(false, |r| r.strength >= rule.minimum_role_strength);
            let permitted = self.roles.permits(role, action, "*")
                && rule.admits_role(role)
                && strength_ok;
            out.insert(action.clone(), permitted);
        }
        out
    }

    /// The validator governing an (action, location) pair.
    pub fn validator_for(
        &self,
        action: &str,
        location: &JurisdictionId,
    ) -> Result<&Validator, NoValidatorError> {
        self.validators.resolve(action, location)
    }

    /// Drop every cached decision. Called after administrative changes to
    /// rules or agreements.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use zkh_core::{CrossJurisdictionScenario, Fact, JurisdictionId};
    use zkh_oracle::templates;

    fn jid(s: &str) -> JurisdictionId {
        JurisdictionId::new(s).unwrap()
    }

    /// Engine over the default config with a HIPAA agreement seeded.
    fn engine() -> (PolicyEngine, AgreementId) {
        let store = Arc::new(AgreementStore::new());
        let (agreement_id, _) = store
            .create(
                "HIPAA Compliance",
                "US PHI access rules",
                jid("US-HIPAA"),
                templates::hipaa(),
            )
            .unwrap();
        let checker = Arc::new(CrossJurisdictionChecker::new(Arc::clone(&store)));
        let engine = PolicyConfig::default()
            .build_engine(store, checker)
            .unwrap();
        (engine, agreement_id)
    }

    fn ctx(role: &str, action: &str, location: &str, resource_type: &str) -> Context {
        Context::new(
            "req-1",
            "actor-1",
            role,
            action,
            jid(location),
            "resource-1",
            resource_type,
            "patient-1",
        )
    }

    fn oracle(agreement_id: AgreementId, clause_ids: &[&str]) -> OracleReference {
        OracleReference {
            agreement_id,
            clause_ids: clause_ids
                .iter()
                .map(|id| ClauseId::new(*id).unwrap())
                .collect(),
        }
    }

    // ── Scenario 1: RBAC short-circuit ──────────────────────────────

    #[test]
    fn nurse_cannot_prescribe_and_no_clauses_evaluated() {
        let (engine, agreement_id) = engine();
        let decision = engine.validate(
            &ctx("nurse", "prescribe", "US", "prescription"),
            Some(&oracle(agreement_id, &["hipaa-phi-access"])),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.reason, REASON_ROLE_DENIED);
        assert!(
            decision.clause_validations.is_empty(),
            "role denial must not evaluate clauses"
        );
        assert!(decision.agreement.is_none());
    }

    // ── Scenarios 2 & 3: clause-gated decisions ─────────────────────

    #[test]
    fn specialist_denied_without_patient_consent() {
        let (engine, agreement_id) = engine();
        let ctx = ctx("specialist", "diagnose", "US", "medical_record")
            .with_fact("patient_consent", Fact::Bool(false));
        let decision = engine.validate(&ctx, Some(&oracle(agreement_id, &["hipaa-phi-access"])));

        assert!(!decision.allowed);
        assert_eq!(decision.clause_validations["hipaa-phi-access"], false);
        assert!(decision.reason.contains("hipaa-phi-access"));
    }

    #[test]
    fn specialist_allowed_with_patient_consent() {
        let (engine, agreement_id) = engine();
        let ctx = ctx("specialist", "diagnose", "US", "medical_record")
            .with_fact("patient_consent", Fact::Bool(true));
        let decision = engine.validate(&ctx, Some(&oracle(agreement_id, &["hipaa-phi-access"])));

        assert!(decision.allowed, "reason: {}", decision.reason);
        assert_eq!(decision.clause_validations["hipaa-phi-access"], true);
        assert_eq!(decision.validator_id.as_ref().unwrap().as_str(), "us_hhs");
        assert_eq!(
            decision.agreement.unwrap().version,
            1,
            "decision records the version it used"
        );
        assert!(decision.directives.contains_key("log_access"));
    }

    #[test]
    fn all_clauses_evaluated_despite_failure() {
        let (engine, agreement_id) = engine();
        // Consent satisfied, but minimum-necessary preconditions missing:
        // the first clause passes, the second fails, both are reported.
        let ctx = ctx("specialist", "diagnose", "US", "medical_record")
            .with_fact("patient_consent", Fact::Bool(true));
        let decision = engine.validate(
            &ctx,
            Some(&oracle(
                agreement_id,
                &["hipaa-phi-access", "hipaa-minimum-necessary"],
            )),
        );

        assert!(!decision.allowed);
        assert_eq!(decision.clause_validations.len(), 2);
        assert_eq!(decision.clause_validations["hipaa-phi-access"], true);
        assert_eq!(decision.clause_validations["hipaa-minimum-necessary"], false);
        assert!(decision.reason.contains("hipaa-minimum-necessary"));
        assert!(decision.directives.is_empty(), "no directives on denial");
    }

    #[test]
    fn unknown_clause_reference_fails_closed() {
        let (engine, agreement_id) = engine();
        let ctx = ctx("specialist", "diagnose", "US", "medical_record")
            .with_fact("patient_consent", Fact::Bool(true));
        let decision =
            engine.validate(&ctx, Some(&oracle(agreement_id, &["no-such-clause"])));
        assert!(!decision.allowed);
        assert_eq!(decision.clause_validations["no-such-clause"], false);
    }

    #[test]
    fn missing_agreement_is_unavailable() {
        let (engine, _) = engine();
        let ctx = ctx("specialist", "diagnose", "US", "medical_record");
        let decision = engine.validate(
            &ctx,
            Some(&oracle(AgreementId::new(), &["hipaa-phi-access"])),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.reason, REASON_AGREEMENT_UNAVAILABLE);
    }

    // ── Jurisdiction rules ──────────────────────────────────────────

    #[test]
    fn undefined_jurisdiction_denied() {
        let (engine, _) = engine();
        let decision = engine.validate(&ctx("specialist", "diagnose", "FR", "medical_record"), None);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("FR"));
    }

    #[test]
    fn undefined_action_denied() {
        let (engine, _) = engine();
        // record_vitals is defined for IN but not US in the default config.
        let decision = engine.validate(&ctx("nurse", "record_vitals", "US", "vitals"), None);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("record_vitals"));
    }

    #[test]
    fn general_doctor_cannot_issue_certificate() {
        let (engine, _) = engine();
        // issue_certificate demands the specialist role (strength 8).
        let decision = engine.validate(
            &ctx("general_doctor", "issue_certificate", "CA", "certificate"),
            None,
        );
        assert!(!decision.allowed);
    }

    #[test]
    fn audit_record_attached_when_required() {
        let (engine, _) = engine();
        let decision = engine.validate(&ctx("specialist", "prescribe", "US", "prescription"), None);
        assert!(decision.allowed);
        let audit = decision.audit.expect("prescribe requires audit");
        assert_eq!(audit.action, "prescribe");
        assert_eq!(audit.retention_days, 365);
        assert!(audit.allowed);
    }

    // ── Validator resolution ────────────────────────────────────────

    #[test]
    fn validator_selected_per_jurisdiction() {
        let (engine, _) = engine();
        let us = engine.validate(&ctx("specialist", "prescribe", "US", "prescription"), None);
        assert_eq!(us.validator_id.as_ref().unwrap().as_str(), "us_hhs");

        let india = engine.validate(&ctx("specialist", "prescribe", "IN", "prescription"), None);
        assert_eq!(india.validator_id.as_ref().unwrap().as_str(), "mci_validator");
    }

    // ── Scenario 4: cross-jurisdiction override ─────────────────────

    #[test]
    fn unregistered_pair_overrides_allowed_decision() {
        let (engine, _) = engine();
        let ctx = ctx("specialist", "diagnose", "CA", "medical_record").with_cross_jurisdiction(
            CrossJurisdictionScenario {
                actor_location: jid("CA"),
                subject_location: jid("US"),
                data_location: jid("US"),
                data_categories: vec!["PHI".to_string()],
            },
        );
        let decision = engine.validate(&ctx, None);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason,
            "no valid agreement between CA and US"
        );
        let report = decision.cross_jurisdiction.unwrap();
        assert!(!report.compliant);
    }

    #[test]
    fn registered_pair_keeps_decision_allowed() {
        let (engine, _) = engine();
        let (pair_agreement, _) = engine
            .store()
            .create(
                "CA-US Telemedicine",
                "bilateral",
                jid("MULTI"),
                templates::telemedicine(),
            )
            .unwrap();
        engine
            .checker()
            .register_pair(&jid("CA"), &jid("US"), pair_agreement);

        let ctx = ctx("specialist", "diagnose", "CA", "medical_record")
            .with_fact("patient_consent", Fact::Bool(true))
            .with_fact("transfer_encrypted", Fact::Bool(true))
            .with_cross_jurisdiction(CrossJurisdictionScenario {
                actor_location: jid("CA"),
                subject_location: jid("US"),
                data_location: jid("US"),
                data_categories: vec!["PHI".to_string()],
            });
        let decision = engine.validate(&ctx, None);
        assert!(decision.allowed, "reason: {}", decision.reason);
        assert!(decision.cross_jurisdiction.unwrap().compliant);
    }

    // ── Deadline ────────────────────────────────────────────────────

    #[test]
    fn expired_deadline_fails_closed() {
        let (engine, _) = engine();
        let ctx = ctx("specialist", "diagnose", "US", "medical_record")
            .with_deadline(std::time::Instant::now() - std::time::Duration::from_secs(1));
        let decision = engine.validate(&ctx, None);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, REASON_DEADLINE);
    }

    // ── Caching ─────────────────────────────────────────────────────

    #[test]
    fn base_decision_is_cached() {
        let (engine, _) = engine();
        let request = ctx("specialist", "prescribe", "US", "prescription");

        let first = engine.validate(&request, None);
        assert!(first.allowed);
        assert!(!first.cached);

        let second = engine.validate(&request, None);
        assert!(second.allowed);
        assert!(second.cached);
        assert!(second.reason.ends_with("(cached)"));
        assert_eq!(second.validator_id, first.validator_id);
    }

    #[test]
    fn oracle_decisions_bypass_cache() {
        let (engine, agreement_id) = engine();
        let request = ctx("specialist", "diagnose", "US", "medical_record")
            .with_fact("patient_consent", Fact::Bool(true));
        let reference = oracle(agreement_id, &["hipaa-phi-access"]);

        let first = engine.validate(&request, Some(&reference));
        let second = engine.validate(&request, Some(&reference));
        assert!(!first.cached);
        assert!(!second.cached, "clause decisions are never cached");
    }

    #[test]
    fn clear_cache_forces_reevaluation() {
        let (engine, _) = engine();
        let request = ctx("specialist", "prescribe", "US", "prescription");
        engine.validate(&request, None);
        engine.clear_cache();
        let decision = engine.validate(&request, None);
        assert!(!decision.cached);
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[test]
    fn allowed_actions_listing() {
        let (engine, _) = engine();
        let actions = engine.allowed_actions("specialist", &jid("US"));
        assert_eq!(actions["prescribe"], true);
        assert_eq!(actions["issue_certificate"], true);

        let nurse_actions = engine.allowed_actions("nurse", &jid("US"));
        assert_eq!(nurse_actions["prescribe"], false);
    }

    #[test]
    fn validator_for_query() {
        let (engine, _) = engine();
        let validator = engine.validator_for("diagnose", &jid("GB")).unwrap();
        assert_eq!(validator.validator_id.as_str(), "nhs_validator");
        assert!(engine.validator_for("diagnose", &jid("FR")).is_err());
    }
}
