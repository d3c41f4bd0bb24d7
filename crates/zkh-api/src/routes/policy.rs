//! # Policy Validation API
//!
//! The decision path: validate a request context, optionally against an
//! oracle clause set, and run cross-jurisdiction compliance checks.
//!
//! Identity fields arrive pre-verified from the upstream gateway. Errors
//! on this path never surface as HTTP failures — the engine collapses
//! them into denied decisions with specific reasons, so callers always
//! receive a well-formed decision body.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use zkh_core::{
    AgreementId, ClauseId, Context, CrossJurisdictionScenario, Fact, JurisdictionId,
};
use zkh_oracle::CrossJurisdictionReport;
use zkh_policy::{verify_proof_freshness, Decision, OracleReference, ProofToken};

use crate::error::AppError;
use crate::state::AppState;

/// Build the policy router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/policy/validate", post(validate))
        .route(
            "/api/policy/validate/cross-jurisdiction",
            post(validate_cross_jurisdiction),
        )
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

/// Request body for policy validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateRequest {
    /// Request identifier; generated when absent.
    pub request_id: Option<String>,
    /// Pre-verified actor identifier.
    pub actor_id: String,
    /// Pre-verified actor role.
    pub actor_role: String,
    /// The requested action.
    pub action: String,
    /// Where the request is made (jurisdiction code).
    #[schema(value_type = String)]
    pub location: JurisdictionId,
    /// Resource being acted on.
    pub resource_id: String,
    /// Resource type.
    pub resource_type: String,
    /// Resource owner (typically the patient).
    pub owner_id: String,
    /// Whether this is a medical emergency.
    #[serde(default)]
    pub emergency: bool,
    /// Named facts for precondition evaluation.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub facts: BTreeMap<String, Fact>,
    /// Agreement whose clauses should be validated.
    #[schema(value_type = Option<String>)]
    pub agreement_id: Option<AgreementId>,
    /// Clauses to validate within the agreement.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub clause_ids: Vec<ClauseId>,
    /// Present when the request spans jurisdictions.
    #[schema(value_type = Option<Object>)]
    pub cross_jurisdiction: Option<CrossJurisdictionScenario>,
    /// Gateway-issued proof tokens accompanying the request. Checked for
    /// freshness and recognized type only; the material stays opaque.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub proofs: Vec<ProofToken>,
    /// Evaluation budget in milliseconds; exceeded budgets fail closed.
    pub timeout_ms: Option<u64>,
}

/// Cross-jurisdiction sub-result in a validation response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CrossJurisdictionResult {
    /// AND of every per-jurisdiction result.
    pub compliant: bool,
    /// Independent result per jurisdiction.
    pub jurisdiction_results: BTreeMap<String, bool>,
    /// Populated when non-compliant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&CrossJurisdictionReport> for CrossJurisdictionResult {
    fn from(report: &CrossJurisdictionReport) -> Self {
        Self {
            compliant: report.compliant,
            jurisdiction_results: report.jurisdiction_results.clone(),
            reason: report.reason.clone(),
        }
    }
}

/// Response body for policy validation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    /// Whether the request is permitted.
    pub allowed: bool,
    /// Specific decision reason.
    pub reason: String,
    /// The validator that governed the action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_id: Option<String>,
    /// The validator's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_name: Option<String>,
    /// The agreement version the clauses were read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_id: Option<String>,
    /// The consulted agreement version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_version: Option<u32>,
    /// Per-clause validation outcomes.
    pub clause_validations: BTreeMap<String, bool>,
    /// Evaluation notes for audit.
    pub validation_notes: Vec<String>,
    /// Execute directives from valid clauses, for the audit sink.
    #[schema(value_type = Object)]
    pub directives: BTreeMap<String, serde_json::Value>,
    /// Cross-jurisdiction sub-result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_jurisdiction: Option<CrossJurisdictionResult>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// Whether the decision was served from cache.
    pub cached: bool,
}

impl From<Decision> for ValidateResponse {
    fn from(decision: Decision) -> Self {
        Self {
            allowed: decision.allowed,
            reason: decision.reason,
            validator_id: decision.validator_id.map(|v| v.as_str().to_string()),
            validator_name: decision.validator_name,
            agreement_id: decision.agreement.map(|a| a.agreement_id.to_string()),
            agreement_version: decision.agreement.map(|a| a.version),
            clause_validations: decision.clause_validations,
            validation_notes: decision.notes,
            directives: decision.directives,
            cross_jurisdiction: decision.cross_jurisdiction.as_ref().map(Into::into),
            decided_at: decision.decided_at,
            cached: decision.cached,
        }
    }
}

/// POST /api/policy/validate — decide a request.
#[utoipa::path(
    post,
    path = "/api/policy/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Decision (allowed or denied)", body = ValidateResponse),
        (status = 422, description = "Malformed request body"),
    ),
    tag = "policy"
)]
async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    // Stale or unrecognized proofs deny before any policy work; the
    // decision body carries the specific rejection.
    let now = Utc::now();
    for proof in &request.proofs {
        if let Err(err) = verify_proof_freshness(proof, now) {
            return Ok(Json(denied_response(format!("proof rejected: {err}"))));
        }
    }

    let oracle = match (&request.agreement_id, request.clause_ids.is_empty()) {
        (Some(agreement_id), _) => Some(OracleReference {
            agreement_id: *agreement_id,
            clause_ids: request.clause_ids.clone(),
        }),
        (None, false) => {
            return Err(AppError::Validation(
                "clause_ids supplied without agreement_id".to_string(),
            ));
        }
        (None, true) => None,
    };

    let ctx = build_context(request);
    let decision = state.engine.validate(&ctx, oracle.as_ref());

    tracing::info!(
        request_id = %ctx.request_id,
        allowed = decision.allowed,
        reason = %decision.reason,
        "policy decision"
    );
    Ok(Json(decision.into()))
}

/// A denial produced before the engine ran (proof rejection).
fn denied_response(reason: String) -> ValidateResponse {
    ValidateResponse {
        allowed: false,
        reason,
        validator_id: None,
        validator_name: None,
        agreement_id: None,
        agreement_version: None,
        clause_validations: BTreeMap::new(),
        validation_notes: Vec::new(),
        directives: BTreeMap::new(),
        cross_jurisdiction: None,
        decided_at: Utc::now(),
        cached: false,
    }
}

fn build_context(request: ValidateRequest) -> Context {
    let mut ctx = Context::new(
        request
            .request_id
            .unwrap_or_else(|| format!("req_{}", uuid::Uuid::new_v4().simple())),
        request.actor_id,
        request.actor_role,
        request.action,
        request.location,
        request.resource_id,
        request.resource_type,
        request.owner_id,
    )
    .with_emergency(request.emergency);
    ctx.facts = request.facts;
    if let Some(scenario) = request.cross_jurisdiction {
        ctx = ctx.with_cross_jurisdiction(scenario);
    }
    if let Some(timeout_ms) = request.timeout_ms {
        ctx = ctx.with_deadline(Instant::now() + Duration::from_millis(timeout_ms));
    }
    ctx
}

// ---------------------------------------------------------------------------
// Cross-jurisdiction
// ---------------------------------------------------------------------------

/// Request body for a standalone cross-jurisdiction check.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CrossJurisdictionRequest {
    /// Where the actor is located.
    #[schema(value_type = String)]
    pub actor_location: JurisdictionId,
    /// Where the subject is located.
    #[schema(value_type = String)]
    pub subject_location: JurisdictionId,
    /// Where the data resides.
    #[schema(value_type = String)]
    pub data_location: JurisdictionId,
    /// Data categories involved in the transfer.
    #[serde(default)]
    pub data_categories: Vec<String>,
    /// Pre-verified actor identifier.
    pub actor_id: String,
    /// Pre-verified actor role.
    pub actor_role: String,
    /// Named facts for transfer-clause evaluation.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub facts: BTreeMap<String, Fact>,
    /// Whether this is a medical emergency.
    #[serde(default)]
    pub emergency: bool,
}

/// Response body for a standalone cross-jurisdiction check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CrossJurisdictionResponse {
    /// AND of every per-jurisdiction result.
    pub compliant: bool,
    /// Independent result per jurisdiction.
    pub jurisdiction_results: BTreeMap<String, bool>,
    /// Populated when non-compliant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Exact agreement versions consulted, for audit replay.
    pub agreements: Vec<ConsultedAgreement>,
}

/// An agreement version consulted during the check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsultedAgreement {
    /// The agreement identifier.
    pub agreement_id: String,
    /// The consulted version.
    pub version: u32,
}

/// POST /api/policy/validate/cross-jurisdiction — standalone check.
#[utoipa::path(
    post,
    path = "/api/policy/validate/cross-jurisdiction",
    request_body = CrossJurisdictionRequest,
    responses(
        (status = 200, description = "Compliance report", body = CrossJurisdictionResponse),
        (status = 422, description = "Malformed request body"),
    ),
    tag = "policy"
)]
async fn validate_cross_jurisdiction(
    State(state): State<AppState>,
    Json(request): Json<CrossJurisdictionRequest>,
) -> Result<Json<CrossJurisdictionResponse>, AppError> {
    let scenario = CrossJurisdictionScenario {
        actor_location: request.actor_location.clone(),
        subject_location: request.subject_location,
        data_location: request.data_location,
        data_categories: request.data_categories,
    };
    let mut ctx = Context::new(
        format!("req_{}", uuid::Uuid::new_v4().simple()),
        request.actor_id,
        request.actor_role,
        "cross_jurisdiction_check",
        request.actor_location,
        "transfer",
        "data_transfer",
        "unspecified",
    )
    .with_emergency(request.emergency);
    ctx.facts = request.facts;

    let report = state.checker().check(&scenario, &ctx);
    Ok(Json(CrossJurisdictionResponse {
        compliant: report.compliant,
        jurisdiction_results: report.jurisdiction_results,
        reason: report.reason,
        agreements: report
            .agreements
            .iter()
            .map(|a| ConsultedAgreement {
                agreement_id: a.agreement_id.to_string(),
                version: a.version,
            })
            .collect(),
    }))
}
