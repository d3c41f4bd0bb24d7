//! # Oracle Agreement API
//!
//! Administrative endpoints for agreement management and regulatory
//! update propagation. Lower-frequency than the validation path; errors
//! here are returned directly to the admin caller for correction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use zkh_core::{Agreement, AgreementId, Clause, ClauseId, JurisdictionId};
use zkh_oracle::{RegulatoryUpdate, UpdateType};

use crate::error::AppError;
use crate::state::AppState;

/// Build the oracle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/oracle/agreement", post(create_agreement))
        .route("/api/oracle/agreements", get(list_agreements))
        .route("/api/oracle/agreement/:agreement_id", get(get_agreement))
        .route(
            "/api/oracle/agreement/:agreement_id/clause/:clause_id",
            get(get_clause),
        )
        .route("/api/oracle/regulatory-update", post(regulatory_update))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Request body for agreement creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAgreementRequest {
    /// Display name of the agreement.
    pub name: String,
    /// Operator-facing description.
    pub description: String,
    /// Governing jurisdiction code (e.g. `US-HIPAA`).
    #[schema(value_type = String)]
    pub jurisdiction: JurisdictionId,
    /// The ordered clause list.
    #[schema(value_type = Vec<Object>)]
    pub clauses: Vec<Clause>,
}

/// Response body for agreement creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAgreementResponse {
    /// The new agreement's identifier.
    pub agreement_id: String,
    /// SHA-256 content hash over the canonicalized clause list.
    pub content_hash: String,
}

/// POST /api/oracle/agreement — create and activate an agreement.
#[utoipa::path(
    post,
    path = "/api/oracle/agreement",
    request_body = CreateAgreementRequest,
    responses(
        (status = 201, description = "Agreement created", body = CreateAgreementResponse),
        (status = 422, description = "Empty clause list or duplicate clause IDs"),
    ),
    tag = "oracle"
)]
async fn create_agreement(
    State(state): State<AppState>,
    Json(request): Json<CreateAgreementRequest>,
) -> Result<(StatusCode, Json<CreateAgreementResponse>), AppError> {
    let (agreement_id, content_hash) = state.store().create(
        request.name,
        request.description,
        request.jurisdiction,
        request.clauses,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(CreateAgreementResponse {
            agreement_id: agreement_id.to_string(),
            content_hash: content_hash.to_hex(),
        }),
    ))
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// Query parameters for agreement listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict the listing to one jurisdiction.
    pub jurisdiction: Option<String>,
}

/// One agreement in a listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgreementSummary {
    /// Agreement identifier.
    pub agreement_id: String,
    /// Latest version number.
    pub version: u32,
    /// Display name.
    pub name: String,
    /// Governing jurisdiction.
    pub jurisdiction: String,
    /// Content hash of the latest version.
    pub content_hash: String,
    /// Lifecycle status of the latest version.
    pub status: String,
    /// Creation time of the latest version.
    pub created_at: DateTime<Utc>,
}

impl From<&Agreement> for AgreementSummary {
    fn from(agreement: &Agreement) -> Self {
        Self {
            agreement_id: agreement.agreement_id.to_string(),
            version: agreement.version,
            name: agreement.name.clone(),
            jurisdiction: agreement.jurisdiction.as_str().to_string(),
            content_hash: agreement.content_hash.to_hex(),
            status: agreement.status.to_string(),
            created_at: agreement.created_at,
        }
    }
}

/// Response body for agreement listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAgreementsResponse {
    /// Latest version of every matching agreement.
    pub agreements: Vec<AgreementSummary>,
}

/// GET /api/oracle/agreements — list agreements.
#[utoipa::path(
    get,
    path = "/api/oracle/agreements",
    params(("jurisdiction" = Option<String>, Query, description = "Jurisdiction filter")),
    responses(
        (status = 200, description = "Agreement listing", body = ListAgreementsResponse),
        (status = 422, description = "Invalid jurisdiction filter"),
    ),
    tag = "oracle"
)]
async fn list_agreements(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListAgreementsResponse>, AppError> {
    let filter = params
        .jurisdiction
        .map(JurisdictionId::new)
        .transpose()
        .map_err(AppError::from)?;
    let agreements = state
        .store()
        .list(filter.as_ref())
        .iter()
        .map(AgreementSummary::from)
        .collect();
    Ok(Json(ListAgreementsResponse { agreements }))
}

/// Full agreement detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgreementDetail {
    /// Agreement identifier.
    pub agreement_id: String,
    /// Version number.
    pub version: u32,
    /// Display name.
    pub name: String,
    /// Operator-facing description.
    pub description: String,
    /// Governing jurisdiction.
    pub jurisdiction: String,
    /// The ordered clause list.
    #[schema(value_type = Vec<Object>)]
    pub clauses: Vec<Clause>,
    /// Content hash.
    pub content_hash: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Agreement> for AgreementDetail {
    fn from(agreement: Agreement) -> Self {
        Self {
            agreement_id: agreement.agreement_id.to_string(),
            version: agreement.version,
            name: agreement.name,
            description: agreement.description,
            jurisdiction: agreement.jurisdiction.as_str().to_string(),
            clauses: agreement.clauses,
            content_hash: agreement.content_hash.to_hex(),
            status: agreement.status.to_string(),
            created_at: agreement.created_at,
        }
    }
}

/// GET /api/oracle/agreement/{agreement_id} — fetch the latest version.
#[utoipa::path(
    get,
    path = "/api/oracle/agreement/{agreement_id}",
    params(("agreement_id" = String, Path, description = "Agreement identifier")),
    responses(
        (status = 200, description = "The agreement", body = AgreementDetail),
        (status = 404, description = "Unknown agreement"),
    ),
    tag = "oracle"
)]
async fn get_agreement(
    State(state): State<AppState>,
    Path(agreement_id): Path<String>,
) -> Result<Json<AgreementDetail>, AppError> {
    let id = parse_agreement_id(&agreement_id)?;
    Ok(Json(state.store().get(id)?.into()))
}

/// GET /api/oracle/agreement/{agreement_id}/clause/{clause_id}
#[utoipa::path(
    get,
    path = "/api/oracle/agreement/{agreement_id}/clause/{clause_id}",
    params(
        ("agreement_id" = String, Path, description = "Agreement identifier"),
        ("clause_id" = String, Path, description = "Clause identifier"),
    ),
    responses(
        (status = 200, description = "The clause"),
        (status = 404, description = "Unknown agreement or clause"),
    ),
    tag = "oracle"
)]
async fn get_clause(
    State(state): State<AppState>,
    Path((agreement_id, clause_id)): Path<(String, String)>,
) -> Result<Json<Clause>, AppError> {
    let id = parse_agreement_id(&agreement_id)?;
    let clause_id = ClauseId::new(clause_id).map_err(AppError::from)?;
    Ok(Json(state.store().get_clause(id, &clause_id)?))
}

// ---------------------------------------------------------------------------
// Regulatory updates
// ---------------------------------------------------------------------------

/// Request body for regulatory update propagation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegulatoryUpdateRequest {
    /// Update identifier; generated when absent.
    pub update_id: Option<String>,
    /// Jurisdiction whose active agreements are affected.
    #[schema(value_type = String)]
    pub jurisdiction: JurisdictionId,
    /// `addition`, `modification`, or `removal`.
    #[schema(value_type = String)]
    pub update_type: UpdateType,
    /// Clause content for additions and modifications.
    #[schema(value_type = Option<Object>)]
    pub clause: Option<Clause>,
    /// Clause to deactivate for removals.
    #[schema(value_type = Option<String>)]
    pub clause_id: Option<ClauseId>,
    /// Operator-facing description of the change.
    pub description: Option<String>,
    /// When the change takes effect; defaults to now.
    pub effective_date: Option<DateTime<Utc>>,
}

/// Response body for regulatory update propagation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegulatoryUpdateResponse {
    /// Agreements that received a new version.
    pub affected_agreement_ids: Vec<String>,
}

/// POST /api/oracle/regulatory-update — propagate a regulatory change.
#[utoipa::path(
    post,
    path = "/api/oracle/regulatory-update",
    request_body = RegulatoryUpdateRequest,
    responses(
        (status = 200, description = "Update propagated", body = RegulatoryUpdateResponse),
        (status = 422, description = "Malformed update"),
    ),
    tag = "oracle"
)]
async fn regulatory_update(
    State(state): State<AppState>,
    Json(request): Json<RegulatoryUpdateRequest>,
) -> Result<Json<RegulatoryUpdateResponse>, AppError> {
    let update = RegulatoryUpdate {
        update_id: request
            .update_id
            .unwrap_or_else(|| format!("update_{}", uuid::Uuid::new_v4().simple())),
        jurisdiction: request.jurisdiction,
        update_type: request.update_type,
        clause: request.clause,
        clause_id: request.clause_id,
        description: request.description.unwrap_or_default(),
        effective_date: request.effective_date.unwrap_or_else(Utc::now),
    };
    let affected = state.propagator.apply(&update)?;

    // Administrative change: drop cached decisions.
    state.engine.clear_cache();

    Ok(Json(RegulatoryUpdateResponse {
        affected_agreement_ids: affected.iter().map(ToString::to_string).collect(),
    }))
}

/// Parse an agreement id path segment.
fn parse_agreement_id(raw: &str) -> Result<AgreementId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid agreement id: {raw}")))
}
