//! # OpenAPI Document
//!
//! Auto-generated OpenAPI 3 specification via utoipa derive macros,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error;
use crate::routes::{oracle, policy};
use crate::state::AppState;

/// The API specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ZK Health Policy API",
        description = "Cross-jurisdiction policy and oracle agreement validation for healthcare access control."
    ),
    paths(
        oracle::create_agreement,
        oracle::list_agreements,
        oracle::get_agreement,
        oracle::get_clause,
        oracle::regulatory_update,
        policy::validate,
        policy::validate_cross_jurisdiction,
    ),
    components(schemas(
        error::ErrorBody,
        error::ErrorDetail,
        oracle::CreateAgreementRequest,
        oracle::CreateAgreementResponse,
        oracle::AgreementSummary,
        oracle::ListAgreementsResponse,
        oracle::AgreementDetail,
        oracle::RegulatoryUpdateRequest,
        oracle::RegulatoryUpdateResponse,
        policy::ValidateRequest,
        policy::ValidateResponse,
        policy::CrossJurisdictionResult,
        policy::CrossJurisdictionRequest,
        policy::CrossJurisdictionResponse,
        policy::ConsultedAgreement,
    )),
    tags(
        (name = "oracle", description = "Agreement management and regulatory updates"),
        (name = "policy", description = "Policy validation")
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — return the generated specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
