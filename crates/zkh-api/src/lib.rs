//! # zkh-api — HTTP Surface for the ZK Health Policy Stack
//!
//! Axum application exposing the administrative and decision endpoints:
//!
//! | Method | Path                                              | Purpose                      |
//! |--------|---------------------------------------------------|------------------------------|
//! | POST   | `/api/oracle/agreement`                           | Create an agreement          |
//! | GET    | `/api/oracle/agreements`                          | List agreements              |
//! | GET    | `/api/oracle/agreement/{id}`                      | Fetch an agreement           |
//! | GET    | `/api/oracle/agreement/{id}/clause/{clause_id}`   | Fetch a clause               |
//! | POST   | `/api/oracle/regulatory-update`                   | Propagate a regulatory change|
//! | POST   | `/api/policy/validate`                            | Decide a request             |
//! | POST   | `/api/policy/validate/cross-jurisdiction`         | Standalone compliance check  |
//! | GET    | `/health`                                         | Liveness probe               |
//! | GET    | `/openapi.json`                                   | OpenAPI specification        |
//!
//! Identity is pre-verified by the upstream gateway; no endpoint performs
//! cryptographic proof verification.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::oracle::router())
        .merge(routes::policy::router())
        .merge(openapi::router())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — liveness probe.
async fn health() -> &'static str {
    "ok"
}
