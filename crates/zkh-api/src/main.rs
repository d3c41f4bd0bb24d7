//! # zkh-api binary
//!
//! Boots the policy stack: loads the policy configuration (from
//! `ZKH_POLICY_CONFIG` when set, shipped defaults otherwise), seeds the
//! agreement store with the framework templates, and serves the HTTP API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use zkh_api::{app, AppState};
use zkh_core::JurisdictionId;
use zkh_oracle::{templates, AgreementStore, CrossJurisdictionChecker};
use zkh_policy::PolicyConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("ZKH_POLICY_CONFIG") {
        Ok(path) => {
            tracing::info!(path = %path, "loading policy configuration");
            PolicyConfig::from_json_file(&path)?
        }
        Err(_) => PolicyConfig::default(),
    };

    let store = Arc::new(AgreementStore::new());
    let checker = Arc::new(CrossJurisdictionChecker::new(Arc::clone(&store)));
    seed_framework_agreements(&store, &checker)?;

    let engine = Arc::new(config.build_engine(Arc::clone(&store), Arc::clone(&checker))?);
    let state = AppState::new(engine);

    let addr = std::env::var("ZKH_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "zkh-api listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Seed the store with the shipped framework agreements and register the
/// telemedicine agreement for the default corridor pairs.
fn seed_framework_agreements(
    store: &Arc<AgreementStore>,
    checker: &Arc<CrossJurisdictionChecker>,
) -> Result<(), Box<dyn std::error::Error>> {
    store.create(
        "HIPAA Compliance",
        "US Protected Health Information access rules",
        JurisdictionId::new("US-HIPAA")?,
        templates::hipaa(),
    )?;
    store.create(
        "GDPR Compliance",
        "EU lawful processing and data subject rights",
        JurisdictionId::new("EU-GDPR")?,
        templates::gdpr(),
    )?;
    let (telemedicine_id, _) = store.create(
        "Cross-Border Telemedicine",
        "Remote practice and cross-border transfer rules",
        JurisdictionId::new("MULTI")?,
        templates::telemedicine(),
    )?;

    for (a, b) in [("US", "CA"), ("US", "GB"), ("GB", "IN")] {
        checker.register_pair(
            &JurisdictionId::new(a)?,
            &JurisdictionId::new(b)?,
            telemedicine_id,
        );
    }
    Ok(())
}
