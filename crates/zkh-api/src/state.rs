//! # Application State
//!
//! Shared state handed to every handler: the policy engine (which owns
//! the agreement store and cross-jurisdiction checker) and the regulatory
//! update propagator.

use std::sync::Arc;

use zkh_oracle::{AgreementStore, CrossJurisdictionChecker, UpdatePropagator};
use zkh_policy::PolicyEngine;

/// Shared application state. Cheap to clone; all members are handles.
#[derive(Clone)]
pub struct AppState {
    /// The policy decision engine.
    pub engine: Arc<PolicyEngine>,
    /// The regulatory update propagator (administrative path).
    pub propagator: UpdatePropagator,
}

impl AppState {
    /// Build state around an engine, deriving the propagator from the
    /// engine's store.
    pub fn new(engine: Arc<PolicyEngine>) -> Self {
        let propagator = UpdatePropagator::new(Arc::clone(engine.store()));
        Self { engine, propagator }
    }

    /// The agreement store behind the engine.
    pub fn store(&self) -> &Arc<AgreementStore> {
        self.engine.store()
    }

    /// The cross-jurisdiction checker behind the engine.
    pub fn checker(&self) -> &Arc<CrossJurisdictionChecker> {
        self.engine.checker()
    }
}
