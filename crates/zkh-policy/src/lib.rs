//! # zkh-policy — Policy Decision Engine
//!
//! Location-aware, role-based policy validation with oracle clause
//! integration:
//!
//! - **Roles** ([`role`]): role registry with strength hierarchy and
//!   wildcard-capable (resource-type, action) capabilities.
//!
//! - **Rules** ([`rules`]): per-(jurisdiction, action) requirements —
//!   required roles, minimum strength, validator and audit obligations.
//!
//! - **Resolver** ([`resolver`]): validator registry mapping
//!   (action, location) to the governing regulatory authority. Ambiguity
//!   is rejected at registration time, so resolution is a pure lookup.
//!
//! - **Engine** ([`engine`]): combines the role check, jurisdiction
//!   rules, validator resolution, oracle clause evaluation, and
//!   cross-jurisdiction checking into a single [`Decision`]. Every
//!   failure path is fail-closed with a specific reason string.
//!
//! - **Cache** ([`cache`]): TTL-bounded decision cache for the hot path.
//!
//! - **Config** ([`config`]): JSON-loadable policy configuration with
//!   shipped defaults for the IN/CA/US/GB deployments.
//!
//! - **Proof** ([`proof`]): freshness validation for opaque
//!   gateway-supplied proof tokens.

pub mod cache;
pub mod config;
pub mod engine;
pub mod proof;
pub mod resolver;
pub mod role;
pub mod rules;

// Re-export primary types.
pub use cache::DecisionCache;
pub use config::{ConfigError, PolicyConfig};
pub use engine::{AuditRecord, Decision, OracleReference, PolicyEngine};
pub use proof::{verify_proof_freshness, ProofError, ProofToken};
pub use resolver::{NoValidatorError, Validator, ValidatorRegistry};
pub use role::{Capability, RoleConfig, RoleRegistry};
pub use rules::{ActionRule, JurisdictionRules, RuleSet};
