//! # Precondition Evaluator
//!
//! Pure clause evaluation: a clause is valid iff every precondition holds
//! against the request context (logical AND, no partial credit).
//!
//! ## Fail-Closed
//!
//! A precondition whose context fact is missing, or whose fact has the
//! wrong type, fails. Missing information must never grant access.
//!
//! ## Emergency Override
//!
//! A clause declaring `emergency_override: true` is short-circuited to
//! valid when the context is flagged as an emergency. The override is
//! always recorded in the evaluation notes for audit, and is scoped to
//! the single clause declaring it — it is not a global bypass.
//!
//! ## Side Effects
//!
//! The evaluator applies nothing. Execute directives are reported in the
//! result for the external audit sink, only when the clause is valid.

use std::collections::BTreeMap;

use zkh_core::{
    Clause, ClauseId, Context, Fact, Precondition, EMERGENCY_OVERRIDE_KEY, NUMERIC_PREFIX,
};

/// The outcome of evaluating one clause against one context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClauseEvaluation {
    /// The clause that was evaluated.
    pub clause_id: ClauseId,
    /// Whether every precondition held.
    pub valid: bool,
    /// Audit notes: override applications and per-precondition failures.
    pub notes: Vec<String>,
    /// Execute directives to hand to the audit sink. Populated only when
    /// the clause is valid.
    pub directives: BTreeMap<String, serde_json::Value>,
}

/// Evaluate a clause against a request context.
pub fn evaluate_clause(clause: &Clause, ctx: &Context) -> ClauseEvaluation {
    let mut notes = Vec::new();

    // Inactive clauses (deactivated by a regulatory removal) never
    // validate for new decisions.
    if !clause.active {
        notes.push(format!("clause '{}' is inactive", clause.clause_id));
        return ClauseEvaluation {
            clause_id: clause.clause_id.clone(),
            valid: false,
            notes,
            directives: BTreeMap::new(),
        };
    }

    // Emergency override short-circuits the remaining preconditions of
    // this clause only. Recorded in notes for audit.
    if clause.has_emergency_override() && ctx.emergency {
        notes.push("emergency override applied".to_string());
        return ClauseEvaluation {
            clause_id: clause.clause_id.clone(),
            valid: true,
            notes,
            directives: clause.execute.clone(),
        };
    }

    let mut valid = true;
    for (name, precondition) in &clause.preconditions {
        if let Err(failure) = evaluate_precondition(name, precondition, ctx) {
            valid = false;
            notes.push(failure);
            // No early abort: every failing precondition is noted so the
            // audit trail is complete.
        }
    }

    let directives = if valid {
        clause.execute.clone()
    } else {
        BTreeMap::new()
    };

    ClauseEvaluation {
        clause_id: clause.clause_id.clone(),
        valid,
        notes,
        directives,
    }
}

/// Evaluate one named precondition. `Err` carries the audit note.
fn evaluate_precondition(
    name: &str,
    precondition: &Precondition,
    ctx: &Context,
) -> Result<(), String> {
    // `emergency_override: false` demands an explicit non-emergency.
    // (`emergency_override: true` outside an actual emergency is an
    // ordinary flag check against the context's emergency state.)
    if name == EMERGENCY_OVERRIDE_KEY {
        return match precondition {
            Precondition::Flag(expected) => {
                if ctx.emergency == *expected {
                    Ok(())
                } else {
                    Err(format!(
                        "precondition '{name}' failed: context emergency flag is {}",
                        ctx.emergency
                    ))
                }
            }
            _ => Err(format!(
                "precondition '{name}' failed: emergency_override must be a boolean"
            )),
        };
    }

    match precondition {
        Precondition::Flag(expected) => match ctx.fact(name) {
            Some(Fact::Bool(actual)) if actual == *expected => Ok(()),
            Some(Fact::Bool(actual)) => Err(format!(
                "precondition '{name}' failed: expected {expected}, context has {actual}"
            )),
            Some(_) => Err(format!(
                "precondition '{name}' failed: context fact is not a boolean"
            )),
            None => Err(format!(
                "precondition '{name}' failed: context fact missing"
            )),
        },
        Precondition::Threshold(minimum) => {
            // `minimum_age: 18` reads the context fact `age`.
            let fact_name = name.strip_prefix(NUMERIC_PREFIX).unwrap_or(name);
            match ctx.fact(fact_name) {
                Some(Fact::Number(actual)) if actual >= *minimum => Ok(()),
                Some(Fact::Number(actual)) => Err(format!(
                    "precondition '{name}' failed: {actual} below minimum {minimum}"
                )),
                Some(_) => Err(format!(
                    "precondition '{name}' failed: context fact '{fact_name}' is not numeric"
                )),
                None => Err(format!(
                    "precondition '{name}' failed: context fact '{fact_name}' missing"
                )),
            }
        }
        Precondition::Membership(allowed) => match ctx.fact(name) {
            Some(Fact::Text(actual)) if allowed.contains(&actual) => Ok(()),
            Some(Fact::Text(actual)) => Err(format!(
                "precondition '{name}' failed: '{actual}' not in allowed set"
            )),
            Some(_) => Err(format!(
                "precondition '{name}' failed: context fact is not text"
            )),
            None => Err(format!(
                "precondition '{name}' failed: context fact missing"
            )),
        },
    }
}
