//! # Decision Cache
//!
//! TTL-bounded cache for base policy decisions on the hot path, keyed by
//! (actor, action, location, resource).
//!
//! Only decisions with no oracle clause set and no cross-jurisdiction
//! scenario are cached — clause evaluations can be invalidated by
//! regulatory updates, and caching them would let a superseded agreement
//! keep deciding requests. Administrative rule changes call
//! [`DecisionCache::clear`].

use std::time::{Duration, Instant};

use dashmap::DashMap;

use zkh_core::{Context, ValidatorId};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached base decision.
#[derive(Debug, Clone)]
pub struct CachedDecision {
    /// Whether the request was allowed.
    pub allowed: bool,
    /// The reason recorded on the original decision.
    pub reason: String,
    /// The validator selected by the original decision.
    pub validator_id: Option<ValidatorId>,
}

#[derive(Debug, Clone)]
struct Entry {
    decision: CachedDecision,
    cached_at: Instant,
}

/// Concurrent TTL cache for base policy decisions.
#[derive(Debug)]
pub struct DecisionCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl DecisionCache {
    /// Create a cache with the given entry lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The cache key for a request context.
    pub fn key(ctx: &Context) -> String {
        format!(
            "{}:{}:{}:{}",
            ctx.actor_id, ctx.action, ctx.location, ctx.resource_id
        )
    }

    /// Fetch a live cached decision; expired entries are evicted on read.
    pub fn get(&self, key: &str) -> Option<CachedDecision> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => {
                return Some(entry.decision.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a decision.
    pub fn insert(&self, key: String, decision: CachedDecision) {
        self.entries.insert(
            key,
            Entry {
                decision,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop every entry. Called after administrative rule changes.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of live-or-expired entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkh_core::JurisdictionId;

    fn ctx() -> Context {
        Context::new(
            "req-1",
            "doctor-1",
            "specialist",
            "diagnose",
            JurisdictionId::new("US").unwrap(),
            "record-1",
            "medical_record",
            "patient-1",
        )
    }

    fn decision(allowed: bool) -> CachedDecision {
        CachedDecision {
            allowed,
            reason: "action allowed".to_string(),
            validator_id: None,
        }
    }

    #[test]
    fn key_includes_actor_action_location_resource() {
        assert_eq!(DecisionCache::key(&ctx()), "doctor-1:diagnose:US:record-1");
    }

    #[test]
    fn hit_within_ttl() {
        let cache = DecisionCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), decision(true));
        let hit = cache.get("k").unwrap();
        assert!(hit.allowed);
    }

    #[test]
    fn miss_after_expiry() {
        let cache = DecisionCache::new(Duration::from_millis(1));
        cache.insert("k".to_string(), decision(true));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty(), "expired entry evicted on read");
    }

    #[test]
    fn clear_drops_everything() {
        let cache = DecisionCache::default();
        cache.insert("a".to_string(), decision(true));
        cache.insert("b".to_string(), decision(false));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn denials_are_cacheable_too() {
        let cache = DecisionCache::default();
        cache.insert("k".to_string(), decision(false));
        assert!(!cache.get("k").unwrap().allowed);
    }
}
