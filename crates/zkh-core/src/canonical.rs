//! # Canonical Serialization
//!
//! Defines [`CanonicalBytes`], the sole construction path for bytes used in
//! digest computation across the stack.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct
//! `CanonicalBytes` is through [`CanonicalBytes::new()`], which serializes
//! with explicitly sorted object keys and compact separators. Every digest
//! in the workspace is therefore computed from the same byte encoding —
//! two agreements with identical clause content in identical order always
//! hash identically.
//!
//! ## Rules
//!
//! 1. Reject floats — clause thresholds and counts must be integers.
//! 2. Object keys sorted lexicographically. The sort happens here, in the
//!    serializer walk, so the encoding does not depend on which map type
//!    backs `serde_json::Value`.
//! 3. Compact separators, no whitespace.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical JSON serialization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value
    /// contains a float anywhere in its tree, or
    /// [`CanonicalizationError::SerializationFailed`] on a serde failure.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let mut out = Vec::new();
        write_canonical(&value, &mut out)?;
        Ok(Self(out))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialize a value with sorted object keys and compact separators.
fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) => {
            // A float threshold in clause content would make digests
            // dependent on formatting; reject outright.
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            out.extend_from_slice(&serde_json::to_vec(n)?);
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&str, &Value> =
                map.iter().map(|(k, v)| (k.as_str(), v)).collect();
            out.push(b'{');
            for (i, (key, inner)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(&serde_json::to_vec(key)?);
                out.push(b':');
                write_canonical(inner, out)?;
            }
            out.push(b'}');
        }
        Value::Array(arr) => {
            out.push(b'[');
            for (i, inner) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(inner, out)?;
            }
            out.push(b']');
        }
        other => out.extend_from_slice(&serde_json::to_vec(other)?),
    }
    Ok(())
}
