//! Scope and rules fingerprints.
//!
//! `scope_hash` binds an estimate/preview to the exact set of products it
//! was computed over: a SHA-256 over the sorted eligible product ids. Any
//! membership change (an item fixed by hand, a new product synced in)
//! produces a different hash and invalidates the binding.
//!
//! `rules_hash` is the independent fingerprint of the playbook's rule
//! parameters. The two are never merged: apply validates the conjunction so
//! a rules change can never masquerade as a scope match (or vice versa).

use sha2::{Digest, Sha256};

use crate::types::DbId;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute the scope hash over a set of product ids.
///
/// Order-independent: ids are sorted ascending before hashing, so the same
/// membership always yields the same hash regardless of query order. The
/// empty scope has a well-defined hash (of the empty string).
pub fn scope_hash(product_ids: &[DbId]) -> String {
    let mut ids = product_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(":");
    sha256_hex(joined.as_bytes())
}

/// Compute the rules hash over a playbook's parameter object.
pub fn rules_hash(params: &serde_json::Value) -> String {
    sha256_hex(canonical_json(params).as_bytes())
}

/// Serialize a JSON value canonically: object keys sorted, no whitespace.
/// `serde_json::Map` preserves insertion order, so two semantically equal
/// objects can print differently without this.
fn canonical_json(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_default(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            let inner: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonical_json(v)
                    )
                })
                .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}
