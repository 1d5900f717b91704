//! Canonicalization and content hashing of a [`RuleSet`] (§4.4).
//!
//! Canonicalization only matters where map key order can legitimately vary
//! between two semantically identical documents — which, once a `RuleSet`
//! is parsed into its typed fields, is exactly the open `actions` payloads
//! (`serde_json::Value` objects carried through verbatim).

use serde_json::Value as Json;
use sha2::{Digest, Sha256};

use super::model::RuleSet;

/// Recursively sort every object's keys by byte-lexicographic order and
/// render the result as the most compact textual form; array order is
/// preserved.
fn canonical_string(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => serde_json::to_string(s).expect("string always serializes"),
        Json::Array(items) => {
            let parts: Vec<String> = items.iter().map(canonical_string).collect();
            format!("[{}]", parts.join(","))
        }
        Json::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).expect("string always serializes"),
                        canonical_string(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

/// Compute the `rule_hash`: lowercase SHA-256 hex over the canonicalized
/// UTF-8 bytes of `ruleset`.
pub fn canonical_hash(ruleset: &RuleSet) -> String {
    let value = serde_json::to_value(ruleset).expect("RuleSet always serializes to JSON");
    let text = canonical_string(&value);
    let digest = Sha256::digest(text.as_bytes());
    format!("{digest:x}")
}
