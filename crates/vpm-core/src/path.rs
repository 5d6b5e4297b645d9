//! # Claim Path Resolution
//!
//! Claim subjects are nested JSON trees of arbitrary shape. A claim is
//! addressed by a dotted path such as `contact.email.username`; array
//! elements are addressed by their decimal index (`document.names.0`).
//!
//! Search criteria are partial JSON objects. A criteria object matches a
//! candidate when every leaf of the criteria, addressed by its full path,
//! is present in the candidate with an equal value. Nested criteria
//! (e.g. `{"credentialRef": {"uid": "..."}}`) therefore compare by value at
//! every depth, never by identity.

use serde_json::Value;

/// Resolve a dotted path inside a claim tree.
///
/// Returns `None` as soon as a segment is absent, indexes past the end of an
/// array, or descends into a scalar.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Flatten a value into `(path, leaf)` pairs.
///
/// Scalars, empty objects and empty arrays are leaves. A scalar root yields
/// a single pair with an empty path. Object keys are visited in insertion
/// order.
pub fn flatten_leaf_paths(value: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    collect_leaves(value, String::new(), &mut out);
    out
}

fn collect_leaves<'a>(value: &'a Value, prefix: String, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(child, join_path(&prefix, key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                collect_leaves(child, join_path(&prefix, &i.to_string()), out);
            }
        }
        _ => out.push((prefix, value)),
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Check whether `candidate` satisfies every leaf of `criteria`.
///
/// Empty objects in `criteria`, at the root or nested, constrain nothing,
/// so `{}` and `{"credentialRef": {}}` match everything.
pub fn matches_criteria(candidate: &Value, criteria: &Value) -> bool {
    flatten_leaf_paths(criteria)
        .into_iter()
        .filter(|(_, expected)| !expected.as_object().is_some_and(|m| m.is_empty()))
        .all(|(path, expected)| {
            let actual = if path.is_empty() {
                Some(candidate)
            } else {
                resolve_path(candidate, &path)
            };
            actual == Some(expected)
        })
}
