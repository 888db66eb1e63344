//! Lookups into user records as they come back from the record store.
//!
//! Records are loosely shaped JSON: donors keep their details under
//! `donorDetails`, recipients under `recipientDetails`, and newer records
//! under a plain `details` object.

use serde_json::Value;

/// Prefixes searched, in order, when a field may live at the top level or
/// inside one of the details objects.
pub(crate) const DETAIL_PREFIXES: [&[&str]; 4] = [
    &[],
    &["details"],
    &["donorDetails"],
    &["recipientDetails"],
];

/// Walk `path` through nested objects.
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(key))
}

/// Find `field` at the top level or inside any details object, first match
/// wins. Null values are treated as absent.
pub(crate) fn find_detail<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    DETAIL_PREFIXES.iter().find_map(|prefix| {
        lookup(record, prefix)
            .and_then(|node| node.get(field))
            .filter(|v| !v.is_null())
    })
}

/// A string-ish field: strings as-is, numbers rendered (record ids are
/// sometimes numeric).
pub(crate) fn find_detail_string(record: &Value, field: &str) -> Option<String> {
    match find_detail(record, field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
