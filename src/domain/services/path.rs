//! Dotted-path access into nested JSON values.
//!
//! Both the projector and the flattener address nested values with paths such
//! as `employer.name`; this module is the single place that walks them.

use serde_json::{Map, Value};

pub const SEPARATOR: char = '.';

/// Resolve a dotted path against nested mappings.
///
/// Returns `None` when any segment is missing or an intermediate value is not
/// a mapping. Sequences are never indexed into.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    resolve_segments(value, path.split(SEPARATOR))
}

pub fn resolve_segments<'a, I, S>(value: &'a Value, segments: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .try_fold(value, |node, segment| node.as_object()?.get(segment.as_ref()))
}

pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, SEPARATOR, key)
    }
}

/// Collapse nested mappings into dotted keys.
///
/// Scalars, nulls and sequences are leaves; empty mappings contribute no keys.
/// A non-mapping input yields an empty map.
pub fn flatten_object(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(map) = value {
        flatten_into("", map, &mut out);
    }
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let key = join(prefix, key);
        match value {
            Value::Object(inner) => flatten_into(&key, inner, out),
            leaf => {
                out.insert(key, leaf.clone());
            }
        }
    }
}
