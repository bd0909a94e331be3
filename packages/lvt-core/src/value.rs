//! The runtime value model the hydrator evaluates expressions against.
//!
//! Go's `text/template` leans on reflection over arbitrary structs; Rust has
//! no equivalent, so application state is serialized once per hydration
//! (via `serde_json::to_value`) and field/index lookups walk the resulting
//! [`Value`] tree. This keeps the evaluator a tagged-variant matcher with no
//! reflection in the hot path, per spec §9.
pub type Value = serde_json::Value;

/// Spec §4.1 truthiness rule: `false`, `0`, `nil`, and zero-length
/// strings/arrays/objects are falsy; everything else — including a present
/// but empty-seeming wrapper object — is truthy.
///
/// Note on the spec's "pointer to empty slice is truthy" tie-break: the JSON
/// value model has no pointer/reference distinction, so that tie-break does
/// not translate; `Value::Array(vec![])` is falsy here like any other empty
/// array; see DESIGN.md.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Go template `eq`: true if the first value equals any of the rest.
pub fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

/// Total order used by `lt`/`le`/`gt`/`ge`. Numbers compare numerically,
/// strings lexicographically; mixed types are never equal/ordered and
/// comparisons between them return `None`.
pub fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Renders a value as it would appear interpolated into HTML text, before
/// escaping.
pub fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// Field/index lookup on the current dot. Supports object-key and
/// array-index access, mirroring Go's unified `.Field`/index addressing.
pub fn field(v: &Value, name: &str) -> Option<Value> {
    match v {
        Value::Object(map) => map.get(name).cloned(),
        Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}

pub fn resolve_path(root: &Value, path: &[String]) -> Option<Value> {
    let mut cur = root.clone();
    for seg in path {
        cur = field(&cur, seg)?;
    }
    Some(cur)
}

pub fn html_escape(s: &str) -> String {
    html_escape::encode_safe(s).into_owned()
}
