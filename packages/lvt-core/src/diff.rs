//! The differ (spec §4.5, C5): compares two hydrations of the same
//! compiled template and emits the minimal [`RenderPayload`].

use serde_json::{Map, Value as Json};

use crate::error::RangeInvariantError;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::planner::{self, PlanOutcome};
use crate::tree::{Dynamic, RangeWrapper, TreeNode};

/// An update ready to serialize onto the wire (spec §6 "Server → client
/// update").
#[derive(Debug, Clone)]
pub enum RenderPayload {
    /// Every node carries its `s` array — used for `renderInitial` and for
    /// the forced re-mount after a dropped delta (spec §5 "Backpressure").
    Full(TreeNode),
    /// Only the dynamic positions that changed; `s` omitted throughout
    /// (spec §4.5 step 3).
    Delta(Map<String, Json>),
    /// Fingerprints matched: nothing to send (spec §4.4, §8 "No-op
    /// idempotence").
    NoChange,
}

impl RenderPayload {
    /// The wire object for this payload, with the tree's fingerprint
    /// attached at the root (spec §3 "f: fingerprint digest (root only)").
    /// Both full and delta payloads carry `f`: §4.5 step 3 says the differ
    /// includes the new fingerprint even on a delta, which is the reading
    /// this implementation follows (see DESIGN.md).
    pub fn to_json(&self, new_fingerprint: Fingerprint) -> Json {
        match self {
            RenderPayload::Full(node) => {
                let mut obj = match node.to_full_json() {
                    Json::Object(m) => m,
                    other => {
                        let mut m = Map::new();
                        m.insert("value".to_string(), other);
                        m
                    }
                };
                obj.insert("f".to_string(), Json::Number(new_fingerprint.into()));
                Json::Object(obj)
            }
            RenderPayload::Delta(changes) => {
                let mut obj = changes.clone();
                obj.insert("f".to_string(), Json::Number(new_fingerprint.into()));
                Json::Object(obj)
            }
            RenderPayload::NoChange => Json::Object(Map::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderPayload::NoChange)
    }
}

/// Compares two hydrations of the *same compiled template* (spec §4.5).
/// Both trees' `s` arrays are equal at every node by construction, so the
/// walk only ever compares dynamic positions.
pub fn diff(old: &TreeNode, new: &TreeNode) -> Result<RenderPayload, RangeInvariantError> {
    if fingerprint(old) == fingerprint(new) {
        return Ok(RenderPayload::NoChange);
    }
    let mut changes = Map::new();
    for (i, (od, nd)) in old.dynamics.iter().zip(new.dynamics.iter()).enumerate() {
        if let Some(v) = diff_dynamic(od, nd)? {
            changes.insert(i.to_string(), v);
        }
    }
    Ok(RenderPayload::Delta(changes))
}

/// Shared by the top-level tree diff and the range-op planner's per-item
/// field diff (spec §4.6 `u` op `changes`): a plain string or nested node
/// is compared by equality and sent in full when different (spec §4.5 step
/// 2 — no recursive structural diffing below one dynamic position); a range
/// wrapper is handed to the planner (C6).
pub(crate) fn diff_dynamic(old: &Dynamic, new: &Dynamic) -> Result<Option<Json>, RangeInvariantError> {
    if old == new {
        return Ok(None);
    }
    match new {
        Dynamic::Leaf(s) => Ok(Some(Json::String(s.clone()))),
        Dynamic::Node(n) => Ok(Some(n.to_full_json())),
        Dynamic::Range(new_r) => match old {
            Dynamic::Range(old_r) => Ok(Some(diff_range(old_r, new_r)?)),
            // The compiled structure guarantees the same position is always
            // a range once it ever is; this arm only guards against a
            // hand-built tree violating that invariant.
            _ => Ok(Some(new_r.to_full_json())),
        },
    }
}

fn diff_range(old: &RangeWrapper, new: &RangeWrapper) -> Result<Json, RangeInvariantError> {
    match planner::plan(old, new)? {
        PlanOutcome::NoChange => Ok(Json::Array(vec![])),
        PlanOutcome::Ops(ops) => Ok(Json::Array(ops)),
        PlanOutcome::FullReplace => Ok(new.to_full_json()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funcs::FuncMap;
    use crate::hydrator::hydrate_value;
    use crate::keygen::KeyRegistry;
    use serde_json::Value;

    fn hydrate_str(src: &str, data: Value, keys: &mut KeyRegistry) -> TreeNode {
        let tpl = lvt_template::compile(src, &[]).unwrap();
        let funcs = FuncMap::new();
        hydrate_value(&tpl, data, keys, &funcs).unwrap()
    }

    #[test]
    fn counter_update_sends_only_changed_position() {
        let mut keys = KeyRegistry::new();
        let old = hydrate_str("<p>count: {{.n}}</p>", serde_json::json!({"n": 0}), &mut keys);
        let new = hydrate_str("<p>count: {{.n}}</p>", serde_json::json!({"n": 1}), &mut keys);
        let payload = diff(&old, &new).unwrap();
        match payload {
            RenderPayload::Delta(changes) => {
                assert_eq!(changes.len(), 1);
                assert_eq!(changes["0"], Json::String("1".to_string()));
            }
            _ => panic!("expected a delta"),
        }
    }

    #[test]
    fn no_op_idempotence() {
        let mut keys = KeyRegistry::new();
        let t1 = hydrate_str("<p>{{.n}}</p>", serde_json::json!({"n": 1}), &mut keys);
        let t2 = hydrate_str("<p>{{.n}}</p>", serde_json::json!({"n": 1}), &mut keys);
        assert!(diff(&t1, &t2).unwrap().is_empty());
    }

    #[test]
    fn keyed_append_produces_an_append_op() {
        let mut keys = KeyRegistry::new();
        let src = r#"<ul>{{range .items}}<li id="{{.id}}">{{.name}}</li>{{end}}</ul>"#;
        let old = hydrate_str(src, serde_json::json!({"items": [{"id": "a", "name": "A"}]}), &mut keys);
        let new = hydrate_str(
            src,
            serde_json::json!({"items": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}]}),
            &mut keys,
        );
        let payload = diff(&old, &new).unwrap();
        match payload {
            RenderPayload::Delta(changes) => {
                let ops = changes["0"].as_array().unwrap();
                assert_eq!(ops.len(), 1);
                assert_eq!(ops[0][0], Json::String("a".to_string()));
            }
            _ => panic!("expected a delta"),
        }
    }
}
