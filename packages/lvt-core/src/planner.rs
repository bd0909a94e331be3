//! The range-op planner (spec §4.6, C6): turns an old/new keyed item
//! sequence into the minimal [range op](crate::diff) sequence, or signals a
//! full replace when the edit is too fragmented to express compactly.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Value as Json};

use crate::diff::diff_dynamic;
use crate::error::RangeInvariantError;
use crate::tree::{RangeItem, RangeWrapper};

/// Maximum number of distinct insertion anchors before falling back to a
/// full replace of the range (spec §4.6 "Fragmented").
const MAX_INSERT_ANCHORS: usize = 3;

pub enum PlanOutcome {
    /// Nothing to do — the caller should omit this position entirely.
    NoChange,
    Ops(Vec<Json>),
    /// Too fragmented to express as ops; caller sends the full new range
    /// wrapper at this position instead (spec §4.6 "Fragmented").
    FullReplace,
}

pub fn plan(old: &RangeWrapper, new: &RangeWrapper) -> Result<PlanOutcome, RangeInvariantError> {
    check_unique(old, "old")?;
    check_unique(new, "new")?;

    let old_keys: Vec<&str> = old.items.iter().map(|i| i.key.as_str()).collect();
    let new_keys: Vec<&str> = new.items.iter().map(|i| i.key.as_str()).collect();
    let old_set: FxHashSet<&str> = old_keys.iter().copied().collect();
    let new_set: FxHashSet<&str> = new_keys.iter().copied().collect();

    if old_set == new_set {
        return plan_same_key_set(old, new, &old_keys, &new_keys);
    }

    plan_general(old, new, &old_set)
}

/// Same items present in both renders: at most a reorder plus per-item
/// field updates — never a remove/insert (spec §4.6 step 2; the combined
/// reorder+update case is this implementation's resolution of the open
/// question left implicit by the spec, see DESIGN.md).
fn plan_same_key_set(
    old: &RangeWrapper,
    new: &RangeWrapper,
    old_keys: &[&str],
    new_keys: &[&str],
) -> Result<PlanOutcome, RangeInvariantError> {
    let old_by_key: FxHashMap<&str, &RangeItem> = old.items.iter().map(|i| (i.key.as_str(), i)).collect();
    let new_by_key: FxHashMap<&str, &RangeItem> = new.items.iter().map(|i| (i.key.as_str(), i)).collect();

    let mut ops = Vec::new();
    if old_keys != new_keys {
        ops.push(json!(["o", new_keys]));
    }

    let mut sorted_keys: Vec<&str> = new_keys.to_vec();
    sorted_keys.sort_unstable();
    for key in sorted_keys {
        let oi = old_by_key[key];
        let ni = new_by_key[key];
        if oi.dynamics != ni.dynamics {
            let mut changes = serde_json::Map::new();
            for (idx, (od, nd)) in oi.dynamics.iter().zip(ni.dynamics.iter()).enumerate() {
                if let Some(v) = diff_dynamic(od, nd)? {
                    changes.insert(idx.to_string(), v);
                }
            }
            ops.push(json!(["u", key, Json::Object(changes)]));
        }
    }

    if ops.is_empty() { Ok(PlanOutcome::NoChange) } else { Ok(PlanOutcome::Ops(ops)) }
}

/// Key sets differ: removes, then matched-item updates, then an insertion
/// plan chosen by pattern (spec §4.6 step 3).
fn plan_general(
    old: &RangeWrapper,
    new: &RangeWrapper,
    old_set: &FxHashSet<&str>,
) -> Result<PlanOutcome, RangeInvariantError> {
    let new_set: FxHashSet<&str> = new.items.iter().map(|i| i.key.as_str()).collect();
    let old_by_key: FxHashMap<&str, &RangeItem> = old.items.iter().map(|i| (i.key.as_str(), i)).collect();
    let new_by_key: FxHashMap<&str, &RangeItem> = new.items.iter().map(|i| (i.key.as_str(), i)).collect();

    let mut ops = Vec::new();

    let mut removed: Vec<&str> = old.items.iter().map(|i| i.key.as_str()).filter(|k| !new_set.contains(k)).collect();
    removed.sort_unstable();
    for key in removed {
        ops.push(json!(["r", key]));
    }

    let mut matched: Vec<&str> = new.items.iter().map(|i| i.key.as_str()).filter(|k| old_set.contains(k)).collect();
    matched.sort_unstable();
    for key in matched {
        let oi = old_by_key[key];
        let ni = new_by_key[key];
        if oi.dynamics != ni.dynamics {
            let mut changes = serde_json::Map::new();
            for (idx, (od, nd)) in oi.dynamics.iter().zip(ni.dynamics.iter()).enumerate() {
                if let Some(v) = diff_dynamic(od, nd)? {
                    changes.insert(idx.to_string(), v);
                }
            }
            ops.push(json!(["u", key, Json::Object(changes)]));
        }
    }

    let added: Vec<usize> =
        new.items.iter().enumerate().filter(|(_, it)| !old_set.contains(it.key.as_str())).map(|(i, _)| i).collect();
    if added.is_empty() {
        return Ok(if ops.is_empty() { PlanOutcome::NoChange } else { PlanOutcome::Ops(ops) });
    }

    let n = new.items.len();
    let first = added[0];
    let is_tail_contiguous = added.iter().enumerate().all(|(off, &idx)| idx == first + off) && first + added.len() == n;
    if is_tail_contiguous {
        let items: Vec<Json> = added.iter().map(|&i| new.items[i].to_full_json()).collect();
        ops.push(json!(["a", items]));
        return Ok(PlanOutcome::Ops(ops));
    }

    let is_contiguous = added.windows(2).all(|w| w[1] == w[0] + 1);
    if is_contiguous {
        let anchor: Option<&str> = if first == 0 { None } else { Some(new.items[first - 1].key.as_str()) };
        let position = if first == 0 { "start" } else { "after" };
        let items: Vec<Json> = added.iter().map(|&i| new.items[i].to_full_json()).collect();
        ops.push(json!(["i", anchor, position, items]));
        return Ok(PlanOutcome::Ops(ops));
    }

    let mut anchors: Vec<Option<&str>> = Vec::new();
    for &idx in &added {
        let anchor = if idx == 0 { None } else { Some(new.items[idx - 1].key.as_str()) };
        if !anchors.contains(&anchor) {
            anchors.push(anchor);
        }
    }
    if anchors.len() > MAX_INSERT_ANCHORS {
        return Ok(PlanOutcome::FullReplace);
    }

    for &idx in &added {
        let item = new.items[idx].to_full_json();
        if idx == 0 {
            ops.push(json!(["i", Json::Null, "start", item]));
        } else {
            let anchor = new.items[idx - 1].key.as_str();
            ops.push(json!(["i", anchor, "after", item]));
        }
    }
    Ok(PlanOutcome::Ops(ops))
}

fn check_unique(wrapper: &RangeWrapper, which: &'static str) -> Result<(), RangeInvariantError> {
    let mut seen = FxHashSet::default();
    for item in &wrapper.items {
        if !seen.insert(item.key.as_str()) {
            return Err(RangeInvariantError {
                range_path: which.to_string(),
                reason: format!("duplicate key `{}` in {which} item list", item.key),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Dynamic;

    fn item(key: &str, text: &str) -> RangeItem {
        RangeItem { key: key.to_string(), dynamics: vec![Dynamic::Leaf(text.to_string())] }
    }

    fn wrapper(items: Vec<RangeItem>) -> RangeWrapper {
        RangeWrapper { item_statics: vec!["<li>".into(), "</li>".into()], items }
    }

    #[test]
    fn tail_append_is_one_op() {
        let old = wrapper(vec![item("a", "A")]);
        let new = wrapper(vec![item("a", "A"), item("b", "B")]);
        match plan(&old, &new).unwrap() {
            PlanOutcome::Ops(ops) => assert_eq!(ops.len(), 1),
            _ => panic!("expected ops"),
        }
    }

    #[test]
    fn pure_reorder_is_one_op() {
        let old = wrapper(vec![item("a", "A"), item("b", "B"), item("c", "C")]);
        let new = wrapper(vec![item("c", "C"), item("a", "A"), item("b", "B")]);
        match plan(&old, &new).unwrap() {
            PlanOutcome::Ops(ops) => {
                assert_eq!(ops.len(), 1);
                assert_eq!(ops[0], json!(["o", ["c", "a", "b"]]));
            }
            _ => panic!("expected ops"),
        }
    }

    #[test]
    fn mixed_remove_update_insert() {
        let old = wrapper(vec![item("a", "A"), item("b", "B"), item("c", "C")]);
        let new = wrapper(vec![item("a", "A"), item("c", "C2"), item("d", "D")]);
        match plan(&old, &new).unwrap() {
            PlanOutcome::Ops(ops) => {
                assert_eq!(ops[0], json!(["r", "b"]));
                assert_eq!(ops[1][0], json!("u"));
                assert_eq!(ops[1][1], json!("c"));
                assert_eq!(ops[2][0], json!("i"));
                assert_eq!(ops[2][1], json!("c"));
                assert_eq!(ops[2][2], json!("after"));
            }
            _ => panic!("expected ops"),
        }
    }

    #[test]
    fn fragmented_insert_falls_back_to_full_replace() {
        let old = wrapper(vec![item("a", "A")]);
        let new = wrapper(vec![
            item("w", "W"),
            item("a", "A"),
            item("x", "X"),
            item("y", "Y"),
            item("z", "Z"),
        ]);
        assert!(matches!(plan(&old, &new).unwrap(), PlanOutcome::FullReplace));
    }

    #[test]
    fn duplicate_key_is_an_invariant_error() {
        let old = wrapper(vec![item("a", "A")]);
        let new = wrapper(vec![item("a", "A"), item("a", "A2")]);
        assert!(plan(&old, &new).is_err());
    }
}
