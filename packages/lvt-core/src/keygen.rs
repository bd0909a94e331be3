//! The range key generator (spec §4.2, C2).
//!
//! Keys identify range items across renders so the differ (C5) and range-op
//! planner (C6) can tell "this row moved" from "this row was replaced".
//! Priority is attribute-derived keys first (`data-lvt-key`, `data-key`,
//! `key`, `id`, in that order — spec §3); when none of those attributes
//! appear in the item's static markup, a per-range counter synthesizes a
//! fresh, stable key, seeded from the previous render's registry so the same
//! list re-rendered with no identity change keeps its old keys (spec §4.2
//! step 3 and invariant K3).

use rustc_hash::FxHashMap;
use slab::Slab;

use crate::error::DuplicateKeyError;
use crate::value::Value;

/// Attribute names recognized as a key source, in priority order (spec §3).
pub const KEY_ATTRS: &[&str] = &["data-lvt-key", "data-key", "key", "id"];

/// Scans compiled item statics for a key attribute and returns the dynamic
/// index immediately following it (the position whose evaluated value
/// supplies the key), per spec §3 "the item's key value is stored at a known
/// positional index determined by scanning the item statics". `KEY_ATTRS`'s
/// order is a name priority, not a markup-position priority: every position
/// is scanned for `data-lvt-key` before any position is considered for
/// `data-key`, and so on, so an item carrying more than one recognized
/// attribute always resolves to the highest-priority name regardless of
/// where in the markup it appears.
///
/// Returns `None` when no recognized attribute is present; the caller then
/// falls back to position 0 / synthesized keys per §4.2.
pub fn find_key_position(item_statics: &[String]) -> Option<usize> {
    for attr in KEY_ATTRS {
        let needle_dq = format!("{attr}=\"");
        let needle_sq = format!("{attr}='");
        for (i, s) in item_statics.iter().enumerate() {
            // A static segment ending in `attr="` (or `attr='`) immediately
            // precedes the dynamic slot that fills the attribute value.
            if s.ends_with(&needle_dq) || s.ends_with(&needle_sq) {
                return Some(i);
            }
        }
    }
    None
}

/// Per-range registry of previously-seen keys, keyed by the range construct's
/// compile-time `id` (spec §3 "Range" / §4.2 "registry state"). Owned by the
/// session renderer (C7) and threaded through each hydration (spec §3
/// "Ownership").
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    per_range: FxHashMap<usize, RangeKeys>,
}

#[derive(Debug, Default, Clone)]
struct RangeKeys {
    /// Synthesized keys previously handed out, slotted by the item position
    /// they were assigned to (spec §9 "classic case for an arena plus
    /// integer indices") — a stable re-render's Nth keyless item reuses
    /// slot N's key (K3).
    synthesized: Slab<String>,
    next_synthetic: u64,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulates synthesized-key state for `range_id` from a prior
    /// render's key sequence (spec §4.7 `loadKeyMappings`), so that
    /// re-hydrating the same data in the same order reuses identical keys.
    pub fn seed(&mut self, range_id: usize, prior_keys: Vec<String>) {
        let entry = self.per_range.entry(range_id).or_default();
        entry.next_synthetic = prior_keys.len() as u64;
        entry.synthesized = Slab::with_capacity(prior_keys.len());
        for key in prior_keys {
            entry.synthesized.insert(key);
        }
    }

    /// Begins a new hydration pass for `range_id`: keys synthesized so far
    /// are retained as the seed, but the per-item cursor restarts so this
    /// render's Nth item (if it again has no attribute key) gets the Nth
    /// remembered synthetic key, not a freshly incremented one.
    pub fn begin_range(&mut self, range_id: usize) -> RangeKeyCursor<'_> {
        let entry = self.per_range.entry(range_id).or_default();
        RangeKeyCursor { entry, cursor: 0, seen: Default::default() }
    }
}

/// Hands out keys for the items of one range, in iteration order, tracking
/// within-render uniqueness (spec invariant K1).
pub struct RangeKeyCursor<'a> {
    entry: &'a mut RangeKeys,
    cursor: usize,
    seen: rustc_hash::FxHashSet<String>,
}

impl<'a> RangeKeyCursor<'a> {
    /// Produces the key for the next item. `attr_value` is the already
    /// stringified value at the attribute position (if one was found by
    /// [`find_key_position`]); `range_path` is a human-readable label used in
    /// the error.
    pub fn next_key(
        &mut self,
        attr_value: Option<&Value>,
        range_path: &str,
    ) -> Result<String, DuplicateKeyError> {
        let key = match attr_value.map(crate::value::stringify).filter(|s| !s.is_empty()) {
            Some(k) => k,
            None => {
                let key = if let Some(existing) = self.entry.synthesized.get(self.cursor) {
                    existing.clone()
                } else {
                    let k = format!("__lvt_{}", self.entry.next_synthetic);
                    self.entry.next_synthetic += 1;
                    self.entry.synthesized.insert(k.clone());
                    k
                };
                self.cursor += 1;
                key
            }
        };
        if !self.seen.insert(key.clone()) {
            return Err(DuplicateKeyError { key, range_path: range_path.to_string() });
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_key_attribute_position() {
        let statics = vec!["<li id=\"".to_string(), "\">".to_string(), "</li>".to_string()];
        assert_eq!(find_key_position(&statics), Some(0));
    }

    #[test]
    fn key_priority_prefers_lvt_key() {
        let statics = vec![
            "<li data-key=\"".to_string(),
            "\" data-lvt-key=\"".to_string(),
            "\">".to_string(),
        ];
        // data-lvt-key appears later in the markup but still wins: the scan
        // is by attribute name priority, not by markup position.
        assert_eq!(find_key_position(&statics), Some(1));
    }

    #[test]
    fn no_key_attribute_returns_none() {
        let statics = vec!["<li>".to_string(), "</li>".to_string()];
        assert_eq!(find_key_position(&statics), None);
    }

    #[test]
    fn synthesized_keys_are_seeded_and_stable_across_renders() {
        let mut reg = KeyRegistry::new();
        let keys_first = {
            let mut cursor = reg.begin_range(0);
            vec![
                cursor.next_key(None, "items").unwrap(),
                cursor.next_key(None, "items").unwrap(),
            ]
        };
        // Re-render with the same two items, no attribute keys: must match.
        let keys_second = {
            let mut cursor = reg.begin_range(0);
            vec![
                cursor.next_key(None, "items").unwrap(),
                cursor.next_key(None, "items").unwrap(),
            ]
        };
        assert_eq!(keys_first, keys_second);
    }

    #[test]
    fn duplicate_attribute_key_is_fatal() {
        let mut reg = KeyRegistry::new();
        let mut cursor = reg.begin_range(0);
        cursor.next_key(Some(&Value::String("a".to_string())), "items").unwrap();
        let err = cursor.next_key(Some(&Value::String("a".to_string())), "items").unwrap_err();
        assert_eq!(err.key, "a");
    }
}
