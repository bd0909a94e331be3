//! The hydrated tree representation (spec §3 "Tree node" / "Range wrapper").
//!
//! `TreeNode` is the in-memory structure the hydrator (C3) produces, the
//! fingerprinter (C4) digests, and the differ (C5) compares. `to_full_json`
//! renders the wire form used for a full payload (statics present at every
//! node); the differ builds partial payloads directly as `serde_json::Value`
//! since their shape depends on what changed.

use serde_json::{Map, Value as Json};

/// One dynamic slot inside a [`TreeNode`] or [`RangeItem`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// A rendered (already HTML-escaped, unless marked safe upstream) leaf.
    Leaf(String),
    /// A nested tree node: the body of a conditional, `with`, block, or
    /// template invocation.
    Node(Box<TreeNode>),
    /// A keyed range. Structural — never flattened to a leaf even when
    /// adjacent to other dynamics in the same `s` array (spec §9 "Range
    /// flattening pitfall").
    Range(RangeWrapper),
}

/// A hydration result: `s[0], d[0], s[1], d[1], …, s[N]` reconstructs the
/// exact HTML span this node covers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeNode {
    pub statics: Vec<String>,
    pub dynamics: Vec<Dynamic>,
}

impl TreeNode {
    pub fn leaf_only(statics: Vec<String>, dynamics: Vec<Dynamic>) -> Self {
        debug_assert_eq!(statics.len(), dynamics.len() + 1);
        Self { statics, dynamics }
    }

    /// Concatenates statics and dynamics back into plain HTML, recursively.
    /// Used to validate the round-trip property (spec §8) in tests and to
    /// render the initial full-document HTML (spec §4.7 `renderInitial`).
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for (i, s) in self.statics.iter().enumerate() {
            out.push_str(s);
            if let Some(d) = self.dynamics.get(i) {
                out.push_str(&d.render_html());
            }
        }
        out
    }

    /// The full wire form: `{"s": [...], "0": ..., "1": ..., ...}`.
    pub fn to_full_json(&self) -> Json {
        let mut map = Map::new();
        map.insert("s".to_string(), Json::Array(self.statics.iter().cloned().map(Json::String).collect()));
        for (i, d) in self.dynamics.iter().enumerate() {
            map.insert(i.to_string(), d.to_full_json());
        }
        Json::Object(map)
    }
}

impl Dynamic {
    fn render_html(&self) -> String {
        match self {
            Dynamic::Leaf(s) => s.clone(),
            Dynamic::Node(n) => n.render_html(),
            Dynamic::Range(r) => r.items.iter().map(|it| it.render_html(&r.item_statics)).collect(),
        }
    }

    fn to_full_json(&self) -> Json {
        match self {
            Dynamic::Leaf(s) => Json::String(s.clone()),
            Dynamic::Node(n) => n.to_full_json(),
            Dynamic::Range(r) => r.to_full_json(),
        }
    }
}

/// One item inside a [`RangeWrapper`]. Shares `item_statics` with its
/// siblings rather than carrying its own `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeItem {
    pub key: String,
    pub dynamics: Vec<Dynamic>,
}

impl RangeItem {
    /// `statics` is the range's shared, data-independent skeleton, sized for
    /// a body that runs to completion. An item whose body hit `{{break}}` or
    /// `{{continue}}` has fewer `dynamics` than that — the remaining
    /// statics never actually executed, so reconstruction stops at
    /// `dynamics.len() + 1` rather than walking the full shared array.
    pub fn render_html(&self, statics: &[String]) -> String {
        let mut out = String::new();
        for (i, s) in statics.iter().take(self.dynamics.len() + 1).enumerate() {
            out.push_str(s);
            if let Some(d) = self.dynamics.get(i) {
                out.push_str(&d.render_html());
            }
        }
        out
    }

    /// Full wire form of one item: just its dynamics, keyed by index (the
    /// shared `s` lives on the wrapper).
    pub fn to_full_json(&self) -> Json {
        let mut map = Map::new();
        for (i, d) in self.dynamics.iter().enumerate() {
            map.insert(i.to_string(), d.to_full_json());
        }
        Json::Object(map)
    }
}

/// A keyed iteration (spec §3 "Range wrapper").
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWrapper {
    pub item_statics: Vec<String>,
    pub items: Vec<RangeItem>,
}

impl RangeWrapper {
    pub fn to_full_json(&self) -> Json {
        let mut map = Map::new();
        map.insert(
            "s".to_string(),
            Json::Array(self.item_statics.iter().cloned().map(Json::String).collect()),
        );
        map.insert("d".to_string(), Json::Array(self.items.iter().map(RangeItem::to_full_json).collect()));
        Json::Object(map)
    }
}
