//! The fingerprinter (spec §4.4, C4): a compact digest over a tree's
//! canonical serialization, used for O(1) no-change detection before the
//! differ walks anything. A collision is never treated as equality on its
//! own merit — it is safe here only because the caller (C7) retains the
//! prior tree and skips diffing solely to avoid redundant work, never to
//! avoid it (spec §4.4).

use xxhash_rust::xxh3::Xxh3;

use crate::tree::{Dynamic, RangeWrapper, TreeNode};

pub type Fingerprint = u64;

/// Digests `node`'s statics (in order) then its dynamics (in numeric-key
/// order), recursively — the exact canonicalization spec §4.4 specifies.
pub fn fingerprint(node: &TreeNode) -> Fingerprint {
    let mut h = Xxh3::new();
    hash_node(&mut h, node);
    h.digest()
}

fn hash_node(h: &mut Xxh3, node: &TreeNode) {
    h.update(&(node.statics.len() as u64).to_le_bytes());
    for s in &node.statics {
        hash_str(h, s);
    }
    h.update(&(node.dynamics.len() as u64).to_le_bytes());
    for d in &node.dynamics {
        hash_dynamic(h, d);
    }
}

fn hash_str(h: &mut Xxh3, s: &str) {
    h.update(&(s.len() as u64).to_le_bytes());
    h.update(s.as_bytes());
}

fn hash_dynamic(h: &mut Xxh3, d: &Dynamic) {
    match d {
        Dynamic::Leaf(s) => {
            h.update(&[0u8]);
            hash_str(h, s);
        }
        Dynamic::Node(n) => {
            h.update(&[1u8]);
            hash_node(h, n);
        }
        Dynamic::Range(r) => {
            h.update(&[2u8]);
            hash_range(h, r);
        }
    }
}

fn hash_range(h: &mut Xxh3, r: &RangeWrapper) {
    h.update(&(r.item_statics.len() as u64).to_le_bytes());
    for s in &r.item_statics {
        hash_str(h, s);
    }
    h.update(&(r.items.len() as u64).to_le_bytes());
    for item in &r.items {
        hash_str(h, &item.key);
        h.update(&(item.dynamics.len() as u64).to_le_bytes());
        for d in &item.dynamics {
            hash_dynamic(h, d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RangeItem;

    #[test]
    fn identical_trees_fingerprint_equal() {
        let a = TreeNode { statics: vec!["x".into(), "y".into()], dynamics: vec![Dynamic::Leaf("1".into())] };
        let b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn changed_leaf_changes_fingerprint() {
        let a = TreeNode { statics: vec!["x".into(), "y".into()], dynamics: vec![Dynamic::Leaf("1".into())] };
        let mut b = a.clone();
        b.dynamics[0] = Dynamic::Leaf("2".into());
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn range_item_order_changes_fingerprint() {
        let wrap = |items: Vec<&str>| RangeWrapper {
            item_statics: vec!["<li>".into(), "</li>".into()],
            items: items
                .into_iter()
                .map(|k| RangeItem { key: k.into(), dynamics: vec![Dynamic::Leaf(k.into())] })
                .collect(),
        };
        let a = TreeNode { statics: vec!["".into(), "".into()], dynamics: vec![Dynamic::Range(wrap(vec!["a", "b"]))] };
        let b = TreeNode { statics: vec!["".into(), "".into()], dynamics: vec![Dynamic::Range(wrap(vec!["b", "a"]))] };
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
