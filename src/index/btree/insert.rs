//! Insertion engine and split policy.
//!
//! Insertion walks down to the covering leaf, builds a new leaf image, and
//! rebuilds every ancestor on the way back up. Child pages on the path are
//! deallocated as they are read and their replacements allocated once the
//! new images are final.

use tracing::trace;

use super::lookup::locate_floor;
use super::node::{Node, NodeType};
use crate::common::config::{HEADER, OFFSET_SIZE, PAGE_SIZE, POINTER_SIZE};
use crate::common::PageId;
use crate::storage::PageStore;

/// Insert or update `key` below `node`, returning the new working image.
///
/// The result may be up to two pages long; the caller splits it with
/// [`split3`] and allocates the parts. The caller also owns deallocating
/// `node` itself.
pub(crate) fn tree_insert<S: PageStore>(store: &mut S, node: &Node, key: &[u8], val: &[u8]) -> Node {
    let idx = locate_floor(node, key);
    match node.node_type() {
        NodeType::Leaf => {
            if node.key(idx) == key {
                leaf_update(node, idx, key, val)
            } else {
                leaf_insert(node, idx + 1, key, val)
            }
        }
        NodeType::Internal => node_insert(store, node, idx, key, val),
    }
}

/// Recurse into the child at `idx` and relink its replacement(s).
fn node_insert<S: PageStore>(store: &mut S, node: &Node, idx: u16, key: &[u8], val: &[u8]) -> Node {
    let kid_ptr = node.child(idx);
    let kid = store.get(kid_ptr);
    store.deallocate(kid_ptr);

    let kid = tree_insert(store, &kid, key, val);
    let parts = split3(kid);
    replace_kid_n(store, node, idx, parts)
}

/// New leaf with `(key, val)` inserted at slot `idx`.
pub(crate) fn leaf_insert(old: &Node, idx: u16, key: &[u8], val: &[u8]) -> Node {
    let n = old.key_count();
    let mut new = Node::blank(2 * PAGE_SIZE);
    new.set_header(NodeType::Leaf, n + 1);
    new.append_range(old, 0, 0, idx);
    new.append_kv(idx, PageId::INVALID, key, val);
    new.append_range(old, idx + 1, idx, n - idx);
    new
}

/// New leaf with record `idx` replaced by `(key, val)`.
pub(crate) fn leaf_update(old: &Node, idx: u16, key: &[u8], val: &[u8]) -> Node {
    let n = old.key_count();
    let mut new = Node::blank(2 * PAGE_SIZE);
    new.set_header(NodeType::Leaf, n);
    new.append_range(old, 0, 0, idx);
    new.append_kv(idx, PageId::INVALID, key, val);
    new.append_range(old, idx + 1, idx + 1, n - (idx + 1));
    new
}

/// Replace the link at `idx` with one link per node in `kids`.
///
/// Each kid is allocated in the store and routed by its first key.
pub(crate) fn replace_kid_n<S: PageStore>(store: &mut S, old: &Node, idx: u16, kids: Vec<Node>) -> Node {
    let n = old.key_count();
    let inc = kids.len() as u16;
    let mut new = Node::blank(2 * PAGE_SIZE);
    new.set_header(NodeType::Internal, n + inc - 1);
    new.append_range(old, 0, 0, idx);
    for (i, kid) in kids.into_iter().enumerate() {
        let slot = idx + i as u16;
        new.append_kv(slot, PageId::INVALID, kid.key(0), &[]);
        let ptr = store.allocate(kid);
        new.set_child(slot, ptr);
    }
    new.append_range(old, idx + inc, idx + 1, n - (idx + 1));
    new
}

// ============================================================================
// Split policy
// ============================================================================

/// Bytes a node holding records `from..to` of `node` would take.
fn range_bytes(node: &Node, from: u16, to: u16) -> usize {
    HEADER
        + (POINTER_SIZE + OFFSET_SIZE) * (to - from) as usize
        + (node.offset(to) - node.offset(from)) as usize
}

/// Pick the number of records that go left.
///
/// Prefers the most balanced boundary where both halves fit a page. If no
/// such boundary exists, takes the smallest left half whose right half fits;
/// that left half can always be split once more into two fitting nodes
/// because a working image never holds two full pages of records.
fn split_point(node: &Node) -> u16 {
    let n = node.key_count();
    assert!(n >= 2, "cannot split a node with {n} records");

    let mut balanced: Option<(u16, usize)> = None;
    let mut first_right_fit = None;
    for at in 1..n {
        let left = range_bytes(node, 0, at);
        let right = range_bytes(node, at, n);
        if right > PAGE_SIZE {
            continue;
        }
        first_right_fit.get_or_insert(at);
        if left <= PAGE_SIZE {
            let skew = left.abs_diff(right);
            if balanced.map_or(true, |(_, best)| skew < best) {
                balanced = Some((at, skew));
            }
        }
    }

    // A single record always fits, so `n - 1` is the fallback of last resort.
    balanced
        .map(|(at, _)| at)
        .or(first_right_fit)
        .unwrap_or(n - 1)
}

/// Split `old` into a left part (possibly still oversized) and a right
/// part that fits one page.
fn split2(old: &Node) -> (Node, Node) {
    let n = old.key_count();
    let at = split_point(old);
    let node_type = old.node_type();

    let mut left = Node::blank(2 * PAGE_SIZE);
    left.set_header(node_type, at);
    left.append_range(old, 0, 0, at);

    let mut right = Node::blank(PAGE_SIZE);
    right.set_header(node_type, n - at);
    right.append_range(old, 0, at, n - at);

    assert!(right.size_bytes() <= PAGE_SIZE, "right split part exceeds page size");
    (left, right)
}

/// Split a working image into 1 to 3 nodes that each fit a page.
pub(crate) fn split3(mut old: Node) -> Vec<Node> {
    if old.size_bytes() <= PAGE_SIZE {
        old.truncate_to_page();
        return vec![old];
    }

    let (mut left, right) = split2(&old);
    if left.size_bytes() <= PAGE_SIZE {
        trace!(
            left = left.key_count(),
            right = right.key_count(),
            "split node in two"
        );
        left.truncate_to_page();
        return vec![left, right];
    }

    let (mut leftleft, middle) = split2(&left);
    assert!(
        leftleft.size_bytes() <= PAGE_SIZE,
        "three-way split left an oversized node of {} bytes",
        leftleft.size_bytes()
    );
    trace!(
        left = leftleft.key_count(),
        middle = middle.key_count(),
        right = right.key_count(),
        "split node in three"
    );
    leftleft.truncate_to_page();
    vec![leftleft, middle, right]
}

// ============================================================================
// TESTS
// ============================================================================
