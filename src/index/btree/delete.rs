//! Deletion engine and merge policy.

use tracing::trace;

use super::insert::{replace_kid_n, split3};
use super::lookup::locate_floor;
use super::node::{Node, NodeType};
use crate::common::config::{HEADER, PAGE_SIZE};
use crate::common::PageId;
use crate::storage::PageStore;

/// Which sibling, if any, an undersized child should be merged into.
enum Merge {
    Left(Node),
    Right(Node),
    None,
}

/// Remove `key` below `node`.
///
/// Returns `None` when the key is absent; in that case no page has been
/// allocated or deallocated. Otherwise returns the new working image, which
/// may exceed one page when a longer routing key replaced a shorter one,
/// and the caller splits it like an insert result.
pub(crate) fn tree_delete<S: PageStore>(store: &mut S, node: &Node, key: &[u8]) -> Option<Node> {
    let idx = locate_floor(node, key);
    match node.node_type() {
        NodeType::Leaf => {
            if node.key(idx) != key {
                return None;
            }
            Some(leaf_delete(node, idx))
        }
        NodeType::Internal => node_delete(store, node, idx, key),
    }
}

fn node_delete<S: PageStore>(store: &mut S, node: &Node, idx: u16, key: &[u8]) -> Option<Node> {
    let kid_ptr = node.child(idx);
    let kid = store.get(kid_ptr);
    let updated = tree_delete(store, &kid, key)?;
    store.deallocate(kid_ptr);

    let new = match should_merge(store, node, idx, &updated) {
        Merge::Left(sibling) => {
            let merged = merge(&sibling, &updated);
            store.deallocate(node.child(idx - 1));
            trace!(keys = merged.key_count(), "merged child into left sibling");
            link_merged(store, node, idx - 1, merged)
        }
        Merge::Right(sibling) => {
            let merged = merge(&updated, &sibling);
            store.deallocate(node.child(idx + 1));
            trace!(keys = merged.key_count(), "merged child into right sibling");
            link_merged(store, node, idx, merged)
        }
        Merge::None if updated.key_count() == 0 => {
            // An empty child fits next to any sibling, so it only lands
            // here when it was the parent's sole link.
            assert!(
                node.key_count() == 1 && idx == 0,
                "empty child left behind in a parent with siblings"
            );
            let mut empty = Node::blank(PAGE_SIZE);
            empty.set_header(NodeType::Internal, 0);
            empty
        }
        Merge::None => replace_kid_n(store, node, idx, split3(updated)),
    };
    Some(new)
}

/// New leaf with record `idx` removed.
pub(crate) fn leaf_delete(old: &Node, idx: u16) -> Node {
    let n = old.key_count();
    let mut new = Node::blank(PAGE_SIZE);
    new.set_header(NodeType::Leaf, n - 1);
    new.append_range(old, 0, 0, idx);
    new.append_range(old, idx, idx + 1, n - (idx + 1));
    new
}

/// Concatenate two sibling nodes.
pub(crate) fn merge(left: &Node, right: &Node) -> Node {
    debug_assert_eq!(left.node_type(), right.node_type());
    let (nl, nr) = (left.key_count(), right.key_count());
    let mut new = Node::blank(PAGE_SIZE);
    new.set_header(left.node_type(), nl + nr);
    new.append_range(left, 0, 0, nl);
    new.append_range(right, nl, 0, nr);
    new
}

/// Decide whether `updated` (the new image of child `idx`) merges with a
/// sibling. Left wins when both qualify.
fn should_merge<S: PageStore>(store: &S, node: &Node, idx: u16, updated: &Node) -> Merge {
    if updated.size_bytes() > PAGE_SIZE / 4 {
        return Merge::None;
    }

    if idx > 0 {
        let sibling = store.get(node.child(idx - 1));
        if sibling.size_bytes() + updated.size_bytes() - HEADER <= PAGE_SIZE {
            return Merge::Left(sibling);
        }
    }

    if idx + 1 < node.key_count() {
        let sibling = store.get(node.child(idx + 1));
        if sibling.size_bytes() + updated.size_bytes() - HEADER <= PAGE_SIZE {
            return Merge::Right(sibling);
        }
    }

    Merge::None
}

/// Allocate `merged` and link it in place of children `idx` and `idx + 1`.
fn link_merged<S: PageStore>(store: &mut S, old: &Node, idx: u16, merged: Node) -> Node {
    assert!(
        merged.size_bytes() <= PAGE_SIZE,
        "merged node of {} bytes exceeds page size",
        merged.size_bytes()
    );
    let mut new = Node::blank(2 * PAGE_SIZE);
    replace_2kid(&mut new, old, idx, PageId::INVALID, merged.key(0));
    let ptr = store.allocate(merged);
    new.set_child(idx, ptr);
    new
}

/// Write into `new` a copy of `old` with links `idx` and `idx + 1` replaced
/// by a single link to `ptr` routed by `key`.
pub(crate) fn replace_2kid(new: &mut Node, old: &Node, idx: u16, ptr: PageId, key: &[u8]) {
    let n = old.key_count();
    new.set_header(NodeType::Internal, n - 1);
    new.append_range(old, 0, 0, idx);
    new.append_kv(idx, ptr, key, &[]);
    new.append_range(old, idx + 1, idx + 2, n - (idx + 2));
}

// ============================================================================
// TESTS
// ============================================================================
