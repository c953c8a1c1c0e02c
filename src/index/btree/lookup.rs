//! Key locator.

use super::node::Node;

/// Find the last record whose key is `<= key`.
///
/// Index 0 is always eligible: it holds either the sentinel (leftmost
/// nodes) or the routing key that led the search into this node, so every
/// key routed here sorts at or after it. On internal nodes the result picks
/// the child to descend into; on leaves it is the slot to update, delete, or
/// insert after.
pub fn locate_floor(node: &Node, key: &[u8]) -> u16 {
    // Binary search over 1..n for the first key > target.
    let mut lo = 1u16;
    let mut hi = node.key_count();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if node.key(mid) <= key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;
    use crate::common::PageId;
    use crate::index::btree::node::NodeType;

    fn leaf_with_keys(keys: &[&[u8]]) -> Node {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Leaf, keys.len() as u16);
        for (i, k) in keys.iter().enumerate() {
            node.append_kv(i as u16, PageId::INVALID, k, b"v");
        }
        node
    }

    /// Reference linear scan.
    fn linear_floor(node: &Node, key: &[u8]) -> u16 {
        let mut found = 0;
        for i in 1..node.key_count() {
            if node.key(i) <= key {
                found = i;
            } else {
                break;
            }
        }
        found
    }

    #[test]
    fn test_exact_match() {
        let node = leaf_with_keys(&[b"", b"b", b"d", b"f"]);
        assert_eq!(locate_floor(&node, b"b"), 1);
        assert_eq!(locate_floor(&node, b"d"), 2);
        assert_eq!(locate_floor(&node, b"f"), 3);
    }

    #[test]
    fn test_between_keys() {
        let node = leaf_with_keys(&[b"", b"b", b"d", b"f"]);
        assert_eq!(locate_floor(&node, b"a"), 0);
        assert_eq!(locate_floor(&node, b"c"), 1);
        assert_eq!(locate_floor(&node, b"e"), 2);
        assert_eq!(locate_floor(&node, b"z"), 3);
    }

    #[test]
    fn test_first_index_always_eligible() {
        // Routing key at index 0 is larger than the probe.
        let node = leaf_with_keys(&[b"m", b"p"]);
        assert_eq!(locate_floor(&node, b"a"), 0);
    }

    #[test]
    fn test_single_record() {
        let node = leaf_with_keys(&[b""]);
        assert_eq!(locate_floor(&node, b"anything"), 0);
    }

    #[test]
    fn test_matches_linear_scan() {
        let keys: Vec<Vec<u8>> = (0..50u32).map(|i| format!("{:04}", i * 3).into_bytes()).collect();
        let mut refs: Vec<&[u8]> = vec![b""];
        refs.extend(keys.iter().map(|k| k.as_slice()));
        let node = leaf_with_keys(&refs);

        for probe in 0..160u32 {
            let key = format!("{:04}", probe).into_bytes();
            assert_eq!(locate_floor(&node, &key), linear_floor(&node, &key), "probe {probe}");
        }
    }
}
