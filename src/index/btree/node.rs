//! Node codec - the binary page layout shared by internal and leaf nodes.
//!
//! # Layout (little-endian)
//! ```text
//! ┌──────────┬──────────┬────────────────┬──────────────┬──────────────────────┐
//! │ type (2) │ nkeys (2)│ pointers (8×N) │ offsets (2×N)│ records              │
//! └──────────┴──────────┴────────────────┴──────────────┴──────────────────────┘
//! record: klen (2) │ vlen (2) │ key │ value
//! ```
//!
//! The offset table stores the start of records `1..=N` relative to the
//! record area; the offset of record 0 is implicitly zero and the offset of
//! record `N` marks the end of the node. Leaves carry a pointer slot per
//! record too, left zeroed.
//!
//! A [`Node`] is an owned buffer. Every mutation builds a fresh node from
//! one or more old ones; committed nodes are never written again.

use std::fmt;

use crate::common::config::{HEADER, OFFSET_SIZE, PAGE_SIZE, POINTER_SIZE, RECORD_PREFIX};
use crate::common::PageId;

/// Node kind stored in the first two bytes of a page.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Routing keys and child pointers, no values.
    Internal = 1,
    /// Keys and values.
    Leaf = 2,
}

impl NodeType {
    /// Convert from the on-page tag, returning `None` for unknown values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(NodeType::Internal),
            2 => Some(NodeType::Leaf),
            _ => None,
        }
    }
}

/// One B-tree node image.
///
/// The buffer may be larger than the encoded node: working images built
/// during an insert have room for two pages until they are split.
/// Only [`size_bytes`](Node::size_bytes) bytes are meaningful.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    data: Vec<u8>,
}

impl Node {
    /// Create a zeroed working buffer of `capacity` bytes.
    pub(crate) fn blank(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
        }
    }

    /// Wrap an encoded node image.
    ///
    /// # Panics
    /// Panics if `data` is shorter than the node header.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        assert!(data.len() >= HEADER, "buffer too small for node header");
        Self { data }
    }

    /// The encoded node, without trailing slack.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.size_bytes()]
    }

    /// Drop working-buffer slack beyond one page.
    pub(crate) fn truncate_to_page(&mut self) {
        self.data.truncate(PAGE_SIZE);
    }

    // ========================================================================
    // Header
    // ========================================================================

    /// Node kind.
    ///
    /// # Panics
    /// Panics on an unknown type tag.
    pub fn node_type(&self) -> NodeType {
        let tag = self.read_u16(0);
        match NodeType::from_u16(tag) {
            Some(node_type) => node_type,
            None => panic!("bad node: unknown type tag {tag}"),
        }
    }

    /// Number of records in the node.
    #[inline]
    pub fn key_count(&self) -> u16 {
        self.read_u16(2)
    }

    pub(crate) fn set_header(&mut self, node_type: NodeType, key_count: u16) {
        self.write_u16(0, node_type as u16);
        self.write_u16(2, key_count);
    }

    // ========================================================================
    // Child pointers
    // ========================================================================

    /// Child page of record `idx`.
    pub fn child(&self, idx: u16) -> PageId {
        assert!(idx < self.key_count(), "child index {idx} out of bounds");
        let pos = HEADER + POINTER_SIZE * idx as usize;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.data[pos..pos + POINTER_SIZE]);
        PageId::new(u64::from_le_bytes(buf))
    }

    pub(crate) fn set_child(&mut self, idx: u16, page_id: PageId) {
        assert!(idx < self.key_count(), "child index {idx} out of bounds");
        let pos = HEADER + POINTER_SIZE * idx as usize;
        self.data[pos..pos + POINTER_SIZE].copy_from_slice(&page_id.0.to_le_bytes());
    }

    // ========================================================================
    // Offsets
    // ========================================================================

    fn offset_pos(&self, idx: u16) -> usize {
        let n = self.key_count();
        assert!(idx >= 1 && idx <= n, "offset index {idx} out of bounds");
        HEADER + POINTER_SIZE * n as usize + OFFSET_SIZE * (idx as usize - 1)
    }

    /// Start of record `idx` relative to the record area.
    ///
    /// Valid for `idx <= key_count()`; `offset(key_count())` is the end of
    /// the last record.
    pub fn offset(&self, idx: u16) -> u16 {
        if idx == 0 {
            return 0;
        }
        self.read_u16(self.offset_pos(idx))
    }

    fn set_offset(&mut self, idx: u16, offset: u16) {
        let pos = self.offset_pos(idx);
        self.write_u16(pos, offset);
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Absolute position of record `idx` in the buffer.
    fn kv_pos(&self, idx: u16) -> usize {
        let n = self.key_count();
        assert!(idx <= n, "record index {idx} out of bounds");
        HEADER + (POINTER_SIZE + OFFSET_SIZE) * n as usize + self.offset(idx) as usize
    }

    /// Key of record `idx`.
    pub fn key(&self, idx: u16) -> &[u8] {
        assert!(idx < self.key_count(), "key index {idx} out of bounds");
        let pos = self.kv_pos(idx);
        let klen = self.read_u16(pos) as usize;
        &self.data[pos + RECORD_PREFIX..pos + RECORD_PREFIX + klen]
    }

    /// Value of record `idx`. Always empty on internal nodes.
    pub fn value(&self, idx: u16) -> &[u8] {
        assert!(idx < self.key_count(), "value index {idx} out of bounds");
        let pos = self.kv_pos(idx);
        let klen = self.read_u16(pos) as usize;
        let vlen = self.read_u16(pos + 2) as usize;
        let start = pos + RECORD_PREFIX + klen;
        &self.data[start..start + vlen]
    }

    /// Encoded length: the position just past the last record.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.kv_pos(self.key_count())
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Copy `n` records (with their child pointers) from `old[src..]` into
    /// `self[dst..]`.
    ///
    /// Records must be appended in order: record `dst` must be the next
    /// unwritten slot of `self`.
    pub(crate) fn append_range(&mut self, old: &Node, dst: u16, src: u16, n: u16) {
        assert!(src + n <= old.key_count(), "source range out of bounds");
        assert!(dst + n <= self.key_count(), "destination range out of bounds");
        if n == 0 {
            return;
        }

        for i in 0..n {
            self.set_child(dst + i, old.child(src + i));
        }

        let dst_begin = self.offset(dst);
        let src_begin = old.offset(src);
        for i in 1..=n {
            let offset = dst_begin + (old.offset(src + i) - src_begin);
            self.set_offset(dst + i, offset);
        }

        let begin = old.kv_pos(src);
        let end = old.kv_pos(src + n);
        let at = self.kv_pos(dst);
        self.data[at..at + (end - begin)].copy_from_slice(&old.data[begin..end]);
    }

    /// Write one record and its child pointer at slot `idx`.
    pub(crate) fn append_kv(&mut self, idx: u16, ptr: PageId, key: &[u8], val: &[u8]) {
        self.set_child(idx, ptr);

        let pos = self.kv_pos(idx);
        self.write_u16(pos, key.len() as u16);
        self.write_u16(pos + 2, val.len() as u16);
        let key_at = pos + RECORD_PREFIX;
        self.data[key_at..key_at + key.len()].copy_from_slice(key);
        let val_at = key_at + key.len();
        self.data[val_at..val_at + val.len()].copy_from_slice(val);

        let next = self.offset(idx) + (RECORD_PREFIX + key.len() + val.len()) as u16;
        self.set_offset(idx + 1, next);
    }

    #[inline]
    fn read_u16(&self, pos: usize) -> u16 {
        u16::from_le_bytes([self.data[pos], self.data[pos + 1]])
    }

    #[inline]
    fn write_u16(&mut self, pos: usize, value: u16) {
        self.data[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("node_type", &NodeType::from_u16(self.read_u16(0)))
            .field("key_count", &self.key_count())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// A leaf holding the sentinel and one record.
    fn sentinel_leaf(key: &[u8], val: &[u8]) -> Node {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Leaf, 2);
        node.append_kv(0, PageId::INVALID, &[], &[]);
        node.append_kv(1, PageId::INVALID, key, val);
        node
    }

    fn leaf_of(pairs: &[(&[u8], &[u8])]) -> Node {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Leaf, pairs.len() as u16);
        for (i, (k, v)) in pairs.iter().enumerate() {
            node.append_kv(i as u16, PageId::INVALID, k, v);
        }
        node
    }

    #[test]
    fn test_node_type_from_u16() {
        assert_eq!(NodeType::from_u16(1), Some(NodeType::Internal));
        assert_eq!(NodeType::from_u16(2), Some(NodeType::Leaf));
        assert_eq!(NodeType::from_u16(0), None);
        assert_eq!(NodeType::from_u16(3), None);
    }

    #[test]
    fn test_byte_layout() {
        let node = sentinel_leaf(b"k", b"v");
        let bytes = node.as_bytes();

        // header
        assert_eq!(&bytes[0..4], &[2, 0, 2, 0]);
        // two zeroed pointer slots
        assert!(bytes[4..20].iter().all(|&b| b == 0));
        // offsets for records 1 and 2
        assert_eq!(&bytes[20..22], &[4, 0]);
        assert_eq!(&bytes[22..24], &[10, 0]);
        // sentinel record, then klen=1 vlen=1 "k" "v"
        assert_eq!(&bytes[24..28], &[0, 0, 0, 0]);
        assert_eq!(&bytes[28..34], &[1, 0, 1, 0, b'k', b'v']);
        assert_eq!(node.size_bytes(), 34);
    }

    #[test]
    fn test_accessors() {
        let node = leaf_of(&[(b"", b""), (b"apple", b"red"), (b"banana", b"yellow")]);

        assert_eq!(node.node_type(), NodeType::Leaf);
        assert_eq!(node.key_count(), 3);
        assert_eq!(node.offset(0), 0);
        assert_eq!(node.offset(1), 4);
        assert_eq!(node.offset(2), 4 + 4 + 5 + 3);
        assert_eq!(node.key(0), b"");
        assert_eq!(node.key(1), b"apple");
        assert_eq!(node.value(1), b"red");
        assert_eq!(node.key(2), b"banana");
        assert_eq!(node.value(2), b"yellow");
        assert_eq!(node.child(2), PageId::INVALID);
    }

    #[test]
    fn test_internal_values_are_empty() {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Internal, 2);
        node.append_kv(0, PageId::new(7), b"", &[]);
        node.append_kv(1, PageId::new(9), b"m", &[]);

        assert_eq!(node.node_type(), NodeType::Internal);
        assert_eq!(node.child(0), PageId::new(7));
        assert_eq!(node.child(1), PageId::new(9));
        assert!(node.value(1).is_empty());
    }

    #[test]
    fn test_append_range_rebases_offsets() {
        let old = leaf_of(&[(b"a", b"1"), (b"bb", b"22"), (b"ccc", b"333")]);

        // Copy the last two records into a fresh node.
        let mut new = Node::blank(PAGE_SIZE);
        new.set_header(NodeType::Leaf, 2);
        new.append_range(&old, 0, 1, 2);

        assert_eq!(new.offset(0), 0);
        assert_eq!(new.key(0), b"bb");
        assert_eq!(new.value(0), b"22");
        assert_eq!(new.key(1), b"ccc");
        assert_eq!(new.value(1), b"333");
        assert_eq!(
            new.size_bytes(),
            HEADER + 2 * (POINTER_SIZE + OFFSET_SIZE) + (4 + 4) + (4 + 6)
        );
    }

    #[test]
    fn test_set_child_roundtrip() {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Internal, 1);
        node.append_kv(0, PageId::INVALID, b"k", &[]);
        node.set_child(0, PageId::new(u64::MAX - 1));
        assert_eq!(node.child(0), PageId::new(u64::MAX - 1));
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let node = sentinel_leaf(b"key", b"value");
        let decoded = Node::from_bytes(node.as_bytes().to_vec());
        assert_eq!(decoded.key(1), b"key");
        assert_eq!(decoded.value(1), b"value");
        assert_eq!(decoded.size_bytes(), node.size_bytes());
    }

    #[test]
    fn test_empty_node_size_is_header() {
        let mut node = Node::blank(PAGE_SIZE);
        node.set_header(NodeType::Internal, 0);
        assert_eq!(node.size_bytes(), HEADER);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_key_out_of_bounds_panics() {
        let node = sentinel_leaf(b"k", b"v");
        node.key(2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_child_out_of_bounds_panics() {
        let node = sentinel_leaf(b"k", b"v");
        node.child(5);
    }

    #[test]
    #[should_panic(expected = "bad node")]
    fn test_unknown_type_panics() {
        let node = Node::from_bytes(vec![9, 0, 0, 0]);
        node.node_type();
    }
}
