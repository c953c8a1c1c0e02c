//! In-memory page store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::Ordering;

use tracing::trace;

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;
use crate::index::btree::Node;
use crate::storage::{PageStore, StoreStats};

/// A page table kept in a `HashMap`.
///
/// Ids come from a counter starting at 1 and are never reused, so a stale
/// id can never silently resolve to a newer image.
///
/// # Example
/// ```
/// use cowtree::{BTree, MemPageStore};
///
/// let mut tree = BTree::new(MemPageStore::new());
/// tree.insert(b"hello", b"world").unwrap();
/// assert_eq!(tree.store().live_pages(), 1);
/// ```
#[derive(Debug)]
pub struct MemPageStore {
    pages: HashMap<PageId, Node>,
    next_id: u64,
    stats: StoreStats,
}

impl MemPageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            next_id: 1,
            stats: StoreStats::new(),
        }
    }

    /// Number of pages currently allocated.
    pub fn live_pages(&self) -> usize {
        self.pages.len()
    }

    /// Check whether `id` is currently allocated.
    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(&id)
    }

    /// Copy of every live page image, ordered by id.
    pub fn page_images(&self) -> BTreeMap<PageId, Vec<u8>> {
        self.pages
            .iter()
            .map(|(&id, node)| (id, node.as_bytes().to_vec()))
            .collect()
    }

    /// Get store statistics.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }
}

impl Default for MemPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemPageStore {
    fn get(&self, id: PageId) -> Node {
        let Some(node) = self.pages.get(&id) else {
            panic!("get on unallocated {id}");
        };
        self.stats.pages_read.fetch_add(1, Ordering::Relaxed);
        node.clone()
    }

    fn allocate(&mut self, node: Node) -> PageId {
        let size = node.size_bytes();
        assert!(size <= PAGE_SIZE, "node of {size} bytes exceeds page size");

        let id = PageId::new(self.next_id);
        self.next_id += 1;
        self.pages.insert(id, node);
        self.stats.pages_allocated.fetch_add(1, Ordering::Relaxed);
        trace!(%id, size, "allocated page");
        id
    }

    fn deallocate(&mut self, id: PageId) {
        assert!(self.pages.remove(&id).is_some(), "deallocate on unallocated {id}");
        self.stats.pages_freed.fetch_add(1, Ordering::Relaxed);
        trace!(%id, "freed page");
    }
}
