//! The tree handle: root bookkeeping on top of the insert/delete engines.

use tracing::debug;

use super::delete::tree_delete;
use super::insert::{split3, tree_insert};
use super::lookup::locate_floor;
use super::node::{Node, NodeType};
use crate::common::config::{MAX_KEY_SIZE, MAX_VAL_SIZE, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::PageStore;

/// A copy-on-write B+tree over a [`PageStore`].
///
/// The tree owns nothing but its root id. Every mutation builds new page
/// images bottom-up, frees the pages they supersede, and repoints the root
/// as its last step.
///
/// The leftmost leaf always starts with a sentinel record whose key is
/// empty, so every real key has a floor. Real keys must therefore be
/// non-empty.
///
/// # Example
/// ```
/// use cowtree::{BTree, MemPageStore};
///
/// let mut tree = BTree::new(MemPageStore::new());
/// tree.insert(b"apple", b"red").unwrap();
/// tree.insert(b"banana", b"yellow").unwrap();
///
/// assert_eq!(tree.get(b"apple").unwrap(), Some(b"red".to_vec()));
/// assert!(tree.delete(b"apple").unwrap());
/// assert_eq!(tree.get(b"apple").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct BTree<S: PageStore> {
    root: Option<PageId>,
    store: S,
}

impl<S: PageStore> BTree<S> {
    /// Create an empty tree over `store`.
    pub fn new(store: S) -> Self {
        Self { root: None, store }
    }

    /// Current root page, or `None` for an empty tree.
    pub fn root(&self) -> Option<PageId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the tree and return the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Number of levels from the root down to the leaves; 0 when empty.
    pub fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut node = self.store.get(root);
        let mut height = 1;
        while node.node_type() == NodeType::Internal {
            node = self.store.get(node.child(0));
            height += 1;
        }
        height
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Insert `key`, or replace its value if already present.
    ///
    /// # Errors
    /// `EmptyKey`, `KeyTooLarge` or `ValueTooLarge` when the record breaks
    /// the size limits. The tree is untouched in that case.
    pub fn insert(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
        check_key(key)?;
        check_value(val)?;

        let Some(root_id) = self.root else {
            let mut leaf = Node::blank(PAGE_SIZE);
            leaf.set_header(NodeType::Leaf, 2);
            leaf.append_kv(0, PageId::INVALID, &[], &[]);
            leaf.append_kv(1, PageId::INVALID, key, val);
            let id = self.store.allocate(leaf);
            self.root = Some(id);
            debug!(root = %id, "created first leaf");
            return Ok(());
        };

        let root = self.store.get(root_id);
        self.store.deallocate(root_id);
        let updated = tree_insert(&mut self.store, &root, key, val);
        self.install_root(updated);
        Ok(())
    }

    /// Remove `key`. Returns `false` if it was not present.
    ///
    /// A miss leaves every page exactly as it was.
    ///
    /// # Errors
    /// `EmptyKey` or `KeyTooLarge` for a key that could never be stored.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        check_key(key)?;

        let Some(root_id) = self.root else {
            return Ok(false);
        };
        let root = self.store.get(root_id);
        let Some(updated) = tree_delete(&mut self.store, &root, key) else {
            return Ok(false);
        };
        self.store.deallocate(root_id);

        match (updated.node_type(), updated.key_count()) {
            (NodeType::Internal, 0) => {
                panic!("empty internal node at the root");
            }
            (NodeType::Internal, 1) => {
                let child = updated.child(0);
                debug!(root = %child, "root has one child, height reduced");
                self.adopt_root(child);
            }
            (NodeType::Leaf, 1) => {
                // Only the sentinel is left.
                self.root = None;
                debug!("last key deleted, tree is empty");
            }
            _ => self.install_root(updated),
        }
        Ok(true)
    }

    /// Look up the value stored under `key`.
    ///
    /// # Errors
    /// `EmptyKey` or `KeyTooLarge` for a key that could never be stored.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        check_key(key)?;

        let Some(root_id) = self.root else {
            return Ok(None);
        };
        let mut node = self.store.get(root_id);
        loop {
            let idx = locate_floor(&node, key);
            match node.node_type() {
                NodeType::Leaf => {
                    let found = node.key(idx) == key;
                    return Ok(found.then(|| node.value(idx).to_vec()));
                }
                NodeType::Internal => node = self.store.get(node.child(idx)),
            }
        }
    }

    // ========================================================================
    // Root installation
    // ========================================================================

    /// Split the new root image and commit it, growing a level if needed.
    fn install_root(&mut self, updated: Node) {
        let mut parts = split3(updated);
        if parts.len() == 1 {
            let node = parts.remove(0);
            self.root = Some(self.store.allocate(node));
            return;
        }

        let mut root = Node::blank(PAGE_SIZE);
        root.set_header(NodeType::Internal, parts.len() as u16);
        let count = parts.len();
        for (i, part) in parts.into_iter().enumerate() {
            let slot = i as u16;
            root.append_kv(slot, PageId::INVALID, part.key(0), &[]);
            let ptr = self.store.allocate(part);
            root.set_child(slot, ptr);
        }
        let id = self.store.allocate(root);
        self.root = Some(id);
        debug!(root = %id, parts = count, "root split, new level added");
    }

    /// Make the committed page `child` the root.
    ///
    /// Single-entry internal nodes left standalone deeper down can end up on
    /// top after a collapse; they are redundant at the root and are removed
    /// too. A leftmost leaf holding only the sentinel means the tree is empty.
    fn adopt_root(&mut self, mut child: PageId) {
        loop {
            let node = self.store.get(child);
            match (node.node_type(), node.key_count()) {
                (NodeType::Internal, 1) => {
                    self.store.deallocate(child);
                    child = node.child(0);
                    debug!(root = %child, "dropped single-entry level");
                }
                (NodeType::Leaf, 1) => {
                    self.store.deallocate(child);
                    self.root = None;
                    debug!("last key deleted, tree is empty");
                    return;
                }
                _ => {
                    self.root = Some(child);
                    return;
                }
            }
        }
    }
}

fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::EmptyKey);
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(Error::KeyTooLarge {
            len: key.len(),
            max: MAX_KEY_SIZE,
        });
    }
    Ok(())
}

fn check_value(val: &[u8]) -> Result<()> {
    if val.len() > MAX_VAL_SIZE {
        return Err(Error::ValueTooLarge {
            len: val.len(),
            max: MAX_VAL_SIZE,
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
