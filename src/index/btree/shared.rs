//! Thread-safe handle around a [`BTree`].

use parking_lot::Mutex;

use super::tree::BTree;
use crate::common::Result;
use crate::storage::PageStore;

/// A [`BTree`] behind a `parking_lot::Mutex`.
///
/// `BTree` itself does no locking and expects callers to serialize access.
/// This wrapper does exactly that: every operation holds the lock for its
/// full duration, so readers never observe a half-installed root.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use cowtree::{MemPageStore, SharedBTree};
///
/// let tree = Arc::new(SharedBTree::new(MemPageStore::new()));
/// let writer = {
///     let tree = Arc::clone(&tree);
///     std::thread::spawn(move || tree.insert(b"k", b"v").unwrap())
/// };
/// writer.join().unwrap();
/// assert_eq!(tree.get(b"k").unwrap(), Some(b"v".to_vec()));
/// ```
#[derive(Debug)]
pub struct SharedBTree<S: PageStore> {
    inner: Mutex<BTree<S>>,
}

impl<S: PageStore> SharedBTree<S> {
    /// Wrap a fresh, empty tree over `store`.
    pub fn new(store: S) -> Self {
        Self::from_tree(BTree::new(store))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<S>) -> Self {
        Self {
            inner: Mutex::new(tree),
        }
    }

    /// See [`BTree::insert`].
    pub fn insert(&self, key: &[u8], val: &[u8]) -> Result<()> {
        self.inner.lock().insert(key, val)
    }

    /// See [`BTree::delete`].
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        self.inner.lock().delete(key)
    }

    /// See [`BTree::get`].
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.lock().get(key)
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// Use this to batch several operations under one lock acquisition.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut BTree<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Unwrap the tree.
    pub fn into_inner(self) -> BTree<S> {
        self.inner.into_inner()
    }
}
