//! The page-store contract consumed by the B-tree.

use crate::common::PageId;
use crate::index::btree::Node;

/// Owns committed node images between allocation and deallocation.
///
/// The tree never touches memory or storage directly; every page it reads,
/// creates, or releases goes through this trait.
///
/// # Contract
/// - `get` on an id that is not currently allocated panics.
/// - `allocate` panics if the node is larger than one page, and returns an
///   id that differs from every live id.
/// - `deallocate` on an id that is not currently allocated panics. The id
///   is invalid for `get`/`deallocate` afterwards.
///
/// All three are invariant checks: the tree only breaks them if it has a bug.
pub trait PageStore {
    /// Read the image stored under `id`.
    fn get(&self, id: PageId) -> Node;

    /// Commit `node` and return its fresh id.
    fn allocate(&mut self, node: Node) -> PageId;

    /// Release the image stored under `id`.
    fn deallocate(&mut self, id: PageId);
}
