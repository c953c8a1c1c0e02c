//! Copy-on-write B+tree.
//!
//! # Layout
//! - [`node`] - Fixed binary page layout and builder primitives
//! - [`lookup`] - Floor search within one node
//! - `insert` / `delete` - Recursive rebuild engines with split and merge
//! - [`BTree`] - Root bookkeeping and the public operations
//! - [`SharedBTree`] - Mutex-guarded handle for multi-threaded callers

mod delete;
mod insert;
pub mod lookup;
pub mod node;
mod shared;
mod tree;

pub use lookup::locate_floor;
pub use node::{Node, NodeType};
pub use shared::SharedBTree;
pub use tree::BTree;
