//! cowtree - A copy-on-write B+tree over a pluggable page store.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            cowtree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Tree Handle (index::btree::tree)               │   │
//! │  │     BTree::insert / delete / get   +   SharedBTree       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Engines (index::btree::insert / delete)           │   │
//! │  │   recursive rebuild  →  split3 / merge  →  relink kids   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │     Node Codec + Key Locator (node / lookup)             │   │
//! │  │   type │ nkeys │ pointers │ offsets │ klen vlen key val  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Page Store (storage/)  [Pluggable]             │   │
//! │  │    PageStore trait: get / allocate / deallocate          │   │
//! │  │    MemPageStore + StoreStats                             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, layout constants)
//! - [`index`] - The B+tree and its node format
//! - [`storage`] - Page store contract, in-memory store, atomic file writer
//!
//! # Quick Start
//! ```
//! use cowtree::{BTree, MemPageStore};
//!
//! let mut tree = BTree::new(MemPageStore::new());
//! for i in 0..100u32 {
//!     tree.insert(format!("key{i}").as_bytes(), b"value").unwrap();
//! }
//! assert_eq!(tree.get(b"key42").unwrap(), Some(b"value".to_vec()));
//! assert!(tree.delete(b"key42").unwrap());
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{MAX_KEY_SIZE, MAX_VAL_SIZE, PAGE_SIZE};
pub use common::{Error, PageId, Result};

pub use index::btree::{BTree, Node, NodeType, SharedBTree};
pub use storage::{save_data, MemPageStore, PageStore, StatsSnapshot, StoreStats};
