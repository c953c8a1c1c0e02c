//! Storage layer - page lifecycle and file output.
//!
//! This module handles everything the tree delegates:
//! - [`PageStore`] - The allocation contract the B-tree runs against
//! - [`MemPageStore`] - In-memory page table implementing it
//! - [`save_data`] - Atomic temp-file + fsync + rename writer

mod atomic_file;
mod mem_store;
mod page_store;
mod stats;

pub use atomic_file::{random_suffix, save_data};
pub use mem_store::MemPageStore;
pub use page_store::PageStore;
pub use stats::{StatsSnapshot, StoreStats};
