//! Common types and utilities shared across cowtree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Layout constants
//! - Error types
//! - Page identifiers

pub mod config;
pub mod error;
mod page_id;

pub use error::{Error, Result};
pub use page_id::PageId;
