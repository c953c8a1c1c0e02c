//! Page identifier type.

use std::fmt;

/// Identifies a committed node image inside a page store.
///
/// Stored on the page as an 8-byte little-endian child pointer. Identifiers
/// are handed out by the store from a counter, never derived from memory
/// addresses, so they stay comparable and never alias.
///
/// # Example
/// ```
/// use cowtree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Written into the unused child slots of leaf nodes. Stores start
    /// counting at 1 so this value is never live.
    pub const INVALID: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u64) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
