//! Layout constants for B-tree pages.

/// Size of a page in bytes (4KB).
///
/// Every committed node image fits in one page. Working images produced
/// while inserting may temporarily grow to two pages before they are split.
pub const PAGE_SIZE: usize = 4096;

/// Size of the node header: 2 bytes node type + 2 bytes key count.
pub const HEADER: usize = 4;

/// Maximum key length in bytes.
pub const MAX_KEY_SIZE: usize = 1000;

/// Maximum value length in bytes.
pub const MAX_VAL_SIZE: usize = 3000;

/// Bytes taken by one child pointer.
pub const POINTER_SIZE: usize = 8;

/// Bytes taken by one entry in the offset table.
pub const OFFSET_SIZE: usize = 2;

/// Bytes taken by the key-length and value-length prefix of a record.
pub const RECORD_PREFIX: usize = 4;

/// Size of a node holding a single maximal record.
///
/// # Layout
/// ```text
/// header (4) + pointer (8) + offset (2) + klen/vlen (4) + key (1000) + value (3000)
/// ```
pub const MAX_SINGLE_RECORD_NODE: usize =
    HEADER + POINTER_SIZE + OFFSET_SIZE + RECORD_PREFIX + MAX_KEY_SIZE + MAX_VAL_SIZE;

// One maximal record must always fit a page, otherwise a split could
// produce a node that can never be made small enough.
const _: () = assert!(MAX_SINGLE_RECORD_NODE <= PAGE_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_single_record_fits_page() {
        assert_eq!(MAX_SINGLE_RECORD_NODE, 4018);
        assert!(MAX_SINGLE_RECORD_NODE <= PAGE_SIZE);
    }
}
