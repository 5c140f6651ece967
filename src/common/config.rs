//! Configuration constants for heapdb.

/// Size of a page in bytes, the unit of both disk I/O and locking.
///
/// 4KB matches the OS page size on most platforms. Heap file lengths are
/// always an exact multiple of this.
///
/// # Slot Capacity
/// A page stores fixed-size tuples behind an occupancy bitmap, so the slot
/// count per page is `floor(8 * PAGE_SIZE / (8 * tuple_size + 1))`: each
/// slot costs its tuple bytes plus one bitmap bit.
pub const PAGE_SIZE: usize = 4096;

/// Serialized size of an integer field in bytes.
pub const INT_FIELD_LEN: usize = 4;

/// Serialized size of a string field in bytes.
///
/// Strings are stored as fixed-width buffers: encoded bytes are truncated
/// to this length and zero-padded, which keeps every tuple of a schema the
/// same size and makes slot arithmetic exact.
pub const STRING_FIELD_LEN: usize = 128;

/// Default number of pages held by the buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 50;
