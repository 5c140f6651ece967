//! Error types for heapdb.
//!
//! One crate-wide [`Error`] enum keeps error handling consistent across the
//! storage, buffer, execution, and statistics layers. Variants fall into
//! three classes:
//!
//! - **Fatal corruption** ([`Error::ShortRead`]): on-disk state disagrees
//!   with file metadata; unrecoverable.
//! - **Retryable transactional** ([`Error::TransactionAborted`]): the
//!   external lock coordinator gave up on the transaction; retry with a
//!   fresh one.
//! - **Contract violations** (everything else): programmer errors such as
//!   deleting a tuple through the wrong file or pulling from a closed
//!   iterator. These fail fast and are never swallowed.
//!
//! End-of-stream is *not* an error: iterators signal it with `Ok(None)`.

use thiserror::Error;

use crate::common::page_id::HeapPageId;
use crate::common::transaction_id::TransactionId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in heapdb.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A page read would run past the end of the heap file.
    ///
    /// The file length is always an exact multiple of the page size, so a
    /// short read means the on-disk state is inconsistent with metadata.
    #[error("short read: page {page_id} lies beyond the end of its heap file ({file_len} bytes)")]
    ShortRead { page_id: HeapPageId, file_len: u64 },

    /// The external lock coordinator aborted the transaction.
    ///
    /// Retryable: rerun the query under a fresh transaction.
    #[error("transaction {0} aborted")]
    TransactionAborted(TransactionId),

    /// No table with this id is registered in the catalog.
    #[error("unknown table id {0}")]
    TableNotFound(u32),

    /// No table with this name is registered in the catalog.
    #[error("unknown table: {0}")]
    TableNameNotFound(String),

    /// No field with this name exists in the tuple descriptor.
    #[error("unknown field: {0}")]
    FieldNotFound(String),

    /// The tuple's record id points into a different heap file.
    #[error("tuple at {0} does not belong to table {1}")]
    ForeignTuple(HeapPageId, u32),

    /// The tuple has no record id, so it was never persisted.
    #[error("tuple has no record id")]
    MissingRecordId,

    /// The slot named by a record id holds no tuple.
    #[error("slot {slot} of page {page_id} is already empty")]
    EmptySlot { page_id: HeapPageId, slot: usize },

    /// The page has no free slot left.
    #[error("page {0} is full")]
    PageFull(HeapPageId),

    /// A tuple's schema does not match the table it is headed for.
    #[error("tuple schema does not match table schema")]
    SchemaMismatch,

    /// `open` was called on an iterator that is already open.
    #[error("iterator is already open")]
    IteratorAlreadyOpen,

    /// `next` or `rewind` was called on an iterator that is not open.
    #[error("iterator is not open")]
    IteratorNotOpen,
}

impl Error {
    /// Whether the error is expected to succeed on retry with a fresh
    /// transaction.
    ///
    /// Only the aborted-transaction condition qualifies; corruption and
    /// contract violations do not go away by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransactionAborted(_))
    }
}
