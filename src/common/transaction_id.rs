//! Transaction identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter backing transaction id allocation.
static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies one transaction.
///
/// Every page acquisition carries a transaction id so the external lock
/// coordinator can attribute the access; the buffer pool also uses it to
/// track which transaction dirtied which page. Ids are allocated from a
/// process-wide atomic counter and are unique for the life of the process.
///
/// # Example
/// ```
/// use heapdb::TransactionId;
///
/// let a = TransactionId::new();
/// let b = TransactionId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Allocate a fresh transaction id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tx({})", self.0)
    }
}
