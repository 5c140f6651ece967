//! Execution layer - the pull-based operator tree.
//!
//! Query plans execute as trees of operators sharing one iterator contract,
//! [`DbIterator`]. The tree is pulled depth-first: each `next` call on the
//! root pulls from its child, down to a [`SeqScan`] leaf pulling tuples out
//! of a heap file through the buffer pool.
//!
//! # Operators
//! - [`SeqScan`] - sequential table scan with alias-qualified field names
//! - [`Filter`] - relational select over a [`Predicate`]
//! - [`Insert`] / [`Delete`] - one-shot side-effecting drains
//! - [`Aggregate`] - grouping/reduction over an [`Aggregator`]
//! - [`TupleIterator`] - materialized in-memory tuple sequence

mod aggregate;
mod aggregator;
mod delete;
mod filter;
mod insert;
mod predicate;
mod seq_scan;
mod tuple_iterator;

pub use aggregate::Aggregate;
pub use aggregator::{AggregateOp, Aggregator, Grouping, IntegerAggregator, StringAggregator};
pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use predicate::Predicate;
pub use seq_scan::SeqScan;
pub use tuple_iterator::TupleIterator;

use crate::common::Result;
use crate::tuple::{Tuple, TupleDesc};

/// The uniform pull-iterator contract shared by file iteration and every
/// operator.
///
/// # Lifecycle
/// `open` → (`next` | `rewind`)* → `close`, where:
/// - `open` on an already open iterator fails
///   ([`crate::common::Error::IteratorAlreadyOpen`]);
/// - `next` produces the next tuple or `Ok(None)` at end-of-stream;
///   end-of-stream is a benign signal, never an error;
/// - `rewind` replays the same result sequence deterministically given
///   stable inputs;
/// - `close` is always safe, even mid-stream, and releases all resources.
///
/// Operators always propagate `open`/`close` to their children, and pass
/// child errors through unchanged. In particular a retryable
/// [`crate::common::Error::TransactionAborted`] must bubble to the top
/// rather than truncate the stream into a plausible partial result.
pub trait DbIterator {
    /// Open the iterator. Must be called before `next`.
    fn open(&mut self) -> Result<()>;

    /// Produce the next tuple, or `Ok(None)` at end-of-stream.
    fn next(&mut self) -> Result<Option<Tuple>>;

    /// Restart the sequence from the beginning.
    fn rewind(&mut self) -> Result<()>;

    /// Close the iterator, releasing all resources. Safe mid-stream.
    fn close(&mut self);

    /// The schema of the tuples this iterator produces.
    fn tuple_desc(&self) -> &TupleDesc;
}
