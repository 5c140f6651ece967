//! heapdb - an embedded query execution engine with heap-file storage and
//! cost-based table statistics.
//!
//! heapdb sits under an external SQL parser and planner: it stores tuples
//! in page-oriented heap files, executes plans as pull-based operator
//! trees, and serves the per-table statistics a cost-based optimizer needs
//! to price scans and joins.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            heapdb                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │            Execution Layer (execution/)                 │    │
//! │  │   SeqScan → Filter → Aggregate / Insert / Delete        │    │
//! │  │        one DbIterator contract, pulled depth-first      │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │            ↓                                    ↘               │
//! │  ┌──────────────────────────────┐   ┌──────────────────────┐    │
//! │  │     Buffer Pool (buffer/)    │   │ Statistics (stats/)  │    │
//! │  │  get_page(tid, pid, mode)    │   │ histograms, costs,   │    │
//! │  │  dirty tracking, txn hooks,  │   │ cardinality, the     │    │
//! │  │  FIFO eviction               │   │ StatsService         │    │
//! │  └──────────────────────────────┘   └──────────────────────┘    │
//! │            ↓                                                    │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │             Storage Layer (storage/)                    │    │
//! │  │   HeapFile + HeapPage (bitmap + fixed-size slots)       │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - shared primitives (ids, error type, config)
//! - [`tuple`] - field values, schemas, tuples
//! - [`storage`] - heap files and slotted pages
//! - [`buffer`] - the shared page cache every access routes through
//! - [`catalog`] - the table registry
//! - [`execution`] - the pull-based operator tree
//! - [`stats`] - histograms and table statistics
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use heapdb::{
//!     Database, DbIterator, Field, FieldType, HeapFile, SeqScan, TransactionId, Tuple,
//!     TupleDesc,
//! };
//!
//! let db = Database::new();
//!
//! // Register a two-column table.
//! let desc = Arc::new(TupleDesc::new([
//!     (FieldType::Int, Some("id".to_string())),
//!     (FieldType::Int, Some("score".to_string())),
//! ]));
//! let file = Arc::new(HeapFile::create("scores.dat", desc.clone()).unwrap());
//! let table_id = db.catalog().add_table(file, "scores");
//!
//! // Insert a row and scan it back.
//! let tid = TransactionId::new();
//! let row = Tuple::new(desc, vec![Field::Int(1), Field::Int(90)]);
//! db.buffer_pool().insert_tuple(tid, table_id, row).unwrap();
//!
//! let mut scan = SeqScan::new(
//!     db.catalog().clone(),
//!     db.buffer_pool().clone(),
//!     tid,
//!     table_id,
//!     Some("s"),
//! )
//! .unwrap();
//! scan.open().unwrap();
//! while let Some(t) = scan.next().unwrap() {
//!     println!("{}", t);
//! }
//! scan.close();
//! ```
//!
//! # Concurrency
//! Execution is synchronous: one logical thread pulls each operator tree.
//! Transactions interact only through the shared [`buffer::BufferPool`],
//! whose `get_page(tid, pid, mode)` call is the seam where an external
//! lock coordinator serializes conflicting access, and where an aborted
//! transaction surfaces as the retryable
//! [`common::Error::TransactionAborted`].

// Core modules
pub mod buffer;
pub mod catalog;
pub mod common;
pub mod execution;
pub mod stats;
pub mod storage;
pub mod tuple;

mod database;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, HeapPageId, RecordId, Result, TransactionId};

pub use buffer::{AccessMode, BufferPool, BufferPoolStats, StatsSnapshot};
pub use catalog::Catalog;
pub use database::Database;
pub use execution::{
    Aggregate, AggregateOp, Aggregator, DbIterator, Delete, Filter, Insert, Predicate, SeqScan,
    TupleIterator,
};
pub use stats::{IntHistogram, StatsService, StringHistogram, TableStats};
pub use storage::{HeapFile, HeapFileIterator, HeapPage};
pub use tuple::{Field, FieldType, Op, Tuple, TupleDesc};
