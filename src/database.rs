//! Database - ties the catalog and buffer pool together.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::Catalog;
use crate::common::config::DEFAULT_POOL_SIZE;

/// One engine instance: a catalog plus the buffer pool reading through it.
///
/// Constructed explicitly and passed where needed; there is no hidden
/// global instance. Operators and the statistics service borrow the two
/// `Arc` handles and share them freely across transactions.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use heapdb::{Database, FieldType, HeapFile, TupleDesc};
///
/// let db = Database::new();
/// let desc = Arc::new(TupleDesc::unnamed([FieldType::Int, FieldType::Int]));
/// let file = Arc::new(HeapFile::create("users.dat", desc).unwrap());
/// let table_id = db.catalog().add_table(file, "users");
/// # let _ = table_id;
/// ```
pub struct Database {
    catalog: Arc<Catalog>,
    buffer_pool: Arc<BufferPool>,
}

impl Database {
    /// Create an engine with the default buffer pool size.
    pub fn new() -> Self {
        Self::with_pool_size(DEFAULT_POOL_SIZE)
    }

    /// Create an engine whose buffer pool holds `pool_size` pages.
    pub fn with_pool_size(pool_size: usize) -> Self {
        let catalog = Arc::new(Catalog::new());
        let buffer_pool = Arc::new(BufferPool::new(pool_size, Arc::clone(&catalog)));
        Self {
            catalog,
            buffer_pool,
        }
    }

    /// The table registry.
    #[inline]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The shared page cache.
    #[inline]
    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
