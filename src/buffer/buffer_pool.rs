//! Buffer pool - the shared page cache every storage path routes through.
//!
//! The [`BufferPool`] supplies pages by `(transaction, page id, mode)`:
//! - Page caching between heap files and memory
//! - Dirty-page tracking per transaction
//! - Transaction-end flush/discard hooks
//! - FIFO eviction with write-back

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::buffer::replacer::FifoReplacer;
use crate::buffer::BufferPoolStats;
use crate::catalog::Catalog;
use crate::common::{Error, HeapPageId, Result, TransactionId};
use crate::storage::HeapPage;
use crate::tuple::Tuple;

/// How a page is being acquired.
///
/// This is the contract consumed by the external lock coordinator: every
/// page access announces the transaction and the intended mode, and the
/// acquisition may block until the matching lock is granted, or fail with
/// [`Error::TransactionAborted`] when the coordinator gives up on the
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Shared read access.
    ReadOnly,
    /// Exclusive access for mutation.
    ReadWrite,
}

/// Caches decoded heap pages keyed by page id.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                         BufferPool                          │
/// │  ┌──────────────────────────┐  ┌─────────────────────────┐  │
/// │  │ pages                    │  │ dirty                   │  │
/// │  │ PageId → Arc<RwLock<..>> │  │ PageId → TransactionId  │  │
/// │  └──────────────────────────┘  └─────────────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
/// │  │   replacer   │  │   catalog    │  │    stats     │       │
/// │  │ FifoReplacer │  │ Arc<Catalog> │  │   atomics    │       │
/// │  └──────────────┘  └──────────────┘  └──────────────┘       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The pool exclusively owns live page buffers; heap files keep only
/// identity and codec logic. Insert/delete go through [`BufferPool::insert_tuple`]
/// and [`BufferPool::delete_tuple`] so the mutated pages are marked dirty
/// here, and dirty pages are written back through their owning heap file on
/// eviction, explicit flush, or transaction commit.
///
/// # Thread Safety
/// - `pages`: `RwLock` (many readers, few writers)
/// - `replacer` / `dirty`: `Mutex` (internal state changes on access)
/// - `stats`: no lock, all atomic counters
pub struct BufferPool {
    /// Resolves page ids to heap files for fetch and write-back.
    catalog: Arc<Catalog>,

    /// Cached pages keyed by page id.
    pages: RwLock<HashMap<HeapPageId, Arc<RwLock<HeapPage>>>>,

    /// Eviction policy for selecting victim pages.
    replacer: Mutex<FifoReplacer>,

    /// Pages modified since load, with the transaction that dirtied them.
    dirty: Mutex<HashMap<HeapPageId, TransactionId>>,

    /// Performance statistics.
    stats: BufferPoolStats,

    /// Maximum number of cached pages (immutable after construction).
    pool_size: usize,
}

impl BufferPool {
    /// Create a new buffer pool.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, catalog: Arc<Catalog>) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        Self {
            catalog,
            pages: RwLock::new(HashMap::new()),
            replacer: Mutex::new(FifoReplacer::new()),
            dirty: Mutex::new(HashMap::new()),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    /// The catalog this pool resolves pages against.
    #[inline]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    // ========================================================================
    // Public API: page acquisition
    // ========================================================================

    /// Fetch a page on behalf of `tid` in the given mode.
    ///
    /// This is the single seam between tuple storage and the external lock
    /// coordinator: a deployment with locking acquires the page lock for
    /// `(tid, pid, mode)` here, blocking until granted or surfacing
    /// [`Error::TransactionAborted`]. Without one, the call only caches.
    ///
    /// # Errors
    /// - [`Error::TableNotFound`] if no catalog entry owns the page
    /// - [`Error::ShortRead`] if the page lies beyond its file's end
    pub fn get_page(
        &self,
        tid: TransactionId,
        pid: HeapPageId,
        mode: AccessMode,
    ) -> Result<Arc<RwLock<HeapPage>>> {
        let _ = (tid, mode); // consumed by the external lock coordinator

        // Fast path: page already cached (read lock only).
        {
            let pages = self.pages.read();
            if let Some(page) = pages.get(&pid) {
                self.stats.record_hit();
                return Ok(Arc::clone(page));
            }
        }

        self.stats.record_miss();

        // Miss: decode from the owning heap file outside the map lock.
        let file = self.catalog.file(pid.table_id())?;
        let loaded = file.read_page(pid)?;

        let mut pages = self.pages.write();
        // Another thread may have loaded the page meanwhile.
        if let Some(page) = pages.get(&pid) {
            return Ok(Arc::clone(page));
        }
        if pages.len() >= self.pool_size {
            self.evict_locked(&mut pages)?;
        }

        let page = Arc::new(RwLock::new(loaded));
        pages.insert(pid, Arc::clone(&page));
        self.replacer.lock().record_access(pid);
        Ok(page)
    }

    // ========================================================================
    // Public API: tuple mutation (dirty-marking wrappers)
    // ========================================================================

    /// Insert `tuple` into the table `table_id`, marking the mutated page
    /// dirty on behalf of `tid`.
    pub fn insert_tuple(&self, tid: TransactionId, table_id: u32, tuple: Tuple) -> Result<()> {
        let file = self.catalog.file(table_id)?;
        let pid = file.insert_tuple(tid, tuple, self)?;
        self.mark_dirty(pid, tid);
        Ok(())
    }

    /// Delete `tuple` from the table its record id names, marking the
    /// mutated page dirty on behalf of `tid`.
    pub fn delete_tuple(&self, tid: TransactionId, tuple: &Tuple) -> Result<()> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let file = self.catalog.file(rid.page_id().table_id())?;
        let pid = file.delete_tuple(tid, tuple, self)?;
        self.mark_dirty(pid, tid);
        Ok(())
    }

    /// Record that `tid` modified the cached page `pid`.
    pub fn mark_dirty(&self, pid: HeapPageId, tid: TransactionId) {
        self.dirty.lock().insert(pid, tid);
    }

    // ========================================================================
    // Public API: flushing and transaction hooks
    // ========================================================================

    /// Write the page back to its heap file if it is dirty.
    pub fn flush_page(&self, pid: HeapPageId) -> Result<()> {
        let page = self.pages.read().get(&pid).cloned();
        if let Some(page) = page {
            if self.dirty.lock().remove(&pid).is_some() {
                let file = self.catalog.file(pid.table_id())?;
                file.write_page(&page.read())?;
                self.stats.record_write_back();
            }
        }
        Ok(())
    }

    /// Write back every dirty page.
    pub fn flush_all_pages(&self) -> Result<()> {
        let dirty: Vec<HeapPageId> = self.dirty.lock().keys().copied().collect();
        for pid in dirty {
            self.flush_page(pid)?;
        }
        Ok(())
    }

    /// Transaction-end hook.
    ///
    /// On commit, the transaction's dirty pages are written back; on abort,
    /// their cached copies are discarded so the next fetch re-reads the
    /// on-disk image from before the transaction's writes.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        let mine: Vec<HeapPageId> = self
            .dirty
            .lock()
            .iter()
            .filter(|(_, &owner)| owner == tid)
            .map(|(&pid, _)| pid)
            .collect();

        if commit {
            for pid in mine {
                self.flush_page(pid)?;
            }
        } else {
            let mut pages = self.pages.write();
            let mut replacer = self.replacer.lock();
            let mut dirty = self.dirty.lock();
            for pid in mine {
                pages.remove(&pid);
                replacer.remove(pid);
                dirty.remove(&pid);
                debug!(page = %pid, tx = %tid, "discarded aborted page image");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Public API: stats and info
    // ========================================================================

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Get the number of pages currently cached.
    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }

    // ========================================================================
    // Internal: eviction
    // ========================================================================

    /// Evict one page. Called with the page map write-locked.
    fn evict_locked(&self, pages: &mut HashMap<HeapPageId, Arc<RwLock<HeapPage>>>) -> Result<()> {
        let mut replacer = self.replacer.lock();
        while let Some(victim) = replacer.evict() {
            let Some(page) = pages.get(&victim) else {
                continue; // Stale replacer entry; try the next victim.
            };

            // Write back before dropping the only up-to-date copy.
            if self.dirty.lock().remove(&victim).is_some() {
                let file = self.catalog.file(victim.table_id())?;
                file.write_page(&page.read())?;
                self.stats.record_write_back();
            }

            pages.remove(&victim);
            self.stats.record_eviction();
            debug!(page = %victim, "evicted page");
            return Ok(());
        }
        // Every cached page was already claimed by a concurrent removal.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HeapFile;
    use crate::tuple::{Field, FieldType, TupleDesc};
    use tempfile::{tempdir, TempDir};

    fn two_int_desc() -> Arc<TupleDesc> {
        Arc::new(TupleDesc::unnamed([FieldType::Int, FieldType::Int]))
    }

    fn int_tuple(desc: &Arc<TupleDesc>, a: i32, b: i32) -> Tuple {
        Tuple::new(desc.clone(), vec![Field::Int(a), Field::Int(b)])
    }

    fn setup(pool_size: usize) -> (Arc<HeapFile>, Arc<BufferPool>, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.dat");
        let file = Arc::new(HeapFile::create(&path, two_int_desc()).unwrap());

        let catalog = Arc::new(Catalog::new());
        catalog.add_table(file.clone(), "t");
        let pool = Arc::new(BufferPool::new(pool_size, catalog));
        (file, pool, dir)
    }

    /// Fill page 0 of the file directly so fetches have something to read.
    fn seed_page(file: &HeapFile, values: &[i32]) {
        let desc = file.tuple_desc().clone();
        let pid = HeapPageId::new(file.id(), 0);
        let mut page = HeapPage::empty(pid, desc.clone());
        for &v in values {
            page.insert_tuple(int_tuple(&desc, v, 0)).unwrap();
        }
        file.write_page(&page).unwrap();
    }

    #[test]
    fn test_get_page_caches() {
        let (file, pool, _dir) = setup(4);
        seed_page(&file, &[1, 2, 3]);

        let tid = TransactionId::new();
        let pid = HeapPageId::new(file.id(), 0);

        let first = pool.get_page(tid, pid, AccessMode::ReadOnly).unwrap();
        let second = pool.get_page(tid, pid, AccessMode::ReadOnly).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let snap = pool.stats().snapshot();
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.hits, 1);
    }

    #[test]
    fn test_get_unknown_table_fails() {
        let (_file, pool, _dir) = setup(4);
        let tid = TransactionId::new();

        let result = pool.get_page(tid, HeapPageId::new(0xDEAD, 0), AccessMode::ReadOnly);
        match result {
            Err(Error::TableNotFound(_)) => {}
            other => panic!("expected TableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_marks_dirty_and_flushes() {
        let (file, pool, _dir) = setup(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        pool.insert_tuple(tid, file.id(), int_tuple(&desc, 7, 8))
            .unwrap();
        pool.flush_all_pages().unwrap();

        // The on-disk image now contains the tuple.
        let page = file.read_page(HeapPageId::new(file.id(), 0)).unwrap();
        assert_eq!(page.iter().count(), 1);
        assert_eq!(pool.stats().snapshot().write_backs, 1);
    }

    #[test]
    fn test_eviction_writes_back_dirty_pages() {
        let (file, pool, _dir) = setup(1);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        // Dirty page 0 via insert, then force an eviction by appending a
        // second page and fetching it through the 1-page pool.
        pool.insert_tuple(tid, file.id(), int_tuple(&desc, 1, 1))
            .unwrap();

        let pid1 = HeapPageId::new(file.id(), 1);
        let page1 = HeapPage::empty(pid1, desc.clone());
        file.write_page(&page1).unwrap();
        pool.get_page(tid, pid1, AccessMode::ReadOnly).unwrap();

        assert_eq!(pool.page_count(), 1);
        assert!(pool.stats().snapshot().evictions >= 1);

        // The dirtied page survived the round trip to disk.
        let page0 = file.read_page(HeapPageId::new(file.id(), 0)).unwrap();
        assert_eq!(page0.iter().count(), 1);
    }

    #[test]
    fn test_abort_discards_page_images() {
        let (file, pool, _dir) = setup(4);
        let desc = file.tuple_desc().clone();
        seed_page(&file, &[1]);

        let tid = TransactionId::new();
        pool.insert_tuple(tid, file.id(), int_tuple(&desc, 2, 0))
            .unwrap();
        pool.transaction_complete(tid, false).unwrap();

        // The cached image was discarded; a re-fetch sees only the
        // pre-transaction tuple.
        let fresh = TransactionId::new();
        let page = pool
            .get_page(fresh, HeapPageId::new(file.id(), 0), AccessMode::ReadOnly)
            .unwrap();
        assert_eq!(page.read().iter().count(), 1);
    }

    #[test]
    fn test_commit_flushes_own_pages_only() {
        let (file, pool, _dir) = setup(4);
        let desc = file.tuple_desc().clone();

        let committing = TransactionId::new();
        pool.insert_tuple(committing, file.id(), int_tuple(&desc, 1, 0))
            .unwrap();
        pool.transaction_complete(committing, true).unwrap();

        assert_eq!(pool.stats().snapshot().write_backs, 1);
        let page = file.read_page(HeapPageId::new(file.id(), 0)).unwrap();
        assert_eq!(page.iter().count(), 1);
    }
}
