//! Heap file - page-granular file I/O for one table.
//!
//! A [`HeapFile`] stores a collection of tuples in no particular order as a
//! sequence of fixed-size [`HeapPage`]s. The file object owns only identity
//! (table id, path), geometry (page count), and the encode/decode logic;
//! live page buffers belong to the buffer pool, and every tuple-level
//! operation routes its page fetches through it so the external lock
//! coordinator observes each access.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::buffer::{AccessMode, BufferPool};
use crate::common::config::PAGE_SIZE;
use crate::common::{Error, HeapPageId, Result, TransactionId};
use crate::execution::DbIterator;
use crate::storage::heap_page::HeapPage;
use crate::tuple::{Tuple, TupleDesc};

/// One table's on-disk backing store.
///
/// # File Layout
/// Pages are laid out sequentially, page `n` at byte offset
/// `n × PAGE_SIZE`:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │  ...    │ Page N-1│
/// │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┘
/// ```
/// The file length is always an exact multiple of `PAGE_SIZE`: pages are
/// appended, never removed. A deleted tuple just empties its slot.
///
/// # Identity
/// The table id is the CRC32 of the canonical storage path, so the same
/// file always yields the same id, and the id is embedded in every page id
/// and record id the file produces.
pub struct HeapFile {
    file: Mutex<File>,
    path: PathBuf,
    table_id: u32,
    desc: Arc<TupleDesc>,
}

impl HeapFile {
    /// Create a new heap file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, desc: Arc<TupleDesc>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        Self::from_parts(file, path.as_ref(), desc)
    }

    /// Open an existing heap file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, desc: Arc<TupleDesc>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_parts(file, path.as_ref(), desc)
    }

    /// Open an existing heap file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P, desc: Arc<TupleDesc>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, desc)
        } else {
            Self::create(path, desc)
        }
    }

    fn from_parts(file: File, path: &Path, desc: Arc<TupleDesc>) -> Result<Self> {
        let path = path.canonicalize()?;
        let table_id = crc32fast::hash(path.to_string_lossy().as_bytes());
        Ok(Self {
            file: Mutex::new(file),
            path,
            table_id,
            desc,
        })
    }

    /// The stable id of this heap file.
    #[inline]
    pub fn id(&self) -> u32 {
        self.table_id
    }

    /// The schema of tuples stored in this file.
    #[inline]
    pub fn tuple_desc(&self) -> &Arc<TupleDesc> {
        &self.desc
    }

    /// The canonical path of the backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in this file.
    pub fn num_pages(&self) -> Result<u32> {
        let len = self.file.lock().metadata()?.len();
        Ok(((len + PAGE_SIZE as u64 - 1) / PAGE_SIZE as u64) as u32)
    }

    /// Read and decode one page straight from disk.
    ///
    /// Callers other than the buffer pool should go through
    /// [`BufferPool::get_page`] so the access is observable.
    ///
    /// # Errors
    /// [`Error::ShortRead`] if the page lies beyond the end of the file;
    /// the on-disk state is then inconsistent with metadata and must not be
    /// silently continued past.
    pub fn read_page(&self, pid: HeapPageId) -> Result<HeapPage> {
        debug_assert_eq!(pid.table_id(), self.table_id, "page from a different file");

        let mut file = self.file.lock();
        let file_len = file.metadata()?.len();
        let offset = pid.page_no() as u64 * PAGE_SIZE as u64;
        if offset + PAGE_SIZE as u64 > file_len {
            error!(page = %pid, file_len, "page offset exceeds heap file length");
            return Err(Error::ShortRead {
                page_id: pid,
                file_len,
            });
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut data = [0u8; PAGE_SIZE];
        file.read_exact(&mut data)?;
        Ok(HeapPage::from_bytes(pid, self.desc.clone(), &data))
    }

    /// Encode and write one page at its offset, extending the file when the
    /// page is the next one past the current end.
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        debug_assert_eq!(page.id().table_id(), self.table_id);

        let mut file = self.file.lock();
        let offset = page.id().page_no() as u64 * PAGE_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&page.to_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Append a zeroed empty-page image at the end of the file.
    fn append_empty_page(&self, pid: HeapPageId) -> Result<()> {
        let mut file = self.file.lock();
        let offset = pid.page_no() as u64 * PAGE_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&HeapPage::empty_page_data())?;
        file.sync_all()?;
        debug!(page = %pid, "heap file grew by one page");
        Ok(())
    }

    /// Store `tuple` on the first page with a free slot, appending a fresh
    /// page when every existing one is full. Returns the id of the single
    /// page mutated; the caller marks it dirty.
    ///
    /// Every candidate page is fetched through the buffer pool in
    /// [`AccessMode::ReadWrite`]. Schema compatibility is the caller's
    /// responsibility.
    pub fn insert_tuple(
        &self,
        tid: TransactionId,
        tuple: Tuple,
        pool: &BufferPool,
    ) -> Result<HeapPageId> {
        let mut pending = Some(tuple);

        for page_no in 0..self.num_pages()? {
            let pid = HeapPageId::new(self.table_id, page_no);
            let page = pool.get_page(tid, pid, AccessMode::ReadWrite)?;
            let mut guard = page.write();
            if guard.empty_slot_count() > 0 {
                let t = pending.take().expect("tuple consumed twice");
                guard.insert_tuple(t)?;
                return Ok(pid);
            }
        }

        // Every page is full: append a zeroed image, then insert through
        // the pool so the new page is cached and the access observed.
        let pid = HeapPageId::new(self.table_id, self.num_pages()?);
        self.append_empty_page(pid)?;
        let page = pool.get_page(tid, pid, AccessMode::ReadWrite)?;
        let t = pending.take().expect("tuple consumed twice");
        page.write().insert_tuple(t)?;
        Ok(pid)
    }

    /// Remove `tuple` from the slot its record id names. Returns the id of
    /// the single page mutated; the caller marks it dirty.
    ///
    /// # Errors
    /// - [`Error::MissingRecordId`] if the tuple was never persisted.
    /// - [`Error::ForeignTuple`] if the record id points into another file.
    /// - [`Error::EmptySlot`] if the slot is already vacant.
    pub fn delete_tuple(
        &self,
        tid: TransactionId,
        tuple: &Tuple,
        pool: &BufferPool,
    ) -> Result<HeapPageId> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let pid = rid.page_id();
        if pid.table_id() != self.table_id {
            return Err(Error::ForeignTuple(pid, self.table_id));
        }

        let page = pool.get_page(tid, pid, AccessMode::ReadWrite)?;
        page.write().delete_tuple(rid)?;
        Ok(pid)
    }

    /// A lazy, restartable iterator over every tuple in the file: pages
    /// 0..N-1 in order, occupied slots in slot order within each page.
    pub fn iterator(
        self: &Arc<Self>,
        tid: TransactionId,
        pool: Arc<BufferPool>,
    ) -> HeapFileIterator {
        HeapFileIterator {
            file: Arc::clone(self),
            pool,
            tid,
            next_page: 0,
            current: VecDeque::new(),
            open: false,
        }
    }
}

/// Pull-iterator over all tuples of one heap file.
///
/// Pulls one page at a time through the buffer pool ([`AccessMode::ReadOnly`])
/// and drains its occupied slots in slot order, so within one lifetime the
/// output order is deterministic absent concurrent mutation. Rewind is
/// close-then-reopen. Any page fetch may block on (or be aborted by) the
/// external lock coordinator behind the pool.
pub struct HeapFileIterator {
    file: Arc<HeapFile>,
    pool: Arc<BufferPool>,
    tid: TransactionId,
    /// Next page number to pull.
    next_page: u32,
    /// Tuples of the current page not yet handed out.
    current: VecDeque<Tuple>,
    open: bool,
}

impl DbIterator for HeapFileIterator {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.next_page = 0;
        self.current.clear();
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        loop {
            if let Some(t) = self.current.pop_front() {
                return Ok(Some(t));
            }
            if self.next_page >= self.file.num_pages()? {
                return Ok(None);
            }
            let pid = HeapPageId::new(self.file.id(), self.next_page);
            self.next_page += 1;
            let page = self.pool.get_page(self.tid, pid, AccessMode::ReadOnly)?;
            self.current.extend(page.read().iter().cloned());
        }
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        self.close();
        self.open()
    }

    fn close(&mut self) {
        self.open = false;
        self.current.clear();
    }

    fn tuple_desc(&self) -> &TupleDesc {
        self.file.tuple_desc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::tuple::{Field, FieldType};
    use tempfile::{tempdir, TempDir};

    fn two_int_desc() -> Arc<TupleDesc> {
        Arc::new(TupleDesc::unnamed([FieldType::Int, FieldType::Int]))
    }

    fn int_tuple(desc: &Arc<TupleDesc>, a: i32, b: i32) -> Tuple {
        Tuple::new(desc.clone(), vec![Field::Int(a), Field::Int(b)])
    }

    fn create_table(pool_size: usize) -> (Arc<HeapFile>, Arc<BufferPool>, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.dat");
        let file = Arc::new(HeapFile::create(&path, two_int_desc()).unwrap());

        let catalog = Arc::new(Catalog::new());
        catalog.add_table(file.clone(), "t");
        let pool = Arc::new(BufferPool::new(pool_size, catalog));
        (file, pool, dir)
    }

    #[test]
    fn test_create_empty_file() {
        let (file, _pool, _dir) = create_table(4);
        assert_eq!(file.num_pages().unwrap(), 0);
    }

    #[test]
    fn test_stable_id_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        let a = HeapFile::create(&path, two_int_desc()).unwrap();
        let b = HeapFile::open(&path, two_int_desc()).unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_write_read_page_roundtrip() {
        let (file, _pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();

        let pid = HeapPageId::new(file.id(), 0);
        let mut page = HeapPage::empty(pid, desc.clone());
        page.insert_tuple(int_tuple(&desc, 5, 6)).unwrap();
        file.write_page(&page).unwrap();

        let read_back = file.read_page(pid).unwrap();
        assert_eq!(read_back.to_bytes(), page.to_bytes());
        assert_eq!(file.num_pages().unwrap(), 1);
    }

    #[test]
    fn test_short_read_is_corruption() {
        let (file, _pool, _dir) = create_table(4);

        let beyond = HeapPageId::new(file.id(), 3);
        match file.read_page(beyond) {
            Err(Error::ShortRead { .. }) => {}
            other => panic!("expected ShortRead, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_grows_file() {
        let (file, pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        let pid = file
            .insert_tuple(tid, int_tuple(&desc, 1, 2), &pool)
            .unwrap();
        assert_eq!(pid.page_no(), 0);
        assert_eq!(file.num_pages().unwrap(), 1);

        // A second insert lands on the same page.
        let pid2 = file
            .insert_tuple(tid, int_tuple(&desc, 3, 4), &pool)
            .unwrap();
        assert_eq!(pid2, pid);
        assert_eq!(file.num_pages().unwrap(), 1);
    }

    #[test]
    fn test_delete_foreign_tuple_rejected() {
        let (file, pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        let mut t = int_tuple(&desc, 1, 2);
        t.set_record_id(Some(crate::common::RecordId::new(
            HeapPageId::new(file.id().wrapping_add(1), 0),
            0,
        )));

        match file.delete_tuple(tid, &t, &pool) {
            Err(Error::ForeignTuple(_, _)) => {}
            other => panic!("expected ForeignTuple, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_unpersisted_tuple_rejected() {
        let (file, pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        let t = int_tuple(&desc, 1, 2);
        match file.delete_tuple(tid, &t, &pool) {
            Err(Error::MissingRecordId) => {}
            other => panic!("expected MissingRecordId, got {:?}", other),
        }
    }

    #[test]
    fn test_iterator_scans_in_order() {
        let (file, pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        for i in 0..20 {
            pool.insert_tuple(tid, file.id(), int_tuple(&desc, i, i * 2))
                .unwrap();
        }

        let mut it = file.iterator(tid, pool.clone());
        it.open().unwrap();
        let mut seen = Vec::new();
        while let Some(t) = it.next().unwrap() {
            match t.field(0) {
                Field::Int(v) => seen.push(*v),
                _ => unreachable!(),
            }
        }
        it.close();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_iterator_rewind_replays() {
        let (file, pool, _dir) = create_table(4);
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();

        for i in 0..5 {
            pool.insert_tuple(tid, file.id(), int_tuple(&desc, i, 0))
                .unwrap();
        }

        let mut it = file.iterator(tid, pool.clone());
        it.open().unwrap();
        let mut first = Vec::new();
        while let Some(t) = it.next().unwrap() {
            first.push(t.field(0).clone());
        }

        it.rewind().unwrap();
        let mut second = Vec::new();
        while let Some(t) = it.next().unwrap() {
            second.push(t.field(0).clone());
        }
        it.close();

        assert_eq!(first, second);
    }

    #[test]
    fn test_iterator_requires_open() {
        let (file, pool, _dir) = create_table(4);
        let tid = TransactionId::new();

        let mut it = file.iterator(tid, pool.clone());
        match it.next() {
            Err(Error::IteratorNotOpen) => {}
            other => panic!("expected IteratorNotOpen, got {:?}", other),
        }

        it.open().unwrap();
        match it.open() {
            Err(Error::IteratorAlreadyOpen) => {}
            other => panic!("expected IteratorAlreadyOpen, got {:?}", other),
        }
    }
}
