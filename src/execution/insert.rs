//! Insert - one-shot operator draining its child into a table.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::{Error, Result, TransactionId};
use crate::execution::DbIterator;
use crate::tuple::{Field, FieldType, Tuple, TupleDesc};

/// Inserts every child tuple into a table and reports the count.
///
/// On `open` the child is drained completely, exactly once, each tuple
/// routed through [`BufferPool::insert_tuple`]. The first `next` yields a
/// single one-field tuple (`"Inserted"`) carrying the count; every fetch
/// after that is end-of-stream. The drain latch is never reset, so neither
/// a second fetch nor a close/reopen cycle repeats the side effects.
///
/// A failure mid-drain propagates immediately; tuples already inserted are
/// not rolled back here, that is the transaction manager's job.
pub struct Insert {
    pool: Arc<BufferPool>,
    tid: TransactionId,
    child: Box<dyn DbIterator>,
    table_id: u32,
    desc: Arc<TupleDesc>,
    /// Count accumulated by the one-time drain.
    count: Option<usize>,
    /// Latched once the count tuple has been handed out.
    emitted: bool,
    open: bool,
}

impl Insert {
    /// Create an insert of `child`'s tuples into `table_id`.
    ///
    /// # Errors
    /// [`Error::SchemaMismatch`] if the child's schema differs from the
    /// table's. The storage layer trusts its caller, so the check happens
    /// here.
    pub fn new(
        pool: Arc<BufferPool>,
        tid: TransactionId,
        child: Box<dyn DbIterator>,
        table_id: u32,
    ) -> Result<Self> {
        let table_desc = pool.catalog().tuple_desc(table_id)?;
        if *child.tuple_desc() != *table_desc {
            return Err(Error::SchemaMismatch);
        }
        Ok(Self {
            pool,
            tid,
            child,
            table_id,
            desc: Arc::new(TupleDesc::new([(
                FieldType::Int,
                Some("Inserted".to_string()),
            )])),
            count: None,
            emitted: false,
            open: false,
        })
    }
}

impl DbIterator for Insert {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.child.open()?;
        self.open = true;

        if self.count.is_none() {
            let mut count = 0;
            while let Some(t) = self.child.next()? {
                self.pool.insert_tuple(self.tid, self.table_id, t)?;
                count += 1;
            }
            self.count = Some(count);
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        if self.emitted {
            return Ok(None);
        }
        let count = self.count.unwrap_or(0);
        self.emitted = true;
        Ok(Some(Tuple::new(
            self.desc.clone(),
            vec![Field::Int(count as i32)],
        )))
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        // The drain never reruns; rewinding only restarts the child.
        self.child.rewind()
    }

    fn close(&mut self) {
        self.open = false;
        self.child.close();
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }
}
