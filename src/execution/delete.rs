//! Delete - one-shot operator removing its child's tuples from storage.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::{Error, Result, TransactionId};
use crate::execution::DbIterator;
use crate::tuple::{Field, FieldType, Tuple, TupleDesc};

/// Deletes every tuple its child produces and reports the count.
///
/// The mirror image of [`Insert`](crate::execution::Insert): `open` drains
/// the child exactly once through [`BufferPool::delete_tuple`], the first
/// `next` yields a single one-field count tuple (`"Deleted"`), and every
/// later fetch is end-of-stream. Child tuples must carry record ids
/// (i.e. come from a scan) or the drain fails fast.
pub struct Delete {
    pool: Arc<BufferPool>,
    tid: TransactionId,
    child: Box<dyn DbIterator>,
    desc: Arc<TupleDesc>,
    count: Option<usize>,
    emitted: bool,
    open: bool,
}

impl Delete {
    /// Create a delete of `child`'s tuples.
    pub fn new(pool: Arc<BufferPool>, tid: TransactionId, child: Box<dyn DbIterator>) -> Self {
        Self {
            pool,
            tid,
            child,
            desc: Arc::new(TupleDesc::new([(
                FieldType::Int,
                Some("Deleted".to_string()),
            )])),
            count: None,
            emitted: false,
            open: false,
        }
    }
}

impl DbIterator for Delete {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.child.open()?;
        self.open = true;

        if self.count.is_none() {
            let mut count = 0;
            while let Some(t) = self.child.next()? {
                self.pool.delete_tuple(self.tid, &t)?;
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
