//! In-memory materialized tuple sequence.

use std::sync::Arc;

use crate::common::{Error, Result};
use crate::execution::DbIterator;
use crate::tuple::{Tuple, TupleDesc};

/// A [`DbIterator`] over an already materialized list of tuples.
///
/// Backs the aggregate operator's result set and makes a convenient typed
/// source in tests. Rewind just resets the cursor.
pub struct TupleIterator {
    desc: Arc<TupleDesc>,
    tuples: Vec<Tuple>,
    cursor: usize,
    open: bool,
}

impl TupleIterator {
    /// Create an iterator over `tuples`, all conforming to `desc`.
    pub fn new(desc: Arc<TupleDesc>, tuples: Vec<Tuple>) -> Self {
        debug_assert!(tuples.iter().all(|t| **t.tuple_desc() == *desc));
        Self {
            desc,
            tuples,
            cursor: 0,
            open: false,
        }
    }

    /// Number of materialized tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

impl DbIterator for TupleIterator {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.cursor = 0;
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        match self.tuples.get(self.cursor) {
            Some(t) => {
                self.cursor += 1;
                Ok(Some(t.clone()))
            }
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.cursor = 0;
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }
}
