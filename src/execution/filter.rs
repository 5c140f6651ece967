//! Filter - the relational select operator.

use crate::common::{Error, Result};
use crate::execution::{DbIterator, Predicate};
use crate::tuple::{Tuple, TupleDesc};

/// Passes through the child tuples satisfying a [`Predicate`].
///
/// Side-effect free: each `next` pulls child tuples until one passes or
/// the child is exhausted, so repeated rewind-and-drain over stable input
/// reproduces the identical sequence.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn DbIterator>,
    open: bool,
}

impl Filter {
    /// Create a filter over `child`.
    pub fn new(predicate: Predicate, child: Box<dyn DbIterator>) -> Self {
        Self {
            predicate,
            child,
            open: false,
        }
    }

    /// The predicate applied to each tuple.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl DbIterator for Filter {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.child.open()?;
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        while let Some(t) = self.child.next()? {
            if self.predicate.filter(&t) {
                return Ok(Some(t));
            }
        }
        Ok(None)
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
        self.child.tuple_desc()
    }
}
