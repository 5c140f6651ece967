//! Aggregate - the grouping/reduction operator.

use crate::common::{Error, Result};
use crate::execution::{AggregateOp, Aggregator, DbIterator, Grouping, TupleIterator};
use crate::tuple::{Tuple, TupleDesc};

/// Computes one aggregate over a single column of its child, optionally
/// grouped by a single column.
///
/// The aggregator variant is picked at construction from the aggregated
/// field's declared type. On `open` the child is drained completely into
/// the aggregator and the per-group results are materialized as this
/// operator's own in-memory iterator; every `next` then reads from that
/// materialization.
///
/// `rewind` replays the materialized results and does NOT re-drain or
/// re-aggregate the child. If the child is not safely re-iterable between
/// this operator's open and close, the materialization and the child can
/// desynchronize; this behavior is deliberate and kept as-is.
pub struct Aggregate {
    child: Box<dyn DbIterator>,
    agg_field: usize,
    grouping: Grouping,
    op: AggregateOp,
    aggregator: Aggregator,
    desc: TupleDesc,
    results: Option<TupleIterator>,
    open: bool,
}

impl Aggregate {
    /// Create an aggregate of `op` over `child`'s field `agg_field`,
    /// grouped by `group_field` when given.
    ///
    /// # Panics
    /// Panics if `agg_field`/`group_field` are out of range for the child's
    /// schema, or if a string column is aggregated with anything but COUNT
    /// (the aggregator's fail-fast construction contract).
    pub fn new(
        child: Box<dyn DbIterator>,
        agg_field: usize,
        group_field: Option<usize>,
        op: AggregateOp,
    ) -> Self {
        let child_desc = child.tuple_desc();
        let grouping = match group_field {
            Some(g) => Grouping::by(g, child_desc.field_type(g)),
            None => Grouping::none(),
        };
        let aggregator =
            Aggregator::for_field_type(child_desc.field_type(agg_field), grouping, agg_field, op);
        let desc = aggregator.result_desc();

        Self {
            child,
            agg_field,
            grouping,
            op,
            aggregator,
            desc,
            results: None,
            open: false,
        }
    }

    /// The index of the aggregated field in the input tuples.
    pub fn aggregate_field(&self) -> usize {
        self.agg_field
    }

    /// The index of the group-by field in the input tuples, if grouping.
    pub fn group_field(&self) -> Option<usize> {
        self.grouping.field
    }

    /// The aggregation operator.
    pub fn aggregate_op(&self) -> AggregateOp {
        self.op
    }
}

impl DbIterator for Aggregate {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::IteratorAlreadyOpen);
        }
        self.child.open()?;

        // Drain the child into the aggregator once; the materialized
        // results serve every later fetch and rewind.
        if self.results.is_none() {
            while let Some(t) = self.child.next()? {
                self.aggregator.merge_tuple_into_group(&t);
            }
            self.results = Some(self.aggregator.results());
        }

        if let Some(results) = self.results.as_mut() {
            results.open()?;
        }
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        match self.results.as_mut() {
            Some(results) => results.next(),
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        // Replays the materialized results; the child is not re-drained.
        match self.results.as_mut() {
            Some(results) => results.rewind(),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.child.close();
        if let Some(results) = self.results.as_mut() {
            results.close();
        }
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }
}
