//! Aggregators - grouping/reduction engines behind the aggregate operator.
//!
//! An [`Aggregator`] folds a stream of tuples into per-group accumulators
//! and materializes one result row per group. The variant (integer or
//! string) is chosen once, from the aggregated field's declared type, at
//! the single construction point; everything downstream matches on the
//! union exhaustively.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::execution::TupleIterator;
use crate::tuple::{Field, FieldType, Tuple, TupleDesc};

/// The supported aggregation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Count => "count",
        };
        write!(f, "{}", s)
    }
}

/// Grouping configuration: the group-by field index and type, or no
/// grouping at all. `None` is the sentinel meaning "fold the whole input
/// into one group".
#[derive(Debug, Clone, Copy)]
pub struct Grouping {
    /// Index of the group-by field in the input tuples, if grouping.
    pub field: Option<usize>,
    /// Type of the group-by field, if grouping.
    pub field_type: Option<FieldType>,
}

impl Grouping {
    /// Group by input field `field` of type `field_type`.
    pub fn by(field: usize, field_type: FieldType) -> Self {
        Self {
            field: Some(field),
            field_type: Some(field_type),
        }
    }

    /// Treat the whole input as one group.
    pub fn none() -> Self {
        Self {
            field: None,
            field_type: None,
        }
    }

    /// The schema of result rows under this grouping: `(groupValue,
    /// aggregateValue)` when grouping, `(aggregateValue)` alone otherwise.
    fn result_desc(&self) -> TupleDesc {
        match self.field_type {
            Some(group_type) => TupleDesc::new([
                (group_type, Some("groupValue".to_string())),
                (FieldType::Int, Some("aggregateValue".to_string())),
            ]),
            None => TupleDesc::new([(FieldType::Int, Some("aggregateValue".to_string()))]),
        }
    }

    /// The group key of `tuple`: its group-by field value, or the shared
    /// no-grouping key.
    fn key_of(&self, tuple: &Tuple) -> Option<Field> {
        self.field.map(|i| tuple.field(i).clone())
    }
}

/// Tagged union over the aggregator kinds.
pub enum Aggregator {
    Int(IntegerAggregator),
    Str(StringAggregator),
}

impl Aggregator {
    /// Construct the aggregator for a field of type `agg_type`.
    ///
    /// This is the single dispatch point on the aggregated column's type.
    ///
    /// # Panics
    /// Panics if `agg_type` is [`FieldType::Str`] and `op` is anything but
    /// [`AggregateOp::Count`]: a fail-fast contract violation, not a
    /// recoverable error.
    pub fn for_field_type(
        agg_type: FieldType,
        grouping: Grouping,
        agg_field: usize,
        op: AggregateOp,
    ) -> Self {
        match agg_type {
            FieldType::Int => Aggregator::Int(IntegerAggregator::new(grouping, agg_field, op)),
            FieldType::Str => Aggregator::Str(StringAggregator::new(grouping, agg_field, op)),
        }
    }

    /// Fold one tuple into its group's accumulator.
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) {
        match self {
            Aggregator::Int(a) => a.merge_tuple_into_group(tuple),
            Aggregator::Str(a) => a.merge_tuple_into_group(tuple),
        }
    }

    /// Materialize the per-group results as an in-memory iterator.
    ///
    /// One row per group: `(groupValue, aggregateValue)` when grouping,
    /// `(aggregateValue)` alone otherwise. Emission order is unspecified;
    /// callers must not depend on it.
    pub fn results(&self) -> TupleIterator {
        match self {
            Aggregator::Int(a) => a.results(),
            Aggregator::Str(a) => a.results(),
        }
    }

    /// The schema of the rows [`Aggregator::results`] produces.
    pub fn result_desc(&self) -> TupleDesc {
        match self {
            Aggregator::Int(a) => a.grouping.result_desc(),
            Aggregator::Str(a) => a.grouping.result_desc(),
        }
    }
}

/// Computes an aggregate over integer fields.
pub struct IntegerAggregator {
    grouping: Grouping,
    agg_field: usize,
    op: AggregateOp,
    /// Per-group accumulator, created on first sight with the op's
    /// initial value.
    data: HashMap<Option<Field>, i32>,
    /// Per-group running count, maintained alongside sums for AVG.
    counts: HashMap<Option<Field>, i32>,
}

impl IntegerAggregator {
    /// Create an integer aggregator.
    pub fn new(grouping: Grouping, agg_field: usize, op: AggregateOp) -> Self {
        Self {
            grouping,
            agg_field,
            op,
            data: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    fn initial_value(op: AggregateOp) -> i32 {
        match op {
            AggregateOp::Min => i32::MAX,
            AggregateOp::Max => i32::MIN,
            AggregateOp::Sum | AggregateOp::Count | AggregateOp::Avg => 0,
        }
    }

    /// Fold one tuple into its group.
    ///
    /// # Panics
    /// Panics if the aggregated field of `tuple` is not an integer; the
    /// operator constructing this aggregator dispatched on that type.
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) {
        let key = self.grouping.key_of(tuple);
        let value = match tuple.field(self.agg_field) {
            Field::Int(v) => *v,
            other => panic!("integer aggregate over {} field", other.field_type()),
        };

        let acc = self
            .data
            .entry(key.clone())
            .or_insert_with(|| Self::initial_value(self.op));
        let count = self.counts.entry(key).or_insert(0);

        match self.op {
            // Strictly more extreme values replace; ties keep first-seen.
            AggregateOp::Min => {
                if value < *acc {
                    *acc = value;
                }
            }
            AggregateOp::Max => {
                if value > *acc {
                    *acc = value;
                }
            }
            AggregateOp::Sum | AggregateOp::Avg => {
                *acc += value;
                *count += 1;
            }
            AggregateOp::Count => *acc += 1,
        }
    }

    /// Materialize one result row per group.
    pub fn results(&self) -> TupleIterator {
        let desc = Arc::new(self.grouping.result_desc());
        let tuples = self
            .data
            .iter()
            .map(|(key, acc)| {
                let value = match self.op {
                    // True average only exists at materialization time.
                    AggregateOp::Avg => acc / self.counts[key],
                    _ => *acc,
                };
                result_tuple(&desc, key, value)
            })
            .collect();
        TupleIterator::new(desc, tuples)
    }
}

/// Computes an aggregate over string fields. Only COUNT is defined.
pub struct StringAggregator {
    grouping: Grouping,
    agg_field: usize,
    /// Per-group running count.
    counts: HashMap<Option<Field>, i32>,
}

impl StringAggregator {
    /// Create a string aggregator.
    ///
    /// # Panics
    /// Panics unless `op` is [`AggregateOp::Count`]; no other aggregate is
    /// defined over strings.
    pub fn new(grouping: Grouping, agg_field: usize, op: AggregateOp) -> Self {
        assert!(
            op == AggregateOp::Count,
            "string aggregation supports COUNT only, got {}",
            op
        );
        Self {
            grouping,
            agg_field,
            counts: HashMap::new(),
        }
    }

    /// Fold one tuple into its group's count.
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) {
        debug_assert_eq!(
            tuple.field(self.agg_field).field_type(),
            FieldType::Str,
            "string aggregate over a non-string field"
        );
        let key = self.grouping.key_of(tuple);
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Materialize one result row per group.
    pub fn results(&self) -> TupleIterator {
        let desc = Arc::new(self.grouping.result_desc());
        let tuples = self
            .counts
            .iter()
            .map(|(key, count)| result_tuple(&desc, key, *count))
            .collect();
        TupleIterator::new(desc, tuples)
    }
}

fn result_tuple(desc: &Arc<TupleDesc>, key: &Option<Field>, value: i32) -> Tuple {
    let fields = match key {
        Some(group) => vec![group.clone(), Field::Int(value)],
        None => vec![Field::Int(value)],
    };
    Tuple::new(desc.clone(), fields)
}
