//! Predicates - field/constant comparisons used by `Filter`.

use crate::tuple::{Field, Op, Tuple};

/// Compares one field of a tuple against a constant.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use heapdb::{Field, FieldType, Op, Predicate, Tuple, TupleDesc};
///
/// let td = Arc::new(TupleDesc::unnamed([FieldType::Int]));
/// let p = Predicate::new(0, Op::GreaterThan, Field::Int(5));
/// assert!(p.filter(&Tuple::new(td.clone(), vec![Field::Int(9)])));
/// assert!(!p.filter(&Tuple::new(td, vec![Field::Int(3)])));
/// ```
#[derive(Debug, Clone)]
pub struct Predicate {
    field: usize,
    op: Op,
    operand: Field,
}

impl Predicate {
    /// Create a predicate comparing field `field` against `operand`.
    pub fn new(field: usize, op: Op, operand: Field) -> Self {
        Self { field, op, operand }
    }

    /// The index of the field compared.
    #[inline]
    pub fn field(&self) -> usize {
        self.field
    }

    /// The comparison operator.
    #[inline]
    pub fn op(&self) -> Op {
        self.op
    }

    /// The constant compared against.
    #[inline]
    pub fn operand(&self) -> &Field {
        &self.operand
    }

    /// Whether `tuple` satisfies this predicate.
    ///
    /// # Panics
    /// Panics if the field index is out of range or the field kinds differ;
    /// predicates are typed against their input schema at plan time.
    pub fn filter(&self, tuple: &Tuple) -> bool {
        tuple.field(self.field).compare(self.op, &self.operand)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f[{}] {} {}", self.field, self.op, self.operand)
    }
}
