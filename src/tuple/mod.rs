//! The tuple model: typed field values and ordered schemas.
//!
//! This module contains:
//! - [`Field`] / [`FieldType`] - tagged value union with fixed-width codec
//! - [`Op`] - predicate comparison operators
//! - [`TupleDesc`] - ordered field descriptors
//! - [`Tuple`] - one row of field values, optionally carrying a record id

mod field;
mod tuple;
mod tuple_desc;

pub use field::{Field, FieldType, Op};
pub use tuple::Tuple;
pub use tuple_desc::{TdItem, TupleDesc};
