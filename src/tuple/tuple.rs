//! Tuples - rows of typed field values.

use std::fmt;
use std::sync::Arc;

use crate::common::RecordId;
use crate::tuple::field::Field;
use crate::tuple::tuple_desc::TupleDesc;

/// One row: an ordered sequence of field values conforming to a
/// [`TupleDesc`].
///
/// Field slots are mutable; the descriptor is shared and immutable. A tuple
/// picks up a [`RecordId`] once it has been persisted into a page slot, and
/// deletes use that id to find the slot again.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use heapdb::{Field, FieldType, Tuple, TupleDesc};
///
/// let td = Arc::new(TupleDesc::unnamed([FieldType::Int, FieldType::Int]));
/// let mut t = Tuple::new(td, vec![Field::Int(1), Field::Int(2)]);
/// t.set_field(1, Field::Int(5));
/// assert_eq!(*t.field(1), Field::Int(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    desc: Arc<TupleDesc>,
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    /// Create a tuple from its field values.
    ///
    /// # Panics
    /// Panics if the number of values differs from the descriptor's field
    /// count.
    pub fn new(desc: Arc<TupleDesc>, fields: Vec<Field>) -> Self {
        assert_eq!(
            fields.len(),
            desc.num_fields(),
            "field count does not match descriptor"
        );
        debug_assert!(fields
            .iter()
            .zip(desc.iter())
            .all(|(f, item)| f.field_type() == item.field_type));
        Self {
            desc,
            fields,
            record_id: None,
        }
    }

    /// The schema of this tuple.
    #[inline]
    pub fn tuple_desc(&self) -> &Arc<TupleDesc> {
        &self.desc
    }

    /// The `i`-th field value.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    /// Replace the `i`-th field value.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn set_field(&mut self, i: usize, value: Field) {
        self.fields[i] = value;
    }

    /// Where this tuple is stored, if it has been persisted.
    #[inline]
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    /// Attach or clear the storage location.
    #[inline]
    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.record_id = rid;
    }

    /// Serialize all fields in schema order into `buf`.
    ///
    /// `buf` must be exactly `tuple_desc().byte_size()` bytes.
    pub fn write_to(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), self.desc.byte_size());
        let mut offset = 0;
        for field in &self.fields {
            let len = field.field_type().byte_len();
            field.write_to(&mut buf[offset..offset + len]);
            offset += len;
        }
    }

    /// Decode a tuple of schema `desc` from `buf`.
    ///
    /// `buf` must be exactly `desc.byte_size()` bytes. The decoded tuple
    /// has no record id; the caller attaches one when it knows the slot.
    pub fn read_from(desc: Arc<TupleDesc>, buf: &[u8]) -> Tuple {
        debug_assert_eq!(buf.len(), desc.byte_size());
        let mut fields = Vec::with_capacity(desc.num_fields());
        let mut offset = 0;
        for item in desc.iter() {
            let len = item.field_type.byte_len();
            fields.push(Field::read_from(item.field_type, &buf[offset..offset + len]));
            offset += len;
        }
        Tuple {
            desc,
            fields,
            record_id: None,
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
