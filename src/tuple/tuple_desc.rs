//! Tuple descriptors - the schema of a tuple.

use std::fmt;

use crate::tuple::field::FieldType;

/// One entry of a descriptor: a field type plus an optional name.
///
/// Names are purely informational. They may repeat, and anonymous fields
/// are legal; only the type sequence carries structural meaning.
#[derive(Debug, Clone)]
pub struct TdItem {
    /// The type of the field.
    pub field_type: FieldType,
    /// The name of the field, if any.
    pub name: Option<String>,
}

/// The schema of a tuple: an ordered, immutable sequence of typed fields.
///
/// Tuples from a given descriptor are of a fixed size
/// ([`TupleDesc::byte_size`]), which is what makes the slotted page layout
/// possible.
///
/// # Equality
/// Two descriptors are equal when their type sequences are equal. Field
/// names are ignored: a scan that qualifies names with a table alias
/// still produces tuples layout-compatible with the base table.
///
/// # Example
/// ```
/// use heapdb::{FieldType, TupleDesc};
///
/// let td = TupleDesc::new([
///     (FieldType::Int, Some("id".to_string())),
///     (FieldType::Str, Some("name".to_string())),
/// ]);
/// assert_eq!(td.num_fields(), 2);
/// assert_eq!(td.field_name_to_index("name"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct TupleDesc {
    items: Vec<TdItem>,
}

impl TupleDesc {
    /// Create a descriptor from `(type, name)` pairs.
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (FieldType, Option<String>)>,
    {
        let items = fields
            .into_iter()
            .map(|(field_type, name)| TdItem { field_type, name })
            .collect();
        Self { items }
    }

    /// Create a descriptor with anonymous fields.
    pub fn unnamed<I>(types: I) -> Self
    where
        I: IntoIterator<Item = FieldType>,
    {
        Self::new(types.into_iter().map(|t| (t, None)))
    }

    /// Number of fields in this descriptor.
    #[inline]
    pub fn num_fields(&self) -> usize {
        self.items.len()
    }

    /// The type of the `i`-th field.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn field_type(&self, i: usize) -> FieldType {
        self.items[i].field_type
    }

    /// The name of the `i`-th field, if it has one.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.items[i].name.as_deref()
    }

    /// Index of the FIRST field with the given name, if any.
    ///
    /// Names may repeat; later duplicates are unreachable by name, which
    /// callers accept.
    pub fn field_name_to_index(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.name.as_deref() == Some(name))
    }

    /// Serialized size in bytes of a tuple with this descriptor.
    pub fn byte_size(&self) -> usize {
        self.items.iter().map(|item| item.field_type.byte_len()).sum()
    }

    /// Concatenate two descriptors: `a`'s fields first, then `b`'s,
    /// order and names preserved.
    pub fn merge(a: &TupleDesc, b: &TupleDesc) -> TupleDesc {
        let mut items = Vec::with_capacity(a.items.len() + b.items.len());
        items.extend(a.items.iter().cloned());
        items.extend(b.items.iter().cloned());
        TupleDesc { items }
    }

    /// Iterate over the descriptor entries.
    pub fn iter(&self) -> impl Iterator<Item = &TdItem> {
        self.items.iter()
    }
}

impl PartialEq for TupleDesc {
    /// Field-type sequence only; names are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.field_type == b.field_type)
    }
}

impl Eq for TupleDesc {}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}({})",
                item.field_type,
                item.name.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{INT_FIELD_LEN, STRING_FIELD_LEN};

    fn named(pairs: &[(&str, FieldType)]) -> TupleDesc {
        TupleDesc::new(
            pairs
                .iter()
                .map(|(n, t)| (*t, Some((*n).to_string())))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_byte_size_all_ints() {
        for n in 1..5 {
            let td = TupleDesc::unnamed(vec![FieldType::Int; n]);
            assert_eq!(td.byte_size(), INT_FIELD_LEN * n);
        }
    }

    #[test]
    fn test_byte_size_mixed() {
        let td = TupleDesc::unnamed([FieldType::Int, FieldType::Str, FieldType::Int]);
        assert_eq!(td.byte_size(), 2 * INT_FIELD_LEN + STRING_FIELD_LEN);
    }

    #[test]
    fn test_merge_counts_and_order() {
        let a = named(&[("x", FieldType::Int), ("y", FieldType::Str)]);
        let b = named(&[("z", FieldType::Int)]);
        let m = TupleDesc::merge(&a, &b);

        assert_eq!(m.num_fields(), a.num_fields() + b.num_fields());
        assert_eq!(m.field_type(0), FieldType::Int);
        assert_eq!(m.field_name(0), Some("x"));
        assert_eq!(m.field_type(1), FieldType::Str);
        assert_eq!(m.field_name(1), Some("y"));
        assert_eq!(m.field_type(2), FieldType::Int);
        assert_eq!(m.field_name(2), Some("z"));
    }

    #[test]
    fn test_equality_ignores_names() {
        let a = named(&[("x", FieldType::Int), ("y", FieldType::Str)]);
        let b = TupleDesc::unnamed([FieldType::Int, FieldType::Str]);
        let c = TupleDesc::unnamed([FieldType::Str, FieldType::Int]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, TupleDesc::unnamed([FieldType::Int]));
    }

    #[test]
    fn test_name_lookup_first_match() {
        let td = named(&[
            ("dup", FieldType::Int),
            ("other", FieldType::Str),
            ("dup", FieldType::Int),
        ]);
        assert_eq!(td.field_name_to_index("dup"), Some(0));
        assert_eq!(td.field_name_to_index("other"), Some(1));
        assert_eq!(td.field_name_to_index("missing"), None);
    }

    #[test]
    fn test_anonymous_fields_unfindable() {
        let td = TupleDesc::unnamed([FieldType::Int, FieldType::Int]);
        assert_eq!(td.field_name_to_index("anything"), None);
        assert_eq!(td.field_name(0), None);
    }
}
