//! Heap page - the fixed-size slotted unit of tuple storage.
//!
//! A [`HeapPage`] holds a fixed number of equal-size tuple slots behind an
//! occupancy bitmap. Pages are decoded from and encoded to exactly
//! [`PAGE_SIZE`] bytes, the unit of I/O between a [`HeapFile`] and the
//! buffer pool.
//!
//! [`HeapFile`]: crate::storage::HeapFile

use std::sync::Arc;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, HeapPageId, RecordId, Result};
use crate::tuple::{Tuple, TupleDesc};

/// A page of fixed-size tuple slots.
///
/// # Byte Layout
/// ```text
/// ┌────────────────────────┬─────────┬─────────┬───────┬──────────────┐
/// │ occupancy bitmap       │ slot 0  │ slot 1  │  ...  │ zero padding │
/// │ ceil(slots/8) bytes    │ t bytes │ t bytes │       │              │
/// └────────────────────────┴─────────┴─────────┴───────┴──────────────┘
/// Total: PAGE_SIZE bytes, t = tuple byte size
/// ```
///
/// Bit `i` of the bitmap is set iff slot `i` holds a tuple. The slot count
/// is `floor(8 * PAGE_SIZE / (8 * t + 1))`, each slot costing its tuple
/// bytes plus one bitmap bit, so the layout always fits with the unused
/// tail zeroed.
///
/// # Invariant
/// A slot is either empty or holds exactly one tuple whose schema matches
/// the page's descriptor, mirrored exactly by its bitmap bit. Encoding a
/// decoded page reproduces the original bytes.
#[derive(Debug)]
pub struct HeapPage {
    pid: HeapPageId,
    desc: Arc<TupleDesc>,
    /// Occupancy bitmap, one bit per slot, byte-rounded.
    header: Vec<u8>,
    /// Decoded slot contents, `None` for empty slots.
    tuples: Vec<Option<Tuple>>,
}

impl HeapPage {
    /// Number of tuple slots a page holds for the given schema.
    pub fn slots_per_page(desc: &TupleDesc) -> usize {
        (PAGE_SIZE * 8) / (desc.byte_size() * 8 + 1)
    }

    /// Size of the occupancy bitmap in bytes for the given schema.
    pub fn header_len(desc: &TupleDesc) -> usize {
        (Self::slots_per_page(desc) + 7) / 8
    }

    /// A zeroed page image: the representation of a page with no tuples.
    pub fn empty_page_data() -> [u8; PAGE_SIZE] {
        [0u8; PAGE_SIZE]
    }

    /// Create an empty page in memory.
    pub fn empty(pid: HeapPageId, desc: Arc<TupleDesc>) -> Self {
        let slots = Self::slots_per_page(&desc);
        Self {
            pid,
            header: vec![0u8; Self::header_len(&desc)],
            tuples: vec![None; slots],
            desc,
        }
    }

    /// Decode a page from its on-disk image.
    ///
    /// Occupied slots are materialized as tuples carrying their
    /// [`RecordId`]; empty slots are skipped.
    ///
    /// # Panics
    /// Panics if `data` is not exactly [`PAGE_SIZE`] bytes.
    pub fn from_bytes(pid: HeapPageId, desc: Arc<TupleDesc>, data: &[u8]) -> Self {
        assert_eq!(data.len(), PAGE_SIZE, "page image must be PAGE_SIZE bytes");

        let slots = Self::slots_per_page(&desc);
        let header_len = Self::header_len(&desc);
        let tuple_size = desc.byte_size();

        let header = data[..header_len].to_vec();
        let mut tuples = Vec::with_capacity(slots);
        for slot in 0..slots {
            if header[slot / 8] & (1 << (slot % 8)) != 0 {
                let offset = header_len + slot * tuple_size;
                let mut t = Tuple::read_from(desc.clone(), &data[offset..offset + tuple_size]);
                t.set_record_id(Some(RecordId::new(pid, slot)));
                tuples.push(Some(t));
            } else {
                tuples.push(None);
            }
        }

        Self {
            pid,
            desc,
            header,
            tuples,
        }
    }

    /// Encode this page to its on-disk image.
    ///
    /// Empty slots and the trailing remainder are zeroed, so the encoding
    /// of a freshly decoded page is byte-identical to its source.
    pub fn to_bytes(&self) -> [u8; PAGE_SIZE] {
        let mut data = [0u8; PAGE_SIZE];
        let header_len = self.header.len();
        let tuple_size = self.desc.byte_size();

        data[..header_len].copy_from_slice(&self.header);
        for (slot, tuple) in self.tuples.iter().enumerate() {
            if let Some(t) = tuple {
                let offset = header_len + slot * tuple_size;
                t.write_to(&mut data[offset..offset + tuple_size]);
            }
        }
        data
    }

    /// The id of this page.
    #[inline]
    pub fn id(&self) -> HeapPageId {
        self.pid
    }

    /// The schema of tuples on this page.
    #[inline]
    pub fn tuple_desc(&self) -> &Arc<TupleDesc> {
        &self.desc
    }

    /// Total number of slots on this page.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.tuples.len()
    }

    /// Number of currently empty slots.
    pub fn empty_slot_count(&self) -> usize {
        self.tuples.iter().filter(|t| t.is_none()).count()
    }

    /// Whether slot `i` holds a tuple.
    #[inline]
    pub fn is_slot_occupied(&self, i: usize) -> bool {
        self.tuples[i].is_some()
    }

    /// The tuple in slot `i`, if any.
    #[inline]
    pub fn tuple(&self, i: usize) -> Option<&Tuple> {
        self.tuples.get(i).and_then(|t| t.as_ref())
    }

    /// Store `tuple` in the first free slot, stamping its record id.
    ///
    /// Schema compatibility is the caller's responsibility; a mismatched
    /// tuple would corrupt the fixed-width layout.
    ///
    /// # Errors
    /// [`Error::PageFull`] when no slot is free.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> Result<RecordId> {
        debug_assert_eq!(**tuple.tuple_desc(), *self.desc, "tuple schema mismatch");

        let slot = self
            .tuples
            .iter()
            .position(|t| t.is_none())
            .ok_or(Error::PageFull(self.pid))?;

        let rid = RecordId::new(self.pid, slot);
        tuple.set_record_id(Some(rid));
        self.header[slot / 8] |= 1 << (slot % 8);
        self.tuples[slot] = Some(tuple);
        Ok(rid)
    }

    /// Clear the slot named by `rid`, emptying it and its bitmap bit.
    ///
    /// # Errors
    /// [`Error::EmptySlot`] when the slot is out of range or already empty.
    pub fn delete_tuple(&mut self, rid: RecordId) -> Result<()> {
        debug_assert_eq!(rid.page_id(), self.pid, "record id names a different page");

        let slot = rid.slot();
        if slot >= self.tuples.len() || self.tuples[slot].is_none() {
            return Err(Error::EmptySlot {
                page_id: self.pid,
                slot,
            });
        }

        self.header[slot / 8] &= !(1 << (slot % 8));
        self.tuples[slot] = None;
        Ok(())
    }

    /// Iterate the occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter().filter_map(|t| t.as_ref())
    }
}
