//! Sequential scan - the leaf operator reading a table front to back.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::Catalog;
use crate::common::{Error, Result, TransactionId};
use crate::execution::DbIterator;
use crate::storage::HeapFileIterator;
use crate::tuple::{Tuple, TupleDesc};

/// Reads each tuple of a table in storage order (page order, then slot
/// order) through the buffer pool.
///
/// # Field Naming
/// The output descriptor qualifies every field as `"alias.name"`, which
/// disambiguates columns when two scanned tables share field names. A
/// missing alias or field name is rendered literally as the string
/// `"null"` (e.g. `"null.id"` or `"t.null"`) rather than failing; the
/// outer planner treats those names as any other.
pub struct SeqScan {
    catalog: Arc<Catalog>,
    pool: Arc<BufferPool>,
    tid: TransactionId,
    table_id: u32,
    alias: Option<String>,
    /// Alias-qualified output schema, fixed at construction.
    desc: TupleDesc,
    iter: Option<HeapFileIterator>,
}

impl SeqScan {
    /// Create a scan of `table_id` on behalf of `tid`.
    ///
    /// # Errors
    /// [`Error::TableNotFound`] if the table is not in the catalog.
    pub fn new(
        catalog: Arc<Catalog>,
        pool: Arc<BufferPool>,
        tid: TransactionId,
        table_id: u32,
        alias: Option<&str>,
    ) -> Result<Self> {
        let base = catalog.tuple_desc(table_id)?;
        let desc = Self::qualified_desc(&base, alias);
        Ok(Self {
            catalog,
            pool,
            tid,
            table_id,
            alias: alias.map(str::to_string),
            desc,
            iter: None,
        })
    }

    fn qualified_desc(base: &TupleDesc, alias: Option<&str>) -> TupleDesc {
        let alias = alias.unwrap_or("null");
        TupleDesc::new(base.iter().map(|item| {
            let name = item.name.as_deref().unwrap_or("null");
            (item.field_type, Some(format!("{}.{}", alias, name)))
        }))
    }

    /// The catalog name of the scanned table.
    pub fn table_name(&self) -> Result<String> {
        self.catalog.table_name(self.table_id)
    }

    /// The alias this scan qualifies field names with, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl DbIterator for SeqScan {
    fn open(&mut self) -> Result<()> {
        if self.iter.is_some() {
            return Err(Error::IteratorAlreadyOpen);
        }
        let file = self.catalog.file(self.table_id)?;
        let mut iter = file.iterator(self.tid, Arc::clone(&self.pool));
        iter.open()?;
        self.iter = Some(iter);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        match self.iter.as_mut() {
            Some(iter) => iter.next(),
            None => Err(Error::IteratorNotOpen),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        match self.iter.as_mut() {
            Some(iter) => iter.rewind(),
            None => Err(Error::IteratorNotOpen),
        }
    }

    fn close(&mut self) {
        if let Some(mut iter) = self.iter.take() {
            iter.close();
        }
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }
}
