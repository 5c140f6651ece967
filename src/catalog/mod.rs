//! Catalog - the registry of tables known to the engine.
//!
//! The catalog maps table ids and names to heap files and their schemas.
//! It is the capability the scan operators, the buffer pool, and the
//! statistics service resolve tables through. Bootstrap from disk belongs
//! to an outer layer; this registry is populated by explicit
//! [`Catalog::add_table`] calls.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result};
use crate::storage::HeapFile;
use crate::tuple::TupleDesc;

/// One registered table.
#[derive(Clone)]
struct TableInfo {
    file: Arc<HeapFile>,
    name: String,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<u32, TableInfo>,
    names: HashMap<String, u32>,
}

/// Process-wide table registry, read concurrently and mutated by explicit
/// calls. Readers tolerate staleness; there is no snapshot isolation.
pub struct Catalog {
    inner: RwLock<Inner>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a table under `name`, returning its id.
    ///
    /// A table already registered under the same name is replaced; the
    /// newest binding wins.
    pub fn add_table(&self, file: Arc<HeapFile>, name: &str) -> u32 {
        let id = file.id();
        let mut inner = self.inner.write();
        if let Some(old_id) = inner.names.insert(name.to_string(), id) {
            inner.tables.remove(&old_id);
        }
        inner.tables.insert(
            id,
            TableInfo {
                file,
                name: name.to_string(),
            },
        );
        id
    }

    /// The heap file backing table `table_id`.
    pub fn file(&self, table_id: u32) -> Result<Arc<HeapFile>> {
        self.inner
            .read()
            .tables
            .get(&table_id)
            .map(|info| Arc::clone(&info.file))
            .ok_or(Error::TableNotFound(table_id))
    }

    /// The schema of table `table_id`.
    pub fn tuple_desc(&self, table_id: u32) -> Result<Arc<TupleDesc>> {
        self.file(table_id).map(|f| f.tuple_desc().clone())
    }

    /// The name table `table_id` is registered under.
    pub fn table_name(&self, table_id: u32) -> Result<String> {
        self.inner
            .read()
            .tables
            .get(&table_id)
            .map(|info| info.name.clone())
            .ok_or(Error::TableNotFound(table_id))
    }

    /// The id of the table registered under `name`.
    pub fn table_id(&self, name: &str) -> Result<u32> {
        self.inner
            .read()
            .names
            .get(name)
            .copied()
            .ok_or_else(|| Error::TableNameNotFound(name.to_string()))
    }

    /// Ids of every registered table.
    pub fn table_ids(&self) -> Vec<u32> {
        self.inner.read().tables.keys().copied().collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
