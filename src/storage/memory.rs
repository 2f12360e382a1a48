use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;

use super::{Error, Result, SignupStore};
use crate::model::SignupRecord;

type Table = HashMap<(String, String), SignupRecord>;

/// An in-process table with the same insert-only contract as the table service.
/// The table has to be created with `ensure_table` before the first insert.
#[derive(Debug)]
pub struct MemoryStore {
    table_name: String,
    table: Mutex<Option<Table>>,
}

impl MemoryStore {
    pub fn new<S: Into<String>>(table_name: S) -> Self {
        MemoryStore {
            table_name: table_name.into(),
            table: Mutex::new(None),
        }
    }

    /// Number of stored entities, `0` if the table was never created.
    pub fn entity_count(&self) -> usize {
        self.lock().as_ref().map_or(0, HashMap::len)
    }

    /// Every stored entity, in no particular order.
    pub fn records(&self) -> Vec<SignupRecord> {
        self.lock()
            .as_ref()
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Table>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn ensure_table(&self) -> Result<()> {
        self.lock().get_or_insert_with(HashMap::new);
        Ok(())
    }

    async fn insert_entity(&self, record: &SignupRecord) -> Result<()> {
        let mut guard = self.lock();
        let table = guard
            .as_mut()
            .ok_or_else(|| Error::TableNotFound(self.table_name.clone()))?;

        match table.entry((record.partition_key.clone(), record.row_key.clone())) {
            Entry::Occupied(_) => Err(Error::EntityAlreadyExists {
                partition_key: record.partition_key.clone(),
                row_key: record.row_key.clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get_entity(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<SignupRecord>> {
        let record = self
            .lock()
            .as_ref()
            .and_then(|table| table.get(&(partition_key.to_string(), row_key.to_string())))
            .cloned();
        Ok(record)
    }
}
