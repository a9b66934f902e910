//! Record storage.
//!
//! Records are loaded once from a JSON array and never change afterwards,
//! so lookups need no locking.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::info;

use calexport_core::{Record, RecordResolver};

use crate::error::{ServerError, ServerResult};

/// Everything the HTTP layer needs from a record backend.
pub trait RecordSource: RecordResolver {
    /// Returns every record of an entity type, ordered by id.
    fn list(&self, entity_type: &str) -> Vec<Record>;

    /// Returns the field names carried by records of an entity type.
    fn field_names(&self, entity_type: &str) -> Vec<String>;
}

/// In-memory record store keyed by `(entity_type, id)`.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<(String, String), Record>,
}

impl RecordStore {
    /// Creates a store from records. Later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = records
            .into_iter()
            .map(|r| ((r.entity_type.clone(), r.id.clone()), r))
            .collect();
        Self { records }
    }

    /// Loads records from a JSON file containing an array of records.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(|source| ServerError::RecordsParse {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::from_records(records);
        info!(path = %path.display(), records = store.len(), "Loaded records");
        Ok(store)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordResolver for RecordStore {
    fn get(&self, entity_type: &str, id: &str) -> Option<Record> {
        self.records
            .get(&(entity_type.to_string(), id.to_string()))
            .cloned()
    }
}

impl RecordSource for RecordStore {
    fn list(&self, entity_type: &str) -> Vec<Record> {
        self.records
            .values()
            .filter(|r| r.entity_type == entity_type)
            .cloned()
            .collect()
    }

    fn field_names(&self, entity_type: &str) -> Vec<String> {
        self.records
            .values()
            .filter(|r| r.entity_type == entity_type)
            .flat_map(|r| r.fields.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
