//! The document store seam.

use std::collections::BTreeMap;
use std::path::PathBuf;

use dwh_model::Record;

use crate::error::{Result, SourceError};

/// Read access to source collections.
pub trait DocumentStore {
    /// Returns a full snapshot of `collection`, in store order.
    fn find_all(&self, collection: &str) -> Result<Vec<Record>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn find_all(&self, collection: &str) -> Result<Vec<Record>> {
        (**self).find_all(collection)
    }
}

/// In-memory collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_collection(mut self, name: &str, records: Vec<Record>) -> Self {
        self.insert(name, records);
        self
    }

    pub fn insert(&mut self, name: &str, records: Vec<Record>) {
        self.collections.insert(name.to_string(), records);
    }
}

impl DocumentStore for MemoryStore {
    fn find_all(&self, collection: &str) -> Result<Vec<Record>> {
        self.collections
            .get(collection)
            .cloned()
            .ok_or_else(|| SourceError::CollectionNotFound {
                collection: collection.to_string(),
                root: PathBuf::from("memory"),
            })
    }
}
