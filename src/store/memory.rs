use std::collections::HashMap;
use std::sync::RwLock;

use super::DocumentStore;
use crate::error::{MarksError, Result};
use crate::types::{Document, WriteAck};

/// Process-local document store, keyed by collection then id.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in `collection`.
    pub fn len(&self, collection: &str) -> Result<usize> {
        let guard = self.collections.read().map_err(|_| poisoned())?;
        Ok(guard.get(collection).map_or(0, HashMap::len))
    }
}

fn poisoned() -> MarksError {
    MarksError::store("memory store lock poisoned")
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let guard = self.collections.read().map_err(|_| poisoned())?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck> {
        let mut guard = self.collections.write().map_err(|_| poisoned())?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        Ok(WriteAck::Written)
    }
}
