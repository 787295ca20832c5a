//! Shared collaborators for integration tests.
//!
//! Every collaborator appends to one [`EventLog`] so tests can assert both
//! which calls happened and in what order.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use marks_core::{
    Document, DocumentStore, EmbeddingService, MarksError, MemoryDocumentStore,
    MemoryVectorIndex, RawSubmission, Result, VectorIndex, WriteAck,
};
use serde_json::Value;

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn submission(value: Value) -> RawSubmission {
    match value {
        Value::Object(map) => map,
        other => panic!("test submission must be an object, got {other}"),
    }
}

pub struct RecordingStore {
    pub inner: MemoryDocumentStore,
    log: EventLog,
    fail_writes: bool,
}

impl RecordingStore {
    pub fn new(log: EventLog) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            log,
            fail_writes: false,
        }
    }

    pub fn failing_writes(log: EventLog) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(log)
        }
    }
}

impl DocumentStore for RecordingStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.log.lock().unwrap().push(format!("store.get {collection}/{id}"));
        self.inner.get(collection, id)
    }

    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck> {
        self.log.lock().unwrap().push(format!("store.set {collection}/{id}"));
        if self.fail_writes {
            return Err(MarksError::Store {
                reason: "disk full".into(),
            });
        }
        self.inner.set(collection, id, document)
    }
}

/// Deterministic embedder producing a small vector derived from input length.
pub struct RecordingEmbedder {
    log: EventLog,
    pub inputs: Mutex<Vec<String>>,
    fail: bool,
    model: Option<String>,
}

impl RecordingEmbedder {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            inputs: Mutex::new(Vec::new()),
            fail: false,
            model: None,
        }
    }

    /// Embedder that reports `model` as the id of the vectors it produces.
    pub fn with_model(log: EventLog, model: &str) -> Self {
        Self {
            model: Some(model.to_string()),
            ..Self::new(log)
        }
    }

    pub fn failing(log: EventLog) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl EmbeddingService for RecordingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.log.lock().unwrap().push("embedder.embed".to_string());
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(MarksError::Embedding {
                reason: "upstream 503".into(),
            });
        }
        Ok(vec![text.len() as f32, 1.0, 0.0])
    }

    fn model_id(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

pub struct RecordingIndex {
    pub inner: MemoryVectorIndex,
    log: EventLog,
}

impl RecordingIndex {
    pub fn new(log: EventLog) -> Self {
        Self {
            inner: MemoryVectorIndex::new(),
            log,
        }
    }
}

impl VectorIndex for RecordingIndex {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize> {
        self.log.lock().unwrap().push(format!("index.upsert {id}"));
        self.inner.upsert(id, vector)
    }
}
