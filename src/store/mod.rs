//! Document store collaborator: the record of truth for marks.
//!
//! Stores are addressed by `(collection, id)` and only support whole-document
//! reads and full-overwrite writes. No transactional guarantee is assumed
//! across a read-merge-write; concurrent writers to one id resolve as
//! last-writer-wins.

mod file;
mod memory;

use std::sync::Arc;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

use crate::error::Result;
use crate::types::{Document, WriteAck};

/// Whether `segment` can name a collection or document id on disk: non-empty,
/// not `.` or `..`, free of `/`, `\` and NUL, and without surrounding
/// whitespace.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment.trim() == segment
        && !segment.contains(['/', '\\', '\0'])
}

pub trait DocumentStore: Send + Sync {
    /// Fetch a document; `Ok(None)` when it does not exist.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Replace the document at `(collection, id)` wholesale.
    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        (**self).get(collection, id)
    }

    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck> {
        (**self).set(collection, id, document)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        (**self).get(collection, id)
    }

    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck> {
        (**self).set(collection, id, document)
    }
}
