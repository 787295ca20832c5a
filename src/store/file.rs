use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use serde_json::Value;

use super::{DocumentStore, is_valid_segment};
use crate::error::{MarksError, Result};
use crate::types::{Document, WriteAck};

/// Directory-backed store: one pretty-printed JSON file per document at
/// `<root>/<collection>/<id>.json`.
///
/// Writes go through a temporary file renamed into place, so a reader never
/// observes a half-written record.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs_err::create_dir_all(&root).map_err(io_to_store)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_segment("collection", collection)?;
        check_segment("document id", id)?;
        Ok(self.root.join(collection).join(format!("{id}.json")))
    }
}

fn check_segment(what: &str, segment: &str) -> Result<()> {
    if !is_valid_segment(segment) {
        return Err(MarksError::store(format!(
            "{what} {segment:?} is not a valid path segment"
        )));
    }
    Ok(())
}

fn io_to_store(err: std::io::Error) -> MarksError {
    MarksError::store(err.to_string())
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let path = self.document_path(collection, id)?;
        let raw = match fs_err::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_to_store(err)),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(document)) => Ok(Some(document)),
            Ok(_) => Err(MarksError::store(format!(
                "{} does not hold a JSON object",
                path.display()
            ))),
            Err(err) => Err(MarksError::store(format!(
                "{} is not valid JSON: {err}",
                path.display()
            ))),
        }
    }

    fn set(&self, collection: &str, id: &str, document: &Document) -> Result<WriteAck> {
        let path = self.document_path(collection, id)?;
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent).map_err(io_to_store)?;
        }
        let mut file = AtomicWriteFile::open(&path).map_err(io_to_store)?;
        serde_json::to_writer_pretty(&mut file, document)?;
        file.write_all(b"\n").map_err(io_to_store)?;
        file.commit().map_err(io_to_store)?;
        tracing::trace!(target = "marks::store", path = %path.display(), "document written");
        Ok(WriteAck::Written)
    }
}
