//! Embedding and vector-index collaborators used on the semantic write path.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{MarksError, Result};

/// Converts text into a fixed-length vector.
///
/// Implementations report failures as [`MarksError::Embedding`].
pub trait EmbeddingService: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Identifier of the model producing the vectors, when the service knows it.
    fn model_id(&self) -> Option<&str> {
        None
    }
}

/// Similarity index accepting `(id, vector)` pairs with upsert semantics.
///
/// Re-upserting an id replaces its previous vector. Returns the number of
/// points written.
pub trait VectorIndex: Send + Sync {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize>;
}

impl<T: EmbeddingService + ?Sized> EmbeddingService for &T {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
    fn model_id(&self) -> Option<&str> {
        (**self).model_id()
    }
}

impl<T: EmbeddingService + ?Sized> EmbeddingService for Arc<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
    fn model_id(&self) -> Option<&str> {
        (**self).model_id()
    }
}

impl<T: VectorIndex + ?Sized> VectorIndex for &T {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize> {
        (**self).upsert(id, vector)
    }
}

impl<T: VectorIndex + ?Sized> VectorIndex for Arc<T> {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize> {
        (**self).upsert(id, vector)
    }
}

/// In-process vector index holding the latest vector per id.
#[derive(Debug, Default)]
pub struct MemoryVectorIndex {
    points: RwLock<HashMap<String, Vec<f32>>>,
}

impl MemoryVectorIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Result<Option<Vec<f32>>> {
        let guard = self.points.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        let guard = self.points.read().map_err(|_| poisoned())?;
        Ok(guard.len())
    }
}

fn poisoned() -> MarksError {
    MarksError::VectorIndex {
        reason: "memory index lock poisoned".to_string(),
    }
}

impl VectorIndex for MemoryVectorIndex {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize> {
        if vector.is_empty() {
            return Err(MarksError::VectorIndex {
                reason: format!("refusing empty vector for {id}"),
            });
        }
        let mut guard = self.points.write().map_err(|_| poisoned())?;
        guard.insert(id.to_string(), vector.to_vec());
        Ok(1)
    }
}
