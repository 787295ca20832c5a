//! Explicit configuration injected into the pipeline and orchestrator.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COLLECTION, DEFAULT_EMBEDDING_MODEL};
use crate::error::{MarksError, Result};
use crate::store::is_valid_segment;

pub const ENV_COLLECTION: &str = "MARKS_COLLECTION";
pub const ENV_EMBEDDING_MODEL: &str = "MARKS_EMBEDDING_MODEL";

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

/// Identifiers the ingestion core needs at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksConfig {
    /// Document-store collection holding marks.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Model id stamped into `embedding_source` after a successful
    /// embedding, unless the embedding service reports its own.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for MarksConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            embedding_model: default_embedding_model(),
        }
    }
}

impl MarksConfig {
    #[must_use]
    pub fn builder() -> MarksConfigBuilder {
        MarksConfigBuilder::default()
    }

    /// Defaults overridden by any `MARKS_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(collection) = lookup(ENV_COLLECTION) {
            config.collection = collection;
        }
        if let Some(model) = lookup(ENV_EMBEDDING_MODEL) {
            config.embedding_model = model;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs_err::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| MarksError::Config {
            reason: format!("{}: {err}", path.as_ref().display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_model.trim().is_empty() {
            return Err(MarksError::Config {
                reason: "embedding_model must not be empty".to_string(),
            });
        }
        if !is_valid_segment(&self.collection) {
            return Err(MarksError::Config {
                reason: format!("collection {:?} is not a valid name", self.collection),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarksConfigBuilder {
    inner: MarksConfig,
}

impl MarksConfigBuilder {
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.inner.collection = collection.into();
        self
    }

    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.inner.embedding_model = model.into();
        self
    }

    pub fn build(self) -> Result<MarksConfig> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
