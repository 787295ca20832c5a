//! Semantic write leg: embed a mark and upsert it into the vector index.
//!
//! Failures here never abort ingestion. Every path returns an
//! [`EmbeddingOutcome`] value and the document-store write proceeds
//! regardless of which variant comes back.

use crate::config::MarksConfig;
use crate::constants::SKIP_REASON_EMPTY_TEXT;
use crate::error::{MarksError, Result};
use crate::identity::IdentityKey;
use crate::types::{EmbeddingOutcome, MarkRecord};
use crate::vector::{EmbeddingService, VectorIndex};

/// Text sent to the embedding service: every non-empty record field in
/// declared order, one per line, then a blank line, then the submission's
/// raw source text.
#[must_use]
pub fn build_embedding_input(record: &MarkRecord, source_text: &str) -> String {
    let flattened = record
        .text_fields()
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(_, value)| *value)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{flattened}\n\n{source_text}")
}

pub struct EmbeddingOrchestrator<E, V> {
    embedder: E,
    index: V,
    model: String,
}

impl<E, V> EmbeddingOrchestrator<E, V>
where
    E: EmbeddingService,
    V: VectorIndex,
{
    /// The model id comes from the embedder when it reports one, falling
    /// back to `config.embedding_model` otherwise.
    pub fn new(embedder: E, index: V, config: &MarksConfig) -> Self {
        let model = match embedder.model_id() {
            Some(reported) => {
                if reported != config.embedding_model {
                    tracing::debug!(
                        target = "marks::embed",
                        configured = %config.embedding_model,
                        reported,
                        "embedder model overrides configured embedding_model"
                    );
                }
                reported.to_string()
            }
            None => config.embedding_model.clone(),
        };
        Self {
            embedder,
            index,
            model,
        }
    }

    /// Model identifier recorded on records this orchestrator embeds.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed `record` plus `source_text` and upsert the vector under `key`.
    ///
    /// Empty `source_text` short-circuits to `Skipped` without touching
    /// either collaborator.
    pub fn embed_and_index(
        &self,
        key: &IdentityKey,
        record: &MarkRecord,
        source_text: &str,
    ) -> EmbeddingOutcome {
        if source_text.is_empty() {
            tracing::debug!(target = "marks::embed", id = %key, "no source text; skipping embedding");
            return EmbeddingOutcome::Skipped {
                reason: SKIP_REASON_EMPTY_TEXT.to_string(),
            };
        }

        match self.try_embed_and_index(key, record, source_text) {
            Ok(dimensions) => {
                tracing::debug!(
                    target = "marks::embed",
                    id = %key,
                    dimensions,
                    model = %self.model,
                    "vector upserted"
                );
                EmbeddingOutcome::Embedded { dimensions }
            }
            Err(err) => {
                tracing::warn!(target = "marks::embed", id = %key, error = %err, "embedding degraded");
                EmbeddingOutcome::Error {
                    message: err.to_string(),
                }
            }
        }
    }

    fn try_embed_and_index(
        &self,
        key: &IdentityKey,
        record: &MarkRecord,
        source_text: &str,
    ) -> Result<usize> {
        let input = build_embedding_input(record, source_text);
        let vector = self.embedder.embed(&input)?;
        if vector.is_empty() {
            return Err(MarksError::Embedding {
                reason: "embedding service returned an empty vector".to_string(),
            });
        }
        self.index.upsert(key.as_str(), &vector)?;
        Ok(vector.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::build_key;
    use crate::vector::MemoryVectorIndex;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmbedder {
        inputs: Mutex<Vec<String>>,
        fail: bool,
    }

    impl EmbeddingService for RecordingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.inputs.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(MarksError::Embedding {
                    reason: "quota exceeded".into(),
                });
            }
            Ok(vec![0.5; 4])
        }
    }

    struct BrokenIndex;

    impl VectorIndex for BrokenIndex {
        fn upsert(&self, _id: &str, _vector: &[f32]) -> Result<usize> {
            Err(MarksError::VectorIndex {
                reason: "index unavailable".into(),
            })
        }
    }

    fn record() -> MarkRecord {
        MarkRecord {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            org: "Acme".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            embedding_source: "m".into(),
            ..MarkRecord::default()
        }
    }

    struct NamedEmbedder;

    impl EmbeddingService for NamedEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn model_id(&self) -> Option<&str> {
            Some("text-embedding-3-small")
        }
    }

    #[test]
    fn reported_model_wins_over_configured_model() {
        let index = MemoryVectorIndex::new();
        let config = MarksConfig::default();
        let orchestrator = EmbeddingOrchestrator::new(NamedEmbedder, &index, &config);
        assert_eq!(orchestrator.model(), "text-embedding-3-small");
        assert_ne!(orchestrator.model(), config.embedding_model);

        let anonymous = RecordingEmbedder::default();
        let orchestrator = EmbeddingOrchestrator::new(&anonymous, &index, &config);
        assert_eq!(orchestrator.model(), "gemini-embedding-001");
    }

    #[test]
    fn input_lists_non_empty_fields_then_source() {
        let input = build_embedding_input(&record(), "raw bio");
        assert_eq!(
            input,
            "mark\nJane Doe\njane@x.com\nAcme\n2024-01-01T00:00:00Z\nm\n\nraw bio"
        );
    }

    #[test]
    fn empty_source_skips_without_calls() {
        let embedder = RecordingEmbedder::default();
        let index = MemoryVectorIndex::new();
        let orchestrator = EmbeddingOrchestrator::new(&embedder, &index, &MarksConfig::default());
        let key = build_key("Jane Doe", "jane@x.com", "");

        let outcome = orchestrator.embed_and_index(&key, &record(), "");
        assert_eq!(
            outcome,
            EmbeddingOutcome::Skipped {
                reason: "empty text".into()
            }
        );
        assert!(embedder.inputs.lock().unwrap().is_empty());
        assert_eq!(index.len().unwrap(), 0);
    }

    #[test]
    fn success_reports_dimensions_and_upserts_under_key() {
        let embedder = RecordingEmbedder::default();
        let index = MemoryVectorIndex::new();
        let orchestrator = EmbeddingOrchestrator::new(&embedder, &index, &MarksConfig::default());
        let key = build_key("Jane Doe", "jane@x.com", "");

        let outcome = orchestrator.embed_and_index(&key, &record(), "bio");
        assert_eq!(outcome, EmbeddingOutcome::Embedded { dimensions: 4 });
        assert_eq!(index.get(key.as_str()).unwrap(), Some(vec![0.5; 4]));
        assert_eq!(orchestrator.model(), "gemini-embedding-001");
    }

    #[test]
    fn embedder_failure_becomes_error_outcome() {
        let embedder = RecordingEmbedder {
            fail: true,
            ..RecordingEmbedder::default()
        };
        let index = MemoryVectorIndex::new();
        let orchestrator = EmbeddingOrchestrator::new(&embedder, &index, &MarksConfig::default());
        let key = build_key("Jane Doe", "jane@x.com", "");

        let outcome = orchestrator.embed_and_index(&key, &record(), "bio");
        assert_eq!(
            outcome,
            EmbeddingOutcome::Error {
                message: "embedding failed: quota exceeded".into()
            }
        );
        assert_eq!(index.len().unwrap(), 0);
    }

    #[test]
    fn index_failure_becomes_error_outcome() {
        let embedder = RecordingEmbedder::default();
        let orchestrator =
            EmbeddingOrchestrator::new(&embedder, BrokenIndex, &MarksConfig::default());
        let key = build_key("Jane Doe", "jane@x.com", "");

        let outcome = orchestrator.embed_and_index(&key, &record(), "bio");
        assert_eq!(outcome.status(), "error");
        assert_eq!(embedder.inputs.lock().unwrap().len(), 1);
    }
}
