//! End-to-end ingestion of one mark submission.
//!
//! ```text
//! Validating -> KeyDerived -> Lookup -> Merging  -> Embedding -> Persisting -> Done
//!     |                              \-> Creating -/
//!     \-> Rejected
//! ```
//!
//! Stages run strictly in sequence within one call; concurrent calls share
//! nothing in-process. The vector-index leg runs before the document write and
//! can only degrade the response, never block or roll back the stored record.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MarksConfig;
use crate::embed::EmbeddingOrchestrator;
use crate::error::Result;
use crate::identity::build_key;
use crate::merge::{create_record, merge};
use crate::store::DocumentStore;
use crate::types::{MarkRecord, SubmitReceipt, SubmitResponse};
use crate::validator::{RawSubmission, parse_submission, raw_profile_url, validate};
use crate::vector::{EmbeddingService, VectorIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validating,
    KeyDerived,
    Lookup,
    Merging,
    Creating,
    Embedding,
    Persisting,
    Done,
    Rejected,
}

impl PipelineStage {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use PipelineStage::{
            Creating, Done, Embedding, KeyDerived, Lookup, Merging, Persisting, Rejected,
            Validating,
        };
        matches!(
            (self, next),
            (Validating, KeyDerived | Rejected)
                | (KeyDerived, Lookup)
                | (Lookup, Merging | Creating)
                | (Merging | Creating, Embedding)
                | (Embedding, Persisting)
                | (Persisting, Done)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Rejected)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::KeyDerived => "key_derived",
            Self::Lookup => "lookup",
            Self::Merging => "merging",
            Self::Creating => "creating",
            Self::Embedding => "embedding",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct StageTracker {
    current: PipelineStage,
    trail: Vec<PipelineStage>,
}

impl StageTracker {
    fn start() -> Self {
        Self {
            current: PipelineStage::Validating,
            trail: vec![PipelineStage::Validating],
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal pipeline transition {} -> {}",
            self.current,
            next
        );
        tracing::debug!(target = "marks::pipeline", from = %self.current, to = %next);
        self.current = next;
        self.trail.push(next);
    }
}

/// Validate, resolve identity, merge, embed, persist.
pub struct IngestionPipeline<S, E, V> {
    store: S,
    orchestrator: EmbeddingOrchestrator<E, V>,
    config: MarksConfig,
}

impl<S, E, V> IngestionPipeline<S, E, V>
where
    S: DocumentStore,
    E: EmbeddingService,
    V: VectorIndex,
{
    pub fn new(store: S, embedder: E, index: V, config: MarksConfig) -> Result<Self> {
        config.validate()?;
        let orchestrator = EmbeddingOrchestrator::new(embedder, index, &config);
        Ok(Self {
            store,
            orchestrator,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MarksConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse a raw request body and submit it. Bodies that are not JSON
    /// objects are rejected without any store access.
    pub fn submit_json(&self, body: &str) -> Result<SubmitResponse> {
        match parse_submission(body) {
            Ok(raw) => self.submit(&raw),
            Err(err) if err.is_validation() => {
                tracing::info!(target = "marks::pipeline", reason = %err, "submission rejected");
                Ok(SubmitResponse::Rejected {
                    error: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Ingest one submission.
    ///
    /// Validation failures come back as [`SubmitResponse::Rejected`].
    /// Embedding failures are reported inside the receipt. Document-store
    /// failures are returned as `Err`.
    pub fn submit(&self, raw: &RawSubmission) -> Result<SubmitResponse> {
        let span = tracing::info_span!("submit", request_id = %Uuid::new_v4());
        let _entered = span.enter();
        let mut stages = StageTracker::start();

        let fields = match validate(raw) {
            Ok(fields) => fields,
            Err(err) if err.is_validation() => {
                stages.advance(PipelineStage::Rejected);
                tracing::info!(target = "marks::pipeline", reason = %err, "submission rejected");
                return Ok(SubmitResponse::Rejected {
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        stages.advance(PipelineStage::KeyDerived);
        let key = build_key(&fields.name, &fields.email, raw_profile_url(raw));

        stages.advance(PipelineStage::Lookup);
        let collection = self.config.collection.as_str();
        let existing = self.store.get(collection, key.as_str())?;

        let mut record = match existing {
            Some(document) => {
                stages.advance(PipelineStage::Merging);
                merge(&MarkRecord::from_document(document)?, &fields)
            }
            None => {
                stages.advance(PipelineStage::Creating);
                create_record(&fields, self.orchestrator.model())
            }
        };

        stages.advance(PipelineStage::Embedding);
        let embedding_status = self
            .orchestrator
            .embed_and_index(&key, &record, &fields.source_text);
        if embedding_status.is_embedded() {
            record.embedding_source = self.orchestrator.model().to_string();
        }

        stages.advance(PipelineStage::Persisting);
        let db_result = self
            .store
            .set(collection, key.as_str(), &record.to_document()?)?;

        stages.advance(PipelineStage::Done);
        tracing::info!(
            target = "marks::pipeline",
            id = %key,
            embedding = embedding_status.status(),
            "mark persisted"
        );

        Ok(SubmitResponse::Accepted(SubmitReceipt {
            success: true,
            id: key,
            db_result,
            embedding_status,
            record,
            stages: stages.trail,
        }))
    }
}
