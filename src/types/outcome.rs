//! Result shapes reported back to the submitting client.

use serde::{Deserialize, Serialize};

use super::mark::MarkRecord;
use crate::identity::IdentityKey;
use crate::pipeline::PipelineStage;

/// Outcome of the vector-index leg of a write. Always returned by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmbeddingOutcome {
    Embedded { dimensions: usize },
    Skipped { reason: String },
    Error { message: String },
}

impl EmbeddingOutcome {
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Embedded { .. } => "embedded",
            Self::Skipped { .. } => "skipped",
            Self::Error { .. } => "error",
        }
    }
}

/// Acknowledgement returned by a document-store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteAck {
    Written,
}

/// Body of an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub success: bool,
    pub id: IdentityKey,
    pub db_result: WriteAck,
    pub embedding_status: EmbeddingOutcome,
    /// Record as persisted; not serialized.
    #[serde(skip)]
    pub record: MarkRecord,
    /// Stages visited, in order; not serialized.
    #[serde(skip)]
    pub stages: Vec<PipelineStage>,
}

/// Response to `submit`: either a receipt or a client-facing rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Accepted(SubmitReceipt),
    Rejected { error: String },
}

impl SubmitResponse {
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub fn receipt(&self) -> Option<&SubmitReceipt> {
        match self {
            Self::Accepted(receipt) => Some(receipt),
            Self::Rejected { .. } => None,
        }
    }

    /// HTTP status a transport shim should answer with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Accepted(_) => 200,
            Self::Rejected { .. } => 400,
        }
    }
}
