#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::float_cmp,
        clippy::cast_precision_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public entry
// points still carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Retry backoff math casts small bounded counters.
#![allow(clippy::cast_possible_truncation)]
//
// Style trade-offs accepted across the crate.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)] // Builders and constructors take owned values
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::must_use_candidate)]

//! Identity resolution and merge engine for scraped contact ("mark") records.
//!
//! A submission is validated into [`CleanedFields`], resolved to a
//! deterministic [`IdentityKey`], merged into any stored [`MarkRecord`] for
//! that key, embedded into a [`VectorIndex`], and written to a
//! [`DocumentStore`]. [`IngestionPipeline`] composes these steps.

/// The marks-core crate version (matches `Cargo.toml`).
pub const MARKS_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod constants;
pub mod embed;
pub mod error;
pub mod identity;
pub mod merge;
pub mod pipeline;
pub mod store;
pub mod text;
pub mod types;
pub mod validator;
pub mod vector;

// API-based embedding providers (OpenAI-compatible) - requires network
#[cfg(feature = "api_embed")]
pub mod api_embed;

// Remote vector index (Qdrant REST) - requires network
#[cfg(feature = "api_index")]
pub mod api_index;

pub use config::{MarksConfig, MarksConfigBuilder};
pub use constants::*;
pub use embed::{EmbeddingOrchestrator, build_embedding_input};
pub use error::{MarksError, Result};
pub use identity::{IdentityKey, build_key};
pub use merge::{create_record, merge};
pub use pipeline::{IngestionPipeline, PipelineStage};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use text::{clean_field, clean_source_text, normalize, truncate_at_grapheme_boundary};
pub use types::{
    CleanedFields, Document, EmbeddingOutcome, MarkRecord, SubmitReceipt, SubmitResponse,
    WriteAck,
};
pub use validator::{RawSubmission, parse_submission, raw_profile_url, validate, validate_at};
pub use vector::{EmbeddingService, MemoryVectorIndex, VectorIndex};

#[cfg(feature = "api_embed")]
pub use api_embed::{OpenAIConfig, OpenAIEmbedder};
#[cfg(feature = "api_index")]
pub use api_index::{QdrantConfig, QdrantVectorIndex};
