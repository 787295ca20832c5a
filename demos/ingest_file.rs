//! Ingest newline-delimited JSON submissions into a file-backed store.
//!
//! Run with: cargo run --example ingest_file [-- submissions.jsonl]
//!
//! Without an argument a few built-in submissions are used, including a
//! repeat of the same person and one rejected body.

use std::sync::Arc;

use tempfile::tempdir;

use marks_core::{
    EmbeddingService, FileDocumentStore, IngestionPipeline, MarksConfig, MemoryVectorIndex,
    Result, SubmitResponse,
};

/// Hashes bytes into a tiny fixed-width vector. Good enough to exercise the index.
struct ToyEmbedder;

impl EmbeddingService for ToyEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; 8];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % 8] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }
}

const SAMPLE: &str = r#"{"name": "Jane Doe", "email": "jane@x.com", "linkedin": "https://linkedin.com/in/janedoe", "notes": "met at conf", "source_text": "Jane leads platform at Acme."}
{"name": "  JANE  doe ", "email": "JANE@X.COM", "linkedin": "https://linkedin.com/in/janedoe", "notes": "sent intro email", "org": "Acme"}
{"name": "Sam Lee", "email": "sam@y.org", "on_x": "@samlee"}
{"name": "No Email"}
"#;

fn main() -> Result<()> {
    let input = match std::env::args().nth(1) {
        Some(path) => fs_err::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };

    let dir = tempdir()?;
    let store = FileDocumentStore::open(dir.path().join("marks"))?;
    let index = Arc::new(MemoryVectorIndex::new());
    let config = MarksConfig::builder().collection("demo_marks").build()?;
    let pipeline = IngestionPipeline::new(store, ToyEmbedder, Arc::clone(&index), config)?;

    println!("=== marks-core ingest demo ===");
    println!("store root: {:?}\n", pipeline.store().root());

    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match pipeline.submit_json(line)? {
            SubmitResponse::Accepted(receipt) => {
                println!(
                    "line {}: {} [{}] notes={:?}",
                    line_no + 1,
                    receipt.id,
                    receipt.embedding_status.status(),
                    receipt.record.notes
                );
            }
            SubmitResponse::Rejected { error } => {
                println!("line {}: rejected ({error})", line_no + 1);
            }
        }
    }

    println!("\nvectors indexed: {}", index.len()?);
    Ok(())
}
