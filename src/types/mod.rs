//! Public types exposed by the `marks-core` crate.

pub mod fields;
pub mod mark;
pub mod outcome;

pub use fields::CleanedFields;
pub use mark::{Document, MarkRecord};
pub use outcome::{EmbeddingOutcome, SubmitReceipt, SubmitResponse, WriteAck};
