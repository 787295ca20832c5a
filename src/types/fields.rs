use serde::{Deserialize, Serialize};

/// Canonical field set produced by the validator.
///
/// `name` and `email` are always non-empty and `email` contains `@`; the
/// other text fields are cleaned and capped. `last_contact` is passed through
/// as submitted and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedFields {
    pub name: String,
    pub email: String,
    pub linkedin: String,
    pub on_x: String,
    pub last_contact: String,
    pub notes: String,
    pub org: String,
    pub source_text: String,
    pub created_at: String,
}
