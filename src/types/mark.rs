//! The stored mark record and its document-store representation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::constants::MARK_TYPE;
use crate::error::{MarksError, Result};

/// Raw document as held by a [`crate::DocumentStore`].
pub type Document = Map<String, Value>;

/// Stored values written by older clients may be `null`; treat them as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A lead/contact record keyed by its identity key.
///
/// Missing or `null` fields in a stored document deserialize as defaults, so
/// partially-populated records from earlier writers still merge cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkRecord {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub on_x: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_contact: String,
    #[serde(deserialize_with = "null_as_default")]
    pub org: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source_text: String,
    /// Set on first write and never changed afterwards.
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Model id behind the current vector, empty if never embedded.
    #[serde(deserialize_with = "null_as_default")]
    pub embedding_source: String,
    /// Owned by outreach logic elsewhere; only carried over here.
    #[serde(deserialize_with = "null_as_default")]
    pub outreach_count: u64,
}

impl Default for MarkRecord {
    fn default() -> Self {
        Self {
            kind: MARK_TYPE.to_string(),
            name: String::new(),
            email: String::new(),
            linkedin: String::new(),
            on_x: String::new(),
            last_contact: String::new(),
            org: String::new(),
            notes: String::new(),
            source_text: String::new(),
            created_at: String::new(),
            embedding_source: String::new(),
            outreach_count: 0,
        }
    }
}

impl MarkRecord {
    /// Text fields in declared order, as fed to the embedding input.
    #[must_use]
    pub fn text_fields(&self) -> [(&'static str, &str); 11] {
        [
            ("type", &self.kind),
            ("name", &self.name),
            ("email", &self.email),
            ("linkedin", &self.linkedin),
            ("on_x", &self.on_x),
            ("last_contact", &self.last_contact),
            ("org", &self.org),
            ("notes", &self.notes),
            ("source_text", &self.source_text),
            ("created_at", &self.created_at),
            ("embedding_source", &self.embedding_source),
        ]
    }

    pub fn from_document(document: Document) -> Result<Self> {
        serde_json::from_value(Value::Object(document)).map_err(|err| MarksError::Store {
            reason: format!("stored mark is malformed: {err}"),
        })
    }

    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(MarksError::store(format!(
                "mark serialized to non-object value: {other}"
            ))),
        }
    }
}
