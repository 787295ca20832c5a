//! Validation boundary: untyped client submissions in, [`CleanedFields`] out.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::constants::{NOTES_MAX_CHARS, ORG_MAX_CHARS, SOURCE_TEXT_MAX_CHARS};
use crate::error::{MarksError, Result};
use crate::text::clean_field;
use crate::types::CleanedFields;

/// Field name -> value mapping as sent by a scraping client.
pub type RawSubmission = Map<String, Value>;

/// Message returned for any name/email failure.
pub const MISSING_IDENTITY_MESSAGE: &str = "Missing or malformed name/email.";

/// Parse a request body into a [`RawSubmission`].
///
/// Bodies that are not JSON objects are validation failures.
pub fn parse_submission(body: &str) -> Result<RawSubmission> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| MarksError::validation(format!("invalid JSON body: {err}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(MarksError::validation("submission must be a JSON object")),
    }
}

/// Validate and clean a submission, stamping `created_at` with the current time if absent.
pub fn validate(raw: &RawSubmission) -> Result<CleanedFields> {
    validate_at(raw, Utc::now())
}

/// As [`validate`], with an explicit clock.
pub fn validate_at(raw: &RawSubmission, now: DateTime<Utc>) -> Result<CleanedFields> {
    let name = clean_field(text_value(raw, "name")?.unwrap_or_default(), None);
    let email = clean_field(text_value(raw, "email")?.unwrap_or_default(), None);
    if name.is_empty() || email.is_empty() || !email.contains('@') {
        return Err(MarksError::validation(MISSING_IDENTITY_MESSAGE));
    }

    let cleaned = |field: &str, cap: Option<usize>| -> Result<String> {
        Ok(clean_field(text_value(raw, field)?.unwrap_or_default(), cap))
    };

    let created_at = match text_value(raw, "created_at")? {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => now.to_rfc3339_opts(SecondsFormat::Micros, true),
    };

    Ok(CleanedFields {
        name,
        email,
        linkedin: cleaned("linkedin", None)?,
        on_x: cleaned("on_x", None)?,
        last_contact: text_value(raw, "last_contact")?
            .unwrap_or_default()
            .to_string(),
        notes: cleaned("notes", Some(NOTES_MAX_CHARS))?,
        org: cleaned("org", Some(ORG_MAX_CHARS))?,
        source_text: cleaned("source_text", Some(SOURCE_TEXT_MAX_CHARS))?,
        created_at,
    })
}

/// The submitted `linkedin` value exactly as sent, used for key derivation.
#[must_use]
pub fn raw_profile_url(raw: &RawSubmission) -> &str {
    raw.get("linkedin").and_then(Value::as_str).unwrap_or_default()
}

/// `None` for missing or `null`; non-string values are rejected.
fn text_value<'a>(raw: &'a RawSubmission, field: &str) -> Result<Option<&'a str>> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(MarksError::validation(format!(
            "field `{field}` must be a string"
        ))),
    }
}
