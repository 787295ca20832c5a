//! Field-level merge between a stored mark and newly validated data.
//!
//! Policy, by field group:
//!
//! - identity and contact fields are replaced only by non-empty incoming values;
//! - `created_at`, `outreach_count` and `embedding_source` carry over untouched;
//! - `notes` accumulate, newline-joined, without repeating the latest entry;
//! - `source_text` accumulates the same way but is capped after joining, so the
//!   oldest text falls off once the cap is reached.
//!
//! Merging is pure: no I/O and no retained references to either input.

use crate::constants::{MARK_TYPE, SOURCE_TEXT_MAX_CHARS};
use crate::text::{clean_source_text, truncate_at_grapheme_boundary};
use crate::types::{CleanedFields, MarkRecord};

/// Merge `incoming` into `existing`, preferring new values when present.
#[must_use]
pub fn merge(existing: &MarkRecord, incoming: &CleanedFields) -> MarkRecord {
    let prefer_new = |old: &str, new: &str| {
        if new.is_empty() {
            old.to_string()
        } else {
            new.to_string()
        }
    };

    MarkRecord {
        kind: MARK_TYPE.to_string(),
        name: prefer_new(&existing.name, &incoming.name),
        email: prefer_new(&existing.email, &incoming.email),
        linkedin: prefer_new(&existing.linkedin, &incoming.linkedin),
        on_x: prefer_new(&existing.on_x, &incoming.on_x),
        last_contact: prefer_new(&existing.last_contact, &incoming.last_contact),
        org: prefer_new(&existing.org, &incoming.org),
        notes: merge_notes(&existing.notes, &incoming.notes),
        source_text: merge_source_text(&existing.source_text, &incoming.source_text),
        created_at: existing.created_at.clone(),
        embedding_source: existing.embedding_source.clone(),
        outreach_count: existing.outreach_count,
    }
}

/// Build the first record for an identity that has never been stored.
///
/// `embedding_source` starts as `embedding_model`; the pipeline confirms it
/// only after a successful embedding.
#[must_use]
pub fn create_record(incoming: &CleanedFields, embedding_model: &str) -> MarkRecord {
    MarkRecord {
        kind: MARK_TYPE.to_string(),
        name: incoming.name.clone(),
        email: incoming.email.clone(),
        linkedin: incoming.linkedin.clone(),
        on_x: incoming.on_x.clone(),
        last_contact: incoming.last_contact.clone(),
        org: incoming.org.clone(),
        notes: incoming.notes.clone(),
        source_text: clean_source_text(&incoming.source_text, SOURCE_TEXT_MAX_CHARS),
        created_at: incoming.created_at.clone(),
        embedding_source: embedding_model.to_string(),
        outreach_count: 0,
    }
}

// A repeat of the most recently appended note is not appended again.
fn merge_notes(old: &str, new: &str) -> String {
    let last_entry = old.rsplit('\n').next().unwrap_or(old).trim();
    match (old.is_empty(), new.is_empty()) {
        (false, false) if old != new && last_entry != new.trim() => {
            format!("{}\n{}", old.trim(), new.trim())
        }
        (false, _) => old.to_string(),
        (true, false) => new.to_string(),
        (true, true) => String::new(),
    }
}

fn merge_source_text(old: &str, new: &str) -> String {
    let old = clean_source_text(old, SOURCE_TEXT_MAX_CHARS);
    let new = clean_source_text(new, SOURCE_TEXT_MAX_CHARS);
    // Re-cleaning folds earlier newline joins into spaces, so a repeat shows
    // up as a space-delimited suffix of the stored text.
    let repeats_tail = old == new || old.ends_with(&format!(" {new}"));
    let joined = match (old.is_empty(), new.is_empty()) {
        (false, false) if !repeats_tail => format!("{old}\n{new}"),
        (false, _) => old,
        (true, _) => new,
    };
    truncate_at_grapheme_boundary(&joined, SOURCE_TEXT_MAX_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> MarkRecord {
        MarkRecord {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            linkedin: "li-jane".into(),
            on_x: "@jane".into(),
            last_contact: "2024-01-01".into(),
            org: "Acme".into(),
            notes: "first contact".into(),
            source_text: "Jane Doe CEO".into(),
            created_at: "2023-05-05T00:00:00".into(),
            embedding_source: "gemini-embedding-001".into(),
            outreach_count: 4,
            ..MarkRecord::default()
        }
    }

    fn incoming() -> CleanedFields {
        CleanedFields {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            created_at: "2024-09-09T00:00:00.000000Z".into(),
            ..CleanedFields::default()
        }
    }

    #[test]
    fn empty_incoming_keeps_stored_values() {
        let merged = merge(&stored(), &incoming());
        assert_eq!(merged.linkedin, "li-jane");
        assert_eq!(merged.on_x, "@jane");
        assert_eq!(merged.org, "Acme");
        assert_eq!(merged.last_contact, "2024-01-01");
        assert_eq!(merged.notes, "first contact");
        assert_eq!(merged.source_text, "Jane Doe CEO");
    }

    #[test]
    fn non_empty_incoming_overwrites() {
        let new = CleanedFields {
            org: "Globex".into(),
            on_x: "@jdoe".into(),
            ..incoming()
        };
        let merged = merge(&stored(), &new);
        assert_eq!(merged.org, "Globex");
        assert_eq!(merged.on_x, "@jdoe");
    }

    #[test]
    fn immutable_and_carried_fields_survive() {
        let existing = MarkRecord {
            kind: "legacy".into(),
            ..stored()
        };
        let merged = merge(&existing, &incoming());
        assert_eq!(merged.created_at, "2023-05-05T00:00:00");
        assert_eq!(merged.outreach_count, 4);
        assert_eq!(merged.embedding_source, "gemini-embedding-001");
        assert_eq!(merged.kind, "mark");
    }

    #[test]
    fn notes_join_once_and_dedupe() {
        let new = CleanedFields {
            notes: "followed up".into(),
            ..incoming()
        };
        let merged = merge(&stored(), &new);
        assert_eq!(merged.notes, "first contact\nfollowed up");

        let same = CleanedFields {
            notes: "first contact".into(),
            ..incoming()
        };
        assert_eq!(merge(&stored(), &same).notes, "first contact");
    }

    #[test]
    fn repeated_note_is_not_appended_again() {
        let new = CleanedFields {
            notes: "followed up".into(),
            ..incoming()
        };
        let mut record = stored();
        for _ in 0..3 {
            record = merge(&record, &new);
        }
        assert_eq!(record.notes, "first contact\nfollowed up");
    }

    #[test]
    fn repeated_source_text_settles_after_first_join() {
        let existing = MarkRecord {
            source_text: "bio A".into(),
            ..stored()
        };
        let new = CleanedFields {
            source_text: "bio B".into(),
            ..incoming()
        };
        let once = merge(&existing, &new);
        assert_eq!(once.source_text, "bio A\nbio B");

        let mut record = once;
        for _ in 0..3 {
            record = merge(&record, &new);
            assert_eq!(record.source_text.matches("bio B").count(), 1);
        }
        assert_eq!(record.source_text, "bio A bio B");
    }

    #[test]
    fn notes_from_one_side_only() {
        let empty = MarkRecord {
            notes: String::new(),
            ..stored()
        };
        let new = CleanedFields {
            notes: "hello".into(),
            ..incoming()
        };
        assert_eq!(merge(&empty, &new).notes, "hello");
        assert_eq!(merge(&empty, &incoming()).notes, "");
    }

    #[test]
    fn source_text_accumulates_and_caps() {
        let new = CleanedFields {
            source_text: "Speaker at RustConf".into(),
            ..incoming()
        };
        let merged = merge(&stored(), &new);
        assert_eq!(merged.source_text, "Jane Doe CEO\nSpeaker at RustConf");

        let long_old = MarkRecord {
            source_text: "a".repeat(290),
            ..stored()
        };
        let long_new = CleanedFields {
            source_text: "b".repeat(50),
            ..incoming()
        };
        let capped = merge(&long_old, &long_new);
        assert_eq!(capped.source_text.chars().count(), SOURCE_TEXT_MAX_CHARS);
        assert!(capped.source_text.starts_with(&"a".repeat(290)));
        assert!(capped.source_text.ends_with("\nbbbbbbbbb"));
    }

    #[test]
    fn source_text_recleans_stored_value() {
        let messy = MarkRecord {
            source_text: "  Jane\n\n Doe  ".into(),
            ..stored()
        };
        let new = CleanedFields {
            source_text: "Jane Doe".into(),
            ..incoming()
        };
        assert_eq!(merge(&messy, &new).source_text, "Jane Doe");
    }

    #[test]
    fn create_record_starts_fresh() {
        let new = CleanedFields {
            notes: "first contact".into(),
            source_text: "bio".into(),
            ..incoming()
        };
        let record = create_record(&new, "text-embedding-3-small");
        assert_eq!(record.kind, "mark");
        assert_eq!(record.outreach_count, 0);
        assert_eq!(record.embedding_source, "text-embedding-3-small");
        assert_eq!(record.created_at, "2024-09-09T00:00:00.000000Z");
        assert_eq!(record.notes, "first contact");
        assert_eq!(record.source_text, "bio");
    }
}
