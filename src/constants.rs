//! Field caps and defaults shared by validation, merge, and configuration.

/// Maximum characters kept in `notes` after cleaning.
pub const NOTES_MAX_CHARS: usize = 500;
/// Maximum characters kept in `org` after cleaning.
pub const ORG_MAX_CHARS: usize = 200;
/// Maximum characters kept in `source_text`, per submission and after merge.
pub const SOURCE_TEXT_MAX_CHARS: usize = 300;

/// Record type tag stored on every mark.
pub const MARK_TYPE: &str = "mark";

/// Default DocumentStore collection holding marks.
pub const DEFAULT_COLLECTION: &str = "entities";
/// Default embedding model identifier recorded in `embedding_source`.
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";

/// Hex characters of the identity digest kept in the key suffix.
pub const IDENTITY_DIGEST_HEX_CHARS: usize = 8;

/// Reason reported when there is no source text to embed.
pub const SKIP_REASON_EMPTY_TEXT: &str = "empty text";
