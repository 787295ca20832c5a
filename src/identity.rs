//! Identity keys: deterministic document ids derived from noisy identity fields.
//!
//! A key looks like `jane_doe_1a2b3c4d`: the normalized name (spaces turned
//! into underscores) followed by the first eight hex characters of a SHA-1
//! digest over `normalized_name|normalized_email|profile_url`. The profile URL
//! enters the digest verbatim, case included, so existing keys stay stable.
//! Eight hex characters leave roughly 32 bits of collision resistance; that is
//! accepted, not eliminated.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::constants::IDENTITY_DIGEST_HEX_CHARS;
use crate::text::normalize;

/// Primary key of a mark in both the document store and the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Hex digest suffix after the final underscore.
    #[must_use]
    pub fn digest(&self) -> &str {
        self.0.rsplit('_').next().unwrap_or_default()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the identity key for a `(name, email, profile_url)` triple.
///
/// `name` and `email` are normalized first; `profile_url` is used as given.
#[must_use]
pub fn build_key(name: &str, email: &str, profile_url: &str) -> IdentityKey {
    let normalized_name = normalize(name);
    let normalized_email = normalize(email);

    let mut hasher = Sha1::new();
    hasher.update(normalized_name.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized_email.as_bytes());
    hasher.update(b"|");
    hasher.update(profile_url.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let prefix = normalized_name.replace(' ', "_");
    IdentityKey(format!(
        "{prefix}_{}",
        &digest[..IDENTITY_DIGEST_HEX_CHARS]
    ))
}
