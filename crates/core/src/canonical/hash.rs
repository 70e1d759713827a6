//! Canonical serialization and SHA-256 digests.

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of hex characters of the digest kept in a stable identifier.
const STABLE_ID_HEX_LEN: usize = 32;

/// Canonicalization failure.
///
/// Only reachable when a record contains a value JSON cannot represent, which
/// is a contract violation of the record type rather than a runtime condition.
#[derive(Debug, Error)]
#[error("Canonicalization failed: {0}")]
pub struct CanonicalError(String);

impl CanonicalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        "CANONICALIZATION_FAILED"
    }
}

/// Serializes a record into its canonical string.
///
/// Struct fields are emitted in declaration order. The value is serialized
/// directly (never through `serde_json::Value`, whose map sorts keys).
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    serde_json::to_string(value).map_err(|e| CanonicalError(e.to_string()))
}

/// SHA-256 of `content`, rendered as lowercase hex.
#[must_use]
pub fn stable_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Canonicalizes `value` and returns its digest.
pub fn digest_of<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    canonicalize(value).map(|canonical| stable_hash(&canonical))
}

/// Deterministic identifier derived from `namespace` and `seed`.
///
/// Shaped as `{namespace}_{32 hex chars}`; the same pair always yields the same id.
#[must_use]
pub fn stable_id(namespace: &str, seed: &str) -> String {
    let digest = stable_hash(&format!("{namespace}:{seed}"));
    format!("{namespace}_{}", &digest[..STABLE_ID_HEX_LEN])
}

/// A record that embeds an integrity hash over its own canonical form.
pub trait Attested {
    /// The hashed portion of the record (everything except the hash itself).
    type Canonical<'a>: Serialize
    where
        Self: 'a;

    /// Views the hashed portion.
    fn canonical(&self) -> Self::Canonical<'_>;

    /// The embedded digest.
    fn integrity_hash(&self) -> &str;
}

/// Recomputes a record's digest and compares it with the embedded one.
pub fn verify_integrity<R: Attested>(record: &R) -> Result<bool, CanonicalError> {
    Ok(digest_of(&record.canonical())? == record.integrity_hash())
}
