//! Deterministic canonical form, integrity digests and the injectable clock.
//!
//! Every hashed record is serialized in the declaration order of its fields,
//! with timestamps as millisecond ISO-8601 UTC strings and money as two-place
//! decimal strings. Changing a canonical struct's field list changes every
//! historical digest, so each record carries a `schema_version`.

pub mod clock;
pub mod hash;
pub mod serde_fmt;

pub use clock::Clock;
pub use hash::{
    Attested, CanonicalError, canonicalize, digest_of, stable_hash, stable_id, verify_integrity,
};
pub use serde_fmt::iso_millis;
