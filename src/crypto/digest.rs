//! SHA-256 license fingerprints and self-generated license ids.

use crate::codec::canonical;
use crate::license::{License, LicenseType};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the license's canonical encoding.
///
/// Stable across nodes for the same license; used in logs instead of the
/// full artifact.
pub fn license_fingerprint(license: &License) -> String {
    hex::encode(Sha256::digest(canonical::encode(license)))
}

/// Derive a uid for a self-generated license.
///
/// The generation is mixed in so two licenses generated in the same
/// millisecond by different commits still get distinct ids.
pub fn derive_uid(
    license_type: LicenseType,
    issued_to: &str,
    issue_date: DateTime<Utc>,
    generation: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(license_type.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(issued_to.as_bytes());
    hasher.update([0u8]);
    hasher.update(issue_date.timestamp_millis().to_be_bytes());
    hasher.update(generation.to_be_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..16])
}
