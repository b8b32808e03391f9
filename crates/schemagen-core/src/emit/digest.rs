//! Digest computation for generated artifacts.
//!
//! The digest is a SHA-256 over the exact artifact bytes. Two runs over the
//! same inputs produce identical text, so their digests match; any byte of
//! difference changes it.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the artifact text (64 characters).
///
/// ## Example
///
/// ```
/// use schemagen_core::emit::compute_artifact_digest;
///
/// let digest = compute_artifact_digest("export type ModelName = never;\n");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn compute_artifact_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
