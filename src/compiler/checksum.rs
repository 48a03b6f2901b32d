//! Deterministic checksum of a rule document (spec §3, §4.2 step 3, §6
//! "Checksum format").
//!
//! `serde_json::Value`'s default `Map` is key-sorted (the `preserve_order`
//! feature is not enabled for this crate), so serializing a value parsed
//! from the document already yields the canonical, lexicographically
//! ordered byte form the spec requires: same semantic content, same bytes,
//! same digest.

use sha2::{Digest, Sha256};

use crate::error::CompilationError;

/// Compute the lowercase hex SHA-256 digest of the document's canonical
/// serialization.
pub fn compute(source: &str) -> Result<String, CompilationError> {
    let value: serde_json::Value = serde_yaml::from_str(source)
        .map_err(|e| CompilationError::new(format!("document parse error: {}", e)))?;
    let canonical = serde_json::to_vec(&value)
        .map_err(|e| CompilationError::new(format!("checksum serialization error: {}", e)))?;
    let digest = Sha256::digest(&canonical);
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_semantic_content_same_checksum() {
        let a = "schema_version: \"1.0.0\"\nmarketplace: acme\nversion: \"1.0.0\"\nrules: []\n";
        let b = "marketplace: acme\nschema_version: \"1.0.0\"\nversion: \"1.0.0\"\nrules: []\n";
        assert_eq!(compute(a).unwrap(), compute(b).unwrap());
    }

    #[test]
    fn different_content_different_checksum() {
        let a = "schema_version: \"1.0.0\"\nmarketplace: acme\nversion: \"1.0.0\"\nrules: []\n";
        let b = "schema_version: \"1.0.0\"\nmarketplace: other\nversion: \"1.0.0\"\nrules: []\n";
        assert_ne!(compute(a).unwrap(), compute(b).unwrap());
    }
}
