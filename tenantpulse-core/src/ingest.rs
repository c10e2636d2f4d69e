//! Snapshot loading
//!
//! Reads a merged platform export (`{"metadata": {...}, "companies": [...]}`)
//! into [`Snapshot`] records. All normalization of missing and null fields
//! happens here, during deserialization; see [`crate::types`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tenantpulse_core::ingest;
//!
//! let snapshot = ingest::load_snapshot(Path::new("merged_data.json"))?;
//! println!("{} companies ({})", snapshot.companies.len(), snapshot.source_digest.unwrap());
//! ```

use crate::error::Result;
use crate::types::Snapshot;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Load and parse a snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    tracing::debug!(path = %path.display(), "Loading snapshot");
    let bytes = std::fs::read(path)?;
    let snapshot = parse_snapshot_bytes(&bytes)?;

    tracing::info!(
        path = %path.display(),
        companies = snapshot.companies.len(),
        digest = snapshot.source_digest.as_deref().unwrap_or_default(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Parse a snapshot from an in-memory JSON document.
pub fn parse_snapshot(json: &str) -> Result<Snapshot> {
    parse_snapshot_bytes(json.as_bytes())
}

fn parse_snapshot_bytes(bytes: &[u8]) -> Result<Snapshot> {
    let mut snapshot: Snapshot = serde_json::from_slice(bytes)?;
    snapshot.source_digest = Some(content_digest(bytes));
    check_consistency(&snapshot);
    Ok(snapshot)
}

/// SHA-256 of the raw document, hex encoded.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Log counter/collection and metadata/company disagreements.
///
/// Both are warnings only: detail arrays are often partially populated.
fn check_consistency(snapshot: &Snapshot) {
    for company in &snapshot.companies {
        for (field, counter, populated) in company.counter_mismatches() {
            tracing::warn!(
                company = %company.name,
                field,
                counter,
                populated,
                "Counter differs from populated collection"
            );
        }
    }

    let meta = &snapshot.metadata;
    if meta.total_companies == 0 {
        return;
    }
    let companies = snapshot.companies.len() as u64;
    let users: u64 = snapshot.companies.iter().map(|c| c.users_count).sum();
    if meta.total_companies != companies || meta.total_users != users {
        tracing::warn!(
            metadata_companies = meta.total_companies,
            companies,
            metadata_users = meta.total_users,
            users,
            "Snapshot metadata totals differ from company counters"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_sets_digest() {
        let json = r#"{"metadata": {"total_companies": 1}, "companies": [{"name": "Acme"}]}"#;
        let snapshot = parse_snapshot(json).unwrap();

        assert_eq!(snapshot.companies.len(), 1);
        assert_eq!(snapshot.metadata.total_companies, 1);
        let digest = snapshot.source_digest.unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, content_digest(json.as_bytes()));
    }

    #[test]
    fn test_parse_snapshot_without_companies() {
        let snapshot = parse_snapshot("{}").unwrap();
        assert!(snapshot.companies.is_empty());
        assert_eq!(snapshot.metadata.total_users, 0);
    }

    #[test]
    fn test_parse_snapshot_tolerates_odd_field_types() {
        let json = r#"{
            "metadata": {"total_companies": 1.0},
            "companies": [{
                "_id": {"$oid": "a1"},
                "id": "a1",
                "name": "Acme",
                "users_count": 3.0,
                "users": [{"name": "ana", "phone": 201001234567, "email": null}]
            }]
        }"#;
        let snapshot = parse_snapshot(json).unwrap();

        let acme = &snapshot.companies[0];
        assert_eq!(acme.id.as_deref(), Some("a1"));
        assert_eq!(acme.users_count, 3);
        assert_eq!(acme.users[0].phone.as_deref(), Some("201001234567"));
        assert_eq!(snapshot.metadata.total_companies, 1);
    }

    #[test]
    fn test_parse_snapshot_rejects_invalid_json() {
        assert!(parse_snapshot("{not json").is_err());
    }

    #[test]
    fn test_load_snapshot_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"companies": [{"name": "A"}, {"name": "B"}]}"#).unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.companies.len(), 2);
        assert!(load_snapshot(&dir.path().join("missing.json")).is_err());
    }
}
