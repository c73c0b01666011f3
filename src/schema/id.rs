//! Composite resource identifiers.
//!
//! Multi-part identifiers are joined with `#`, e.g.
//! `example.com#WEB#rule-00000001`. Data source snapshots get a stable
//! hash identifier derived from the matched object IDs.

use sha2::{Digest, Sha256};

use crate::error::SchemaError;

/// Separator between the parts of a composite resource ID.
pub const ID_SEPARATOR: char = '#';

/// Join ID parts in declaration order.
#[must_use]
pub fn build_composite_id(parts: &[&str]) -> String {
    parts.join(&ID_SEPARATOR.to_string())
}

/// Split a composite ID into exactly `expected` parts.
pub fn split_composite_id(id: &str, expected: usize) -> Result<Vec<String>, SchemaError> {
    let parts: Vec<String> = id.split(ID_SEPARATOR).map(ToString::to_string).collect();
    if parts.len() == expected && parts.iter().all(|p| !p.is_empty()) {
        Ok(parts)
    } else {
        Err(SchemaError::MalformedId {
            id: id.to_string(),
            expected,
        })
    }
}

/// Stable identifier for a data source result set.
///
/// 与查询到的对象 ID 集合一一对应，顺序敏感。
#[must_use]
pub fn data_resource_id_hash(ids: &[String]) -> String {
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_round_trip() {
        let id = build_composite_id(&["example.com", "WEB", "rule-00000001"]);
        assert_eq!(id, "example.com#WEB#rule-00000001");
        let parts = split_composite_id(&id, 3).unwrap();
        assert_eq!(parts, vec!["example.com", "WEB", "rule-00000001"]);
    }

    #[test]
    fn split_rejects_wrong_arity() {
        assert!(split_composite_id("a#b", 3).is_err());
        assert!(split_composite_id("a#b#c#d", 3).is_err());
    }

    #[test]
    fn split_rejects_empty_parts() {
        assert!(split_composite_id("a##c", 3).is_err());
        assert!(split_composite_id("", 1).is_err());
    }

    #[test]
    fn hash_is_stable_and_order_sensitive() {
        let ids = vec!["id-1".to_string(), "id-2".to_string()];
        let rev = vec!["id-2".to_string(), "id-1".to_string()];
        assert_eq!(data_resource_id_hash(&ids), data_resource_id_hash(&ids));
        assert_ne!(data_resource_id_hash(&ids), data_resource_id_hash(&rev));
        assert_eq!(data_resource_id_hash(&ids).len(), 16);
    }

    #[test]
    fn hash_separates_adjacent_ids() {
        // "ab"+"c" 与 "a"+"bc" 不应同哈希
        let left = vec!["ab".to_string(), "c".to_string()];
        let right = vec!["a".to_string(), "bc".to_string()];
        assert_ne!(data_resource_id_hash(&left), data_resource_id_hash(&right));
    }
}
