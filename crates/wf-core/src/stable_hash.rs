//! SHA-256 based stable hashing.
//!
//! Provenance keys must be identical across runs and across independently
//! constructed but structurally equal nodes, so they are derived from a
//! canonical field encoding rather than `std::hash`.

use sha2::{Digest, Sha256};

/// Incremental hasher over named fields.
///
/// Every field is written as `name`, the value length and the value, so
/// `("ab", "c")` and `("a", "bc")` never collide.
#[derive(Clone)]
pub struct StableHasher {
    hasher: Sha256,
}

impl StableHasher {
    /// Start a hash for a node of the given kind tag
    pub fn new(tag: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        hasher.update([0u8]);
        Self { hasher }
    }

    /// Add one named field
    pub fn field(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        let value = value.to_string();
        self.hasher.update(name.as_bytes());
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Add an optional field; `None` is encoded distinctly from an empty string
    pub fn optional(self, name: &str, value: Option<impl std::fmt::Display>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(&format!("{name}?"), "none"),
        }
    }

    /// Add an ordered sequence of values under one field name
    pub fn sequence<I, T>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        let mut count = 0usize;
        for (i, value) in values.into_iter().enumerate() {
            self = self.field(&format!("{name}[{i}]"), value);
            count += 1;
        }
        self.field(&format!("{name}#"), count)
    }

    /// Finish and return the lowercase hex digest
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_hex_sha256() {
        let key = StableHasher::new("t").finish();
        assert_eq!(key.len(), 64);
        assert_eq!(key, StableHasher::new("t").finish());
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let a = StableHasher::new("t").field("x", "ab").field("y", "c").finish();
        let b = StableHasher::new("t").field("x", "a").field("y", "bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tag_participates() {
        let a = StableHasher::new("column").field("name", "id").finish();
        let b = StableHasher::new("table").field("name", "id").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_optional_none_differs_from_empty() {
        let none = StableHasher::new("t").optional("alias", None::<&str>).finish();
        let empty = StableHasher::new("t").optional("alias", Some("")).finish();
        assert_ne!(none, empty);
    }

    #[test]
    fn test_sequence_order_matters() {
        let a = StableHasher::new("f").sequence("args", ["a", "b"]).finish();
        let b = StableHasher::new("f").sequence("args", ["b", "a"]).finish();
        assert_ne!(a, b);
    }
}
