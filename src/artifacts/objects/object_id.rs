//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character hexadecimal strings addressing every object
//! in the database. Objects are stored under
//! `.twig/objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A validated 40-character hexadecimal SHA-1 identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string.
    ///
    /// Fails unless the input is exactly 40 ASCII hex digits.
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if id.len() != OBJECT_ID_LENGTH {
            anyhow::bail!("invalid object id length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("invalid object id characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Relative storage path for the object: `XX/YYYY...` where `XX` is the
    /// first two hex characters (sharding, not semantics).
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form (first 7 characters) for display.
    pub fn to_short_oid(&self) -> &str {
        &self.0[..7]
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn valid_hex_strings_parse(id in "[0-9a-f]{40}") {
            let oid = ObjectId::try_parse(id.clone()).unwrap();
            assert_eq!(oid.as_ref(), id);
        }

        #[test]
        fn wrong_length_is_rejected(id in "[0-9a-f]{0,39}") {
            assert!(ObjectId::try_parse(id).is_err());
        }

        #[test]
        fn non_hex_characters_are_rejected(
            prefix in "[0-9a-f]{10}",
            bad in "[g-z]{1}",
            suffix in "[0-9a-f]{29}",
        ) {
            assert!(ObjectId::try_parse(format!("{prefix}{bad}{suffix}")).is_err());
        }
    }

    #[test]
    fn uppercase_input_is_normalized() {
        let oid = ObjectId::try_parse("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(oid.as_ref(), "abcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn storage_path_splits_after_two_characters() {
        let oid = ObjectId::try_parse("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(
            oid.to_path(),
            PathBuf::from("ab").join("cdef0123456789abcdef0123456789abcdef01")
        );
        assert_eq!(oid.to_short_oid(), "abcdef0");
    }
}
