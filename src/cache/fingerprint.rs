use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable cache key derived from the text of a schema description.
///
/// Two requests with byte-identical schema text share a key, whatever
/// documents they are run against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(schema_description: &str) -> Self {
        Self(format!("{:x}", md5::compute(schema_description.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_schema_same_key() {
        let schema = "reviews[] = { username: string, rating: number }";
        assert_eq!(Fingerprint::of(schema), Fingerprint::of(schema));
    }

    #[test]
    fn test_distinct_schemas_distinct_keys() {
        assert_ne!(
            Fingerprint::of("reviews[] = { rating: number }"),
            Fingerprint::of("reviews[] = { rating: string }")
        );
    }

    #[test]
    fn test_key_is_md5_hex() {
        assert_eq!(Fingerprint::of("").as_str(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(Fingerprint::of("abc").to_string(), "900150983cd24fb0d6963f7d28e17f72");
    }
}
