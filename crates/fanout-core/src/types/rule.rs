//! Output rule types

use serde::{Deserialize, Deserializer, Serialize};

/// Destination plus key filters deciding whether an object is copied there
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRule {
    /// Name of the destination storage provider
    pub storage_name: String,
    /// Destination path prefix, `<container>[/<key prefix>]`
    pub path: String,
    /// Accepted key suffixes, empty matches everything
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suffix: Vec<String>,
    /// Accepted key prefixes, empty matches everything
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prefix: Vec<String>,
}

impl OutputRule {
    pub fn new(storage_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            storage_name: storage_name.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_suffix(mut self, value: impl Into<String>) -> Self {
        self.suffix.push(value.into());
        self
    }

    pub fn with_prefix(mut self, value: impl Into<String>) -> Self {
        self.prefix.push(value.into());
        self
    }

    /// Check if an object key passes both filter dimensions.
    ///
    /// The suffix filters are only consulted once a prefix filter passed.
    pub fn matches(&self, key: &str) -> bool {
        let prefix_ok =
            self.prefix.is_empty() || self.prefix.iter().any(|p| key.starts_with(p.as_str()));
        if !prefix_ok {
            return false;
        }
        self.suffix.is_empty() || self.suffix.iter().any(|s| key.ends_with(s.as_str()))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_match_anything() {
        let rule = OutputRule::new("store", "out");
        assert!(rule.matches("anything.bin"));
        assert!(rule.matches(""));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let rule = OutputRule::new("store", "out")
            .with_prefix("logs/")
            .with_prefix("audit/")
            .with_suffix(".json");

        assert!(rule.matches("logs/app.json"));
        assert!(rule.matches("audit/app.json"));
        assert!(!rule.matches("data/app.json"));
        assert!(!rule.matches("logs/app.txt"));
        assert!(!rule.matches("data/app.txt"));
    }

    #[test]
    fn test_null_filters_deserialize_as_empty() {
        let rule: OutputRule = serde_json::from_str(
            r#"{"storage_name": "s3-bucket", "path": "out", "suffix": null}"#,
        )
        .unwrap();
        assert!(rule.suffix.is_empty());
        assert!(rule.prefix.is_empty());
    }
}
