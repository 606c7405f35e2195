//! Test-data loading.
//!
//! Test data is a flat `key → string` table. Two file formats are accepted:
//!
//! - `.yaml` / `.yml`: a single mapping of scalars
//! - `.properties` (and anything else): `key=value` or `key: value` lines,
//!   `#` and `!` comments, trailing `\` continues a line
//!
//! Credentials stored hex-encoded are read back with
//! [`TestData::get_decrypted`].

use crate::codec::decrypt_string;
use crate::result::{PagewireError, PagewireResult};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Conventional location of the test-data file
pub const DEFAULT_TEST_DATA_PATH: &str = "ExternalFiles/testData.yaml";

/// Anything that can answer a test-data lookup
pub trait DataSource {
    /// Value for `key`
    ///
    /// # Errors
    ///
    /// [`PagewireError::TestData`] when the key is missing.
    fn get(&self, key: &str) -> PagewireResult<String>;
}

/// Flat test-data table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestData {
    values: BTreeMap<String, String>,
}

impl TestData {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file, picking the format from its extension
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PagewireResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PagewireError::test_data(format!("cannot read {}: {e}", path.display()))
        })?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let data = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_properties_str(&content)
        };
        debug!(path = %path.display(), keys = data.len(), "test data loaded");
        Ok(data)
    }

    /// Parse a YAML mapping of scalars
    ///
    /// # Errors
    ///
    /// [`PagewireError::Yaml`] on malformed YAML, [`PagewireError::TestData`]
    /// when the document is not a flat mapping.
    pub fn from_yaml_str(yaml: &str) -> PagewireResult<Self> {
        let document: Value = serde_yaml_ng::from_str(yaml)?;
        let mapping = match document {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            _ => return Err(PagewireError::test_data("test data must be a mapping")),
        };

        let mut values = BTreeMap::new();
        for (key, value) in mapping {
            let key = scalar_to_string(&key)
                .ok_or_else(|| PagewireError::test_data("test data keys must be scalars"))?;
            let value = scalar_to_string(&value).ok_or_else(|| {
                PagewireError::test_data(format!("value for {key:?} is not a scalar"))
            })?;
            let _ = values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Parse `key=value` / `key: value` lines
    #[must_use]
    pub fn from_properties_str(text: &str) -> Self {
        let mut values = BTreeMap::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            let comment = line.starts_with('#') || line.starts_with('!');
            if pending.is_empty() && (line.is_empty() || comment) {
                continue;
            }
            if let Some(head) = line.strip_suffix('\\') {
                pending.push_str(head);
                continue;
            }
            pending.push_str(line);
            let logical = std::mem::take(&mut pending);
            if let Some((key, value)) = split_property(&logical) {
                let _ = values.insert(key.to_string(), value.to_string());
            }
        }
        if let Some((key, value)) = split_property(&pending) {
            let _ = values.insert(key.to_string(), value.to_string());
        }
        Self { values }
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.values.insert(key.into(), value.into());
        self
    }

    /// Value for `key`, or `default` when missing
    #[must_use]
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Value for `key`, hex-decoded
    ///
    /// # Errors
    ///
    /// [`PagewireError::TestData`] when missing, [`PagewireError::Decode`]
    /// when the value is not valid hex.
    pub fn get_decrypted(&self, key: &str) -> PagewireResult<String> {
        decrypt_string(&DataSource::get(self, key)?)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The whole table
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl DataSource for TestData {
    fn get(&self, key: &str) -> PagewireResult<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| PagewireError::test_data(format!("missing key {key:?}")))
    }
}

fn split_property(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(at) = line.find(['=', ':']) else {
        return Some((line, ""));
    };
    let key = line[..at].trim();
    let value = line[at + 1..].trim();
    (!key.is_empty()).then_some((key, value))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_flat_mapping() {
            let data = TestData::from_yaml_str(
                "username: qa.user\npassword: 50617373\nretries: 3\nheadless: true\nempty:\n",
            )
            .unwrap();
            assert_eq!(data.get("username").unwrap(), "qa.user");
            assert_eq!(data.get("retries").unwrap(), "3");
            assert_eq!(data.get("headless").unwrap(), "true");
            assert_eq!(data.get("empty").unwrap(), "");
            assert_eq!(data.len(), 5);
        }

        #[test]
        fn test_nested_values_rejected() {
            let err = TestData::from_yaml_str("user:\n  name: x\n").unwrap_err();
            assert!(matches!(err, PagewireError::TestData { .. }));
        }

        #[test]
        fn test_top_level_sequence_rejected() {
            assert!(TestData::from_yaml_str("- a\n- b\n").is_err());
        }

        #[test]
        fn test_empty_document() {
            assert!(TestData::from_yaml_str("").unwrap().is_empty());
        }
    }

    mod properties_tests {
        use super::*;

        #[test]
        fn test_separators_and_comments() {
            let data = TestData::from_properties_str(concat!(
                "# comment\n",
                "! also comment\n",
                "\n",
                "user=alice\n",
                "password : 50617373 \n",
                "url=http://host:8080/x\n",
            ));
            assert_eq!(data.get("user").unwrap(), "alice");
            assert_eq!(data.get("password").unwrap(), "50617373");
            assert_eq!(data.get("url").unwrap(), "http://host:8080/x");
            assert_eq!(data.len(), 3);
        }

        #[test]
        fn test_line_continuation() {
            let data = TestData::from_properties_str("greeting=Hello \\\n   World\n");
            assert_eq!(data.get("greeting").unwrap(), "Hello World");
        }

        #[test]
        fn test_key_without_value() {
            let data = TestData::from_properties_str("flag\n");
            assert_eq!(data.get("flag").unwrap(), "");
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_missing_key() {
            let data = TestData::new();
            let err = data.get("nope").unwrap_err();
            assert!(err.to_string().contains("nope"));
        }

        #[test]
        fn test_get_or() {
            let data = TestData::new().with("a", "1");
            assert_eq!(data.get_or("a", "x"), "1");
            assert_eq!(data.get_or("b", "x"), "x");
        }

        #[test]
        fn test_get_decrypted() {
            let data = TestData::new().with("password", "50617373").with("bad", "5");
            assert_eq!(data.get_decrypted("password").unwrap(), "Pass");
            assert!(matches!(
                data.get_decrypted("bad"),
                Err(PagewireError::Decode { .. })
            ));
        }

        #[test]
        fn test_keys_sorted() {
            let data = TestData::new().with("b", "2").with("a", "1");
            assert_eq!(data.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_load_by_extension() {
            let dir = TempDir::new().unwrap();
            let yaml = dir.path().join("testData.yaml");
            std::fs::write(&yaml, "username: bob\n").unwrap();
            let props = dir.path().join("testData.properties");
            std::fs::write(&props, "username=carol\n").unwrap();

            assert_eq!(TestData::load(&yaml).unwrap().get("username").unwrap(), "bob");
            assert_eq!(TestData::load(&props).unwrap().get("username").unwrap(), "carol");
        }

        #[test]
        fn test_load_missing_file() {
            let dir = TempDir::new().unwrap();
            let err = TestData::load(dir.path().join("absent.yaml")).unwrap_err();
            assert!(matches!(err, PagewireError::TestData { .. }));
        }
    }
}
