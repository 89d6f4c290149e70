//! Metadata for Alembic objects and properties.
//!
//! Metadata is stored as key-value pairs of strings and is used to
//! describe schemas, interpretations, and other attributes.

use smallvec::SmallVec;
use std::fmt;

/// Metadata storage - key-value pairs of strings, in insertion order.
///
/// Uses SmallVec optimization for common case of few entries.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MetaData {
    entries: SmallVec<[(String, String); 4]>,
}

impl MetaData {
    /// Schema title key.
    pub const SCHEMA_KEY: &'static str = "schema";

    /// Schema base type key.
    pub const SCHEMA_BASE_KEY: &'static str = "schemaBaseType";

    /// Interpretation key (e.g., "point", "normal", "rgb").
    pub const INTERPRETATION_KEY: &'static str = "interpretation";

    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata from key-value pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut meta = Self::new();
        for (k, v) in pairs {
            meta.set(*k, *v);
        }
        meta
    }

    /// Set a metadata value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Get a metadata value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to Alembic metadata string format.
    /// Format: "key=value;key2=value2;..."
    pub fn serialize(&self) -> String {
        let mut result = String::new();
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                result.push(';');
            }
            result.push_str(&escape_metadata_string(k));
            result.push('=');
            result.push_str(&escape_metadata_string(v));
        }
        result
    }

    /// Get schema title.
    pub fn schema(&self) -> Option<&str> {
        self.get(Self::SCHEMA_KEY)
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Escape special characters in metadata strings.
fn escape_metadata_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            '=' => result.push_str("\\="),
            _ => result.push(c),
        }
    }
    result
}
