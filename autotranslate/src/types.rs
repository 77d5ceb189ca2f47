//! Core types for autotranslate.
//! The string table format decodes into these; the writer serializes these.

use std::{collections::HashMap, fmt::Display, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    formats::StringTableFormat,
    traits::Parser,
};

/// Root element name used when a table is built from scratch.
pub const DEFAULT_ROOT: &str = "base";

/// A complete string table (corresponds to one `*.xml` strings file).
/// Contains metadata and all records for a single language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringTable {
    /// Table-level metadata (language tag, root element details).
    pub metadata: Metadata,

    /// Ordered list of all records in this table.
    #[serde(default)]
    pub records: Vec<StringRecord>,
}

impl StringTable {
    /// Creates an empty table for the given language display name.
    pub fn new(language: impl Into<String>) -> Self {
        StringTable {
            metadata: Metadata::new(language),
            records: Vec::new(),
        }
    }

    /// Reads a table from disk. Both the `tags` and the `strings` sections
    /// must be present.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading string table");
        StringTable::try_from(StringTableFormat::read_from(path)?)
    }

    /// Writes the table to disk, creating parent directories as needed.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        tracing::debug!(
            path = %path.display(),
            records = self.records.len(),
            "writing string table"
        );
        StringTableFormat::from(self.clone()).write_to(path)
    }

    /// Sets the language tag written to `tags/tag@language`.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.metadata.language = language.into();
    }

    pub fn find_record(&self, id: &str) -> Option<&StringRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn find_record_mut(&mut self, id: &str) -> Option<&mut StringRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Returns only the records worth sending to translation: those whose
    /// text is non-empty after trimming whitespace.
    pub fn filter_translatable(&self) -> Vec<&StringRecord> {
        self.records.iter().filter(|r| r.is_translatable()).collect()
    }

    /// Maps every id to its position in [`StringTable::records`].
    pub fn index_by_id(&self) -> HashMap<String, usize> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect()
    }

    /// Checks the table invariants: ids are non-empty and unique.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashMap::with_capacity(self.records.len());
        for (i, record) in self.records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(Error::format_error(format!(
                    "string #{} has an empty id",
                    i + 1
                )));
            }
            if let Some(first) = seen.insert(record.id.as_str(), i) {
                return Err(Error::format_error(format!(
                    "duplicate string id `{}` (strings #{} and #{})",
                    record.id,
                    first + 1,
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// Table-level metadata.
///
/// `language` is the human-readable language name stored on the single
/// `<tag>` element. The root element name and any attributes on the root
/// and on `<tag>` are carried along so a rewritten file keeps its shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    /// Language display name (e.g. "Français", "Deutsch").
    pub language: String,

    /// Root element name, usually `base`.
    pub root: String,

    /// Attributes of the root element, in document order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[serde(default)]
    pub root_attributes: IndexMap<String, String>,

    /// Attributes of `<tag>` other than `language`, in document order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[serde(default)]
    pub tag_attributes: IndexMap<String, String>,
}

impl Metadata {
    pub fn new(language: impl Into<String>) -> Self {
        Metadata {
            language: language.into(),
            root: DEFAULT_ROOT.to_string(),
            root_attributes: IndexMap::new(),
            tag_attributes: IndexMap::new(),
        }
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Metadata {{ language: {}, root: {} }}",
            self.language, self.root
        )
    }
}

/// A single string record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringRecord {
    /// Unique string identifier within the table.
    pub id: String,

    /// Text in the table's language.
    pub text: String,

    /// Source-language text at the time this record was last translated.
    /// Absent in pristine source tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub original: Option<String>,

    /// Any other attributes found on the element, in document order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[serde(default)]
    pub extra: IndexMap<String, String>,
}

impl StringRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        StringRecord {
            id: id.into(),
            text: text.into(),
            original: None,
            extra: IndexMap::new(),
        }
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn is_translatable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// The `original` attribute, treating a missing one as empty.
    pub fn original_or_empty(&self) -> &str {
        self.original.as_deref().unwrap_or_default()
    }
}

impl Display for StringRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringRecord {{ id: {}, text: {} }}", self.id, self.text)
    }
}
