//! Publication record model.
//!
//! A record is an open-ended, insertion-ordered mapping as found in a site
//! data file. Nothing is required; accessors below look fields up under
//! their usual synonyms and degrade to `None` when a field is missing,
//! empty or of an unusable shape.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Keys that may hold the record title
pub const TITLE_KEYS: &[&str] = &["title", "Title"];
/// Keys that may hold the journal/venue name
pub const JOURNAL_KEYS: &[&str] = &["journal", "container-title", "container_title", "venue"];
/// Keys that may hold the volume
pub const VOLUME_KEYS: &[&str] = &["volume"];
/// Keys that may hold the issue number
pub const ISSUE_KEYS: &[&str] = &["issue", "number"];
/// Keys that may hold the page range
pub const PAGES_KEYS: &[&str] = &["pages", "page"];
/// Keys that may hold the DOI
pub const DOI_KEYS: &[&str] = &["doi", "DOI"];
/// Keys that may hold a landing page URL
pub const URL_KEYS: &[&str] = &["url", "URL"];

/// A single publication entry.
///
/// Serializes transparently as the underlying mapping, so reading and
/// writing a record never reorders or drops its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Mapping,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing mapping
    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Build a record from an arbitrary collection entry.
    ///
    /// Entries that are not mappings become empty records.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Mapping(m) => Self::from_mapping(m.clone()),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            _ => Self::new(),
        }
    }

    /// The underlying mapping
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// Consume the record, returning the underlying mapping
    pub fn into_mapping(self) -> Mapping {
        self.fields
    }

    /// Raw value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether `key` is present (even with a null value)
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or overwrite a field. Overwriting keeps the field's position.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(Value::String(key.to_string()), value.into());
    }

    /// Builder-style [`Record::set`]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Text value of `key`, if it is a non-empty string or a number
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }

    /// First non-empty text value among `keys`
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    /// Raw string value of `key` (not trimmed, strings only)
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Record title
    pub fn title(&self) -> Option<String> {
        self.first_text(TITLE_KEYS)
    }

    /// Journal / container / venue name
    pub fn journal(&self) -> Option<String> {
        self.first_text(JOURNAL_KEYS)
    }

    /// Volume
    pub fn volume(&self) -> Option<String> {
        self.first_text(VOLUME_KEYS)
    }

    /// Issue / number
    pub fn issue(&self) -> Option<String> {
        self.first_text(ISSUE_KEYS)
    }

    /// Page range
    pub fn pages(&self) -> Option<String> {
        self.first_text(PAGES_KEYS)
    }

    /// DOI
    pub fn doi(&self) -> Option<String> {
        self.first_text(DOI_KEYS)
    }

    /// Landing page URL
    pub fn url(&self) -> Option<String> {
        self.first_text(URL_KEYS)
    }

    /// Raw `authors` field
    pub fn authors(&self) -> Option<&Value> {
        self.get("authors")
    }
}

impl From<Mapping> for Record {
    fn from(fields: Mapping) -> Self {
        Self::from_mapping(fields)
    }
}

/// Trimmed text form of a scalar value.
///
/// Strings are trimmed, numbers use their decimal rendering. Empty strings,
/// null, booleans and collections yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Tagged(tagged) => return scalar_text(&tagged.value),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
