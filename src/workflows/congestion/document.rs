use indexmap::IndexMap;
use serde::Deserialize;

/// One extracted page: field name to raw value, in document order.
pub type RawRecord = IndexMap<String, RawValue>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text.as_str()),
            RawValue::Number(_) => None,
        }
    }
}

/// Parsed document-extraction output. A document without a `pages` collection
/// is treated as an empty document, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionDocument {
    #[serde(default)]
    pub pages: Vec<RawRecord>,
}

impl ExtractionDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
