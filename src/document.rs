use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single named value of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub value: String,
    /// `true` tokenizes and counts the value, `false` indexes it verbatim
    #[serde(default = "default_analyze")]
    pub analyze: bool,
}

fn default_analyze() -> bool {
    true
}

impl Field {
    pub fn new(value: String, analyze: bool) -> Self {
        Self { value, analyze }
    }

    /// Free-text field, tokenized before indexing
    pub fn analyzed(value: impl Into<String>) -> Self {
        Self::new(value.into(), true)
    }

    /// Literal field, indexed as one exact term
    pub fn verbatim(value: impl Into<String>) -> Self {
        Self::new(value.into(), false)
    }
}

/// Document represents an indexable set of uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

impl Document {
    pub fn new(id: String) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, replacing any field previously stored under `name`
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, Field::analyzed(value))
    }

    pub fn with_keyword(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, Field::verbatim(value))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
