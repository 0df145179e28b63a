//! Documents sent to the search index.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Raw column values of one input line, keyed by column name in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata(Vec<(&'static str, String)>);

impl Metadata {
    pub fn with_capacity(capacity: usize) -> Self {
        Metadata(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.push((name, value.into()));
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }
}

// Serialized as a JSON object whose keys keep column order.
impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One searchable terminology entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Document {
    /// Unique key in the index, stable across re-imports of the same file
    pub id: String,
    pub code: String,
    pub display: String,
    /// Provenance tag (e.g. `snomed-ct`)
    pub context: String,
    pub metadata: Metadata,
}

/// A group of documents submitted to the index as one request.
pub type Batch = Vec<Document>;
