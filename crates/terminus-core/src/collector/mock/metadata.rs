//! Mock implementation of [`MetadataSource`].

use std::collections::HashMap;

use crate::collector::cloud::MetadataSource;
use crate::error::ProbeError;

/// Serves metadata fields from a map.
#[derive(Debug, Clone, Default)]
pub struct MockMetadata {
    available: bool,
    fields: HashMap<String, String>,
}

impl MockMetadata {
    /// An endpoint that answers but has no fields.
    pub fn new() -> Self {
        Self {
            available: true,
            fields: HashMap::new(),
        }
    }

    /// An endpoint that never answers the existence check.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: &str) {
        self.fields.insert(field.to_string(), value.to_string());
    }

    pub fn remove(&mut self, field: &str) {
        self.fields.remove(field);
    }
}

impl MetadataSource for MockMetadata {
    fn is_available(&self) -> bool {
        self.available
    }

    fn fetch(&self, field: &str) -> Result<String, ProbeError> {
        self.fields
            .get(field)
            .cloned()
            .ok_or_else(|| ProbeError::Metadata {
                field: field.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}
