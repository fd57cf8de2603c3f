use serde::{Deserialize, Serialize};

pub const DEFAULT_COLLECTION: &str = "movies";

/// Settings for a [`CatalogProvider`](super::CatalogProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Name of the remote collection holding movie documents.
    pub collection: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }
}
