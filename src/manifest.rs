//! Provenance manifest
//!
//! The manifest is a JSON array written offline by the manifest tool, one
//! object per source dataset keyed by `id`. It is read once per question and
//! never written here.

use crate::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    pub id: String,
    pub title: Option<String>,
    pub catalog_url: Option<String>,
    pub url: Option<String>,
    pub resource_id: Option<String>,
    pub resource_url: Option<String>,
    pub license: Option<String>,
    pub attribution: Option<String>,
    pub notes: Option<String>,
    pub file_name: Option<String>,
    pub format: Option<String>,
    pub filesize_bytes: Option<u64>,
    pub md5: Option<String>,
    pub columns: Vec<Value>,
}

impl ManifestEntry {
    /// Catalog link, falling back to the legacy `url` field
    pub fn catalog_link(&self) -> Option<&str> {
        self.catalog_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: HashMap<String, ManifestEntry>,
}

impl Manifest {
    /// Load the manifest. A missing file is an empty manifest.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No manifest at {}, citations will be empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlannerError::Manifest(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| PlannerError::Manifest(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(content)?;
        let items = match raw {
            Value::Array(items) => items,
            _ => return Err(PlannerError::Manifest("manifest must be a JSON array".to_string())),
        };

        let mut entries = HashMap::new();
        for item in items {
            if !item.is_object() {
                continue;
            }
            match serde_json::from_value::<ManifestEntry>(item) {
                Ok(entry) => {
                    entries.insert(entry.id.clone(), entry);
                }
                Err(e) => warn!("Skipping manifest entry: {}", e),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
