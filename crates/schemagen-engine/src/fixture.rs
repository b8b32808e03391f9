//! Static snapshot provider loaded from YAML.
//!
//! ```yaml
//! base:
//!   user:
//!     email: { type: string, required: true }
//! extensions:
//!   admin:
//!     entities:
//!       user:
//!         banned: { type: boolean }
//!   broken:
//!     fail: "schema resolver crashed"
//! ```
//!
//! Activating an extension overlays its entities on the base: new fields are
//! appended, redefined fields replace the base attribute in place, and new
//! entities are appended after the base entities.

use crate::provider::{ProviderError, SnapshotProvider};
use crate::Result;
use schemagen_core::errors::{ExError, GenError};
use schemagen_core::model::{EntitySnapshot, ExtensionDescriptor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureDocument {
    #[serde(default)]
    base: EntitySnapshot,
    #[serde(default)]
    extensions: BTreeMap<String, FixtureExtension>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureExtension {
    #[serde(default)]
    entities: EntitySnapshot,
    /// When set, activating the extension fails with this message
    #[serde(default)]
    fail: Option<String>,
}

/// Snapshot provider answering from a fixed document.
///
/// Records every call so tests can assert the activation sequence.
#[derive(Debug, Default)]
pub struct StaticSnapshotProvider {
    document: FixtureDocument,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StaticSnapshotProvider {
    /// Provider with only a base schema
    pub fn new(base: EntitySnapshot) -> Self {
        Self {
            document: FixtureDocument {
                base,
                extensions: BTreeMap::new(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register the fields an extension contributes when active
    pub fn with_extension(mut self, id: impl Into<String>, entities: EntitySnapshot) -> Self {
        self.document.extensions.insert(
            id.into(),
            FixtureExtension {
                entities,
                fail: None,
            },
        );
        self
    }

    /// Register an extension whose activation fails
    pub fn with_failing_extension(
        mut self,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.document.extensions.insert(
            id.into(),
            FixtureExtension {
                entities: EntitySnapshot::new(),
                fail: Some(message.into()),
            },
        );
        self
    }

    /// Parse and validate a YAML fixture.
    ///
    /// # Errors
    ///
    /// `FixtureInvalid` when the document does not parse or declares an
    /// empty extension id.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let document: FixtureDocument = serde_yaml::from_str(text).map_err(|e| {
            ExError::from(GenError::InvalidFixture {
                reason: format!("YAML parse error: {}", e),
            })
            .with_op("load_fixture")
        })?;

        if document.extensions.keys().any(|id| id.trim().is_empty()) {
            return Err(ExError::from(GenError::InvalidFixture {
                reason: "extension ids must not be empty".to_string(),
            })
            .with_op("load_fixture"));
        }

        tracing::debug!(
            entity_count = document.base.len(),
            extension_count = document.extensions.len(),
            "loaded snapshot fixture"
        );
        Ok(Self {
            document,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Read a YAML fixture from disk.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise as
    /// [`StaticSnapshotProvider::from_yaml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::from(GenError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
            .with_op("load_fixture")
        })?;
        Self::from_yaml_str(&text)
    }

    /// Extension ids the fixture knows, sorted
    pub fn extension_ids(&self) -> Vec<String> {
        self.document.extensions.keys().cloned().collect()
    }

    /// Active-id lists of every call so far, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record_call(&self, ids: Vec<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ids);
        }
    }
}

impl SnapshotProvider for StaticSnapshotProvider {
    type Activation = ();

    fn snapshot(
        &self,
        active: &[ExtensionDescriptor<()>],
    ) -> std::result::Result<EntitySnapshot, ProviderError> {
        self.record_call(active.iter().map(|d| d.id.clone()).collect());

        let mut snapshot = self.document.base.clone();
        for descriptor in active {
            let extension = self
                .document
                .extensions
                .get(&descriptor.id)
                .ok_or_else(|| {
                    ProviderError::new(format!("unknown extension '{}'", descriptor.id))
                })?;
            if let Some(message) = &extension.fail {
                return Err(ProviderError::new(message.clone()));
            }
            for (entity, fields) in extension.entities.entities() {
                match snapshot.entity_mut(entity) {
                    Some(existing) => {
                        for (key, attr) in fields.iter() {
                            existing.insert(key, attr.clone());
                        }
                    }
                    None => snapshot.insert_entity(entity, fields.clone()),
                }
            }
        }
        Ok(snapshot)
    }
}
