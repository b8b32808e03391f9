use schemagen_core::model::{EntitySnapshot, ExtensionDescriptor};
use schemagen_engine::{ProviderError, SnapshotProvider, StaticSnapshotProvider};
use std::path::PathBuf;
use std::sync::Mutex;

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The auth fixture provider
#[allow(dead_code)]
pub fn auth_provider() -> StaticSnapshotProvider {
    StaticSnapshotProvider::from_file(fixture_path("auth.yaml")).unwrap()
}

#[allow(dead_code)]
pub fn descriptors(ids: &[&str]) -> Vec<ExtensionDescriptor> {
    ids.iter().map(|id| ExtensionDescriptor::named(*id)).collect()
}

/// Provider whose activation payload is the extension's own contribution.
///
/// The base call can be made to fail.
#[allow(dead_code)]
pub struct InlineProvider {
    pub base: Option<EntitySnapshot>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

#[allow(dead_code)]
impl InlineProvider {
    pub fn new(base: EntitySnapshot) -> Self {
        Self {
            base: Some(base),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_base() -> Self {
        Self {
            base: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl SnapshotProvider for InlineProvider {
    type Activation = EntitySnapshot;

    fn snapshot(
        &self,
        active: &[ExtensionDescriptor<EntitySnapshot>],
    ) -> Result<EntitySnapshot, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(active.iter().map(|d| d.id.clone()).collect());

        let mut snapshot = self
            .base
            .clone()
            .ok_or_else(|| ProviderError::new("base schema unavailable"))?;
        for descriptor in active {
            for (entity, fields) in descriptor.activation.entities() {
                if !snapshot.contains_entity(entity) {
                    snapshot.insert_entity(entity, Default::default());
                }
                if let Some(table) = snapshot.entity_mut(entity) {
                    for (key, attr) in fields.iter() {
                        table.insert(key, attr.clone());
                    }
                }
            }
        }
        Ok(snapshot)
    }
}
