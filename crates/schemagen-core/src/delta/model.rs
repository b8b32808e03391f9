//! Delta and aggregation output types.
//!
//! All collections are ordered `Vec`s: entity order and per-entity extension
//! order are first-seen order, which is what makes emission deterministic.

use crate::model::{EntityFields, FieldAttribute};
use serde::Serialize;

/// Fields one extension contributes, per entity, when evaluated alone
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExtensionDelta {
    entities: Vec<(String, EntityFields)>,
}

impl ExtensionDelta {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Record the new fields for an entity. Empty tables are ignored.
    pub(crate) fn push(&mut self, entity: impl Into<String>, fields: EntityFields) {
        if !fields.is_empty() {
            self.entities.push((entity.into(), fields));
        }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityFields> {
        self.entities
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityFields)> {
        self.entities.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Per-extension delta tables of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDelta {
    pub entity: String,
    /// `(extension id, new fields)` in extension order; every table is non-empty
    pub contributions: Vec<(String, EntityFields)>,
}

/// entity → extension id → new fields, over every evaluated extension
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeltaMap {
    entries: Vec<EntityDelta>,
}

impl DeltaMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Merge one extension's delta into the table
    pub(crate) fn merge(&mut self, extension_id: &str, delta: &ExtensionDelta) {
        for (entity, fields) in delta.entities() {
            let contribution = (extension_id.to_string(), fields.clone());
            match self.entries.iter_mut().find(|e| e.entity == entity) {
                Some(entry) => entry.contributions.push(contribution),
                None => self.entries.push(EntityDelta {
                    entity: entity.to_string(),
                    contributions: vec![contribution],
                }),
            }
        }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDelta> {
        self.entries.iter().find(|e| e.entity == name)
    }

    /// The delta of `extension_id` for `entity`, if it contributed anything
    pub fn get(&self, entity: &str, extension_id: &str) -> Option<&EntityFields> {
        self.entity(entity).and_then(|e| {
            e.contributions
                .iter()
                .find(|(id, _)| id == extension_id)
                .map(|(_, f)| f)
        })
    }

    /// Ids of the extensions contributing to `entity`, in extension order
    pub fn extension_ids(&self, entity: &str) -> Vec<String> {
        self.entity(entity)
            .map(|e| e.contributions.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    /// Entity names in first-seen order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.entity.as_str())
    }

    pub fn entries(&self) -> &[EntityDelta] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Emission shape of one entity, computed once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityShape {
    /// Base fields only; the merged type is the base-fields type
    BaseOnly,
    /// Exists only because of one extension; emitted as a flat alias
    ExtensionOnly { extension_id: String },
    /// Base fields (if any) intersected with every contributing extension
    Merged {
        has_base: bool,
        extension_ids: Vec<String>,
    },
}

impl EntityShape {
    pub fn classify(has_base: bool, mut extension_ids: Vec<String>) -> Self {
        match (has_base, extension_ids.len()) {
            (true, 0) => EntityShape::BaseOnly,
            (false, 1) => EntityShape::ExtensionOnly {
                extension_id: extension_ids.remove(0),
            },
            _ => EntityShape::Merged {
                has_base,
                extension_ids,
            },
        }
    }

    pub fn has_base(&self) -> bool {
        match self {
            EntityShape::BaseOnly => true,
            EntityShape::ExtensionOnly { .. } => false,
            EntityShape::Merged { has_base, .. } => *has_base,
        }
    }

    pub fn extension_ids(&self) -> Vec<&str> {
        match self {
            EntityShape::BaseOnly => Vec::new(),
            EntityShape::ExtensionOnly { extension_id } => vec![extension_id.as_str()],
            EntityShape::Merged { extension_ids, .. } => {
                extension_ids.iter().map(String::as_str).collect()
            }
        }
    }
}

/// An entity scheduled for emission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedEntity {
    /// On-wire entity name, kept verbatim
    pub name: String,
    pub shape: EntityShape,
}

/// A later descriptor dropped because its id was already processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedExtension {
    pub extension_id: String,
    /// Position of the dropped descriptor in the caller's list
    pub position: usize,
}

/// A base field an extension's snapshot redefined.
///
/// Redefinitions never reach the delta: the base definition is what gets
/// emitted. They are reported so callers can spot them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRedefinition {
    pub extension_id: String,
    pub entity: String,
    pub field: String,
    pub base: FieldAttribute,
    pub extension: FieldAttribute,
}

/// Result of aggregating every extension against the base
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregatedModel {
    pub deltas: DeltaMap,
    /// Entities to emit, base entities first, then extension-introduced ones
    pub entities: Vec<PlannedEntity>,
    /// Processed extension ids in first-seen order
    pub extension_ids: Vec<String>,
    pub dropped_duplicates: Vec<DroppedExtension>,
    pub redefinitions: Vec<FieldRedefinition>,
}

impl AggregatedModel {
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn planned(&self, name: &str) -> Option<&PlannedEntity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
